pub mod world;

pub use world::{AntMode, Edge, EditorState, UserMode, World};
