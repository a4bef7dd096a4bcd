pub mod grid;
pub mod store;

pub use grid::Grid;
pub use store::{SpatialStore, StoreSnapshot};
