//! Core type definitions used throughout the codebase

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Unique identifier for entities
///
/// Ids are handed out by the spatial store and stay stable for the lifetime
/// of the entity, including across life-stage transitions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
#[display(fmt = "#{}", _0)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Placeholder carried by freshly built entities until the store assigns one
    pub const UNASSIGNED: EntityId = EntityId(0);

    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

/// Identifier for pheromone trails (edges between locations)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
#[display(fmt = "edge-{}", _0)]
pub struct EdgeId(pub u64);

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Integer grid position. `y` grows upward, so "below" is `y - 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display(fmt = "({}, {})", x, y)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn below(&self) -> Self {
        self.offset(0, -1)
    }

    pub fn above(&self) -> Self {
        self.offset(0, 1)
    }

    /// One grid step along `theta` (radians), rounded to the nearest cell
    pub fn step_toward(&self, theta: f64) -> Self {
        self.offset(theta.cos().round() as i32, theta.sin().round() as i32)
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Heading of this vector in radians
    pub fn theta(&self) -> f64 {
        (self.y as f64).atan2(self.x as f64)
    }
}

impl std::ops::Add for GridPos {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for GridPos {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

/// Axis-aligned bounding box anchored at its bottom-left cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub position: GridPos,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(position: GridPos, width: i32, height: i32) -> Self {
        Self { position, width, height }
    }

    /// A single cell
    pub fn cell(position: GridPos) -> Self {
        Self::new(position, 1, 1)
    }

    pub fn max_x(&self) -> i32 {
        self.position.x + self.width - 1
    }

    pub fn max_y(&self) -> i32 {
        self.position.y + self.height - 1
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.position.x <= other.max_x()
            && other.position.x <= self.max_x()
            && self.position.y <= other.max_y()
            && other.position.y <= self.max_y()
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.overlaps(&Rect::cell(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId(7).to_string(), "#7");
        assert!(!EntityId::UNASSIGNED.is_assigned());
        assert!(EntityId::from(3).is_assigned());
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(GridPos::new(0, 0), 2, 2);
        let b = Rect::new(GridPos::new(1, 1), 2, 2);
        let c = Rect::new(GridPos::new(2, 0), 1, 1);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(a.contains(GridPos::new(1, 0)));
        assert!(!a.contains(GridPos::new(2, 1)));
    }

    #[test]
    fn test_step_toward_heading() {
        let origin = GridPos::new(5, 5);
        assert_eq!(origin.step_toward(0.0), GridPos::new(6, 5));
        assert_eq!(origin.step_toward(std::f64::consts::FRAC_PI_2), GridPos::new(5, 6));
        assert_eq!(origin.step_toward(std::f64::consts::PI), GridPos::new(4, 5));
        assert_eq!(origin.step_toward(-std::f64::consts::FRAC_PI_2), GridPos::new(5, 4));
    }

    #[test]
    fn test_theta_matches_step() {
        let dir = GridPos::new(0, -1);
        assert_eq!(GridPos::new(0, 0).step_toward(dir.theta()), dir);
    }
}
