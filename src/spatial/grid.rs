//! Dense grid of per-cell data, sized to the world

use crate::core::types::GridPos;

/// Fixed-size 2D grid. Memory is bounded by `width * height`; lookups outside
/// the grid return `None` instead of allocating.
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: i32,
    pub height: i32,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            data: vec![T::default(); (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, pos: GridPos) -> Option<&T> {
        self.index(pos).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut T> {
        self.index(pos).map(move |i| &mut self.data[i])
    }

    /// Iterate over every cell with its position, row by row
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &T)> + '_ {
        let width = self.width.max(1) as usize;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (GridPos::new((i % width) as i32, (i / width) as i32), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_none() {
        let mut grid: Grid<u8> = Grid::new(3, 2);
        assert!(grid.get(GridPos::new(-1, 0)).is_none());
        assert!(grid.get(GridPos::new(3, 0)).is_none());
        assert!(grid.get(GridPos::new(0, 2)).is_none());
        assert!(grid.get_mut(GridPos::new(5, 5)).is_none());
    }

    #[test]
    fn test_set_and_iterate() {
        let mut grid: Grid<u8> = Grid::new(3, 2);
        if let Some(cell) = grid.get_mut(GridPos::new(2, 1)) {
            *cell = 7;
        }
        assert_eq!(grid.get(GridPos::new(2, 1)), Some(&7));
        let hits: Vec<_> = grid.iter().filter(|(_, v)| **v == 7).map(|(p, _)| p).collect();
        assert_eq!(hits, vec![GridPos::new(2, 1)]);
    }
}
