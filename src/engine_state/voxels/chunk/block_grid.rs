//! Dense cell storage for one chunk column.

use std::fmt;

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};

use super::coordinates::{CHUNK_HEIGHT, CHUNK_VOLUME, CHUNK_WIDTH};

/// A 16 × 256 × 16 array of block kinds, one byte per cell.
///
/// Cells are laid out `x + 16 * y + 16 * 256 * z`. The grid knows nothing
/// about neighbors or meshes; that is [`super::Chunk`]'s job. The generator
/// builds one of these off-thread and hands it over whole.
#[derive(Clone, PartialEq, Eq)]
pub struct BlockGrid {
    cells: Box<[BlockTypeSize]>,
}

impl BlockGrid {
    /// A grid with every cell `EMPTY`.
    pub fn new() -> Self {
        BlockGrid {
            cells: vec![BlockType::EMPTY as BlockTypeSize; CHUNK_VOLUME].into_boxed_slice(),
        }
    }

    #[inline]
    fn index(x: usize, y: usize, z: usize) -> usize {
        x + CHUNK_WIDTH as usize * y + (CHUNK_WIDTH * CHUNK_HEIGHT) as usize * z
    }

    /// Whether `(x, y, z)` lies inside the grid.
    #[inline]
    pub fn contains(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH).contains(&x) && (0..CHUNK_HEIGHT).contains(&y) && (0..CHUNK_WIDTH).contains(&z)
    }

    /// Reads an interior cell. Coordinates must be in range.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockType {
        BlockType::from_int(self.cells[Self::index(x, y, z)])
    }

    /// Reads a cell, or `None` outside the grid.
    #[inline]
    pub fn try_get(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        Self::contains(x, y, z).then(|| self.get(x as usize, y as usize, z as usize))
    }

    /// Writes an interior cell. Coordinates must be in range.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        self.cells[Self::index(x, y, z)] = block_type as BlockTypeSize;
    }

    /// Writes a cell if it lies inside the grid; returns whether it did.
    #[inline]
    pub fn try_set(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> bool {
        if !Self::contains(x, y, z) {
            return false;
        }
        self.set(x as usize, y as usize, z as usize, block_type);
        true
    }

    /// Raw cell bytes in storage order.
    pub fn as_bytes(&self) -> &[BlockTypeSize] {
        &self.cells
    }

    /// Number of cells holding `block_type`.
    pub fn count(&self, block_type: BlockType) -> usize {
        let raw = block_type as BlockTypeSize;
        self.cells.iter().filter(|&&cell| cell == raw).count()
    }
}

impl Default for BlockGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockGrid")
            .field("non_empty", &(CHUNK_VOLUME - self.count(BlockType::EMPTY)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = BlockGrid::new();
        assert_eq!(grid.count(BlockType::EMPTY), CHUNK_VOLUME);
    }

    #[test]
    fn test_layout_is_x_then_y_then_z() {
        let mut grid = BlockGrid::new();
        grid.set(1, 2, 3, BlockType::STONE);
        assert_eq!(grid.as_bytes()[1 + 16 * 2 + 16 * 256 * 3], BlockType::STONE as u8);
        assert_eq!(grid.get(1, 2, 3), BlockType::STONE);
    }

    #[test]
    fn test_checked_access_rejects_outside_cells() {
        let mut grid = BlockGrid::new();
        assert!(!grid.try_set(16, 0, 0, BlockType::DIRT));
        assert!(!grid.try_set(0, -1, 0, BlockType::DIRT));
        assert!(!grid.try_set(0, 256, 0, BlockType::DIRT));
        assert!(grid.try_set(15, 255, 15, BlockType::DIRT));

        assert_eq!(grid.try_get(15, 255, 15), Some(BlockType::DIRT));
        assert_eq!(grid.try_get(0, 0, -1), None);
        assert_eq!(grid.count(BlockType::DIRT), 1);
    }
}
