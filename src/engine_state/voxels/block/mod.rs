//! # Block Module
//!
//! Block kinds, the six face directions, and the texture atlas layout that
//! ties them together.

use block_type::BlockType;
use direction::Direction;

pub mod block_type;
pub mod direction;

/// The underlying integer type used to store a block kind in a chunk cell.
pub type BlockTypeSize = u8;

/// Width of one atlas tile in texture coordinates. The atlas is a 16×16 grid.
pub const ATLAS_TILE: f32 = 1.0 / 16.0;

/// Maps each block type to the atlas tile used by each of its faces.
///
/// The outer array is indexed by `BlockType` as a `usize`, the inner one by
/// `Direction` in the order [XPOS, XNEG, YPOS, YNEG, ZPOS, ZNEG]. Entries are
/// (column, row) tile indices. EMPTY and UNKNOWN never reach the mesher.
pub static BLOCK_TYPE_TO_ATLAS_TILES: [[(u8, u8); 6]; BlockType::COUNT] = [
    [(0, 0); 6],                                                // EMPTY
    [(0, 0); 6],                                                // UNKNOWN
    [(3, 15), (3, 15), (8, 13), (2, 15), (3, 15), (3, 15)],     // GRASS_BLOCK
    [(2, 15); 6],                                               // DIRT
    [(1, 15); 6],                                               // STONE
    [(14, 3); 6],                                               // WATER
    [(2, 11); 6],                                               // SNOW
    [(1, 14); 6],                                               // BEDROCK
    [(14, 1); 6],                                               // LAVA
    [(2, 14); 6],                                               // SAND
    [(14, 8); 6],                                               // MUSHLAND
    [(13, 8); 6],                                               // MUSHHEAD
    [(13, 7); 6],                                               // MUSHSTEM
    [(4, 14), (4, 14), (5, 14), (5, 14), (4, 14), (4, 14)],     // OAK_LOG
    [(5, 12); 6],                                               // OAK_LEAF
    [(4, 8), (4, 8), (5, 14), (5, 14), (4, 8), (4, 8)],         // DARK_LOG
    [(4, 12); 6],                                               // DARK_LEAF
    [(5, 8), (5, 8), (5, 14), (5, 14), (5, 8), (5, 8)],         // BIRCH_LOG
    [(5, 12); 6],                                               // BIRCH_LEAF
    [(6, 8), (6, 8), (6, 9), (6, 8), (6, 8), (6, 8)],           // PUMPKIN
    [(8, 7), (8, 7), (9, 7), (8, 7), (8, 7), (8, 7)],           // WATERMELON
    [(6, 11), (6, 11), (5, 11), (5, 11), (6, 11), (6, 11)],     // CACTUS
    [(8, 8), (6, 8), (6, 9), (6, 8), (6, 8), (6, 8)],           // LANTERN
];

/// Returns the lower-left texture coordinate of the atlas tile for one face.
pub fn atlas_offset(block_type: BlockType, direction: Direction) -> [f32; 2] {
    let (column, row) = BLOCK_TYPE_TO_ATLAS_TILES[block_type as usize][direction as usize];
    [column as f32 * ATLAS_TILE, row as f32 * ATLAS_TILE]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grass_top_differs_from_sides() {
        assert_eq!(atlas_offset(BlockType::GRASS_BLOCK, Direction::YPOS), [0.5, 13.0 / 16.0]);
        assert_eq!(atlas_offset(BlockType::GRASS_BLOCK, Direction::XNEG), [3.0 / 16.0, 15.0 / 16.0]);
        assert_eq!(atlas_offset(BlockType::GRASS_BLOCK, Direction::YNEG), [2.0 / 16.0, 15.0 / 16.0]);
    }

    #[test]
    fn test_every_material_has_a_tile() {
        for block_type in BlockType::all().filter(|t| t.is_material()) {
            for direction in Direction::all() {
                let [u, v] = atlas_offset(block_type, direction);
                assert!(u > 0.0 || v > 0.0, "{block_type:?} {direction:?} has no tile");
                assert!(u < 1.0 && v < 1.0);
            }
        }
    }
}
