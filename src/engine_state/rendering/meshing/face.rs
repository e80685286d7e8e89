//! Quad templates for the six faces of a block.

use crate::engine_state::voxels::block::{direction::Direction, ATLAS_TILE};

const T: f32 = ATLAS_TILE;

/// Geometry of one face of a unit cube.
///
/// Corners are offsets from the block's minimum corner, listed
/// counter-clockwise when seen from outside. `uvs` are added to the block's
/// atlas tile offset, so each face spans exactly one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceTemplate {
    /// The face this template draws.
    pub direction: Direction,
    /// Corner offsets from the block's minimum corner.
    pub corners: [[f32; 3]; 4],
    /// Corner offsets inside one atlas tile.
    pub uvs: [[f32; 2]; 4],
}

/// Face templates in [`Direction::all`] order.
pub static FACE_TEMPLATES: [FaceTemplate; 6] = [
    FaceTemplate {
        direction: Direction::XPOS,
        corners: [[1., 0., 0.], [1., 1., 0.], [1., 1., 1.], [1., 0., 1.]],
        uvs: [[T, 0.], [T, T], [0., T], [0., 0.]],
    },
    FaceTemplate {
        direction: Direction::XNEG,
        corners: [[0., 0., 0.], [0., 0., 1.], [0., 1., 1.], [0., 1., 0.]],
        uvs: [[0., 0.], [T, 0.], [T, T], [0., T]],
    },
    FaceTemplate {
        direction: Direction::YPOS,
        corners: [[0., 1., 0.], [1., 1., 0.], [1., 1., 1.], [0., 1., 1.]],
        uvs: [[0., T], [T, T], [T, 0.], [0., 0.]],
    },
    FaceTemplate {
        direction: Direction::YNEG,
        corners: [[0., 0., 0.], [0., 0., 1.], [1., 0., 1.], [1., 0., 0.]],
        uvs: [[0., 0.], [0., T], [T, T], [T, 0.]],
    },
    FaceTemplate {
        direction: Direction::ZPOS,
        corners: [[0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.]],
        uvs: [[0., 0.], [T, 0.], [T, T], [0., T]],
    },
    FaceTemplate {
        direction: Direction::ZNEG,
        corners: [[0., 0., 0.], [0., 1., 0.], [1., 1., 0.], [1., 0., 0.]],
        uvs: [[T, 0.], [T, T], [0., T], [0., 0.]],
    },
];
