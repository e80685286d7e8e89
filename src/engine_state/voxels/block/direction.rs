//! # Direction Module
//!
//! The six axis-aligned face directions of a block. The four lateral ones
//! double as slots in a chunk's neighbor table.

use cgmath::Vector3;

/// One of the six faces of a voxel, named by the axis its normal points along.
#[allow(clippy::upper_case_acronyms)]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Direction {
    /// +x, east.
    XPOS = 0,
    /// -x, west.
    XNEG = 1,
    /// +y, up.
    YPOS = 2,
    /// -y, down.
    YNEG = 3,
    /// +z.
    ZPOS = 4,
    /// -z.
    ZNEG = 5,
}

impl Direction {
    /// All six directions in table order.
    pub fn all() -> [Direction; 6] {
        [
            Direction::XPOS,
            Direction::XNEG,
            Direction::YPOS,
            Direction::YNEG,
            Direction::ZPOS,
            Direction::ZNEG,
        ]
    }

    /// The directions in which a chunk can have a neighbor.
    pub fn lateral() -> [Direction; 4] {
        [
            Direction::XPOS,
            Direction::XNEG,
            Direction::ZPOS,
            Direction::ZNEG,
        ]
    }

    /// The direction facing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::XPOS => Direction::XNEG,
            Direction::XNEG => Direction::XPOS,
            Direction::YPOS => Direction::YNEG,
            Direction::YNEG => Direction::YPOS,
            Direction::ZPOS => Direction::ZNEG,
            Direction::ZNEG => Direction::ZPOS,
        }
    }

    /// Unit step along this direction.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            Direction::XPOS => Vector3::new(1, 0, 0),
            Direction::XNEG => Vector3::new(-1, 0, 0),
            Direction::YPOS => Vector3::new(0, 1, 0),
            Direction::YNEG => Vector3::new(0, -1, 0),
            Direction::ZPOS => Vector3::new(0, 0, 1),
            Direction::ZNEG => Vector3::new(0, 0, -1),
        }
    }

    /// Face normal as floats, ready for a vertex.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }

    /// Slot of a lateral direction in a 4-entry neighbor table, `None` for ±Y.
    pub fn lateral_index(self) -> Option<usize> {
        match self {
            Direction::XPOS => Some(0),
            Direction::XNEG => Some(1),
            Direction::ZPOS => Some(2),
            Direction::ZNEG => Some(3),
            Direction::YPOS | Direction::YNEG => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_an_involution() {
        for direction in Direction::all() {
            assert_ne!(direction.opposite(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.offset() + direction.opposite().offset(), Vector3::new(0, 0, 0));
        }
    }

    #[test]
    fn test_lateral_slots_are_distinct() {
        let slots: Vec<usize> = Direction::lateral()
            .iter()
            .filter_map(|d| d.lateral_index())
            .collect();
        assert_eq!(slots, vec![0, 1, 2, 3]);
        assert_eq!(Direction::YPOS.lateral_index(), None);
    }
}
