//! # Block Type Module
//!
//! The closed set of cell kinds a chunk can hold.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates every kind a grid cell can take.
///
/// Discriminants are the on-cell storage values, so the order is fixed.
/// `FromPrimitive` turns a stored byte back into a `BlockType`.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// Air. Never meshed, never hit by a ray.
    EMPTY,
    /// Returned for lookups that fall outside any loaded data. Never stored.
    UNKNOWN,
    /// Grassland and forest surface.
    GRASS_BLOCK,
    /// Soil.
    DIRT,
    /// Base fill and mountain surface.
    STONE,
    /// Transparent; meshed into the transparent pass.
    WATER,
    /// Snow peak cap.
    SNOW,
    /// The bottom layer, y = 0.
    BEDROCK,
    /// Transparent; meshed into the transparent pass.
    LAVA,
    /// Desert surface and lake beds.
    SAND,
    /// Marsh topsoil.
    MUSHLAND,
    /// Mushroom cap.
    MUSHHEAD,
    /// Mushroom stem.
    MUSHSTEM,
    /// Oak trunk.
    OAK_LOG,
    /// Oak canopy.
    OAK_LEAF,
    /// Dark oak trunk.
    DARK_LOG,
    /// Dark oak canopy.
    DARK_LEAF,
    /// Birch trunk.
    BIRCH_LOG,
    /// Birch canopy.
    BIRCH_LEAF,
    /// Dark forest prop.
    PUMPKIN,
    /// Plain prop.
    WATERMELON,
    /// Desert column.
    CACTUS,
    /// Snow peak prop.
    LANTERN,
}

impl BlockType {
    /// Number of variants.
    pub const COUNT: usize = BlockType::LANTERN as usize + 1;

    /// Converts a stored cell value back to a `BlockType`.
    ///
    /// Bytes outside the enumeration decode as `UNKNOWN`.
    pub fn from_int(btype: BlockTypeSize) -> Self {
        num_traits::FromPrimitive::from_u8(btype).unwrap_or(BlockType::UNKNOWN)
    }

    /// Iterates every variant in storage order.
    pub fn all() -> impl Iterator<Item = BlockType> {
        (0..Self::COUNT as BlockTypeSize).map(Self::from_int)
    }

    /// Water and lava: faces behind them stay visible and their own faces go
    /// into the transparent mesh.
    pub fn is_transparent(self) -> bool {
        matches!(self, BlockType::WATER | BlockType::LAVA)
    }

    /// `true` for anything that is a real material (not EMPTY or UNKNOWN).
    pub fn is_material(self) -> bool {
        !matches!(self, BlockType::EMPTY | BlockType::UNKNOWN)
    }

    /// Whether a picking ray stops at this cell.
    pub fn is_pickable(self) -> bool {
        !matches!(self, BlockType::EMPTY | BlockType::WATER | BlockType::LAVA)
    }
}
