//! Shared types used throughout the library.

mod bounds;
mod mirroring;
mod side;

pub use bounds::{bounds, BoundingBox, BoxCorner};
pub use mirroring::{
    mirroring_axis_from_name, Mirroring, MirroringAxes, MirroringAxis, MirroringFit,
};
pub use side::{Side, SideDescriptor, Projection, ANGLE_45};

use crate::error::{ExportError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Half the edge length of a large block, in scene units.
pub const LARGE_BLOCK_HALF_EXTENT: f32 = 1.25;

/// A small block is a fifth of a large block.
pub const SMALL_BLOCK_RATIO: f32 = 0.2;

/// The two grid sizes a block can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSize {
    #[default]
    Large,
    Small,
}

impl BlockSize {
    /// The value written to `<CubeSize>`.
    pub fn cube_size(&self) -> &'static str {
        match self {
            BlockSize::Large => "Large",
            BlockSize::Small => "Small",
        }
    }

    /// Half edge length of one grid cell.
    pub fn half_extent(&self) -> f32 {
        match self {
            BlockSize::Large => LARGE_BLOCK_HALF_EXTENT,
            BlockSize::Small => LARGE_BLOCK_HALF_EXTENT * SMALL_BLOCK_RATIO,
        }
    }

    /// Scale that maps one grid cell onto the unit range 0..1.
    pub fn normalize_scale(&self) -> f32 {
        match self {
            BlockSize::Large => 0.4,
            BlockSize::Small => 2.0,
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "large" => Some(BlockSize::Large),
            "small" => Some(BlockSize::Small),
            _ => None,
        }
    }
}

impl std::fmt::Display for BlockSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cube_size())
    }
}

/// Which block sizes a scene is exported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockSizeMode {
    Large,
    Small,
    /// Export a large block and a scaled-down small block from the same scene.
    #[default]
    ScaleDown,
}

impl BlockSizeMode {
    /// The `(size, scale_down)` pairs to export, in export order.
    pub fn variants(&self) -> &'static [(BlockSize, bool)] {
        match self {
            BlockSizeMode::Large => &[(BlockSize::Large, false)],
            BlockSizeMode::Small => &[(BlockSize::Small, false)],
            BlockSizeMode::ScaleDown => &[(BlockSize::Large, false), (BlockSize::Small, true)],
        }
    }
}

/// Logical block configuration of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockConfig {
    /// Grid size the block is modelled for.
    pub size: BlockSize,
    /// Number of grid cells along x, y and z (scene axes, z up).
    pub dimensions: [u32; 3],
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            size: BlockSize::Large,
            dimensions: [1, 1, 1],
        }
    }
}

impl BlockConfig {
    pub fn new(size: BlockSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_dimensions(mut self, dimensions: [u32; 3]) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Reject zero-sized dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.iter().any(|&d| d == 0) {
            return Err(ExportError::InvalidConfig(format!(
                "block dimensions must be at least 1, got {:?}",
                self.dimensions
            )));
        }
        Ok(())
    }

    /// Half extents of the whole block along each axis.
    pub fn half_extents(&self) -> Vec3 {
        let [x, y, z] = self.dimensions;
        Vec3::new(x as f32, y as f32, z as f32) * self.size.half_extent()
    }
}

/// The bounding box of the logical block, centred at the origin.
pub fn block_bounds(config: &BlockConfig) -> BoundingBox {
    let half = config.half_extents();
    BoundingBox::from_min_max(-half, half)
}
