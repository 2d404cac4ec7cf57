//! # CubeBlock Export
//!
//! Building blocks for exporting modelled blocks to a voxel game's
//! `CubeBlocks.sbc` catalog.
//!
//! ## Overview
//!
//! - [`mount_points`] finds polygons painted with the `MountPoint` material,
//!   assigns each to the block side it faces and projects it into that side's
//!   plane, in grid units.
//! - [`export`] turns mount points and other block settings into
//!   `<Definition>` XML fragments.
//! - [`merge`] merges such fragments into a hand-maintained catalog, touching
//!   only the elements the fragment mentions.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cubeblock_export::{
//!     block_bounds, mount_point_definitions, AsAuthored, BlockConfig, BlockSize,
//!     CubeBlocksMerger, MergeOptions, mount_points_xml,
//! };
//!
//! let config = BlockConfig::new(BlockSize::Large);
//! let mps = mount_point_definitions(&objects, &AsAuthored, &block_bounds(&config), config.size)?;
//!
//! let mut merger = CubeBlocksMerger::open("CubeBlocks.sbc", MergeOptions::default())?;
//! merger.merge(&definition.to_xml()?, false)?;
//! merger.write()?;
//! ```
//!
//! ## Host Integration
//!
//! Implement [`SceneObject`] for your scene's objects and [`MeshEvaluator`]
//! to hand out evaluated meshes. The evaluated mesh is dropped as soon as an
//! object has been scanned, so it can own and release host resources.

pub mod error;
pub mod types;
pub mod scene;
pub mod mount_points;
pub mod xml;
pub mod merge;
pub mod export;

// Re-export main types for convenience
pub use error::{ExportError, Result};
pub use types::{
    block_bounds, BlockConfig, BlockSize, BlockSizeMode, BoundingBox, BoxCorner, Mirroring,
    MirroringAxes, MirroringAxis, Side,
};
pub use scene::{AsAuthored, EvaluatedMesh, MeshEvaluator, MeshObject, ObjectKind, PolyMesh, Polygon, SceneObject};
pub use mount_points::{mount_point_definitions, mount_point_skeleton, MountPoint, MOUNT_POINT_MATERIAL};
pub use xml::{Document, NodeId, XmlEditor};
pub use merge::{CubeBlocksMerger, MergeOptions, MergeReport, MergeResult};
pub use export::{format_coordinate, mount_points_xml, BlockDefinition};

/// Load scene objects from a JSON file.
pub fn load_scene<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<MeshObject>> {
    let json = std::fs::read_to_string(path)?;
    scene::load_objects_json(&json)
}
