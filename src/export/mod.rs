//! XML fragments for CubeBlocks definitions.
//!
//! The documents built here are candidates for [`crate::merge`]; they are not
//! indented until [`Document::pretty`](crate::xml::Document::pretty) is called.

pub mod definition;
pub mod mount_points;

pub use definition::BlockDefinition;
pub use mount_points::{format_coordinate, mount_points_xml};
