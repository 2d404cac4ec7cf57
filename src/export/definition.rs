//! Generated `<Definition>` fragments.

use super::mount_points::append_mount_points;
use crate::error::Result;
use crate::mount_points::MountPoint;
use crate::types::{BlockConfig, MirroringAxes, MirroringAxis};
use crate::xml::{Document, NodeId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the exporter knows about one block variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub subtype_id: String,
    pub block_pair_name: String,
    /// Grid size and dimensions (scene axes, z up).
    #[serde(default)]
    pub block: BlockConfig,
    /// Icon path; `.dds` is appended when it has no extension.
    #[serde(default)]
    pub icon: Option<String>,
    pub model: String,
    /// Construction stage models, least built first.
    #[serde(default)]
    pub construction_models: Vec<String>,
    #[serde(default)]
    pub mount_points: Vec<MountPoint>,
    /// SubtypeId of the block that replaces this one when mirrored.
    #[serde(default)]
    pub mirroring_block: Option<String>,
    #[serde(default)]
    pub mirroring: MirroringAxes,
}

fn text_element(doc: &mut Document, parent: NodeId, tag: &str, text: impl Into<String>) -> NodeId {
    let element = doc.create_element(tag);
    doc.set_text(element, Some(text.into()));
    doc.append_child(parent, element);
    element
}

fn xyz_element(doc: &mut Document, parent: NodeId, tag: &str, xyz: [u32; 3]) {
    let element = doc.create_element(tag);
    for (name, value) in ["x", "y", "z"].into_iter().zip(xyz) {
        doc.set_attribute(element, name, value.to_string());
    }
    doc.append_child(parent, element);
}

fn icon_path(icon: &str) -> String {
    if Path::new(icon).extension().is_some() {
        icon.to_string()
    } else {
        format!("{}.dds", icon)
    }
}

impl BlockDefinition {
    /// Build the `<Definition>` document.
    pub fn to_xml(&self) -> Result<Document> {
        self.block.validate()?;

        let mut doc = Document::new("Definition");
        let root = doc.root();

        let id = doc.create_element("Id");
        doc.append_child(root, id);
        text_element(&mut doc, id, "SubtypeId", self.subtype_id.as_str());

        if let Some(icon) = &self.icon {
            text_element(&mut doc, root, "Icon", icon_path(icon));
        }
        text_element(&mut doc, root, "CubeSize", self.block.size.cube_size());
        text_element(&mut doc, root, "BlockTopology", "TriangleMesh");

        // The game's y axis is the scene's z axis.
        let [x, y, z] = self.block.dimensions;
        xyz_element(&mut doc, root, "Size", [x, z, y]);
        xyz_element(&mut doc, root, "ModelOffset", [0, 0, 0]);
        text_element(&mut doc, root, "Model", self.model.as_str());

        if !self.construction_models.is_empty() {
            let stages = doc.create_element("BuildProgressModels");
            doc.append_child(root, stages);
            let count = self.construction_models.len();
            for (i, file) in self.construction_models.iter().enumerate() {
                let upper_bound = (i + 1) as f32 / count as f32;
                let model = doc.create_element("Model");
                doc.set_attribute(model, "BuildPercentUpperBound", format!("{:.2}", upper_bound));
                doc.set_attribute(model, "File", file.as_str());
                doc.append_child(stages, model);
            }
        }

        if !self.mount_points.is_empty() {
            let list = doc.create_element("MountPoints");
            doc.append_child(root, list);
            append_mount_points(&mut doc, list, &self.mount_points);
        }

        if let Some(mirroring_block) = &self.mirroring_block {
            text_element(&mut doc, root, "MirroringBlock", mirroring_block.as_str());
        }

        if !self.mirroring.is_empty() {
            for axis in MirroringAxis::ALL {
                let value = self.mirroring.get(axis).map_or("None", |m| m.name());
                text_element(&mut doc, root, axis.tag(), value);
            }
        }

        text_element(&mut doc, root, "BlockPairName", self.block_pair_name.as_str());
        Ok(doc)
    }
}
