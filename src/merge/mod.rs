//! Merging generated block definitions into an existing CubeBlocks catalog.
//!
//! A catalog is a hand-maintained `<Definitions><CubeBlocks>` file. Merging a
//! candidate `<Definition>` updates the matching record in place: known tags
//! are inserted at their canonical position, list-type tags are replaced
//! wholesale, and everything the candidate does not mention is left alone,
//! including comments, unknown tags and indentation.

use crate::error::{ExportError, Result};
use crate::xml::{Document, NodeId, XmlEditor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Canonical order of the children of a `<Definition>`.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "Id",
    "DisplayName",
    "Icon",
    "CubeSize",
    "BlockTopology",
    "Size",
    "ModelOffset",
    "Model",
    "UseModelIntersection",
    "Components",
    "CriticalComponent",
    "BuildProgressModels",
    "MountPoints",
    "BlockPairName",
    "MirroringBlock",
    "MirroringX",
    "MirroringY",
    "MirroringZ",
    "DeformationRatio",
    "EdgeType",
    "BuildTimeSeconds",
    "DisassembleRatio",
    "Public",
];

/// Canonical order of the children of `<Id>`.
pub const ID_ELEMENTS: &[&str] = &["TypeId", "SubtypeId"];

/// Tags whose children are replaced as a whole.
pub const LIST_ELEMENTS: &[&str] = &["BuildProgressModels", "MountPoints"];

/// Depth of a `<Definition>` inside `<Definitions><CubeBlocks>`.
const BLOCK_LEVEL: usize = 2;

/// Outcome of merging one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MergeResult {
    Merged,
    /// The record was found by BlockPairName and CubeSize and its SubtypeId rewritten.
    Renamed,
    NotFound,
}

/// Options for [`CubeBlocksMerger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// One level of indentation in the catalog.
    pub indent: String,
    /// Keep the previous catalog as `<file>.bak` when writing.
    pub backup: bool,
    /// Used by [`CubeBlocksMerger::merge_all`].
    pub allow_renames: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            backup: true,
            allow_renames: false,
        }
    }
}

/// Per-SubtypeId outcome of [`CubeBlocksMerger::merge_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub merged: Vec<String>,
    pub renamed: Vec<String>,
    pub not_found: Vec<String>,
}

impl MergeReport {
    pub fn is_success(&self) -> bool {
        self.not_found.is_empty()
    }
}

/// SubtypeId of a candidate `<Definition>` document.
pub fn subtype_id(candidate: &Document) -> Option<&str> {
    candidate.find_text(candidate.root(), "Id/SubtypeId")
}

/// An in-memory catalog with lookup indices over its records.
#[derive(Debug)]
pub struct CubeBlocksMerger {
    path: Option<PathBuf>,
    document: Document,
    options: MergeOptions,
    by_id: HashMap<String, NodeId>,
    by_pair_and_size: HashMap<(String, String), NodeId>,
}

impl CubeBlocksMerger {
    /// Load a catalog file.
    pub fn open<P: AsRef<Path>>(path: P, options: MergeOptions) -> Result<Self> {
        let path = path.as_ref();
        let document = Document::load(path)?;
        let mut merger = Self::from_document(document, options)?;
        merger.path = Some(path.to_path_buf());
        Ok(merger)
    }

    /// Wrap an already parsed catalog. [`write`](Self::write) is unavailable.
    pub fn from_document(document: Document, options: MergeOptions) -> Result<Self> {
        let root = document.root();
        if document.tag(root) != Some("Definitions") {
            return Err(ExportError::MalformedCatalog(format!(
                "root element is <{}>, expected <Definitions>",
                document.tag(root).unwrap_or_default()
            )));
        }
        let (_, container) = document
            .find_child(root, "CubeBlocks")
            .ok_or_else(|| ExportError::MalformedCatalog("no <CubeBlocks> element".to_string()))?;

        let mut merger = Self {
            path: None,
            document,
            options,
            by_id: HashMap::new(),
            by_pair_and_size: HashMap::new(),
        };
        for block in merger.document.descendants(container, "Definition") {
            merger.index(block);
        }
        log::debug!(
            "Catalog has {} definitions ({} with BlockPairName and CubeSize)",
            merger.by_id.len(),
            merger.by_pair_and_size.len()
        );
        Ok(merger)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn index(&mut self, block: NodeId) {
        let doc = &self.document;
        if let Some(id) = doc.find_text(block, "Id/SubtypeId") {
            self.by_id.insert(id.to_string(), block);
        }
        if let (Some(pair), Some(size)) = (
            doc.find_text(block, "BlockPairName"),
            doc.find_text(block, "CubeSize"),
        ) {
            self.by_pair_and_size
                .insert((pair.to_string(), size.to_string()), block);
        }
    }

    /// Refresh the index entries of a record after it changed.
    fn reindex(&mut self, block: NodeId) {
        self.by_id.retain(|_, &mut indexed| indexed != block);
        self.by_pair_and_size.retain(|_, &mut indexed| indexed != block);
        self.index(block);
    }

    /// Merge one candidate `<Definition>` into the matching catalog record.
    ///
    /// The record is looked up by SubtypeId, then, if `rename_allowed`, by
    /// BlockPairName and CubeSize. A candidate without a SubtypeId is an error.
    pub fn merge(&mut self, candidate: &Document, rename_allowed: bool) -> Result<BTreeSet<MergeResult>> {
        let candidate_root = candidate.root();
        let id = subtype_id(candidate)
            .ok_or(ExportError::MissingSubtypeId)?
            .to_string();

        let mut outcome = BTreeSet::new();
        let mut block = self.by_id.get(&id).copied();
        if block.is_none() && rename_allowed {
            if let (Some(pair), Some(size)) = (
                candidate.find_text(candidate_root, "BlockPairName"),
                candidate.find_text(candidate_root, "CubeSize"),
            ) {
                block = self
                    .by_pair_and_size
                    .get(&(pair.to_string(), size.to_string()))
                    .copied();
                if block.is_some() {
                    outcome.insert(MergeResult::Renamed);
                }
            }
        }
        let Some(block) = block else {
            return Ok(BTreeSet::from([MergeResult::NotFound]));
        };

        let indent = self.options.indent.as_str();
        let block_editor = XmlEditor::new(BLOCK_ELEMENTS, BLOCK_LEVEL, indent);
        let id_editor = XmlEditor::new(ID_ELEMENTS, BLOCK_LEVEL + 1, indent);
        let list_editor = XmlEditor::new(&[], BLOCK_LEVEL + 1, indent);
        let doc = &mut self.document;

        for child in candidate.child_elements(candidate_root) {
            let tag = candidate.tag(child).unwrap_or_default();
            if tag == "Id" {
                let id_element = block_editor.subelement(doc, block, "Id");
                let subtype = id_editor.subelement(doc, id_element, "SubtypeId");
                doc.set_text(subtype, Some(id.clone()));
            } else if LIST_ELEMENTS.contains(&tag) {
                let list = block_editor.subelement(doc, block, tag);
                let attributes = candidate.attributes(child);
                if !attributes.is_empty() {
                    doc.set_attributes(list, attributes.to_vec());
                }

                let last_tail = doc
                    .children(list)
                    .last()
                    .and_then(|&last| doc.tail(last))
                    .map(str::to_string);
                doc.set_text(list, Some(String::new()));
                doc.clear_children(list);

                for item in candidate.child_elements(child) {
                    let end = doc.children(list).len();
                    let item_tag = candidate.tag(item).unwrap_or_default();
                    let copy = list_editor.new_element(doc, list, end, item_tag);
                    doc.set_text(copy, candidate.text(item).map(str::to_string));
                    doc.set_attributes(copy, candidate.attributes(item).to_vec());
                    for &nested in candidate.children(item) {
                        let nested = doc.import(candidate, nested);
                        doc.append_child(copy, nested);
                    }
                }

                let last = doc.children(list).last().copied();
                if let (Some(last), Some(tail)) = (last, last_tail) {
                    doc.set_tail(last, Some(tail));
                }
            } else {
                let element = block_editor.subelement(doc, block, tag);
                doc.set_text(element, candidate.text(child).map(str::to_string));
                doc.set_attributes(element, candidate.attributes(child).to_vec());
            }
        }

        for &tag in LIST_ELEMENTS {
            if candidate.find_child(candidate_root, tag).is_some() {
                continue;
            }
            if let Some((index, list)) = doc.find_child(block, tag) {
                // The removed element's tail closes the parent when it was last.
                if index + 1 == doc.children(block).len() && index > 0 {
                    let previous = doc.children(block)[index - 1];
                    let tail = doc.tail(list).map(str::to_string);
                    doc.set_tail(previous, tail);
                }
                doc.remove_child(block, list);
                log::debug!("Removed <{}> from SubtypeId [{}]", tag, id);
            }
        }

        if outcome.contains(&MergeResult::Renamed) {
            log::info!("Renamed record to SubtypeId [{}]", id);
        }
        self.reindex(block);
        outcome.insert(MergeResult::Merged);
        Ok(outcome)
    }

    /// Merge several candidates, renaming per [`MergeOptions::allow_renames`].
    pub fn merge_all<'a>(
        &mut self,
        candidates: impl IntoIterator<Item = &'a Document>,
    ) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        for candidate in candidates {
            let outcome = self.merge(candidate, self.options.allow_renames)?;
            let id = subtype_id(candidate).unwrap_or_default().to_string();
            if outcome.contains(&MergeResult::NotFound) {
                log::warn!("Catalog contains no definition for SubtypeId [{}]", id);
                report.not_found.push(id);
            } else if outcome.contains(&MergeResult::Renamed) {
                report.renamed.push(id);
            } else {
                log::info!("Updated SubtypeId [{}]", id);
                report.merged.push(id);
            }
        }
        Ok(report)
    }

    /// Write the catalog back to the file it was opened from.
    pub fn write(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or_else(|| {
            ExportError::InvalidConfig("catalog was not opened from a file".to_string())
        })?;
        if self.options.backup && path.exists() {
            let mut backup = path.as_os_str().to_owned();
            backup.push(".bak");
            let backup = PathBuf::from(backup);
            if backup.exists() {
                std::fs::remove_file(&backup)?;
            }
            std::fs::rename(path, &backup)?;
            log::debug!("Previous catalog kept as {}", backup.display());
        }
        self.document.write_to(path)
    }
}
