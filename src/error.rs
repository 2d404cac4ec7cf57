//! Error types for block export.

use thiserror::Error;

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for mount-point projection and definition merging.
///
/// Only structural problems and contract violations are errors. Per-record
/// merge outcomes (merged, renamed, not found) are reported as
/// [`MergeResult`](crate::merge::MergeResult) values instead.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The XML tokenizer rejected the input.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally invalid XML (no root, unbalanced tags, bad encoding).
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    /// The catalog lacks the `<Definitions>` or `<CubeBlocks>` containers.
    #[error("Malformed catalog: {0}")]
    MalformedCatalog(String),

    /// A candidate definition has no `<Id><SubtypeId>`.
    #[error("Definition has no <SubtypeId>")]
    MissingSubtypeId,

    /// The host could not produce the evaluated mesh of an object.
    #[error("Failed to evaluate mesh of '{object}': {message}")]
    MeshEvaluation { object: String, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
