//! Recoverable failures.
//!
//! Contract violations (duplicate ids, re-parenting into a descendant) are
//! not errors: they panic at the call site.

use crate::tree::NodeId;
use std::path::PathBuf;

/// Errors that can occur while loading resources for the UI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The skin definition file could not be read.
    #[error("failed to read skin file {path}: {source}")]
    SkinIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The skin definition file is malformed.
    #[error("skin parse error at line {line}: {message}")]
    SkinParse { line: usize, message: String },

    /// The backend could not load an image into a surface.
    #[error("failed to load image {path}: {reason}")]
    ImageLoad { path: PathBuf, reason: String },

    /// The backend refused a font.
    #[error("failed to load font {path}: {reason}")]
    FontLoad { path: PathBuf, reason: String },

    /// A handle referred to a widget that no longer exists.
    #[error("widget {0:?} was destroyed")]
    UnknownWidget(NodeId),
}

/// Result type for UI operations.
pub type Result<T> = std::result::Result<T, Error>;
