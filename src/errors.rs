//! Fatal scan errors
//!
//! Only structural problems surface as [`ScanError`]. Non-matches,
//! duplicate symbols, unknown types and ambiguous literals are logged and
//! skipped instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Unterminated struct body starting at line {line}")]
    UnterminatedAggregate { line: usize },
    #[error("Malformed registry document: {0}")]
    Registry(#[from] roxmltree::Error),
    #[error("Registry <{element}> node is missing its '{attribute}' attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
}
