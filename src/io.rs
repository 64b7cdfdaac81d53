//! Reading graphs and configs from disk, writing layout results
//!
//! The file format is chosen from the path extension: `.json` or
//! `.yaml`/`.yml`.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::LayoutConfig;
use crate::model::GraphInput;

/// Errors that can occur during reading or writing
#[derive(Error, Debug)]
pub enum IoError {
    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON document could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The YAML document could not be read
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for reader/writer operations
pub type IoResult<T> = Result<T, IoError>;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// File extensions this format is read from
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Json => &["json"],
            Format::Yaml => &["yaml", "yml"],
        }
    }

    /// Determine the format from a path's extension
    pub fn from_path(path: &Path) -> IoResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        [Format::Json, Format::Yaml]
            .into_iter()
            .find(|f| f.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    /// Parse a document in this format
    pub fn parse<T: DeserializeOwned>(self, text: &str) -> IoResult<T> {
        Ok(match self {
            Format::Json => serde_json::from_str(text)?,
            Format::Yaml => serde_yaml::from_str(text)?,
        })
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> IoResult<T> {
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path)?;
    format.parse(&text)
}

/// Read a `{ nodes, links }` graph document
pub fn read_graph(path: &Path) -> IoResult<GraphInput> {
    read_document(path)
}

/// Read an engine config document
///
/// The result is sanitized, so a hand-edited file cannot stall convergence.
pub fn read_config(path: &Path) -> IoResult<LayoutConfig> {
    read_document::<LayoutConfig>(path).map(LayoutConfig::sanitized)
}

/// Serialize `value` as pretty JSON
pub fn to_json<T: Serialize>(value: &T) -> IoResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Serialize `value` as a single JSON line
pub fn to_json_line<T: Serialize>(value: &T) -> IoResult<String> {
    Ok(serde_json::to_string(value)?)
}
