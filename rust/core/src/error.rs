// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene parsing and conversion.

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing a scene archive
#[derive(Error, Debug)]
pub enum Error {
    /// The archive has no `Home.xml` entry. Fatal for the whole operation.
    #[error("invalid scene archive: missing Home.xml")]
    MissingHomeXml,

    #[error("missing archive entry: {0}")]
    MissingEntry(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed <{tag}>: missing required attribute '{attr}'")]
    MissingAttribute { tag: &'static str, attr: &'static str },

    #[error("malformed <{tag}>: attribute '{attr}' has invalid value '{value}'")]
    InvalidAttribute {
        tag: &'static str,
        attr: &'static str,
        value: String,
    },

    #[error("invalid color string '{0}': expected 6 or 8 hex digits")]
    InvalidColor(String),

    /// A host color was given with an unsupported channel count. Raised
    /// instead of silently coercing.
    #[error("color type mismatch: expected 3 or 4 channels or a packed integer, got {0} channels")]
    ColorChannelCount(usize),

    #[error("unexpected XML structure: {0}")]
    UnexpectedStructure(String),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
