// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the conversion pipeline.
//!
//! Severities follow the per-element boundary: errors raised inside a
//! handler fail that single element and are collected in the import
//! report; only a missing scene document aborts the whole operation.

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// An error reported by the host kernel for one create/query call.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct KernelError(pub String);

/// Errors that can occur while importing or exporting a scene
#[derive(Error, Debug)]
pub enum Error {
    #[error("scene error: {0}")]
    Core(#[from] sh3d_lite_core::Error),

    #[error("geometry error: {0}")]
    Geometry(#[from] sh3d_lite_geometry::Error),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// The element references a level that was never registered, in a
    /// document with more than one floor.
    #[error("missing floor '{level}' for {element}")]
    MissingFloor { level: String, element: String },

    /// A declared sibling wall id does not exist in the same document.
    #[error("wall '{wall}' references unknown wall '{sibling}'")]
    MissingSiblingWall { wall: String, sibling: String },

    #[error("missing model entry '{entry}' for furniture '{furniture}'")]
    MissingModel { furniture: String, entry: String },

    /// An id resolved to an object of a different kind. Never silently
    /// returns the wrong-typed object.
    #[error("id '{id}' is registered as {actual}, expected {expected}")]
    KindMismatch {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },
}
