// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry synthesis
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid arc: {0}")]
    InvalidArc(String),

    /// The kernel kept rejecting the sweep after the bounded number of
    /// end-section adjustments. Fatal for the wall, not for the import.
    #[error("Sweep stayed degenerate after {attempts} end-section adjustments")]
    RecoveryExhausted { attempts: usize },

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Core parser error: {0}")]
    CoreError(#[from] sh3d_lite_core::Error),
}
