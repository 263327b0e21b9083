// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # SH3D-Lite Geometry
//!
//! Sweep synthesis for walls and placement math for furniture, built on
//! [nalgebra](https://docs.rs/nalgebra).
//!
//! ## Overview
//!
//! - **Wall sweeps**: end cross-sections (rectangular or mitered) and the
//!   spine path (line or arc) for a sweep-solid operation
//! - **Degenerate recovery**: bounded end-section adjustment when the
//!   kernel rejects a sweep
//! - **Furniture placement**: the composed center/scale/rotate/translate
//!   matrix for normalized meshes, and its inverse for export
//!
//! All geometry here is in host units; the core crate's transforms are
//! applied before descriptors are built.

pub mod error;
pub mod placement;
pub mod recovery;
pub mod wall;

pub use error::{Error, Result};
pub use placement::{inverse_placement, placement_matrix, FurniturePlacement, ModelBounds};
pub use recovery::{recover_sweep, MAX_RECOVERY_ATTEMPTS};
pub use wall::{section_centroid, ArcInfo, Section, Side, Spine, WallDescriptor, WallSweep};
