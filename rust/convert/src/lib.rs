// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # SH3D-Lite Convert
//!
//! The conversion pipeline between SweetHome 3D scene archives and a
//! host building model.
//!
//! ## Overview
//!
//! - **Import**: parse the archive, walk the element stream in
//!   dependency order, and drive a [`HostKernel`] implementation that
//!   creates the host objects
//! - **Export**: serialize a [`HostScene`] element graph back into an
//!   archive, reconstructing wall sibling references from endpoint
//!   coincidence
//! - **Registry**: per-operation id resolution, endpoint indexing, and
//!   progress counters
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sh3d_lite_convert::{import_archive, ImportConfig, NullProgress};
//! use sh3d_lite_core::SceneArchive;
//!
//! let mut archive = SceneArchive::from_bytes(bytes)?;
//! let mut kernel = MyKernel::new();
//! let report = import_archive(
//!     &mut archive,
//!     &mut kernel,
//!     &ImportConfig::default(),
//!     &mut NullProgress,
//! )?;
//! println!("imported {} elements", report.imported);
//! ```
//!
//! [`HostKernel`]: kernel::HostKernel
//! [`HostScene`]: export::HostScene

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod handlers;
pub mod importer;
pub mod kernel;
pub mod progress;
pub mod registry;

pub use config::ImportConfig;
pub use error::{Error, KernelError, Result};
pub use export::{export_scene, HostFurniture, HostLevel, HostOpening, HostRoom, HostScene, HostWall};
pub use handlers::ModelSource;
pub use importer::{import_archive, import_home, import_home_into, ImportReport, SkippedElement};
pub use kernel::{
    BaseboardParams, CameraParams, FloorParams, FurnitureParams, HostKernel, LightSourceParams,
    ObjectId, OpeningParams, OpeningPreset, RoomParams, WallParams,
};
pub use progress::{NullProgress, ProgressSink};
pub use registry::Registry;
