// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # SH3D-Lite Core
//!
//! Scene archive and element parsing for SweetHome 3D files, built with
//! [quick-xml](https://docs.rs/quick-xml) and [zip](https://docs.rs/zip).
//!
//! ## Overview
//!
//! This crate provides the source-format layer of SH3D-Lite:
//!
//! - **Archive access**: the zip container with its `Home.xml` entry and
//!   furniture model entries
//! - **Document parsing**: the flat element stream of the scene document
//! - **Typed schemas**: per-kind attribute structs with defaults applied
//! - **Unit transforms**: cm/mm, axis flip, angle winding, colors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sh3d_lite_core::{ElementKind, SceneArchive, WallAttrs};
//!
//! let mut archive = SceneArchive::from_bytes(bytes)?;
//! let home = archive.home()?;
//! for (index, element) in home.elements_of(ElementKind::Wall) {
//!     let wall = WallAttrs::from_element(element, index)?;
//!     println!("wall {} is {} cm thick", wall.id, wall.thickness);
//! }
//! ```

pub mod container;
pub mod error;
pub mod model;
pub mod parser;
pub mod units;

pub use container::{SceneArchive, SceneWriter, HOME_XML_ENTRY};
pub use error::{Error, Result};
pub use model::{
    BaseboardAttrs, BaseboardSide, CameraAttrs, ElementKind, FurnitureAttrs, Home, LevelAttrs,
    LightAttrs, LightSourceAttrs, OpeningAttrs, RawChild, RawElement, RoomAttrs, WallAttrs,
};
pub use parser::parse_home;
pub use units::{
    angle_to_host, angle_to_source, coord_to_host, coord_to_source, dim_to_host, dim_to_source,
    percent_to_host, percent_to_source, Color, DEFAULT_WALL_THICKNESS, FACTOR, TOLERANCE,
};
