// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import configuration.

use serde::{Deserialize, Serialize};

use sh3d_lite_core::units::Color;

/// Knobs for one import operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Import `<doorOrWindow>` elements.
    pub import_openings: bool,
    /// Import `<pieceOfFurniture>` and `<furnitureGroup>` elements.
    pub import_furniture: bool,
    /// Import `<light>` point sources.
    pub import_lights: bool,
    /// Import stored `<camera>`/`<observerCamera>` viewpoints.
    pub import_cameras: bool,
    /// Miter walls with their declared or coincident siblings. When off,
    /// every section is a plain rectangle.
    pub join_walls: bool,
    /// Reuse objects already registered for a source id instead of
    /// creating new ones. Ids come from a registry carried over from an
    /// earlier import or seeded by the caller.
    pub merge: bool,
    /// Fallback when a room or wall declares no floor color.
    pub default_floor_color: Color,
    /// Fallback when a room declares no ceiling color.
    pub default_ceiling_color: Color,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            import_openings: true,
            import_furniture: true,
            import_lights: true,
            import_cameras: true,
            join_walls: true,
            merge: false,
            default_floor_color: Color {
                r: 0x80,
                g: 0x80,
                b: 0x80,
                alpha: None,
            },
            default_ceiling_color: Color {
                r: 0xF0,
                g: 0xF0,
                b: 0xF0,
                alpha: None,
            },
        }
    }
}
