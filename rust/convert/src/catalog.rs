// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Opening catalog mapping.
//!
//! The source application ships thousands of door and window models
//! identified by catalog id. Openings are not imported as meshes; a
//! small lookup table maps the known window ids onto host presets, and
//! everything else becomes a plain door.

use crate::kernel::OpeningPreset;

const CATALOG_PRESETS: &[(&str, OpeningPreset)] = &[
    ("eTeks#fixedWindow85x123", OpeningPreset::Open2Pane),
    ("eTeks#window85x123", OpeningPreset::Open2Pane),
    ("eTeks#doubleWindow126x123", OpeningPreset::Open2Pane),
    ("eTeks#doubleWindow126x163", OpeningPreset::Open2Pane),
    ("eTeks#doubleFrenchWindow126x200", OpeningPreset::Open2Pane),
    ("eTeks#window85x163", OpeningPreset::Open2Pane),
    ("eTeks#frenchWindow85x200", OpeningPreset::Open2Pane),
    ("eTeks#doubleHungWindow80x122", OpeningPreset::Open2Pane),
    ("eTeks#roundWindow", OpeningPreset::Open2Pane),
    ("eTeks#halfRoundWindow", OpeningPreset::Open2Pane),
    ("Scopia#window_2x1_with_sliders", OpeningPreset::Sliding2Pane),
    ("Scopia#window_2x3_arched", OpeningPreset::Sliding2Pane),
    ("Scopia#window_2x4_arched", OpeningPreset::Sliding2Pane),
    ("eTeks#sliderWindow126x200", OpeningPreset::Sliding2Pane),
];

/// The preset for a catalog id. `None` for unknown or absent ids; the
/// caller warns and falls back to [`OpeningPreset::SimpleDoor`].
pub fn preset_for(catalog_id: Option<&str>) -> Option<OpeningPreset> {
    let id = catalog_id?;
    CATALOG_PRESETS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, preset)| *preset)
}
