// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Degenerate sweep recovery.
//!
//! Some wall configurations make the kernel produce a twisted, self
//! intersecting sweep. Nudging the end section around its own centroid in
//! one-degree steps usually untwists it within a few attempts; walls that
//! stay degenerate after the bounded number of attempts are reported as
//! un-buildable so the import can continue without them.

use nalgebra::{Point3, Rotation2};

use crate::error::{Error, Result};
use crate::wall::{section_centroid, Section, WallSweep};

/// Upper bound on one-degree end-section adjustments.
pub const MAX_RECOVERY_ATTEMPTS: usize = 45;

/// One-degree step, radians.
const STEP: f64 = std::f64::consts::PI / 180.0;

/// Repair a sweep the kernel reports as degenerate.
///
/// `is_valid` asks the kernel whether the current sweep builds a sound
/// solid. The end section is rotated in one-degree increments about the
/// vertical axis through its centroid until the sweep validates, up to
/// [`MAX_RECOVERY_ATTEMPTS`]. Returns the number of degrees applied.
pub fn recover_sweep<F>(sweep: &mut WallSweep, mut is_valid: F) -> Result<usize>
where
    F: FnMut(&WallSweep) -> bool,
{
    if is_valid(sweep) {
        return Ok(0);
    }

    for attempt in 1..=MAX_RECOVERY_ATTEMPTS {
        rotate_about_centroid(&mut sweep.section_end, STEP);
        if is_valid(sweep) {
            return Ok(attempt);
        }
    }
    Err(Error::RecoveryExhausted {
        attempts: MAX_RECOVERY_ATTEMPTS,
    })
}

fn rotate_about_centroid(section: &mut Section, angle: f64) {
    let centroid = section_centroid(section);
    let rot = Rotation2::new(angle);
    for corner in section.iter_mut() {
        let planar = rot * (corner.xy() - centroid.xy());
        *corner = Point3::new(centroid.x + planar.x, centroid.y + planar.y, corner.z);
    }
}
