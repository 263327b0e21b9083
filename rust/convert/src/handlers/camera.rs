// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `<camera>` / `<observerCamera>` handler.
//!
//! Only stored viewpoints are importable; the live observer and top
//! cameras describe an interactive view, not a scene object, and are
//! skipped without error.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::Point3;
use tracing::debug;

use sh3d_lite_core::units::coord_to_host;
use sh3d_lite_core::{CameraAttrs, RawElement};

use crate::error::Result;
use crate::handlers::Context;
use crate::kernel::{CameraParams, HostKernel, ObjectId};

pub(crate) fn process<K: HostKernel>(
    cx: &mut Context<'_, K>,
    index: usize,
    elm: &RawElement,
) -> Result<Option<ObjectId>> {
    let attrs = CameraAttrs::from_element(elm, index)?;

    if attrs.attribute != "storedCamera" {
        debug!(
            kind = elm.kind.tag(),
            index,
            attribute = %attrs.attribute,
            "camera kind is not importable; skipping"
        );
        return Ok(None);
    }

    // The source coordinate system is screen-like, so the pitch ends up
    // as roll once the axes are flipped.
    let params = CameraParams {
        id: attrs.id.clone(),
        name: attrs.name.clone(),
        position: coord_to_host(Point3::new(attrs.x, attrs.y, attrs.z)),
        yaw_deg: (PI - attrs.yaw).to_degrees(),
        roll_deg: (FRAC_PI_2 - attrs.pitch).to_degrees(),
        field_of_view_deg: attrs.field_of_view.to_degrees(),
    };
    let merge = cx.config.merge;
    let kernel = &mut *cx.kernel;
    let (object, _created) = cx
        .registry
        .resolve_or_create(&attrs.id, elm.kind, merge, || kernel.create_camera(&params))?;
    Ok(Some(object))
}
