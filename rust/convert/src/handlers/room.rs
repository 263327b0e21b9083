// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `<room>` handler: a closed slab boundary on its floor.

use nalgebra::Point3;

use sh3d_lite_core::units::{coord_to_host, dim_to_source, percent_to_host};
use sh3d_lite_core::{ElementKind, RawElement, RoomAttrs};

use crate::error::Result;
use crate::handlers::Context;
use crate::kernel::{HostKernel, ObjectId, RoomParams};

pub(crate) fn process<K: HostKernel>(
    cx: &mut Context<'_, K>,
    index: usize,
    elm: &RawElement,
) -> Result<ObjectId> {
    let attrs = RoomAttrs::from_element(elm, index)?;
    let floor = cx
        .registry
        .floor_for(attrs.level.as_deref(), &format!("<room> '{}'", attrs.id))?;

    // Boundary points are planar in the file; they sit at the floor's
    // elevation in the document.
    let z = dim_to_source(floor.elevation);
    let boundary: Vec<Point3<f64>> = attrs
        .points
        .iter()
        .map(|p| coord_to_host(Point3::new(p.x, p.y, z)))
        .collect();

    let params = RoomParams {
        id: attrs.id.clone(),
        name: attrs.name.clone(),
        floor: floor.object,
        boundary,
        slab_thickness: floor.slab_thickness,
        floor_visible: attrs.floor_visible,
        floor_color: attrs.floor_color.unwrap_or(cx.config.default_floor_color),
        floor_shininess: percent_to_host(attrs.floor_shininess),
        ceiling_visible: attrs.ceiling_visible,
        ceiling_color: attrs
            .ceiling_color
            .unwrap_or(cx.config.default_ceiling_color),
        ceiling_shininess: percent_to_host(attrs.ceiling_shininess),
    };
    let merge = cx.config.merge;
    let kernel = &mut *cx.kernel;
    let (object, _created) =
        cx.registry
            .resolve_or_create(&attrs.id, ElementKind::Room, merge, || {
                kernel.create_room(&params)
            })?;
    Ok(object)
}
