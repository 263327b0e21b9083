// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `<level>` handler: one floor per level element.

use sh3d_lite_core::units::dim_to_host;
use sh3d_lite_core::{ElementKind, LevelAttrs, RawElement};

use crate::error::Result;
use crate::handlers::Context;
use crate::kernel::{FloorParams, HostKernel, ObjectId};
use crate::registry::FloorInfo;

pub(crate) fn process<K: HostKernel>(
    cx: &mut Context<'_, K>,
    index: usize,
    elm: &RawElement,
) -> Result<ObjectId> {
    let attrs = LevelAttrs::from_element(elm, index)?;

    let params = FloorParams {
        id: attrs.id.clone(),
        name: attrs.name.clone(),
        elevation: dim_to_host(attrs.elevation),
        height: dim_to_host(attrs.height),
        slab_thickness: dim_to_host(attrs.floor_thickness),
        elevation_index: attrs.elevation_index,
        visible: attrs.visible,
    };
    let merge = cx.config.merge;
    let kernel = &mut *cx.kernel;
    let (object, _created) =
        cx.registry
            .resolve_or_create(&attrs.id, ElementKind::Level, merge, || {
                kernel.create_floor(&params)
            })?;

    cx.registry.add_floor(FloorInfo {
        id: attrs.id,
        object,
        elevation: params.elevation,
        height: params.height,
        slab_thickness: params.slab_thickness,
    });
    Ok(object)
}
