// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `<light>` handler: the appliance mesh plus its point sources.

use nalgebra::Point3;

use sh3d_lite_core::units::{coord_to_host, dim_to_host};
use sh3d_lite_core::{ElementKind, LightAttrs, RawElement};

use crate::error::Result;
use crate::handlers::{furniture, Context};
use crate::kernel::{HostKernel, LightSourceParams, ObjectId};

pub(crate) fn process<K: HostKernel>(
    cx: &mut Context<'_, K>,
    index: usize,
    elm: &RawElement,
) -> Result<Vec<ObjectId>> {
    let attrs = LightAttrs::from_element(elm, index)?;

    // The appliance itself is ordinary furniture when furniture import
    // is on; the point sources are created either way.
    let appliance = if cx.config.import_furniture {
        Some(furniture::process_attrs(
            cx,
            &attrs.furniture,
            ElementKind::Light,
        )?)
    } else {
        None
    };

    let merge = cx.config.merge;
    let mut created = Vec::with_capacity(attrs.sources.len());
    for (j, source) in attrs.sources.iter().enumerate() {
        let params = LightSourceParams {
            id: format!("{}-{j}", attrs.furniture.id),
            position: coord_to_host(Point3::new(source.x, source.y, source.z)),
            radius: dim_to_host(source.diameter / 2.0),
            color: source.color,
            appliance,
            power: attrs.power,
        };
        let kernel = &mut *cx.kernel;
        let (object, _created) =
            cx.registry
                .resolve_or_create(&params.id, ElementKind::Light, merge, || {
                    kernel.create_light_source(&params)
                })?;
        created.push(object);
    }
    Ok(created)
}
