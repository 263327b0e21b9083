// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `<doorOrWindow>` handler.
//!
//! The source places an opening by the center of its lower face; the
//! host wants the corner of the frame on the wall face. The host wall is
//! found by bounding-volume containment of the placement point over the
//! walls built so far, first match wins. No containing wall is not an
//! error: the frame falls back to a nominal wall thickness.

use nalgebra::{Point2, Point3, Rotation2};
use tracing::warn;

use sh3d_lite_core::units::{angle_to_host, coord_to_host, dim_to_host, dim_to_source};
use sh3d_lite_core::units::DEFAULT_WALL_THICKNESS;
use sh3d_lite_core::{ElementKind, OpeningAttrs, RawElement};

use crate::catalog;
use crate::error::Result;
use crate::handlers::Context;
use crate::kernel::{HostKernel, ObjectId, OpeningParams, OpeningPreset};

pub(crate) fn process<K: HostKernel>(
    cx: &mut Context<'_, K>,
    index: usize,
    elm: &RawElement,
) -> Result<ObjectId> {
    let attrs = OpeningAttrs::from_element(elm, index)?;
    let floor = cx.registry.floor_for(
        attrs.level.as_deref(),
        &format!("<doorOrWindow> '{}'", attrs.id),
    )?;
    let floor_object = floor.object;

    // Center of the opening's lower face, host coordinates.
    let z = attrs.elevation + dim_to_source(floor.elevation);
    let center = coord_to_host(Point3::new(attrs.x, attrs.y, z));

    let host_wall = cx
        .registry
        .walls()
        .iter()
        .map(|w| (w.object, w.descriptor.thickness))
        .collect::<Vec<_>>()
        .into_iter()
        .find(|(object, _)| cx.kernel.wall_contains(*object, &center));
    let wall_thickness = match host_wall {
        Some((_, thickness)) => thickness,
        None => {
            warn!(
                opening = %attrs.id,
                "no wall contains the opening; defaulting to thickness {DEFAULT_WALL_THICKNESS}"
            );
            DEFAULT_WALL_THICKNESS
        }
    };

    let preset = match catalog::preset_for(attrs.catalog_id.as_deref()) {
        Some(preset) => preset,
        None => {
            warn!(
                opening = %attrs.id,
                catalog_id = attrs.catalog_id.as_deref().unwrap_or("<none>"),
                "unmapped catalog id; defaulting to a plain door"
            );
            OpeningPreset::SimpleDoor
        }
    };

    let width = dim_to_host(attrs.width);
    let depth = dim_to_host(attrs.depth);
    let height = dim_to_host(attrs.height);
    let angle = angle_to_host(attrs.angle);

    // From the lower-face center to the frame corner, spun by the plan
    // angle.
    let offset = Rotation2::new(angle) * Point2::new(-width / 2.0, -wall_thickness / 2.0);
    let corner = Point3::new(center.x + offset.x, center.y + offset.y, center.z);

    let params = OpeningParams {
        id: attrs.id.clone(),
        name: attrs.name.clone(),
        floor: floor_object,
        preset,
        host_wall: host_wall.map(|(object, _)| object),
        corner,
        angle,
        width,
        height,
        frame_depth: depth.min(wall_thickness),
        mirrored: attrs.mirrored,
    };
    let merge = cx.config.merge;
    let kernel = &mut *cx.kernel;
    let (object, _created) =
        cx.registry
            .resolve_or_create(&attrs.id, ElementKind::DoorOrWindow, merge, || {
                kernel.create_opening(&params)
            })?;
    Ok(object)
}
