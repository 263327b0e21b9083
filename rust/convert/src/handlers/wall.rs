// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `<wall>` handler: sweep synthesis, sibling resolution, baseboards.
//!
//! Sibling descriptors for mitering come from the raw document rather
//! than the registry because a wall may reference a sibling declared
//! after it in the stream. A declared sibling id always wins; endpoint
//! coincidence against already-built walls is the fallback.

use nalgebra::Point3;
use tracing::{debug, warn};

use sh3d_lite_core::units::{angle_to_host, coord_to_host, dim_to_host, dim_to_source};
use sh3d_lite_core::{ElementKind, Home, RawElement, WallAttrs};
use sh3d_lite_geometry::{recover_sweep, WallDescriptor};

use crate::error::{Error, Result};
use crate::handlers::Context;
use crate::kernel::{BaseboardParams, HostKernel, ObjectId, WallParams};
use crate::registry::{FloorInfo, WallInfo};

pub(crate) fn process<K: HostKernel>(
    cx: &mut Context<'_, K>,
    home: &Home,
    index: usize,
    elm: &RawElement,
) -> Result<ObjectId> {
    let attrs = WallAttrs::from_element(elm, index)?;
    let floor = cx
        .registry
        .floor_for(attrs.level.as_deref(), &format!("<wall> '{}'", attrs.id))?;
    let floor = floor.clone();

    let descriptor = descriptor_of(&attrs, &floor);
    let start_sibling = sibling_descriptor(cx, home, &attrs, &floor, true, &descriptor.start)?;
    let end_sibling = sibling_descriptor(cx, home, &attrs, &floor, false, &descriptor.end)?;

    let mut sweep = descriptor.sweep(start_sibling.as_ref(), end_sibling.as_ref())?;
    let adjusted = recover_sweep(&mut sweep, |s| cx.kernel.sweep_is_valid(s))?;
    if adjusted > 0 {
        debug!(wall = %attrs.id, degrees = adjusted, "adjusted degenerate sweep end section");
    }

    let top_color = attrs.top_color.unwrap_or(cx.config.default_floor_color);
    let params = WallParams {
        id: attrs.id.clone(),
        floor: floor.object,
        thickness: descriptor.thickness,
        top_color,
        left_side_color: attrs.left_side_color.unwrap_or(top_color),
        right_side_color: attrs.right_side_color.unwrap_or(top_color),
    };
    let merge = cx.config.merge;
    let kernel = &mut *cx.kernel;
    let (object, created) =
        cx.registry
            .resolve_or_create(&attrs.id, ElementKind::Wall, merge, || {
                kernel.create_wall(&params, &sweep)
            })?;

    cx.registry.add_wall(WallInfo {
        id: attrs.id.clone(),
        object,
        descriptor,
    });

    // Baseboards belong to the wall object; a reused wall keeps the ones
    // it already has.
    if created && cx.config.import_furniture {
        for baseboard in &attrs.baseboards {
            cx.kernel.create_baseboard(&BaseboardParams {
                wall: object,
                left_side: baseboard.side == sh3d_lite_core::BaseboardSide::Left,
                thickness: dim_to_host(baseboard.thickness),
                height: dim_to_host(baseboard.height),
                color: baseboard.color,
            })?;
        }
    }

    Ok(object)
}

/// Build the host-unit descriptor for a wall on its floor. Heights
/// default to the floor height, then the start height.
fn descriptor_of(attrs: &WallAttrs, floor: &FloorInfo) -> WallDescriptor {
    let z = dim_to_source(floor.elevation);
    let height_start = attrs.height.map(dim_to_host).unwrap_or(floor.height);
    let height_end = attrs.height_at_end.map(dim_to_host).unwrap_or(height_start);
    WallDescriptor {
        start: coord_to_host(Point3::new(attrs.x_start, attrs.y_start, z)),
        end: coord_to_host(Point3::new(attrs.x_end, attrs.y_end, z)),
        thickness: dim_to_host(attrs.thickness),
        height_start,
        height_end,
        arc_extent: angle_to_host(attrs.arc_extent),
    }
}

/// Resolve the miter partner at one end, as a descriptor.
///
/// A declared sibling id must exist in the document (missing is fatal for
/// this wall). Without a declared id, the first already-built wall
/// touching the endpoint is used. Joining disabled means no partner at
/// all.
fn sibling_descriptor<K: HostKernel>(
    cx: &Context<'_, K>,
    home: &Home,
    attrs: &WallAttrs,
    floor: &FloorInfo,
    at_start: bool,
    joint: &Point3<f64>,
) -> Result<Option<WallDescriptor>> {
    if !cx.config.join_walls {
        return Ok(None);
    }

    let declared = if at_start {
        attrs.wall_at_start.as_deref()
    } else {
        attrs.wall_at_end.as_deref()
    };

    if let Some(sibling_id) = declared {
        let (sibling_index, sibling_elm) = home
            .elements_of(ElementKind::Wall)
            .find(|(_, e)| e.id() == Some(sibling_id))
            .ok_or_else(|| Error::MissingSiblingWall {
                wall: attrs.id.clone(),
                sibling: sibling_id.to_string(),
            })?;
        let sibling = WallAttrs::from_element(sibling_elm, sibling_index)?;
        return Ok(Some(descriptor_of(&sibling, floor)));
    }

    match cx.registry.siblings_of(joint, &attrs.id).first() {
        Some(id) => {
            let info = cx.registry.wall(id);
            if info.is_none() {
                warn!(wall = %attrs.id, sibling = %id, "endpoint bucket names an unknown wall");
            }
            Ok(info.map(|w| w.descriptor.clone()))
        }
        None => Ok(None),
    }
}
