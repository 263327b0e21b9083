// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `<pieceOfFurniture>` handler.
//!
//! The archive ships each piece as a normalized mesh; the kernel loads
//! it and reports bounds, and the placement matrix scales and spins it
//! into position. A missing mesh entry fails the piece, not the import.

use sh3d_lite_core::units::{dim_to_host, dim_to_source};
use sh3d_lite_core::{ElementKind, FurnitureAttrs, RawElement};
use sh3d_lite_geometry::{placement_matrix, FurniturePlacement};

use crate::error::{Error, Result};
use crate::handlers::Context;
use crate::kernel::{FurnitureParams, HostKernel, ObjectId};

pub(crate) fn process<K: HostKernel>(
    cx: &mut Context<'_, K>,
    index: usize,
    elm: &RawElement,
) -> Result<ObjectId> {
    let attrs = FurnitureAttrs::from_element(elm, index)?;
    process_attrs(cx, &attrs, elm.kind)
}

pub(crate) fn process_attrs<K: HostKernel>(
    cx: &mut Context<'_, K>,
    attrs: &FurnitureAttrs,
    kind: ElementKind,
) -> Result<ObjectId> {
    let floor = cx.registry.floor_for(
        attrs.level.as_deref(),
        &format!("<{}> '{}'", kind.tag(), attrs.id),
    )?;
    let floor_elevation = floor.elevation;
    let floor_object = floor.object;

    let entry = attrs.model.as_deref().ok_or_else(|| Error::MissingModel {
        furniture: attrs.id.clone(),
        entry: "<none>".to_string(),
    })?;
    let bytes = cx
        .models
        .model_bytes(entry)
        .map_err(|_| Error::MissingModel {
            furniture: attrs.id.clone(),
            entry: entry.to_string(),
        })?;
    let bounds = cx.kernel.load_model(entry, &bytes)?;

    let height = dim_to_host(attrs.height);
    let placement = FurniturePlacement {
        width: dim_to_host(attrs.width),
        depth: dim_to_host(attrs.depth),
        height,
        x: attrs.x,
        y: attrs.y,
        level_elevation: dim_to_source(floor_elevation) + attrs.elevation,
        angle: attrs.angle,
        pitch: attrs.pitch,
        roll: attrs.roll,
    };
    let matrix = placement_matrix(&bounds, &placement)?;

    let params = FurnitureParams {
        id: attrs.id.clone(),
        name: attrs.name.clone(),
        floor: floor_object,
        model: entry.to_string(),
        movable: attrs.movable,
        visible: attrs.visible,
        color: attrs.color,
    };
    let merge = cx.config.merge;
    let kernel = &mut *cx.kernel;
    let (object, _created) =
        cx.registry
            .resolve_or_create(&attrs.id, ElementKind::Furniture, merge, || {
                kernel.create_furniture(&params, &matrix)
            })?;
    Ok(object)
}
