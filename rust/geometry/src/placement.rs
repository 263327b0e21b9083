// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Furniture mesh placement.
//!
//! Furniture meshes ship normalized (unit-ish box, facing up). Placing one
//! composes, in order: centering on the bounding-box center, non-uniform
//! scaling to the declared dimensions, standing the model upright, the
//! declared pitch/roll/plan rotations, and the translation to the placed
//! position. Export uses the exact matrix inverse, accepting the small
//! distortion non-uniform scale under rotation can introduce.

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

use sh3d_lite_core::units::{coord_to_host, dim_to_source};

use crate::error::{Error, Result};

/// Axis-aligned bounds of a normalized furniture mesh, in mesh units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl ModelBounds {
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn x_length(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn y_length(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn z_length(&self) -> f64 {
        self.max.z - self.min.z
    }
}

/// Placement parameters for one furniture piece. Dimensions are host
/// units; position and angles are source convention (the matrix applies
/// the coordinate and winding flips itself).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FurniturePlacement {
    /// Target width, host units.
    pub width: f64,
    /// Target depth, host units.
    pub depth: f64,
    /// Target height, host units.
    pub height: f64,
    /// Plan position x, source units.
    pub x: f64,
    /// Plan position y, source units.
    pub y: f64,
    /// Elevation of the level plus the piece's own elevation, source units.
    pub level_elevation: f64,
    /// Plan rotation, radians, source winding.
    pub angle: f64,
    /// Rotation about the source X axis, radians.
    pub pitch: f64,
    /// Rotation about the source Y axis, radians.
    pub roll: f64,
}

/// The placement matrix for a normalized mesh.
///
/// The mesh faces up, so its y and z extents map to the declared height
/// and depth respectively. The piece's vertical anchor is its center, so
/// the translation lifts it by half the height above the level elevation.
pub fn placement_matrix(bounds: &ModelBounds, placement: &FurniturePlacement) -> Result<Matrix4<f64>> {
    let (sx, sy, sz) = (bounds.x_length(), bounds.y_length(), bounds.z_length());
    if sx <= 0.0 || sy <= 0.0 || sz <= 0.0 {
        return Err(Error::InvalidPlacement(format!(
            "mesh bounds are degenerate: {sx} x {sy} x {sz}"
        )));
    }

    let center = Matrix4::new_translation(&(-bounds.center().coords));
    let scale = Matrix4::new_nonuniform_scaling(&Vector3::new(
        placement.width / sx,
        placement.height / sy,
        placement.depth / sz,
    ));
    let upright = rotation_x(std::f64::consts::FRAC_PI_2);
    let pitch = rotation_x(-placement.pitch);
    let roll = rotation_y(placement.roll);
    let plan = rotation_z(-placement.angle);

    let target = coord_to_host(Point3::new(
        placement.x,
        placement.y,
        placement.level_elevation + dim_to_source(placement.height) / 2.0,
    ));
    let translate = Matrix4::new_translation(&target.coords);

    Ok(translate * plan * roll * pitch * upright * scale * center)
}

/// The inverse placement, used on export to regenerate a normalized mesh.
/// Fails when the placement matrix is singular (degenerate scale).
pub fn inverse_placement(
    bounds: &ModelBounds,
    placement: &FurniturePlacement,
) -> Result<Matrix4<f64>> {
    placement_matrix(bounds, placement)?
        .try_inverse()
        .ok_or_else(|| Error::InvalidPlacement("placement matrix is singular".to_string()))
}

fn rotation_x(angle: f64) -> Matrix4<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle).to_homogeneous()
}

fn rotation_y(angle: f64) -> Matrix4<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle).to_homogeneous()
}

fn rotation_z(angle: f64) -> Matrix4<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle).to_homogeneous()
}
