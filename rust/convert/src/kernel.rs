// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The host kernel boundary.
//!
//! The pipeline computes attributes and geometry inputs; actually
//! creating document objects, solids and meshes is the host
//! application's job. [`HostKernel`] is that surface: one create call
//! per element kind plus the geometric queries the handlers need
//! (sweep validity for degenerate recovery, bounding-box containment
//! for opening placement). All values crossing this boundary are in
//! host units.

use nalgebra::{Matrix4, Point3};

use sh3d_lite_core::units::Color;
use sh3d_lite_geometry::{ModelBounds, WallSweep};

use crate::error::KernelError;

pub type KernelResult<T> = std::result::Result<T, KernelError>;

/// Opaque handle to an object created in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A floor to create, host units.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorParams {
    pub id: String,
    pub name: Option<String>,
    pub elevation: f64,
    pub height: f64,
    pub slab_thickness: f64,
    pub elevation_index: i32,
    pub visible: bool,
}

/// A room slab to create: a closed boundary on a floor, host units.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomParams {
    pub id: String,
    pub name: Option<String>,
    pub floor: ObjectId,
    /// Closed boundary, already coordinate-transformed, one point per
    /// source `<point>`.
    pub boundary: Vec<Point3<f64>>,
    pub slab_thickness: f64,
    pub floor_visible: bool,
    pub floor_color: Color,
    /// Specular shininess of the floor finish, host percent (0..100).
    pub floor_shininess: f64,
    pub ceiling_visible: bool,
    pub ceiling_color: Color,
    /// Specular shininess of the ceiling finish, host percent (0..100).
    pub ceiling_shininess: f64,
}

/// Wall attributes accompanying a sweep, host units.
#[derive(Debug, Clone, PartialEq)]
pub struct WallParams {
    pub id: String,
    pub floor: ObjectId,
    pub thickness: f64,
    pub top_color: Color,
    pub left_side_color: Color,
    pub right_side_color: Color,
}

/// A baseboard hugging one wall face, host units.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseboardParams {
    pub wall: ObjectId,
    /// True for the left hand side face walking start to end.
    pub left_side: bool,
    pub thickness: f64,
    pub height: f64,
    pub color: Option<Color>,
}

/// An opening preset from the host's parts library. The source catalog
/// carries thousands of models; openings map onto this fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpeningPreset {
    Fixed,
    Open1Pane,
    Open2Pane,
    Sash2Pane,
    Sliding2Pane,
    SimpleDoor,
    GlassDoor,
    Sliding4Pane,
    Awning,
}

/// A door or window to cut into a wall, host units.
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningParams {
    pub id: String,
    pub name: Option<String>,
    pub floor: ObjectId,
    pub preset: OpeningPreset,
    /// The wall the opening was spatially matched to, when one contains
    /// its placement point.
    pub host_wall: Option<ObjectId>,
    /// Lower-left corner of the opening frame.
    pub corner: Point3<f64>,
    /// Plan rotation, radians, host winding.
    pub angle: f64,
    pub width: f64,
    pub height: f64,
    /// Frame depth: the lesser of the opening depth and the host wall
    /// thickness.
    pub frame_depth: f64,
    pub mirrored: bool,
}

/// A furniture mesh to place, host units.
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureParams {
    pub id: String,
    pub name: Option<String>,
    pub floor: ObjectId,
    /// Archive entry the mesh was loaded from.
    pub model: String,
    pub movable: bool,
    pub visible: bool,
    pub color: Option<Color>,
}

/// One point source of a light appliance, host units.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSourceParams {
    pub id: String,
    pub position: Point3<f64>,
    pub radius: f64,
    pub color: Option<Color>,
    /// The furniture object this source belongs to, when furniture
    /// import is enabled.
    pub appliance: Option<ObjectId>,
    pub power: f64,
}

/// A stored viewpoint, host units and host winding.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraParams {
    pub id: String,
    pub name: Option<String>,
    pub position: Point3<f64>,
    /// Heading, degrees.
    pub yaw_deg: f64,
    /// Roll, degrees. The source's screen-like pitch maps onto roll.
    pub roll_deg: f64,
    /// Field of view, degrees.
    pub field_of_view_deg: f64,
}

/// The host document surface the import drives.
///
/// Creating an object returns an [`ObjectId`] the pipeline registers for
/// cross-referencing. Implementations are free to build real geometry or
/// just record calls (tests do the latter).
pub trait HostKernel {
    fn create_floor(&mut self, params: &FloorParams) -> KernelResult<ObjectId>;

    fn create_room(&mut self, params: &RoomParams) -> KernelResult<ObjectId>;

    /// Probe whether a sweep would build a sound solid. Drives the
    /// bounded degenerate-sweep recovery.
    fn sweep_is_valid(&mut self, sweep: &WallSweep) -> bool;

    fn create_wall(&mut self, params: &WallParams, sweep: &WallSweep) -> KernelResult<ObjectId>;

    /// Whether the wall's bounding volume contains the point. Used to
    /// find an opening's host wall.
    fn wall_contains(&mut self, wall: ObjectId, point: &Point3<f64>) -> bool;

    fn create_baseboard(&mut self, params: &BaseboardParams) -> KernelResult<ObjectId>;

    fn create_opening(&mut self, params: &OpeningParams) -> KernelResult<ObjectId>;

    /// Load a normalized furniture mesh from raw archive bytes and
    /// report its bounds. Mesh decoding stays on the host side.
    fn load_model(&mut self, entry: &str, bytes: &[u8]) -> KernelResult<ModelBounds>;

    fn create_furniture(
        &mut self,
        params: &FurnitureParams,
        placement: &Matrix4<f64>,
    ) -> KernelResult<ObjectId>;

    fn create_light_source(&mut self, params: &LightSourceParams) -> KernelResult<ObjectId>;

    fn create_camera(&mut self, params: &CameraParams) -> KernelResult<ObjectId>;
}
