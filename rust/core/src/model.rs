// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed element model for the scene file.
//!
//! The file stores a flat stream of elements whose attributes are all
//! strings. Parsing happens in two steps: the XML layer produces
//! [`RawElement`]s (tag + attribute map + geometric children), and the
//! `*Attrs` structs here apply a fixed per-kind schema — attribute name,
//! required/optional, default, converter — exactly once per element.
//! Values stay in source units; unit conversion happens at the point of
//! use so the transforms remain visible in the handlers.

use nalgebra::Point2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::units::Color;

/// The element kinds recognized in the scene document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Level,
    Room,
    Wall,
    DoorOrWindow,
    Furniture,
    FurnitureGroup,
    Light,
    ObserverCamera,
    Camera,
}

impl ElementKind {
    /// The XML tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Level => "level",
            ElementKind::Room => "room",
            ElementKind::Wall => "wall",
            ElementKind::DoorOrWindow => "doorOrWindow",
            ElementKind::Furniture => "pieceOfFurniture",
            ElementKind::FurnitureGroup => "furnitureGroup",
            ElementKind::Light => "light",
            ElementKind::ObserverCamera => "observerCamera",
            ElementKind::Camera => "camera",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "level" => Some(ElementKind::Level),
            "room" => Some(ElementKind::Room),
            "wall" => Some(ElementKind::Wall),
            "doorOrWindow" => Some(ElementKind::DoorOrWindow),
            "pieceOfFurniture" => Some(ElementKind::Furniture),
            "furnitureGroup" => Some(ElementKind::FurnitureGroup),
            "light" => Some(ElementKind::Light),
            "observerCamera" => Some(ElementKind::ObserverCamera),
            "camera" => Some(ElementKind::Camera),
            _ => None,
        }
    }
}

/// A child node carrying geometry or nested elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RawChild {
    /// A `<point>` of a room boundary, in source units.
    Point { x: f64, y: f64 },
    /// A `<lightSource>` of a light.
    LightSource(FxHashMap<String, String>),
    /// A `<baseboard>` of a wall.
    Baseboard(FxHashMap<String, String>),
    /// A member of a `<furnitureGroup>`.
    Furniture(Box<RawElement>),
}

/// One parsed element from the flat stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawElement {
    pub kind: ElementKind,
    pub attrs: FxHashMap<String, String>,
    pub children: Vec<RawChild>,
}

impl RawElement {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attrs: FxHashMap::default(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The element id, if the file declares one.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// The element id, or a synthesized `"<tag>-<index>"` when absent.
    /// Furniture-like elements fall back to their name first, matching
    /// how the source application identifies them.
    pub fn id_or_synthesized(&self, index: usize) -> String {
        if let Some(id) = self.id() {
            return id.to_string();
        }
        if let Some(name) = self.attr("name") {
            return format!("{name}-{index}");
        }
        format!("{}-{index}", self.kind.tag())
    }

    fn required(&self, attr: &'static str) -> Result<&str> {
        self.attr(attr).ok_or(Error::MissingAttribute {
            tag: self.kind.tag(),
            attr,
        })
    }

    pub fn required_f64(&self, attr: &'static str) -> Result<f64> {
        parse_f64(self.kind.tag(), attr, self.required(attr)?)
    }

    pub fn f64_or(&self, attr: &'static str, default: f64) -> Result<f64> {
        match self.attr(attr) {
            Some(value) => parse_f64(self.kind.tag(), attr, value),
            None => Ok(default),
        }
    }

    pub fn opt_f64(&self, attr: &'static str) -> Result<Option<f64>> {
        self.attr(attr)
            .map(|value| parse_f64(self.kind.tag(), attr, value))
            .transpose()
    }

    pub fn i32_or(&self, attr: &'static str, default: i32) -> Result<i32> {
        match self.attr(attr) {
            Some(value) => value.parse().map_err(|_| Error::InvalidAttribute {
                tag: self.kind.tag(),
                attr,
                value: value.to_string(),
            }),
            None => Ok(default),
        }
    }

    /// Booleans are written as the literal strings `"true"` / `"false"`.
    pub fn bool_or(&self, attr: &'static str, default: bool) -> bool {
        match self.attr(attr) {
            Some(value) => value == "true",
            None => default,
        }
    }

    pub fn opt_color(&self, attr: &'static str) -> Result<Option<Color>> {
        self.attr(attr).map(Color::from_source_hex).transpose()
    }

    /// Room boundary points, in declaration order.
    pub fn points(&self) -> SmallVec<[Point2<f64>; 8]> {
        self.children
            .iter()
            .filter_map(|child| match child {
                RawChild::Point { x, y } => Some(Point2::new(*x, *y)),
                _ => None,
            })
            .collect()
    }
}

fn parse_f64(tag: &'static str, attr: &'static str, value: &str) -> Result<f64> {
    value.parse().map_err(|_| Error::InvalidAttribute {
        tag,
        attr,
        value: value.to_string(),
    })
}

fn parse_child_f64(map: &FxHashMap<String, String>, tag: &'static str, attr: &'static str) -> Result<f64> {
    let value = map.get(attr).ok_or(Error::MissingAttribute { tag, attr })?;
    parse_f64(tag, attr, value)
}

/// The parsed scene document: root attributes plus the flat element stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Home {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Document-level default wall height, in source units.
    pub wall_height: Option<f64>,
    pub properties: Vec<(String, String)>,
    pub elements: Vec<RawElement>,
}

impl Home {
    /// Elements of one kind, in file order, with their stream index.
    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = (usize, &RawElement)> {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.kind == kind)
    }

    /// Total count across all recognized kinds, for progress reporting.
    /// Furniture nested in groups counts one per member.
    pub fn element_count(&self) -> usize {
        fn members(elm: &RawElement) -> usize {
            elm.children
                .iter()
                .map(|child| match child {
                    RawChild::Furniture(member) => 1 + members(member),
                    _ => 0,
                })
                .sum()
        }
        self.elements.iter().map(|e| 1 + members(e)).sum()
    }
}

/// A `<level>` element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelAttrs {
    pub id: String,
    pub name: Option<String>,
    /// Elevation of the level, source units.
    pub elevation: f64,
    /// Floor-to-ceiling height, source units.
    pub height: f64,
    /// Slab thickness, source units.
    pub floor_thickness: f64,
    pub elevation_index: i32,
    pub visible: bool,
}

impl LevelAttrs {
    pub fn from_element(elm: &RawElement, index: usize) -> Result<Self> {
        Ok(Self {
            id: elm.id_or_synthesized(index),
            name: elm.attr("name").map(str::to_string),
            elevation: elm.required_f64("elevation")?,
            height: elm.required_f64("height")?,
            floor_thickness: elm.required_f64("floorThickness")?,
            elevation_index: elm.i32_or("elevationIndex", 0)?,
            visible: elm.bool_or("visible", true),
        })
    }
}

/// A `<room>` element, boundary points in source units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAttrs {
    pub id: String,
    pub name: Option<String>,
    pub level: Option<String>,
    pub points: Vec<Point2<f64>>,
    pub floor_visible: bool,
    pub floor_color: Option<Color>,
    pub floor_shininess: f64,
    pub ceiling_visible: bool,
    pub ceiling_color: Option<Color>,
    pub ceiling_shininess: f64,
    pub area_visible: bool,
}

impl RoomAttrs {
    pub fn from_element(elm: &RawElement, index: usize) -> Result<Self> {
        Ok(Self {
            id: elm.id_or_synthesized(index),
            name: elm.attr("name").map(str::to_string),
            level: elm.attr("level").map(str::to_string),
            points: elm.points().into_vec(),
            floor_visible: elm.bool_or("floorVisible", true),
            floor_color: elm.opt_color("floorColor")?,
            floor_shininess: elm.f64_or("floorShininess", 0.0)?,
            ceiling_visible: elm.bool_or("ceilingVisible", true),
            ceiling_color: elm.opt_color("ceilingColor")?,
            ceiling_shininess: elm.f64_or("ceilingShininess", 0.0)?,
            area_visible: elm.bool_or("areaVisible", false),
        })
    }
}

/// Which wall face a baseboard hugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseboardSide {
    Left,
    Right,
}

/// A `<baseboard>` child of a wall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseboardAttrs {
    pub side: BaseboardSide,
    /// Thickness, source units.
    pub thickness: f64,
    /// Height, source units.
    pub height: f64,
    pub color: Option<Color>,
}

impl BaseboardAttrs {
    fn from_map(map: &FxHashMap<String, String>) -> Result<Self> {
        const TAG: &str = "baseboard";
        let side = match map.get("attribute").map(String::as_str) {
            Some("leftSideBaseboard") => BaseboardSide::Left,
            Some("rightSideBaseboard") => BaseboardSide::Right,
            other => {
                return Err(Error::InvalidAttribute {
                    tag: TAG,
                    attr: "attribute",
                    value: other.unwrap_or("").to_string(),
                })
            }
        };
        Ok(Self {
            side,
            thickness: parse_child_f64(map, TAG, "thickness")?,
            height: parse_child_f64(map, TAG, "height")?,
            color: map
                .get("color")
                .map(|c| Color::from_source_hex(c))
                .transpose()?,
        })
    }
}

/// A `<wall>` element. Coordinates and dimensions in source units; the
/// arc extent keeps the source (clockwise-positive) sign here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallAttrs {
    pub id: String,
    pub level: Option<String>,
    pub x_start: f64,
    pub y_start: f64,
    pub x_end: f64,
    pub y_end: f64,
    pub thickness: f64,
    /// Height at the start point; the document default applies when absent.
    pub height: Option<f64>,
    /// Height at the end point; defaults to the start height.
    pub height_at_end: Option<f64>,
    /// Signed arc extent in radians; zero means straight.
    pub arc_extent: f64,
    pub wall_at_start: Option<String>,
    pub wall_at_end: Option<String>,
    pub top_color: Option<Color>,
    pub left_side_color: Option<Color>,
    pub right_side_color: Option<Color>,
    pub pattern: Option<String>,
    pub baseboards: Vec<BaseboardAttrs>,
}

impl WallAttrs {
    pub fn from_element(elm: &RawElement, index: usize) -> Result<Self> {
        let mut baseboards = Vec::new();
        for child in &elm.children {
            if let RawChild::Baseboard(map) = child {
                baseboards.push(BaseboardAttrs::from_map(map)?);
            }
        }
        Ok(Self {
            id: elm.id_or_synthesized(index),
            level: elm.attr("level").map(str::to_string),
            x_start: elm.required_f64("xStart")?,
            y_start: elm.required_f64("yStart")?,
            x_end: elm.required_f64("xEnd")?,
            y_end: elm.required_f64("yEnd")?,
            thickness: elm.required_f64("thickness")?,
            height: elm.opt_f64("height")?,
            height_at_end: elm.opt_f64("heightAtEnd")?,
            arc_extent: elm.f64_or("arcExtent", 0.0)?,
            wall_at_start: elm.attr("wallAtStart").map(str::to_string),
            wall_at_end: elm.attr("wallAtEnd").map(str::to_string),
            top_color: elm.opt_color("topColor")?,
            left_side_color: elm.opt_color("leftSideColor")?,
            right_side_color: elm.opt_color("rightSideColor")?,
            pattern: elm.attr("pattern").map(str::to_string),
            baseboards,
        })
    }
}

/// A `<doorOrWindow>` element, dimensions in source units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningAttrs {
    pub id: String,
    pub name: Option<String>,
    pub level: Option<String>,
    pub catalog_id: Option<String>,
    pub x: f64,
    pub y: f64,
    /// Elevation of the lower face above the level, source units.
    pub elevation: f64,
    /// Rotation in the plan, radians, source winding.
    pub angle: f64,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub mirrored: bool,
    pub visible: bool,
}

impl OpeningAttrs {
    pub fn from_element(elm: &RawElement, index: usize) -> Result<Self> {
        Ok(Self {
            id: elm.id_or_synthesized(index),
            name: elm.attr("name").map(str::to_string),
            level: elm.attr("level").map(str::to_string),
            catalog_id: elm.attr("catalogId").map(str::to_string),
            x: elm.required_f64("x")?,
            y: elm.required_f64("y")?,
            elevation: elm.f64_or("elevation", 0.0)?,
            angle: elm.f64_or("angle", 0.0)?,
            width: elm.required_f64("width")?,
            depth: elm.required_f64("depth")?,
            height: elm.required_f64("height")?,
            mirrored: elm.bool_or("modelMirrored", false),
            visible: elm.bool_or("visible", true),
        })
    }
}

/// A `<pieceOfFurniture>` element, dimensions in source units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FurnitureAttrs {
    pub id: String,
    pub name: Option<String>,
    pub level: Option<String>,
    pub catalog_id: Option<String>,
    /// Archive entry holding the normalized mesh.
    pub model: Option<String>,
    pub x: f64,
    pub y: f64,
    /// Elevation of the lower face above the level, source units.
    pub elevation: f64,
    /// Plan rotation, radians, source winding.
    pub angle: f64,
    /// Rotation about the source X axis, radians.
    pub pitch: f64,
    /// Rotation about the source Y axis, radians.
    pub roll: f64,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub mirrored: bool,
    pub movable: bool,
    pub visible: bool,
    pub color: Option<Color>,
}

impl FurnitureAttrs {
    pub fn from_element(elm: &RawElement, index: usize) -> Result<Self> {
        Ok(Self {
            id: elm.id_or_synthesized(index),
            name: elm.attr("name").map(str::to_string),
            level: elm.attr("level").map(str::to_string),
            catalog_id: elm.attr("catalogId").map(str::to_string),
            model: elm.attr("model").map(str::to_string),
            x: elm.f64_or("x", 0.0)?,
            y: elm.f64_or("y", 0.0)?,
            elevation: elm.f64_or("elevation", 0.0)?,
            angle: elm.f64_or("angle", 0.0)?,
            pitch: elm.f64_or("pitch", 0.0)?,
            roll: elm.f64_or("roll", 0.0)?,
            width: elm.required_f64("width")?,
            depth: elm.required_f64("depth")?,
            height: elm.required_f64("height")?,
            mirrored: elm.bool_or("modelMirrored", false),
            movable: elm.bool_or("movable", true),
            visible: elm.bool_or("visible", true),
            color: elm.opt_color("color")?,
        })
    }
}

/// A `<lightSource>` child of a light.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightSourceAttrs {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub diameter: f64,
    pub color: Option<Color>,
}

impl LightSourceAttrs {
    fn from_map(map: &FxHashMap<String, String>) -> Result<Self> {
        const TAG: &str = "lightSource";
        Ok(Self {
            x: parse_child_f64(map, TAG, "x")?,
            y: parse_child_f64(map, TAG, "y")?,
            z: parse_child_f64(map, TAG, "z")?,
            diameter: parse_child_f64(map, TAG, "diameter")?,
            color: map
                .get("color")
                .map(|c| Color::from_source_hex(c))
                .transpose()?,
        })
    }
}

/// A `<light>` element: a piece of furniture plus its point sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightAttrs {
    pub furniture: FurnitureAttrs,
    pub power: f64,
    pub sources: Vec<LightSourceAttrs>,
}

impl LightAttrs {
    pub fn from_element(elm: &RawElement, index: usize) -> Result<Self> {
        let mut sources = Vec::new();
        for child in &elm.children {
            if let RawChild::LightSource(map) = child {
                sources.push(LightSourceAttrs::from_map(map)?);
            }
        }
        Ok(Self {
            furniture: FurnitureAttrs::from_element(elm, index)?,
            power: elm.f64_or("power", 0.5)?,
            sources,
        })
    }
}

/// A `<camera>` or `<observerCamera>` element. Angles in radians.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraAttrs {
    pub id: String,
    pub name: Option<String>,
    /// The camera kind tag (`storedCamera`, `topCamera`, ...). Only
    /// `storedCamera` is importable.
    pub attribute: String,
    pub lens: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub field_of_view: f64,
    pub time: Option<f64>,
}

impl CameraAttrs {
    pub fn from_element(elm: &RawElement, index: usize) -> Result<Self> {
        let attribute = elm
            .attr("attribute")
            .unwrap_or(elm.kind.tag())
            .to_string();
        Ok(Self {
            id: format!("{attribute}-{index}"),
            name: elm.attr("name").map(str::to_string),
            attribute,
            lens: elm.attr("lens").unwrap_or("PINHOLE").to_string(),
            x: elm.required_f64("x")?,
            y: elm.required_f64("y")?,
            z: elm.required_f64("z")?,
            yaw: elm.required_f64("yaw")?,
            pitch: elm.required_f64("pitch")?,
            field_of_view: elm.required_f64("fieldOfView")?,
            time: elm.opt_f64("time")?,
        })
    }
}
