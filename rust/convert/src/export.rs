// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export: host element graph to a scene archive.
//!
//! The mirror of the import direction, built on the same transforms.
//! The consuming application expects the document elements in a fixed
//! order (properties, furniture column declarations, environment,
//! compass, cameras, levels, rooms, walls, openings, furniture) even
//! though the schema itself does not enforce it.
//!
//! Wall sibling attributes are reconstructed from endpoint coincidence:
//! for `wallAtStart` a wall ending at this wall's start point is
//! preferred over one starting there, and mirrored for `wallAtEnd`, so a
//! chain of walls round-trips into the same chain.

use std::io::Cursor;

use nalgebra::Point3;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use rustc_hash::FxHashSet;
use tracing::info;

use sh3d_lite_core::units::{
    angle_to_source, coord_to_source, dim_to_source, percent_to_source, Color,
};
use sh3d_lite_core::SceneWriter;

use crate::error::Result;
use crate::registry::EndpointIndex;

/// A floor to export, host units.
#[derive(Debug, Clone)]
pub struct HostLevel {
    pub id: String,
    pub name: String,
    pub elevation: f64,
    pub height: f64,
    pub slab_thickness: f64,
}

/// A room to export, boundary in host units.
#[derive(Debug, Clone)]
pub struct HostRoom {
    pub id: String,
    pub level: String,
    pub name: String,
    pub boundary: Vec<Point3<f64>>,
    pub floor_visible: bool,
    pub floor_color: Option<Color>,
    /// Specular shininess of the floor finish, host percent (0..100).
    pub floor_shininess: f64,
    pub ceiling_visible: bool,
    pub ceiling_color: Option<Color>,
    /// Specular shininess of the ceiling finish, host percent (0..100).
    pub ceiling_shininess: f64,
    pub area_visible: bool,
}

/// A wall to export: centerline endpoints in host units.
#[derive(Debug, Clone)]
pub struct HostWall {
    pub id: String,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub thickness: f64,
    pub height: f64,
}

/// A door or window to export, host units.
#[derive(Debug, Clone)]
pub struct HostOpening {
    pub id: String,
    pub name: String,
    pub level: String,
    pub catalog_id: Option<String>,
    /// Center of the lower face.
    pub center: Point3<f64>,
    /// Plan rotation, radians, host winding.
    pub angle: f64,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

/// A furniture piece to export, host units, plus its mesh entry.
#[derive(Debug, Clone)]
pub struct HostFurniture {
    pub id: String,
    pub name: String,
    pub level: String,
    /// Center of the placed bounding box.
    pub center: Point3<f64>,
    /// Elevation of the lower face above its floor.
    pub elevation: f64,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    /// Plan rotation, radians, host winding.
    pub angle: f64,
    pub movable: bool,
    pub visible: bool,
    pub color: Option<Color>,
    /// Archive entry name for the normalized mesh.
    pub model_entry: String,
    pub model_bytes: Vec<u8>,
}

/// The host element graph handed to the exporter.
#[derive(Debug, Clone, Default)]
pub struct HostScene {
    pub name: String,
    pub levels: Vec<HostLevel>,
    pub rooms: Vec<HostRoom>,
    pub walls: Vec<HostWall>,
    pub openings: Vec<HostOpening>,
    pub furniture: Vec<HostFurniture>,
}

impl HostScene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Serialize the scene to archive bytes: `Home.xml` plus one entry per
/// referenced mesh.
pub fn export_scene(scene: &HostScene) -> Result<Vec<u8>> {
    info!(name = %scene.name, walls = scene.walls.len(), "exporting scene");

    let xml = home_xml(scene)?;
    let mut writer = SceneWriter::new();
    writer.write_home_xml(&xml)?;
    // Pieces may share a mesh; the entry is written once.
    let mut written: FxHashSet<&str> = FxHashSet::default();
    for piece in &scene.furniture {
        if written.insert(&piece.model_entry) {
            writer.write_entry(&piece.model_entry, &piece.model_bytes)?;
        }
    }
    Ok(writer.finish()?)
}

/// Build the scene document.
pub fn home_xml(scene: &HostScene) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(into_core)?;

    let mut home = BytesStart::new("home");
    home.push_attribute(("version", "7400"));
    home.push_attribute(("name", scene.name.as_str()));
    home.push_attribute(("camera", "topCamera"));
    home.push_attribute(("wallHeight", "250.0"));
    writer.write_event(Event::Start(home)).map_err(into_core)?;

    write_properties(&mut writer)?;
    write_furniture_properties(&mut writer)?;
    write_environment(&mut writer)?;
    write_compass(&mut writer)?;
    write_cameras(&mut writer)?;
    write_levels(&mut writer, scene)?;
    write_rooms(&mut writer, scene)?;
    write_walls(&mut writer, scene)?;
    write_openings(&mut writer, scene)?;
    write_furniture(&mut writer, scene)?;

    writer
        .write_event(Event::End(BytesEnd::new("home")))
        .map_err(into_core)?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn into_core(err: std::io::Error) -> crate::error::Error {
    crate::error::Error::Core(sh3d_lite_core::Error::Io(err))
}

fn empty(writer: &mut XmlWriter, tag: &str, attrs: &[(&str, String)]) -> Result<()> {
    let mut start = BytesStart::new(tag);
    for (key, value) in attrs {
        start.push_attribute((*key, value.as_str()));
    }
    writer.write_event(Event::Empty(start)).map_err(into_core)?;
    Ok(())
}

fn write_properties(writer: &mut XmlWriter) -> Result<()> {
    // Window-layout hints the consuming application expects to find.
    const PREFIX: &str = "com.eteks.sweethome3d.SweetHome3D";
    for (name, value) in [
        ("FrameHeight", "921"),
        ("FrameWidth", "1381"),
        ("FrameX", "50"),
        ("FrameY", "87"),
        ("ScreenHeight", "1152"),
        ("ScreenWidth", "1920"),
    ] {
        empty(
            writer,
            "property",
            &[
                ("name", format!("{PREFIX}.{name}")),
                ("value", value.to_string()),
            ],
        )?;
    }
    Ok(())
}

fn write_furniture_properties(writer: &mut XmlWriter) -> Result<()> {
    for name in ["NAME", "WIDTH", "DEPTH", "HEIGHT", "VISIBLE"] {
        empty(
            writer,
            "furnitureVisibleProperty",
            &[("name", name.to_string())],
        )?;
    }
    Ok(())
}

fn write_environment(writer: &mut XmlWriter) -> Result<()> {
    empty(
        writer,
        "environment",
        &[
            ("groundColor", "A0A0A0".to_string()),
            ("skyColor", "CCDBFF".to_string()),
            ("photoWidth", "400".to_string()),
            ("photoHeight", "300".to_string()),
            ("photoAspectRatio", "VIEW_3D_RATIO".to_string()),
            ("videoWidth", "320".to_string()),
            ("videoAspectRatio", "RATIO_4_3".to_string()),
            ("videoFrameRate", "25".to_string()),
        ],
    )
}

fn write_compass(writer: &mut XmlWriter) -> Result<()> {
    empty(
        writer,
        "compass",
        &[
            ("x", "-100.0".to_string()),
            ("y", "100.0".to_string()),
            ("diameter", "100.0".to_string()),
            ("northDirection", "0.0".to_string()),
            ("longitude", "0.0".to_string()),
            ("latitude", "0.0".to_string()),
            ("timeZone", "Europe/Paris".to_string()),
        ],
    )
}

fn write_cameras(writer: &mut XmlWriter) -> Result<()> {
    empty(
        writer,
        "observerCamera",
        &[
            ("attribute", "observerCamera".to_string()),
            ("lens", "PINHOLE".to_string()),
            ("x", "50.0".to_string()),
            ("y", "50.0".to_string()),
            ("z", "170.0".to_string()),
            ("yaw", "5.4977875".to_string()),
            ("pitch", "0.19634955".to_string()),
            ("fieldOfView", "1.0995575".to_string()),
        ],
    )?;
    empty(
        writer,
        "camera",
        &[
            ("attribute", "topCamera".to_string()),
            ("lens", "PINHOLE".to_string()),
            ("x", "244.0".to_string()),
            ("y", "994.0".to_string()),
            ("z", "1125.0".to_string()),
            ("yaw", "3.1415927".to_string()),
            ("pitch", "0.7853982".to_string()),
            ("fieldOfView", "1.0995575".to_string()),
        ],
    )
}

fn write_levels(writer: &mut XmlWriter, scene: &HostScene) -> Result<()> {
    for level in &scene.levels {
        empty(
            writer,
            "level",
            &[
                ("id", level.id.clone()),
                ("name", level.name.clone()),
                ("elevation", dim_to_source(level.elevation).to_string()),
                (
                    "floorThickness",
                    dim_to_source(level.slab_thickness).to_string(),
                ),
                ("height", dim_to_source(level.height).to_string()),
                ("elevationIndex", "0".to_string()),
                ("visible", "true".to_string()),
            ],
        )?;
    }
    Ok(())
}

fn write_rooms(writer: &mut XmlWriter, scene: &HostScene) -> Result<()> {
    for room in &scene.rooms {
        let mut start = BytesStart::new("room");
        start.push_attribute(("id", room.id.as_str()));
        start.push_attribute(("level", room.level.as_str()));
        start.push_attribute(("name", room.name.as_str()));
        start.push_attribute(("areaVisible", bool_str(room.area_visible)));
        start.push_attribute(("floorVisible", bool_str(room.floor_visible)));
        if let Some(color) = room.floor_color {
            start.push_attribute(("floorColor", color.to_source_hex().as_str()));
        }
        let floor_shininess = percent_to_source(room.floor_shininess).to_string();
        start.push_attribute(("floorShininess", floor_shininess.as_str()));
        start.push_attribute(("ceilingVisible", bool_str(room.ceiling_visible)));
        if let Some(color) = room.ceiling_color {
            start.push_attribute(("ceilingColor", color.to_source_hex().as_str()));
        }
        let ceiling_shininess = percent_to_source(room.ceiling_shininess).to_string();
        start.push_attribute(("ceilingShininess", ceiling_shininess.as_str()));
        writer.write_event(Event::Start(start)).map_err(into_core)?;

        for point in &room.boundary {
            let p = coord_to_source(*point);
            empty(
                writer,
                "point",
                &[("x", p.x.to_string()), ("y", p.y.to_string())],
            )?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("room")))
            .map_err(into_core)?;
    }
    Ok(())
}

fn write_walls(writer: &mut XmlWriter, scene: &HostScene) -> Result<()> {
    let mut endpoints = EndpointIndex::default();
    for wall in &scene.walls {
        endpoints.insert(&wall.id, &wall.start, true);
        endpoints.insert(&wall.id, &wall.end, false);
    }

    for wall in &scene.walls {
        let start = coord_to_source(wall.start);
        let end = coord_to_source(wall.end);
        let mut attrs = vec![
            ("id", wall.id.clone()),
            ("xStart", start.x.to_string()),
            ("yStart", start.y.to_string()),
            ("xEnd", end.x.to_string()),
            ("yEnd", end.y.to_string()),
            ("height", dim_to_source(wall.height).to_string()),
            ("thickness", dim_to_source(wall.thickness).to_string()),
            ("pattern", "hatchUp".to_string()),
        ];
        if let Some(sibling) = sibling_at(&endpoints, &wall.start, &wall.id, true) {
            attrs.push(("wallAtStart", sibling));
        }
        if let Some(sibling) = sibling_at(&endpoints, &wall.end, &wall.id, false) {
            attrs.push(("wallAtEnd", sibling));
        }
        empty(writer, "wall", &attrs)?;
    }
    Ok(())
}

/// The sibling to declare at one endpoint. At a start point a wall
/// ending there wins over another wall starting there, and mirrored at
/// an end point.
fn sibling_at(
    endpoints: &EndpointIndex,
    point: &Point3<f64>,
    own_id: &str,
    at_start: bool,
) -> Option<String> {
    let (preferred, fallback) = if at_start {
        (endpoints.ending_at(point), endpoints.starting_at(point))
    } else {
        (endpoints.starting_at(point), endpoints.ending_at(point))
    };
    preferred
        .iter()
        .chain(fallback.iter())
        .find(|id| id.as_str() != own_id)
        .cloned()
}

fn write_openings(writer: &mut XmlWriter, scene: &HostScene) -> Result<()> {
    for opening in &scene.openings {
        let center = coord_to_source(opening.center);
        let mut attrs = vec![
            ("id", opening.id.clone()),
            ("name", opening.name.clone()),
            ("level", opening.level.clone()),
            ("x", center.x.to_string()),
            ("y", center.y.to_string()),
            ("elevation", center.z.to_string()),
            ("angle", angle_to_source(opening.angle).to_string()),
            ("width", dim_to_source(opening.width).to_string()),
            ("depth", dim_to_source(opening.depth).to_string()),
            ("height", dim_to_source(opening.height).to_string()),
        ];
        if let Some(catalog_id) = &opening.catalog_id {
            attrs.push(("catalogId", catalog_id.clone()));
        }
        empty(writer, "doorOrWindow", &attrs)?;
    }
    Ok(())
}

fn write_furniture(writer: &mut XmlWriter, scene: &HostScene) -> Result<()> {
    for piece in &scene.furniture {
        let center = coord_to_source(piece.center);
        let mut attrs = vec![
            ("id", piece.id.clone()),
            ("name", piece.name.clone()),
            ("level", piece.level.clone()),
            ("x", center.x.to_string()),
            ("y", center.y.to_string()),
            ("elevation", dim_to_source(piece.elevation).to_string()),
            ("angle", angle_to_source(piece.angle).to_string()),
            ("width", dim_to_source(piece.width).to_string()),
            ("depth", dim_to_source(piece.depth).to_string()),
            ("height", dim_to_source(piece.height).to_string()),
            ("model", piece.model_entry.clone()),
            ("movable", bool_str(piece.movable).to_string()),
            ("visible", bool_str(piece.visible).to_string()),
        ];
        if let Some(color) = piece.color {
            attrs.push(("color", color.to_source_hex()));
        }
        empty(writer, "pieceOfFurniture", &attrs)?;
    }
    Ok(())
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh3d_lite_core::{parse_home, ElementKind, SceneArchive, WallAttrs};

    fn two_wall_scene() -> HostScene {
        let mut scene = HostScene::new("Chained");
        scene.levels.push(HostLevel {
            id: "level0".to_string(),
            name: "Ground".to_string(),
            elevation: 0.0,
            height: 2500.0,
            slab_thickness: 120.0,
        });
        scene.walls.push(HostWall {
            id: "wallA".to_string(),
            start: Point3::new(0.0, 0.0, 0.0),
            end: Point3::new(5000.0, 0.0, 0.0),
            thickness: 100.0,
            height: 2500.0,
        });
        scene.walls.push(HostWall {
            id: "wallB".to_string(),
            start: Point3::new(5000.0, 0.0, 0.0),
            end: Point3::new(5000.0, -3000.0, 0.0),
            thickness: 100.0,
            height: 2500.0,
        });
        scene
    }

    #[test]
    fn document_elements_come_in_schema_order() {
        let xml = home_xml(&two_wall_scene()).unwrap();
        let order = [
            "<property",
            "<furnitureVisibleProperty",
            "<environment",
            "<compass",
            "<observerCamera",
            "<camera",
            "<level",
            "<wall",
        ];
        let mut last = 0;
        for tag in order {
            let at = xml.find(tag).unwrap_or_else(|| panic!("missing {tag}"));
            assert!(at >= last, "{tag} out of order");
            last = at;
        }
    }

    #[test]
    fn chained_walls_declare_each_other_as_siblings() {
        let xml = home_xml(&two_wall_scene()).unwrap();
        let home = parse_home(&xml).unwrap();
        let walls: Vec<WallAttrs> = home
            .elements_of(ElementKind::Wall)
            .map(|(i, e)| WallAttrs::from_element(e, i).unwrap())
            .collect();

        // wallA ends where wallB starts.
        assert_eq!(walls[0].wall_at_end.as_deref(), Some("wallB"));
        assert_eq!(walls[1].wall_at_start.as_deref(), Some("wallA"));
        assert_eq!(walls[0].wall_at_start, None);
        assert_eq!(walls[1].wall_at_end, None);
    }

    #[test]
    fn exported_walls_round_trip_through_the_transforms() {
        let xml = home_xml(&two_wall_scene()).unwrap();
        let home = parse_home(&xml).unwrap();
        let (i, elm) = home.elements_of(ElementKind::Wall).next().unwrap();
        let wall = WallAttrs::from_element(elm, i).unwrap();
        assert_eq!(wall.x_start, 0.0);
        assert_eq!(wall.x_end, 500.0);
        assert_eq!(wall.thickness, 10.0);
        assert_eq!(wall.height, Some(250.0));
    }

    #[test]
    fn rooms_and_openings_survive_a_round_trip() {
        use sh3d_lite_core::{OpeningAttrs, RoomAttrs};

        let mut scene = two_wall_scene();
        scene.rooms.push(HostRoom {
            id: "room0".to_string(),
            level: "level0".to_string(),
            name: "Living".to_string(),
            boundary: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(5000.0, 0.0, 0.0),
                Point3::new(5000.0, -3000.0, 0.0),
                Point3::new(0.0, -3000.0, 0.0),
            ],
            floor_visible: true,
            floor_color: Some(Color {
                r: 0x80,
                g: 0x40,
                b: 0x20,
                alpha: None,
            }),
            floor_shininess: 25.0,
            ceiling_visible: true,
            ceiling_color: None,
            ceiling_shininess: 0.0,
            area_visible: false,
        });
        scene.openings.push(HostOpening {
            id: "window0".to_string(),
            name: "Window".to_string(),
            level: "level0".to_string(),
            catalog_id: Some("eTeks#doubleWindow126x123".to_string()),
            center: Point3::new(2500.0, 0.0, 900.0),
            angle: 0.0,
            width: 1260.0,
            depth: 120.0,
            height: 1230.0,
        });

        let xml = home_xml(&scene).unwrap();
        let home = parse_home(&xml).unwrap();

        let (i, elm) = home.elements_of(ElementKind::Room).next().unwrap();
        let room = RoomAttrs::from_element(elm, i).unwrap();
        assert_eq!(room.points.len(), 4);
        // Host (5000, -3000) flips back to source (500, 300).
        assert_eq!(room.points[2].x, 500.0);
        assert_eq!(room.points[2].y, 300.0);
        assert_eq!(room.floor_color.unwrap().to_source_hex(), "804020");
        // Host 25 percent flips back to the source 0..1 fraction.
        assert_eq!(room.floor_shininess, 0.25);
        assert_eq!(room.ceiling_shininess, 0.0);

        let (i, elm) = home.elements_of(ElementKind::DoorOrWindow).next().unwrap();
        let opening = OpeningAttrs::from_element(elm, i).unwrap();
        assert_eq!(opening.x, 250.0);
        assert_eq!(opening.elevation, 90.0);
        assert_eq!(opening.width, 126.0);
        assert_eq!(
            opening.catalog_id.as_deref(),
            Some("eTeks#doubleWindow126x123")
        );
    }

    #[test]
    fn archive_contains_home_xml_and_models() {
        let mut scene = two_wall_scene();
        scene.furniture.push(HostFurniture {
            id: "sofa".to_string(),
            name: "Sofa".to_string(),
            level: "level0".to_string(),
            center: Point3::new(0.0, 0.0, 375.0),
            elevation: 0.0,
            width: 1200.0,
            depth: 600.0,
            height: 750.0,
            angle: 0.0,
            movable: true,
            visible: true,
            color: None,
            model_entry: "models/sofa".to_string(),
            model_bytes: b"o sofa".to_vec(),
        });

        let bytes = export_scene(&scene).unwrap();
        let mut archive = SceneArchive::from_bytes(bytes).unwrap();
        assert_eq!(archive.model_bytes("models/sofa").unwrap(), b"o sofa");
        let home = archive.home().unwrap();
        assert_eq!(home.name.as_deref(), Some("Chained"));
        assert_eq!(home.elements_of(ElementKind::Furniture).count(), 1);
    }
}
