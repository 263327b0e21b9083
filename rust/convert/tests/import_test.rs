// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end import tests against a recording kernel.

use std::io::Cursor;

use approx::assert_relative_eq;
use nalgebra::{Matrix4, Point3};

use sh3d_lite_convert::{
    import_archive, import_home_into, BaseboardParams, CameraParams, FloorParams, FurnitureParams,
    HostKernel, ImportConfig, LightSourceParams, NullProgress, ObjectId, OpeningParams,
    OpeningPreset, ProgressSink, Registry, RoomParams, WallParams,
};
use sh3d_lite_core::{ElementKind, SceneArchive, SceneWriter};
use sh3d_lite_geometry::{ModelBounds, Spine, WallSweep};

/// Records every kernel call; wall containment is answered from the
/// bounding box of the recorded sweep sections.
#[derive(Default)]
struct RecordingKernel {
    next_id: u64,
    floors: Vec<FloorParams>,
    rooms: Vec<RoomParams>,
    walls: Vec<(ObjectId, WallParams, WallSweep)>,
    baseboards: Vec<BaseboardParams>,
    openings: Vec<OpeningParams>,
    furniture: Vec<(FurnitureParams, Matrix4<f64>)>,
    light_sources: Vec<LightSourceParams>,
    cameras: Vec<CameraParams>,
}

impl RecordingKernel {
    fn alloc(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId(self.next_id)
    }

    fn sweep_bounds(sweep: &WallSweep) -> (Point3<f64>, Point3<f64>) {
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for corner in sweep.section_start.iter().chain(sweep.section_end.iter()) {
            for axis in 0..3 {
                min[axis] = min[axis].min(corner[axis]);
                max[axis] = max[axis].max(corner[axis]);
            }
        }
        (min, max)
    }
}

impl HostKernel for RecordingKernel {
    fn create_floor(&mut self, params: &FloorParams) -> Result<ObjectId, sh3d_lite_convert::KernelError> {
        self.floors.push(params.clone());
        Ok(self.alloc())
    }

    fn create_room(&mut self, params: &RoomParams) -> Result<ObjectId, sh3d_lite_convert::KernelError> {
        self.rooms.push(params.clone());
        Ok(self.alloc())
    }

    fn sweep_is_valid(&mut self, _sweep: &WallSweep) -> bool {
        true
    }

    fn create_wall(
        &mut self,
        params: &WallParams,
        sweep: &WallSweep,
    ) -> Result<ObjectId, sh3d_lite_convert::KernelError> {
        let id = self.alloc();
        self.walls.push((id, params.clone(), sweep.clone()));
        Ok(id)
    }

    fn wall_contains(&mut self, wall: ObjectId, point: &Point3<f64>) -> bool {
        let Some((_, _, sweep)) = self.walls.iter().find(|(id, _, _)| *id == wall) else {
            return false;
        };
        let (min, max) = Self::sweep_bounds(sweep);
        (0..3).all(|axis| point[axis] >= min[axis] - 1e-9 && point[axis] <= max[axis] + 1e-9)
    }

    fn create_baseboard(
        &mut self,
        params: &BaseboardParams,
    ) -> Result<ObjectId, sh3d_lite_convert::KernelError> {
        self.baseboards.push(params.clone());
        Ok(self.alloc())
    }

    fn create_opening(
        &mut self,
        params: &OpeningParams,
    ) -> Result<ObjectId, sh3d_lite_convert::KernelError> {
        self.openings.push(params.clone());
        Ok(self.alloc())
    }

    fn load_model(
        &mut self,
        _entry: &str,
        bytes: &[u8],
    ) -> Result<ModelBounds, sh3d_lite_convert::KernelError> {
        if bytes.is_empty() {
            return Err(sh3d_lite_convert::KernelError("empty mesh".to_string()));
        }
        // Normalized unit cube centered on the origin.
        Ok(ModelBounds {
            min: Point3::new(-0.5, -0.5, -0.5),
            max: Point3::new(0.5, 0.5, 0.5),
        })
    }

    fn create_furniture(
        &mut self,
        params: &FurnitureParams,
        placement: &Matrix4<f64>,
    ) -> Result<ObjectId, sh3d_lite_convert::KernelError> {
        self.furniture.push((params.clone(), *placement));
        Ok(self.alloc())
    }

    fn create_light_source(
        &mut self,
        params: &LightSourceParams,
    ) -> Result<ObjectId, sh3d_lite_convert::KernelError> {
        self.light_sources.push(params.clone());
        Ok(self.alloc())
    }

    fn create_camera(
        &mut self,
        params: &CameraParams,
    ) -> Result<ObjectId, sh3d_lite_convert::KernelError> {
        self.cameras.push(params.clone());
        Ok(self.alloc())
    }
}

fn archive_of(xml: &str, entries: &[(&str, &[u8])]) -> SceneArchive<Cursor<Vec<u8>>> {
    let mut writer = SceneWriter::new();
    writer.write_home_xml(xml).unwrap();
    for (name, bytes) in entries {
        writer.write_entry(name, bytes).unwrap();
    }
    SceneArchive::from_bytes(writer.finish().unwrap()).unwrap()
}

fn import(
    xml: &str,
    entries: &[(&str, &[u8])],
    config: &ImportConfig,
) -> (RecordingKernel, sh3d_lite_convert::ImportReport) {
    let mut archive = archive_of(xml, entries);
    let mut kernel = RecordingKernel::default();
    let report = import_archive(&mut archive, &mut kernel, config, &mut NullProgress).unwrap();
    (kernel, report)
}

const FULL_HOME: &str = r#"
<home version="7.0" name="Demo" wallHeight="250">
  <level id="level0" name="Ground" elevation="0.0" height="250.0" floorThickness="12.0"/>
  <room id="room0" level="level0" name="Living" floorShininess="0.25">
    <point x="0.0" y="0.0"/>
    <point x="500.0" y="0.0"/>
    <point x="500.0" y="300.0"/>
    <point x="0.0" y="300.0"/>
  </room>
  <wall id="wall0" level="level0" xStart="0.0" yStart="0.0" xEnd="500.0" yEnd="0.0"
        thickness="10.0" height="250.0"/>
  <doorOrWindow id="window0" level="level0" catalogId="eTeks#doubleWindow126x123"
        x="250.0" y="0.0" elevation="90.0" width="126.0" depth="12.0" height="123.0"/>
  <pieceOfFurniture id="sofa0" level="level0" name="Sofa" model="models/sofa.obj"
        x="100.0" y="100.0" width="120.0" depth="60.0" height="75.0"/>
  <light id="lamp0" level="level0" name="Lamp" model="models/lamp.obj"
        x="50.0" y="50.0" width="20.0" depth="20.0" height="40.0" power="0.7">
    <lightSource x="50.0" y="50.0" z="35.0" diameter="10.0" color="FFFFFF"/>
  </light>
  <camera attribute="storedCamera" name="View" x="100.0" y="100.0" z="170.0"
        yaw="1.0" pitch="0.5" fieldOfView="1.1"/>
</home>
"#;

const MODELS: &[(&str, &[u8])] = &[
    ("models/sofa.obj", b"o sofa"),
    ("models/lamp.obj", b"o lamp"),
];

#[test]
fn imports_a_single_floor_scene() {
    let (kernel, report) = import(FULL_HOME, MODELS, &ImportConfig::default());

    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    assert_eq!(report.home_name.as_deref(), Some("Demo"));
    // level + room + wall + opening + sofa + lamp appliance + source + camera
    assert_eq!(report.imported, 8);

    let floor = &kernel.floors[0];
    assert_eq!(floor.id, "level0");
    assert_relative_eq!(floor.height, 2500.0);
    assert_relative_eq!(floor.slab_thickness, 120.0);

    // Boundary points flip y and scale into millimeters.
    let room = &kernel.rooms[0];
    assert_eq!(room.boundary.len(), 4);
    assert_relative_eq!(room.boundary[0], Point3::new(0.0, 0.0, 0.0));
    assert_relative_eq!(room.boundary[2], Point3::new(5000.0, -3000.0, 0.0));
    assert_relative_eq!(room.floor_shininess, 25.0);
    assert_relative_eq!(room.ceiling_shininess, 0.0);

    let (_, wall, sweep) = &kernel.walls[0];
    assert_relative_eq!(wall.thickness, 100.0);
    match &sweep.spine {
        Spine::Line { start, end } => {
            assert_relative_eq!(*start, Point3::new(0.0, 0.0, 0.0));
            assert_relative_eq!(*end, Point3::new(5000.0, 0.0, 0.0));
        }
        Spine::Arc { .. } => panic!("straight wall produced an arc spine"),
    }
}

#[test]
fn opening_is_hosted_by_its_containing_wall() {
    let (kernel, _) = import(FULL_HOME, MODELS, &ImportConfig::default());

    let wall_object = kernel.walls[0].0;
    let opening = &kernel.openings[0];
    assert_eq!(opening.host_wall, Some(wall_object));
    assert_eq!(opening.preset, OpeningPreset::Open2Pane);
    // Frame depth is capped by the host wall thickness (120 mm > 100 mm).
    assert_relative_eq!(opening.frame_depth, 100.0);
    assert_relative_eq!(opening.width, 1260.0);
    // Corner sits half a width left and half a thickness off the center.
    assert_relative_eq!(opening.corner.x, 2500.0 - 630.0);
    assert_relative_eq!(opening.corner.y, -50.0);
    assert_relative_eq!(opening.corner.z, 900.0);
}

#[test]
fn furniture_lands_scaled_and_centered_on_its_spot() {
    let (kernel, _) = import(FULL_HOME, MODELS, &ImportConfig::default());

    let (params, matrix) = &kernel.furniture[0];
    assert_eq!(params.model, "models/sofa.obj");
    // Placement target: (100, 100) cm with the piece's half height above
    // the floor.
    assert_relative_eq!(matrix[(0, 3)], 1000.0, epsilon = 1e-9);
    assert_relative_eq!(matrix[(1, 3)], -1000.0, epsilon = 1e-9);
    assert_relative_eq!(matrix[(2, 3)], 375.0, epsilon = 1e-9);
}

#[test]
fn light_sources_carry_their_appliance_and_power() {
    let (kernel, _) = import(FULL_HOME, MODELS, &ImportConfig::default());

    let source = &kernel.light_sources[0];
    assert_eq!(source.id, "lamp0-0");
    assert_relative_eq!(source.position, Point3::new(500.0, -500.0, 350.0));
    assert_relative_eq!(source.radius, 50.0);
    assert_relative_eq!(source.power, 0.7);
    assert!(source.appliance.is_some());
}

#[test]
fn stored_camera_angles_are_remapped() {
    let (kernel, _) = import(FULL_HOME, MODELS, &ImportConfig::default());

    let camera = &kernel.cameras[0];
    assert_relative_eq!(
        camera.yaw_deg,
        (std::f64::consts::PI - 1.0).to_degrees(),
        epsilon = 1e-9
    );
    assert_relative_eq!(
        camera.roll_deg,
        (std::f64::consts::FRAC_PI_2 - 0.5).to_degrees(),
        epsilon = 1e-9
    );
    assert_relative_eq!(camera.field_of_view_deg, 1.1f64.to_degrees(), epsilon = 1e-9);
}

#[test]
fn chained_walls_share_a_mitered_joint() {
    let xml = r#"
<home version="7.0" name="Corner">
  <level id="level0" elevation="0.0" height="250.0" floorThickness="12.0"/>
  <wall id="wallA" level="level0" xStart="0.0" yStart="0.0" xEnd="50.0" yEnd="0.0"
        thickness="1.0" height="25.0" wallAtEnd="wallB"/>
  <wall id="wallB" level="level0" xStart="50.0" yStart="0.0" xEnd="50.0" yEnd="30.0"
        thickness="1.0" height="25.0" wallAtStart="wallA"/>
</home>
"#;
    let (kernel, report) = import(xml, &[], &ImportConfig::default());

    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    let (_, _, sweep_b) = &kernel.walls[1];

    // wallA runs along +x with faces at y = +-5; wallB runs along -y
    // (source y flips) with faces at x = 495 and 505. The mitered start
    // section of wallB collapses onto the two face intersections.
    for corner in &sweep_b.section_start {
        let at_outer = (corner.x - 505.0).abs() < 1e-6 && (corner.y - 5.0).abs() < 1e-6;
        let at_inner = (corner.x - 495.0).abs() < 1e-6 && (corner.y + 5.0).abs() < 1e-6;
        assert!(
            at_outer || at_inner,
            "corner {corner} is off the mitered joint"
        );
    }
}

#[test]
fn declared_sibling_beats_endpoint_coincidence() {
    // wallA and wallC both end at wallB's start point; wallA was built
    // first, so the coincidence fallback would pick it. wallB declares
    // wallC, and wallA is collinear with wallB, so a miter against the
    // wrong partner degrades to the plain offset corners at x = 500.
    let xml = r#"
<home version="7.0" name="Junction">
  <level id="level0" elevation="0.0" height="250.0" floorThickness="12.0"/>
  <wall id="wallA" level="level0" xStart="0.0" yStart="0.0" xEnd="50.0" yEnd="0.0"
        thickness="1.0" height="25.0"/>
  <wall id="wallC" level="level0" xStart="50.0" yStart="-30.0" xEnd="50.0" yEnd="0.0"
        thickness="1.0" height="25.0"/>
  <wall id="wallB" level="level0" xStart="50.0" yStart="0.0" xEnd="100.0" yEnd="0.0"
        thickness="1.0" height="25.0" wallAtStart="wallC"/>
</home>
"#;
    let (kernel, report) = import(xml, &[], &ImportConfig::default());

    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    let (_, params_b, sweep_b) = &kernel.walls[2];
    assert_eq!(params_b.id, "wallB");
    for corner in &sweep_b.section_start {
        let at_outer = (corner.x - 505.0).abs() < 1e-6 && (corner.y - 5.0).abs() < 1e-6;
        let at_inner = (corner.x - 495.0).abs() < 1e-6 && (corner.y + 5.0).abs() < 1e-6;
        assert!(
            at_outer || at_inner,
            "corner {corner} was not mitered against wallC"
        );
    }
}

#[test]
fn missing_floor_fails_only_that_element() {
    let xml = r#"
<home version="7.0" name="Partial">
  <level id="level0" elevation="0.0" height="250.0" floorThickness="12.0"/>
  <level id="level1" elevation="250.0" height="250.0" floorThickness="12.0"/>
  <room id="orphan" level="no-such-level">
    <point x="0.0" y="0.0"/>
    <point x="100.0" y="0.0"/>
    <point x="100.0" y="100.0"/>
  </room>
  <wall id="wall0" level="level0" xStart="0.0" yStart="0.0" xEnd="100.0" yEnd="0.0"
        thickness="10.0" height="250.0"/>
</home>
"#;
    let (kernel, report) = import(xml, &[], &ImportConfig::default());

    assert_eq!(kernel.walls.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    let skipped = &report.skipped[0];
    assert_eq!(skipped.kind, ElementKind::Room);
    assert_eq!(skipped.id, "orphan");
    assert!(skipped.reason.contains("missing floor"), "{}", skipped.reason);
}

#[test]
fn declared_sibling_must_exist() {
    let xml = r#"
<home version="7.0" name="Ghost">
  <level id="level0" elevation="0.0" height="250.0" floorThickness="12.0"/>
  <wall id="wall0" level="level0" xStart="0.0" yStart="0.0" xEnd="100.0" yEnd="0.0"
        thickness="10.0" height="250.0" wallAtStart="ghost"/>
  <wall id="wall1" level="level0" xStart="0.0" yStart="100.0" xEnd="100.0" yEnd="100.0"
        thickness="10.0" height="250.0"/>
</home>
"#;
    let (kernel, report) = import(xml, &[], &ImportConfig::default());

    assert_eq!(kernel.walls.len(), 1);
    assert_eq!(kernel.walls[0].1.id, "wall1");
    assert_eq!(report.skipped.len(), 1);
    assert!(
        report.skipped[0].reason.contains("unknown wall"),
        "{}",
        report.skipped[0].reason
    );
}

#[test]
fn document_without_levels_gets_the_default_floor() {
    let xml = r#"
<home version="7.0" name="Flat">
  <wall id="wall0" xStart="0.0" yStart="0.0" xEnd="100.0" yEnd="0.0"
        thickness="10.0" height="250.0"/>
</home>
"#;
    let (kernel, report) = import(xml, &[], &ImportConfig::default());

    assert!(report.skipped.is_empty());
    assert_eq!(kernel.floors.len(), 1);
    let floor = &kernel.floors[0];
    assert_eq!(floor.id, "Level");
    assert_relative_eq!(floor.elevation, 0.0);
    assert_relative_eq!(floor.height, 2500.0);
    assert_relative_eq!(floor.slab_thickness, 120.0);
    assert_eq!(kernel.walls.len(), 1);
}

#[test]
fn disabled_kinds_are_not_imported() {
    let config = ImportConfig {
        import_openings: false,
        import_furniture: false,
        import_cameras: false,
        ..ImportConfig::default()
    };
    let (kernel, report) = import(FULL_HOME, MODELS, &config);

    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    assert!(kernel.openings.is_empty());
    assert!(kernel.furniture.is_empty());
    assert!(kernel.cameras.is_empty());
    // Light point sources survive without their appliance mesh.
    assert_eq!(kernel.light_sources.len(), 1);
    assert_eq!(kernel.light_sources[0].appliance, None);
    // level + room + wall + source
    assert_eq!(report.imported, 4);
}

#[test]
fn furniture_groups_import_their_members() {
    let xml = r#"
<home version="7.0" name="Grouped">
  <level id="level0" elevation="0.0" height="250.0" floorThickness="12.0"/>
  <furnitureGroup id="set0" level="level0" name="Dining set" width="200.0" depth="200.0" height="80.0">
    <pieceOfFurniture id="table0" level="level0" name="Table" model="models/table.obj"
          x="100.0" y="100.0" width="140.0" depth="90.0" height="75.0"/>
    <furnitureGroup id="chairs" level="level0" width="50.0" depth="50.0" height="90.0">
      <pieceOfFurniture id="chair0" level="level0" name="Chair" model="models/chair.obj"
            x="60.0" y="60.0" width="45.0" depth="45.0" height="90.0"/>
    </furnitureGroup>
  </furnitureGroup>
</home>
"#;
    let entries: &[(&str, &[u8])] = &[
        ("models/table.obj", b"o table"),
        ("models/chair.obj", b"o chair"),
    ];
    let (kernel, report) = import(xml, entries, &ImportConfig::default());

    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    let ids: Vec<&str> = kernel.furniture.iter().map(|(p, _)| p.id.as_str()).collect();
    assert_eq!(ids, vec!["table0", "chair0"]);
}

#[test]
fn merge_reimport_reuses_existing_objects() {
    let config = ImportConfig {
        merge: true,
        ..ImportConfig::default()
    };
    let mut kernel = RecordingKernel::default();
    let mut registry = Registry::default();

    for _ in 0..2 {
        let mut archive = archive_of(FULL_HOME, MODELS);
        let home = archive.home().unwrap();
        let report = import_home_into(
            &home,
            &mut kernel,
            &mut archive,
            &config,
            &mut NullProgress,
            &mut registry,
        )
        .unwrap();
        assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
        assert_eq!(report.imported, 8);
    }

    // The second pass resolved every id instead of creating twins.
    assert_eq!(kernel.floors.len(), 1);
    assert_eq!(kernel.rooms.len(), 1);
    assert_eq!(kernel.walls.len(), 1);
    assert_eq!(kernel.openings.len(), 1);
    // Sofa plus the lamp appliance.
    assert_eq!(kernel.furniture.len(), 2);
    assert_eq!(kernel.light_sources.len(), 1);
    assert_eq!(kernel.cameras.len(), 1);
}

#[test]
fn reimport_without_merge_duplicates_objects() {
    let config = ImportConfig::default();
    let mut kernel = RecordingKernel::default();
    let mut registry = Registry::default();

    for _ in 0..2 {
        let mut archive = archive_of(FULL_HOME, MODELS);
        let home = archive.home().unwrap();
        import_home_into(
            &home,
            &mut kernel,
            &mut archive,
            &config,
            &mut NullProgress,
            &mut registry,
        )
        .unwrap();
    }

    assert_eq!(kernel.walls.len(), 2);
    assert_eq!(kernel.rooms.len(), 2);
}

#[derive(Default)]
struct CountingProgress {
    phases: Vec<(ElementKind, usize)>,
    last: Option<(usize, usize)>,
}

impl ProgressSink for CountingProgress {
    fn phase_started(&mut self, kind: ElementKind, _step: usize, _total_steps: usize, count: usize) {
        self.phases.push((kind, count));
    }

    fn element_processed(&mut self, processed: usize, expected: usize) {
        self.last = Some((processed, expected));
    }
}

#[test]
fn progress_covers_every_phase_and_group_member() {
    let xml = r#"
<home version="7.0" name="Grouped">
  <furnitureGroup id="set0" name="Set">
    <pieceOfFurniture id="table0" name="Table" model="models/table.obj"
          x="100.0" y="100.0" width="140.0" depth="90.0" height="75.0"/>
  </furnitureGroup>
</home>
"#;
    let entries: &[(&str, &[u8])] = &[("models/table.obj", b"o table")];
    let mut archive = archive_of(xml, entries);
    let mut kernel = RecordingKernel::default();
    let mut progress = CountingProgress::default();
    let report = import_archive(&mut archive, &mut kernel, &ImportConfig::default(), &mut progress)
        .unwrap();

    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    // Every phase announces itself, including the level phase that only
    // synthesizes the default floor.
    assert_eq!(progress.phases.len(), 8);
    assert_eq!(progress.phases[0], (ElementKind::Level, 0));
    // The group element and its member both count.
    assert_eq!(progress.last, Some((2, 2)));
}

#[test]
fn missing_model_entry_fails_the_piece() {
    let xml = r#"
<home version="7.0" name="NoMesh">
  <level id="level0" elevation="0.0" height="250.0" floorThickness="12.0"/>
  <pieceOfFurniture id="ghost0" level="level0" model="models/missing.obj"
        x="0.0" y="0.0" width="10.0" depth="10.0" height="10.0"/>
</home>
"#;
    let (kernel, report) = import(xml, &[], &ImportConfig::default());

    assert!(kernel.furniture.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert!(
        report.skipped[0].reason.contains("models/missing.obj"),
        "{}",
        report.skipped[0].reason
    );
}
