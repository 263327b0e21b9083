// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The import orchestrator.
//!
//! Element kinds are processed in a fixed order because later kinds
//! reference ids produced by earlier ones: levels, then rooms, walls,
//! openings, furniture, lights and cameras. Within a kind, elements run
//! in file order; wall-to-wall sibling references may still point
//! forward, which the wall handler resolves against the raw document.
//!
//! Every element runs inside its own error boundary: a failing element
//! is logged, recorded in the report, and the pass moves on.

use std::io::{Read, Seek};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use sh3d_lite_core::units::dim_to_host;
use sh3d_lite_core::{ElementKind, Home, RawChild, RawElement, SceneArchive};

use crate::config::ImportConfig;
use crate::error::Result;
use crate::handlers::{self, Context, ModelSource};
use crate::kernel::{FloorParams, HostKernel};
use crate::progress::ProgressSink;
use crate::registry::{FloorInfo, Registry};

/// Default floor when the document declares no levels: 250 cm of height
/// over a 12 cm slab at elevation zero.
const DEFAULT_FLOOR_ID: &str = "Level";
const DEFAULT_FLOOR_HEIGHT: f64 = 250.0;
const DEFAULT_SLAB_THICKNESS: f64 = 12.0;

/// One element that failed and was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedElement {
    pub kind: ElementKind,
    /// Position of the element within the stream.
    pub index: usize,
    pub id: String,
    pub reason: String,
}

/// Outcome of an import. The operation succeeds even when individual
/// elements were skipped; callers inspect `skipped` for the details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub home_name: Option<String>,
    pub imported: usize,
    pub skipped: Vec<SkippedElement>,
}

/// Import a scene archive: parse `Home.xml`, then drive the kernel.
pub fn import_archive<R, K>(
    archive: &mut SceneArchive<R>,
    kernel: &mut K,
    config: &ImportConfig,
    progress: &mut dyn ProgressSink,
) -> Result<ImportReport>
where
    R: Read + Seek,
    K: HostKernel,
{
    let home = archive.home()?;
    import_home(&home, kernel, archive, config, progress)
}

/// Import an already-parsed document, reading meshes from `models`.
pub fn import_home<K: HostKernel>(
    home: &Home,
    kernel: &mut K,
    models: &mut dyn ModelSource,
    config: &ImportConfig,
    progress: &mut dyn ProgressSink,
) -> Result<ImportReport> {
    let mut registry = Registry::default();
    import_home_into(home, kernel, models, config, progress, &mut registry)
}

/// Import into an existing registry. With [`ImportConfig::merge`] set,
/// ids already registered there resolve to their objects instead of
/// creating duplicates, so a file can be re-imported over its own
/// result.
pub fn import_home_into<K: HostKernel>(
    home: &Home,
    kernel: &mut K,
    models: &mut dyn ModelSource,
    config: &ImportConfig,
    progress: &mut dyn ProgressSink,
    registry: &mut Registry,
) -> Result<ImportReport> {
    info!(name = home.name.as_deref().unwrap_or("<unnamed>"), "importing home");

    registry.expect_more(home.element_count());
    let mut report = ImportReport {
        home_name: home.name.clone(),
        ..ImportReport::default()
    };
    let mut cx = Context {
        kernel,
        registry,
        config,
        models,
    };

    let phases = phases(config);
    let total_steps = phases.len();

    for (step, kind) in phases.iter().enumerate() {
        let elements: Vec<(usize, &RawElement)> = home.elements_of(*kind).collect();
        progress.phase_started(*kind, step + 1, total_steps, elements.len());

        if *kind == ElementKind::Level && elements.is_empty() {
            info!("no level defined; creating the default floor");
            create_default_floor(&mut cx)?;
            continue;
        }

        info!(kind = kind.tag(), count = elements.len(), "importing elements");

        for (index, elm) in elements {
            process_element(&mut cx, home, *kind, index, elm, &mut report);
            tick(&mut cx, progress);
        }

        // Group members live nested under their group, outside the flat
        // per-kind streams.
        if *kind == ElementKind::Furniture {
            for (index, group) in home.elements_of(ElementKind::FurnitureGroup) {
                process_group(&mut cx, home, index, group, &mut report, progress);
                tick(&mut cx, progress);
            }
        }
    }

    info!(
        imported = report.imported,
        skipped = report.skipped.len(),
        "import finished"
    );
    Ok(report)
}

/// The fixed handler order, with configured kinds removed.
fn phases(config: &ImportConfig) -> Vec<ElementKind> {
    let mut order = vec![ElementKind::Level, ElementKind::Room, ElementKind::Wall];
    if config.import_openings {
        order.push(ElementKind::DoorOrWindow);
    }
    if config.import_furniture {
        order.push(ElementKind::Furniture);
    }
    if config.import_lights {
        order.push(ElementKind::Light);
    }
    if config.import_cameras {
        order.push(ElementKind::ObserverCamera);
        order.push(ElementKind::Camera);
    }
    order
}

/// Run one element through its handler, catching the failure at the
/// element boundary.
fn process_element<K: HostKernel>(
    cx: &mut Context<'_, K>,
    home: &Home,
    kind: ElementKind,
    index: usize,
    elm: &RawElement,
    report: &mut ImportReport,
) {
    let outcome: Result<usize> = match kind {
        ElementKind::Level => handlers::level::process(cx, index, elm).map(|_| 1),
        ElementKind::Room => handlers::room::process(cx, index, elm).map(|_| 1),
        ElementKind::Wall => handlers::wall::process(cx, home, index, elm).map(|_| 1),
        ElementKind::DoorOrWindow => handlers::opening::process(cx, index, elm).map(|_| 1),
        ElementKind::Furniture => handlers::furniture::process(cx, index, elm).map(|_| 1),
        ElementKind::Light => {
            let with_appliance = cx.config.import_furniture;
            handlers::light::process(cx, index, elm)
                .map(|ids| ids.len() + usize::from(with_appliance))
        }
        ElementKind::ObserverCamera | ElementKind::Camera => handlers::camera::process(cx, index, elm)
            .map(|created| usize::from(created.is_some())),
        ElementKind::FurnitureGroup => Ok(0),
    };

    match outcome {
        Ok(created) => report.imported += created,
        Err(err) => {
            let id = elm.id_or_synthesized(index);
            error!(kind = kind.tag(), index, id = %id, %err, "failed to import element");
            report.skipped.push(SkippedElement {
                kind,
                index,
                id,
                reason: err.to_string(),
            });
        }
    }
}

/// Import the furniture nested in a group, recursing into inner groups.
/// Members count toward progress like flat-stream elements.
fn process_group<K: HostKernel>(
    cx: &mut Context<'_, K>,
    home: &Home,
    group_index: usize,
    group: &RawElement,
    report: &mut ImportReport,
    progress: &mut dyn ProgressSink,
) {
    for child in &group.children {
        let RawChild::Furniture(member) = child else {
            continue;
        };
        match member.kind {
            ElementKind::FurnitureGroup => {
                process_group(cx, home, group_index, member, report, progress)
            }
            kind => process_element(cx, home, kind, group_index, member, report),
        }
        tick(cx, progress);
    }
}

fn tick<K: HostKernel>(cx: &mut Context<'_, K>, progress: &mut dyn ProgressSink) {
    cx.registry.element_processed();
    progress.element_processed(cx.registry.processed(), cx.registry.expected());
}

fn create_default_floor<K: HostKernel>(cx: &mut Context<'_, K>) -> Result<()> {
    let params = FloorParams {
        id: DEFAULT_FLOOR_ID.to_string(),
        name: Some(DEFAULT_FLOOR_ID.to_string()),
        elevation: 0.0,
        height: dim_to_host(DEFAULT_FLOOR_HEIGHT),
        slab_thickness: dim_to_host(DEFAULT_SLAB_THICKNESS),
        elevation_index: 0,
        visible: true,
    };
    let merge = cx.config.merge;
    let kernel = &mut *cx.kernel;
    let (object, _created) =
        cx.registry
            .resolve_or_create(DEFAULT_FLOOR_ID, ElementKind::Level, merge, || {
                kernel.create_floor(&params)
            })?;
    cx.registry.add_floor(FloorInfo {
        id: params.id,
        object,
        elevation: params.elevation,
        height: params.height,
        slab_thickness: params.slab_thickness,
    });
    Ok(())
}
