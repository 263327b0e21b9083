// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The element registry.
//!
//! One registry lives for the duration of one import or export
//! operation. It resolves identifier references between elements
//! (including forward references, since the file stream is not
//! topologically ordered), finds walls by quantized endpoint, and keeps
//! the processed/expected counters for progress reporting.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

use sh3d_lite_core::units::{dim_to_host, TOLERANCE};
use sh3d_lite_core::ElementKind;
use sh3d_lite_geometry::WallDescriptor;

use crate::error::{Error, KernelError, Result};
use crate::kernel::ObjectId;

/// Quantized coordinates: host units rounded to the shared tolerance, so
/// near-coincident points land in the same bucket.
pub type PointKey = (i64, i64, i64);

/// Quantize a host-unit point to the shared tolerance.
pub fn quantize(p: &Point3<f64>) -> PointKey {
    let scale = 1.0 / dim_to_host(TOLERANCE);
    (
        (p.x * scale).round() as i64,
        (p.y * scale).round() as i64,
        (p.z * scale).round() as i64,
    )
}

/// Wall ids bucketed by quantized start and end point. Used on import to
/// find miter partners without a declared sibling, and on export to
/// reconstruct the sibling attributes.
#[derive(Debug, Default)]
pub struct EndpointIndex {
    by_start: FxHashMap<PointKey, Vec<String>>,
    by_end: FxHashMap<PointKey, Vec<String>>,
}

impl EndpointIndex {
    pub fn insert(&mut self, wall_id: &str, point: &Point3<f64>, as_start: bool) {
        let buckets = if as_start {
            &mut self.by_start
        } else {
            &mut self.by_end
        };
        buckets
            .entry(quantize(point))
            .or_default()
            .push(wall_id.to_string());
    }

    pub fn starting_at(&self, point: &Point3<f64>) -> &[String] {
        self.by_start
            .get(&quantize(point))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn ending_at(&self, point: &Point3<f64>) -> &[String] {
        self.by_end
            .get(&quantize(point))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All wall ids touching the point with either endpoint, insertion
    /// order within each bucket, excluding one wall. Walls ending at the
    /// point come first; a wall ending where another starts is the common
    /// chain case and makes the better miter partner.
    pub fn touching(&self, point: &Point3<f64>, exclude: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for id in self.ending_at(point).iter().chain(self.starting_at(point)) {
            if id != exclude && !out.contains(id) {
                out.push(id.clone());
            }
        }
        out
    }
}

/// A floor known to the registry, host units.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorInfo {
    pub id: String,
    pub object: ObjectId,
    pub elevation: f64,
    pub height: f64,
    pub slab_thickness: f64,
}

/// A wall known to the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct WallInfo {
    pub id: String,
    pub object: ObjectId,
    pub descriptor: WallDescriptor,
}

#[derive(Debug, Clone, Copy)]
struct Registered {
    object: ObjectId,
    kind: ElementKind,
}

/// Per-operation element graph state.
#[derive(Debug, Default)]
pub struct Registry {
    objects: FxHashMap<String, Registered>,
    floors: Vec<FloorInfo>,
    walls: Vec<WallInfo>,
    endpoints: EndpointIndex,
    expected: usize,
    processed: usize,
}

impl Registry {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            ..Self::default()
        }
    }

    /// Store or overwrite an id mapping. Overwriting happens when merge
    /// mode re-associates a source id with a pre-existing object.
    pub fn register(&mut self, id: &str, kind: ElementKind, object: ObjectId) {
        self.objects
            .insert(id.to_string(), Registered { object, kind });
    }

    /// Resolve `id` to its registered object, or run `create` and
    /// register the result.
    ///
    /// With `merge` set, an id already registered under the same kind
    /// reuses its object and the creation closure never runs; the ids
    /// come from a registry carried over from an earlier import or
    /// seeded by the caller. Returns the object and whether it was
    /// created.
    pub fn resolve_or_create<F>(
        &mut self,
        id: &str,
        kind: ElementKind,
        merge: bool,
        create: F,
    ) -> Result<(ObjectId, bool)>
    where
        F: FnOnce() -> std::result::Result<ObjectId, KernelError>,
    {
        if merge {
            if let Some(object) = self.lookup(id, kind)? {
                return Ok((object, false));
            }
        }
        let object = create()?;
        self.register(id, kind, object);
        Ok((object, true))
    }

    /// Resolve an id. Present under a different kind is an error, never a
    /// wrong-typed object.
    pub fn lookup(&self, id: &str, expected: ElementKind) -> Result<Option<ObjectId>> {
        match self.objects.get(id) {
            None => Ok(None),
            Some(registered) if registered.kind == expected => Ok(Some(registered.object)),
            Some(registered) => Err(Error::KindMismatch {
                id: id.to_string(),
                expected: expected.tag(),
                actual: registered.kind.tag(),
            }),
        }
    }

    /// Record a floor. Re-adding an id (a merge re-import) updates the
    /// record in place.
    pub fn add_floor(&mut self, floor: FloorInfo) {
        self.register(&floor.id, ElementKind::Level, floor.object);
        match self.floors.iter_mut().find(|f| f.id == floor.id) {
            Some(existing) => *existing = floor,
            None => self.floors.push(floor),
        }
    }

    /// Resolve the floor an element sits on.
    ///
    /// A single-floor document wins regardless of the declared id, which
    /// tolerates files that only carry the synthesized default floor.
    /// Otherwise the id must resolve; a missing floor fails the element,
    /// not the operation.
    pub fn floor_for(&self, level_id: Option<&str>, element: &str) -> Result<&FloorInfo> {
        if self.floors.len() == 1 {
            return Ok(&self.floors[0]);
        }
        if let Some(id) = level_id {
            if let Some(floor) = self.floors.iter().find(|f| f.id == id) {
                return Ok(floor);
            }
        }
        Err(Error::MissingFloor {
            level: level_id.unwrap_or("<none>").to_string(),
            element: element.to_string(),
        })
    }

    /// Record a built wall and index both its endpoints. Re-adding an id
    /// updates the record without duplicating its endpoint buckets.
    pub fn add_wall(&mut self, wall: WallInfo) {
        self.register(&wall.id, ElementKind::Wall, wall.object);
        if let Some(existing) = self.walls.iter_mut().find(|w| w.id == wall.id) {
            *existing = wall;
            return;
        }
        self.endpoints.insert(&wall.id, &wall.descriptor.start, true);
        self.endpoints.insert(&wall.id, &wall.descriptor.end, false);
        self.walls.push(wall);
    }

    /// Walls in creation order, for the opening handler's containment
    /// scan.
    pub fn walls(&self) -> &[WallInfo] {
        &self.walls
    }

    pub fn wall(&self, id: &str) -> Option<&WallInfo> {
        self.walls.iter().find(|w| w.id == id)
    }

    /// Wall ids touching a point with either endpoint, excluding one
    /// wall. Fallback when no sibling id was declared; declared ids take
    /// precedence over this lookup.
    pub fn siblings_of(&self, point: &Point3<f64>, exclude_wall_id: &str) -> Vec<String> {
        self.endpoints.touching(point, exclude_wall_id)
    }

    /// Raise the expected-element counter ahead of an import pass, so a
    /// reused registry keeps its totals consistent.
    pub fn expect_more(&mut self, count: usize) {
        self.expected += count;
    }

    pub fn element_processed(&mut self) {
        self.processed += 1;
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn expected(&self) -> usize {
        self.expected
    }
}
