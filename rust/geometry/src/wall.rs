// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall sweep synthesis.
//!
//! A wall is described by its centerline endpoints, a thickness, a height
//! at each endpoint and an optional arc extent. From that description this
//! module computes the two end cross-sections and the spine path a
//! sweep-solid operation needs. Joints with adjacent walls are mitered by
//! intersecting the offset boundary edges of both walls so shared corners
//! are flush instead of gapped or overlapping.

use nalgebra::{Point2, Point3, Rotation2, Vector2, Vector3};

use crate::error::{Error, Result};

/// Parallel-line detection threshold for miter intersections, in host
/// units of cross product magnitude.
const PARALLEL_EPS: f64 = 1e-9;

/// A wall centerline description in host units. The z coordinate of both
/// endpoints is the floor elevation.
#[derive(Debug, Clone, PartialEq)]
pub struct WallDescriptor {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub thickness: f64,
    pub height_start: f64,
    pub height_end: f64,
    /// Signed arc extent in radians, host winding (counter-clockwise
    /// positive). Zero means straight.
    pub arc_extent: f64,
}

/// One end cross-section: four corners of a planar quadrilateral, listed
/// bottom-left, bottom-right, top-right, top-left when looking along the
/// spine.
pub type Section = [Point3<f64>; 4];

/// Circle data for a curved wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcInfo {
    /// True when the mirrored center had to be selected to preserve the
    /// declared winding; the spine's bounding angles swap in that case.
    pub inverted: bool,
    pub center: Point3<f64>,
    pub radius: f64,
}

/// The path a sweep follows. Arcs always run counter-clockwise from
/// `angle_start` to `angle_end`.
#[derive(Debug, Clone, PartialEq)]
pub enum Spine {
    Line {
        start: Point3<f64>,
        end: Point3<f64>,
    },
    Arc {
        center: Point3<f64>,
        radius: f64,
        angle_start: f64,
        angle_end: f64,
    },
}

/// Everything a sweep-solid operation needs for one wall.
#[derive(Debug, Clone, PartialEq)]
pub struct WallSweep {
    pub section_start: Section,
    pub section_end: Section,
    pub spine: Spine,
}

impl WallDescriptor {
    /// Synthesize the sweep inputs for this wall.
    ///
    /// A sibling descriptor enables mitering at that end; without one the
    /// section is a plain rectangle normal to the spine.
    pub fn sweep(
        &self,
        start_sibling: Option<&WallDescriptor>,
        end_sibling: Option<&WallDescriptor>,
    ) -> Result<WallSweep> {
        let (angle_start, angle_end, arc) = self.normal_angles()?;

        let section_start = match start_sibling {
            Some(sibling) => self.mitered_section(true, sibling),
            None => self.rectangular_section(true, angle_start),
        };
        let section_end = match end_sibling {
            Some(sibling) => self.mitered_section(false, sibling),
            None => self.rectangular_section(false, angle_end),
        };

        let spine = match arc {
            None => Spine::Line {
                start: self.start,
                end: self.end,
            },
            // The arc always runs counter-clockwise, so when the mirrored
            // center was selected the bounding angles swap to keep the
            // traversal direction matching the declared extent.
            Some(arc) => {
                let (a1, a2) = if arc.inverted {
                    (angle_start, angle_end)
                } else {
                    (angle_end, angle_start)
                };
                Spine::Arc {
                    center: arc.center,
                    radius: arc.radius,
                    angle_start: a1,
                    angle_end: a2,
                }
            }
        };

        Ok(WallSweep {
            section_start,
            section_end,
            spine,
        })
    }

    /// The cross-section normal angle at each endpoint, plus the circle
    /// for a curved wall.
    ///
    /// Straight: both normals are perpendicular to the start-to-end
    /// direction. Curved: the circle of radius `|chord / (2 sin(extent/2))|`
    /// through both endpoints, choosing of the two mirrored centers the one
    /// whose start-to-end winding matches the sign of the extent; each
    /// normal is then the angle of the radius vector at that endpoint.
    pub fn normal_angles(&self) -> Result<(f64, f64, Option<ArcInfo>)> {
        let chord = self.end.xy() - self.start.xy();

        if self.arc_extent == 0.0 {
            let angle = chord.y.atan2(chord.x) + std::f64::consts::FRAC_PI_2;
            return Ok((angle, angle, None));
        }

        let chord_len = chord.norm();
        if chord_len == 0.0 {
            return Err(Error::InvalidArc(
                "curved wall with coincident endpoints".to_string(),
            ));
        }
        let radius = (chord_len / (2.0 * (self.arc_extent / 2.0).sin())).abs();

        let (center_right, center_left) = circle_centers(self.start, self.end, radius, chord_len);

        let mut inverted = false;
        let mut center = center_right;
        let winding = signed_angle(self.start.xy() - center.xy(), self.end.xy() - center.xy());
        if winding.signum() != self.arc_extent.signum() {
            inverted = true;
            center = center_left;
        }

        let r1 = self.start.xy() - center.xy();
        let r2 = self.end.xy() - center.xy();
        let angle_start = r1.y.atan2(r1.x);
        let angle_end = r2.y.atan2(r2.x);

        Ok((
            angle_start,
            angle_end,
            Some(ArcInfo {
                inverted,
                center,
                radius,
            }),
        ))
    }

    /// The left and right boundary edges: the centerline offset by half the
    /// thickness along the in-plane normal on each side. Left is the left
    /// hand side when walking from start to end.
    pub fn sides(&self) -> (Side, Side) {
        let dir = self.end.xy() - self.start.xy();
        // dir x z_up, pointing to the right of travel.
        let normal = Vector2::new(dir.y, -dir.x).normalize();
        let left = -normal * (self.thickness / 2.0);
        let right = normal * (self.thickness / 2.0);
        (
            Side {
                start: self.start.xy() + left,
                end: self.end.xy() + left,
            },
            Side {
                start: self.start.xy() + right,
                end: self.end.xy() + right,
            },
        )
    }

    /// A plain rectangular section: thickness wide, endpoint height tall,
    /// stood upright, rotated to the normal angle, centered on the endpoint.
    fn rectangular_section(&self, at_start: bool, z_rotation: f64) -> Section {
        let (anchor, height) = if at_start {
            (self.start, self.height_start)
        } else {
            (self.end, self.height_end)
        };
        let half = self.thickness / 2.0;
        let rot = Rotation2::new(z_rotation);

        let corner = |x: f64, z: f64| {
            let planar = rot * Point2::new(x, 0.0);
            Point3::new(anchor.x + planar.x, anchor.y + planar.y, anchor.z + z)
        };
        [
            corner(-half, 0.0),
            corner(half, 0.0),
            corner(half, height),
            corner(-half, height),
        ]
    }

    /// A mitered section: the left sides and the right sides of the two
    /// walls are intersected (as infinite lines) to get the shared corner
    /// points; parallel sides fall back to this wall's own boundary
    /// endpoint at the joint.
    fn mitered_section(&self, at_start: bool, sibling: &WallDescriptor) -> Section {
        let (lside, rside) = self.sides();
        let (s_lside, s_rside) = sibling.sides();

        let fallback = |side: &Side| if at_start { side.start } else { side.end };
        let left = intersect_lines(&lside, &s_lside).unwrap_or_else(|| fallback(&lside));
        let right = intersect_lines(&rside, &s_rside).unwrap_or_else(|| fallback(&rside));

        let height = if at_start {
            self.height_start
        } else {
            self.height_end
        };
        let z = self.start.z;
        [
            Point3::new(left.x, left.y, z),
            Point3::new(right.x, right.y, z),
            Point3::new(right.x, right.y, z + height),
            Point3::new(left.x, left.y, z + height),
        ]
    }
}

/// A 2D boundary edge of a wall, in plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Side {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

/// Intersection of two edges extended to infinite lines; `None` when
/// parallel.
fn intersect_lines(a: &Side, b: &Side) -> Option<Point2<f64>> {
    let da = a.end - a.start;
    let db = b.end - b.start;
    let denom = da.x * db.y - da.y * db.x;
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let diff = b.start - a.start;
    let t = (diff.x * db.y - diff.y * db.x) / denom;
    Some(a.start + da * t)
}

/// The two centers of circles with the given radius through both points,
/// mirrored across the chord. The center on the right hand side of the
/// start-to-end direction comes first.
fn circle_centers(
    start: Point3<f64>,
    end: Point3<f64>,
    radius: f64,
    chord_len: f64,
) -> (Point3<f64>, Point3<f64>) {
    let mid = nalgebra::center(&start.xy(), &end.xy());
    let u = (end.xy() - start.xy()) / chord_len;
    let left = Vector2::new(-u.y, u.x);
    // The extent-derived radius is always at least half the chord; guard
    // against rounding pushing the radicand negative at extent == pi.
    let offset = (radius * radius - (chord_len / 2.0) * (chord_len / 2.0))
        .max(0.0)
        .sqrt();
    let z = start.z;
    (
        Point3::new(mid.x - left.x * offset, mid.y - left.y * offset, z),
        Point3::new(mid.x + left.x * offset, mid.y + left.y * offset, z),
    )
}

/// Signed angle from `a` to `b` about the vertical axis.
fn signed_angle(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    (a.x * b.y - a.y * b.x).atan2(a.dot(&b))
}

/// Centroid of a section's corners.
pub fn section_centroid(section: &Section) -> Point3<f64> {
    let sum: Vector3<f64> = section.iter().map(|p| p.coords).sum();
    Point3::from(sum / section.len() as f64)
}
