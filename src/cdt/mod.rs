//! Constrained Delaunay triangulation by sweep line.
//!
//! Points are swept bottom-up in (y, x) order over an advancing front
//! anchored by two synthetic far-away points. Constraint edges (polygon
//! boundaries and hole boundaries) are enforced by edge flips, with a scan
//! fallback when the immediate triangle pair is not flip-safe. See
//! Domiter & Žalik, "Sweep-line algorithm for constrained Delaunay
//! triangulation".
//!
//! ```
//! use csgkit::cdt::{Mode, Triangulator};
//!
//! let mut t = Triangulator::new();
//! t.add_polyline(&[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]]).unwrap();
//! let result = t.triangulate(Mode::Polygon).unwrap();
//! assert_eq!(result.triangles.len(), 2);
//! ```

pub mod front;
pub mod point;
pub mod predicates;
pub mod sweep;
pub mod triangle;

use crate::errors::TriangulationError;
use crate::float_types::Real;
use point::{Edge, PointId, SweepPoint, cmp_sweep};
use sweep::Sweep;
use std::cmp::Ordering;

/// What the sweep collects at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only the triangles enclosed by the constrained boundary (holes
    /// excluded). Requires at least one closed polyline.
    Polygon,
    /// The full convex-hull triangulation of a free point set.
    PointSet,
}

/// Result of a triangulation run. Triangle corners index into `points`,
/// which preserves insertion order ([`Triangulator::add_polyline`] /
/// [`Triangulator::add_point`]); the sweep never invents points.
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub points: Vec<[Real; 2]>,
    /// Counter-clockwise triangles.
    pub triangles: Vec<[u32; 3]>,
    /// Constraint edges that could not be enforced because a point lies
    /// exactly on them; recoverable, reported, never silently resolved.
    pub skipped: Vec<[u32; 2]>,
}

/// Builder collecting points and constraint edges for one sweep.
#[derive(Debug, Default)]
pub struct Triangulator {
    points: Vec<SweepPoint>,
    has_constraints: bool,
}

impl Triangulator {
    pub fn new() -> Self {
        Triangulator { points: Vec::new(), has_constraints: false }
    }

    /// Register a closed loop of points as constrained edges (outer
    /// boundary or hole — the interior test makes no distinction, holes are
    /// simply loops whose inside is walled off).
    pub fn add_polyline(&mut self, loop_2d: &[[Real; 2]]) -> Result<(), TriangulationError> {
        if loop_2d.len() < 3 {
            return Err(TriangulationError::TooFewPoints(loop_2d.len()));
        }
        let first = self.points.len() as PointId;
        for p in loop_2d {
            self.points.push(SweepPoint::new(p[0], p[1]));
        }
        for i in 0..loop_2d.len() {
            let a = first + i as PointId;
            let b = first + ((i + 1) % loop_2d.len()) as PointId;
            self.register_edge(a, b)?;
        }
        self.has_constraints = true;
        Ok(())
    }

    /// Add a free (steiner or point-set) point; returns its index.
    pub fn add_point(&mut self, p: [Real; 2]) -> u32 {
        self.points.push(SweepPoint::new(p[0], p[1]));
        (self.points.len() - 1) as u32
    }

    /// Run the sweep and collect triangles for the requested `mode`.
    pub fn triangulate(self, mode: Mode) -> Result<Triangulation, TriangulationError> {
        if mode == Mode::Polygon && !self.has_constraints {
            return Err(TriangulationError::BrokenTopology(
                "polygon mode requires a constrained boundary",
            ));
        }

        let coords: Vec<[Real; 2]> = self.points.iter().map(|p| p.coords()).collect();

        let mut sweep = Sweep::new(self.points)?;
        sweep.sweep_points()?;
        let triangles = match mode {
            Mode::Polygon => sweep.finalize_polygon()?,
            Mode::PointSet => sweep.finalize_point_set()?,
        };

        Ok(Triangulation {
            points: coords,
            triangles,
            skipped: sweep.skipped_edges().to_vec(),
        })
    }

    /// Register the edge on its upper endpoint (the one the sweep reaches
    /// last), as the point-event/edge-event pairing requires.
    fn register_edge(&mut self, a: PointId, b: PointId) -> Result<(), TriangulationError> {
        let ord = cmp_sweep(&self.points[a as usize], &self.points[b as usize]);
        let (p, q) = match ord {
            Ordering::Less => (a, b),
            Ordering::Greater => (b, a),
            Ordering::Equal => return Err(TriangulationError::ZeroLengthConstraint),
        };
        self.points[q as usize].edges.push(Edge { p, q });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_2d(points: &[[Real; 2]], tri: &[u32; 3]) -> Real {
        let [a, b, c] = [
            points[tri[0] as usize],
            points[tri[1] as usize],
            points[tri[2] as usize],
        ];
        0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
    }

    #[test]
    fn square_yields_two_triangles() {
        let mut t = Triangulator::new();
        t.add_polyline(&[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]])
            .unwrap();
        let result = t.triangulate(Mode::Polygon).unwrap();
        assert_eq!(result.triangles.len(), 2);
        let total: Real = result
            .triangles
            .iter()
            .map(|tri| area_2d(&result.points, tri))
            .sum();
        assert!((total - 16.0).abs() < 1e-9);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn triangles_are_ccw() {
        let mut t = Triangulator::new();
        t.add_polyline(&[[0.0, 0.0], [3.0, 0.0], [3.0, 2.0], [0.0, 2.0]])
            .unwrap();
        let result = t.triangulate(Mode::Polygon).unwrap();
        for tri in &result.triangles {
            assert!(area_2d(&result.points, tri) > 0.0);
        }
    }

    #[test]
    fn polygon_mode_needs_a_boundary() {
        let mut t = Triangulator::new();
        t.add_point([0.0, 0.0]);
        t.add_point([1.0, 0.0]);
        t.add_point([0.0, 1.0]);
        assert!(t.triangulate(Mode::Polygon).is_err());
    }

    #[test]
    fn zero_length_constraint_rejected() {
        let mut t = Triangulator::new();
        let err = t
            .add_polyline(&[[0.0, 0.0], [0.0, 0.0], [1.0, 1.0]])
            .unwrap_err();
        assert_eq!(err, TriangulationError::ZeroLengthConstraint);
    }
}
