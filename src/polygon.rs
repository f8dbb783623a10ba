//! Planar polygons: ordered vertex loops with a cached plane.

use crate::cdt::{self, Triangulator};
use crate::errors::TriangulationError;
use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::float_types::{EPSILON, Real};
use crate::plane::Plane;
use crate::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;
use std::sync::OnceLock;

/// A planar polygon: an ordered vertex loop, its cached plane and an
/// optional metadata payload shared by fragments split off of it.
///
/// For BSP use the loop must be convex and non-degenerate; arbitrary simple
/// loops are accepted and handed to [`to_convex_polygons`](Self::to_convex_polygons)
/// for decomposition first.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    pub vertices: Vec<Vertex>,
    pub plane: Plane,
    /// Lazily calculated AABB spanning `vertices`.
    pub bounding_box: OnceLock<Aabb>,
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync + Debug> Polygon<S> {
    /// Build a polygon from a vertex loop; the plane is derived from the
    /// loop with Newell's method and agrees with the winding. A loop with
    /// fewer than 3 vertices or a degenerate normal is kept but reported as
    /// invalid by [`is_valid`](Self::is_valid).
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        let plane = Plane::from_vertices(&vertices);
        Polygon { vertices, plane, bounding_box: OnceLock::new(), metadata }
    }

    /// Build a polygon from bare points; vertex normals are set to the
    /// derived plane normal.
    pub fn from_points(points: &[Point3<Real>], metadata: Option<S>) -> Self {
        let vertices: Vec<Vertex> =
            points.iter().map(|p| Vertex::new(*p, Vector3::zeros())).collect();
        let plane = Plane::from_vertices(&vertices);
        let normal = plane.normal;
        let mut polygon = Polygon { vertices, plane, bounding_box: OnceLock::new(), metadata };
        for v in &mut polygon.vertices {
            v.normal = normal;
        }
        polygon
    }

    /// Build a split fragment that keeps the parent polygon's plane instead
    /// of re-deriving one from the fragment's vertices.
    pub(crate) fn with_plane(vertices: Vec<Vertex>, plane: Plane, metadata: Option<S>) -> Self {
        Polygon { vertices, plane, bounding_box: OnceLock::new(), metadata }
    }

    /// A polygon is invalid when its loop cannot define a plane: fewer than
    /// 3 vertices, or duplicate/collinear points degenerating the normal.
    /// Invalid polygons are skipped by BSP builds; callers needing
    /// strictness must filter before building.
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= 3 && self.plane.normal.norm_squared() > EPSILON * EPSILON
    }

    /// Reverse the winding: vertex order, vertex normals and the plane all
    /// flip together.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
    }

    /// Re-derive the plane from the current vertex positions and assign its
    /// normal to every vertex.
    pub fn set_new_normal(&mut self) {
        self.plane = Plane::from_vertices(&self.vertices);
        let normal = self.plane.normal;
        for v in &mut self.vertices {
            v.normal = normal;
        }
        self.bounding_box = OnceLock::new();
    }

    /// Axis-aligned bounding box over the vertex positions, cached.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in &self.vertices {
                mins.x = mins.x.min(v.pos.x);
                mins.y = mins.y.min(v.pos.y);
                mins.z = mins.z.min(v.pos.z);
                maxs.x = maxs.x.max(v.pos.x);
                maxs.y = maxs.y.max(v.pos.y);
                maxs.z = maxs.z.max(v.pos.z);
            }
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            Aabb::new(mins, maxs)
        })
    }

    /// True when every corner turns the same way around the plane normal.
    /// Triangles are trivially convex.
    pub fn is_convex(&self) -> bool {
        let len = self.vertices.len();
        if len <= 3 {
            return true;
        }
        let n = self.plane.normal;
        let mut sign = 0.0;
        for i in 0..len {
            let a = self.vertices[i].pos;
            let b = self.vertices[(i + 1) % len].pos;
            let c = self.vertices[(i + 2) % len].pos;
            let turn = (b - a).cross(&(c - b)).dot(&n);
            if turn.abs() > EPSILON {
                if sign == 0.0 {
                    sign = turn.signum();
                } else if turn.signum() != sign {
                    return false;
                }
            }
        }
        true
    }

    /// Triangulate this polygon into vertex triples.
    ///
    /// Convex loops are fanned from the first vertex; concave loops go
    /// through the sweep-line triangulator. Invalid polygons (and concave
    /// loops the triangulator rejects) yield no triangles — use
    /// [`to_convex_polygons`](Self::to_convex_polygons) when failure must
    /// surface.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        if !self.is_valid() {
            return Vec::new();
        }
        if self.vertices.len() == 3 {
            return vec![[
                self.vertices[0].clone(),
                self.vertices[1].clone(),
                self.vertices[2].clone(),
            ]];
        }
        if self.is_convex() {
            let mut triangles = Vec::with_capacity(self.vertices.len() - 2);
            for i in 1..self.vertices.len() - 1 {
                triangles.push([
                    self.vertices[0].clone(),
                    self.vertices[i].clone(),
                    self.vertices[i + 1].clone(),
                ]);
            }
            return triangles;
        }
        match self.to_convex_polygons() {
            Ok(polys) => polys
                .into_iter()
                .map(|p| [p.vertices[0].clone(), p.vertices[1].clone(), p.vertices[2].clone()])
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Decompose a (possibly concave) loop into convex triangles, each
    /// reassembled as a 3-vertex polygon carrying this polygon's plane and
    /// metadata.
    pub fn to_convex_polygons(&self) -> Result<Vec<Polygon<S>>, TriangulationError> {
        self.to_convex_polygons_with_holes(&[])
    }

    /// Attach hole loops without triangulating, producing the deferred
    /// boundary form of this polygon. See [`PolygonWithHoles`].
    pub fn with_holes(self, holes: Vec<Vec<Point3<Real>>>) -> PolygonWithHoles<S> {
        PolygonWithHoles { outer: self, holes }
    }

    /// Same as [`to_convex_polygons`](Self::to_convex_polygons) with hole
    /// loops (closed point lists lying in this polygon's plane). Hole
    /// interiors produce no triangles. Output triangles preserve the source
    /// loop's winding.
    pub fn to_convex_polygons_with_holes(
        &self,
        holes: &[Vec<Point3<Real>>],
    ) -> Result<Vec<Polygon<S>>, TriangulationError> {
        if !self.is_valid() {
            return Err(TriangulationError::TooFewPoints(self.vertices.len()));
        }

        let normal = self.plane.normal;
        let (u, v) = plane_basis(&normal);
        let origin = self.vertices[0].pos;
        let project =
            |p: &Point3<Real>| -> [Real; 2] { [(p - origin).dot(&u), (p - origin).dot(&v)] };

        let outer: Vec<[Real; 2]> = self.vertices.iter().map(|vx| project(&vx.pos)).collect();

        let mut triangulator = Triangulator::new();
        triangulator.add_polyline(&outer)?;
        for hole in holes {
            let loop_2d: Vec<[Real; 2]> = hole.iter().map(&project).collect();
            triangulator.add_polyline(&loop_2d)?;
        }
        let triangulation = triangulator.triangulate(cdt::Mode::Polygon)?;

        // With a winding-derived plane the projected loop is CCW; a caller-
        // supplied clockwise loop flips the signed area and the output order.
        let reverse = signed_area(&outer) < 0.0;

        // The sweep inserts no new points, so indices map straight back:
        // outer loop first, then each hole loop in order.
        let mut all_vertices: Vec<Vertex> = self.vertices.clone();
        for hole in holes {
            for p in hole {
                all_vertices.push(Vertex::new(*p, normal));
            }
        }

        let mut polygons = Vec::with_capacity(triangulation.triangles.len());
        for tri in &triangulation.triangles {
            let [a, b, c] = *tri;
            let corners = if reverse { [c, b, a] } else { [a, b, c] };
            let verts: Vec<Vertex> = corners
                .iter()
                .map(|&i| all_vertices[i as usize].clone())
                .collect();
            polygons.push(Polygon::with_plane(
                verts,
                self.plane.clone(),
                self.metadata.clone(),
            ));
        }
        Ok(polygons)
    }
}

/// A boundary polygon with its hole loops attached for later triangulation:
/// the deferred alternative to immediate convex decomposition, for callers
/// (extrusion, export) that want to carry the boundary around before
/// committing to triangles.
///
/// Hole loops lie in the outer polygon's plane and must not touch the outer
/// loop or each other.
#[derive(Debug, Clone)]
pub struct PolygonWithHoles<S: Clone> {
    pub outer: Polygon<S>,
    pub holes: Vec<Vec<Point3<Real>>>,
}

impl<S: Clone + Send + Sync + Debug> PolygonWithHoles<S> {
    /// Triangulate now: convex pieces covering the outer loop minus the
    /// holes, each carrying the outer polygon's plane and metadata.
    pub fn to_convex_polygons(&self) -> Result<Vec<Polygon<S>>, TriangulationError> {
        self.outer.to_convex_polygons_with_holes(&self.holes)
    }
}

/// Group a set of coplanar loops into boundary polygons with their holes
/// attached: a loop nested inside an odd number of other loops becomes a
/// hole of its innermost container; an evenly nested loop (an island inside
/// a hole) becomes a boundary of its own. Loops must not intersect each
/// other.
pub fn boundary_polygons_with_holes<S: Clone + Send + Sync + Debug>(
    loops: Vec<Polygon<S>>,
) -> Vec<PolygonWithHoles<S>> {
    let Some(reference) = loops.iter().find(|l| l.is_valid()) else {
        return loops
            .into_iter()
            .map(|outer| PolygonWithHoles { outer, holes: Vec::new() })
            .collect();
    };
    let normal = reference.plane.normal;
    let origin = reference.vertices[0].pos;
    let (u, v) = plane_basis(&normal);

    let projected: Vec<Vec<[Real; 2]>> = loops
        .iter()
        .map(|l| {
            l.vertices
                .iter()
                .map(|vx| [(vx.pos - origin).dot(&u), (vx.pos - origin).dot(&v)])
                .collect()
        })
        .collect();

    // Nesting depth of each loop, and its innermost container. Containers
    // of a loop are themselves nested, so the one with the greatest depth
    // is the immediate parent.
    let mut containers: Vec<Vec<usize>> = vec![Vec::new(); loops.len()];
    for i in 0..loops.len() {
        if projected[i].is_empty() {
            continue;
        }
        for j in 0..loops.len() {
            if i != j
                && projected[j].len() >= 3
                && point_in_loop(projected[i][0], &projected[j])
            {
                containers[i].push(j);
            }
        }
    }
    let depth: Vec<usize> = containers.iter().map(|c| c.len()).collect();

    let mut hole_lists: Vec<Vec<Vec<Point3<Real>>>> = vec![Vec::new(); loops.len()];
    for (i, poly) in loops.iter().enumerate() {
        if depth[i] % 2 == 0 {
            continue;
        }
        if let Some(&parent) = containers[i].iter().max_by_key(|&&j| depth[j]) {
            hole_lists[parent].push(poly.vertices.iter().map(|vx| vx.pos).collect());
        }
    }

    loops
        .into_iter()
        .zip(hole_lists)
        .enumerate()
        .filter(|(i, _)| depth[*i] % 2 == 0)
        .map(|(_, (outer, holes))| PolygonWithHoles { outer, holes })
        .collect()
}

/// Even-odd ray-crossing test for a 2D point against a closed loop.
fn point_in_loop(p: [Real; 2], loop_2d: &[[Real; 2]]) -> bool {
    let mut inside = false;
    let mut j = loop_2d.len() - 1;
    for i in 0..loop_2d.len() {
        let [xi, yi] = loop_2d[i];
        let [xj, yj] = loop_2d[j];
        if (yi > p[1]) != (yj > p[1]) && p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Orthonormal in-plane basis `(u, v)` with `v = normal × u`, so a loop that
/// is counter-clockwise around `normal` projects counter-clockwise in 2D.
pub(crate) fn plane_basis(normal: &Vector3<Real>) -> (Vector3<Real>, Vector3<Real>) {
    let mut u = if normal.z.abs() > normal.x.abs() || normal.z.abs() > normal.y.abs() {
        Vector3::x().cross(normal)
    } else {
        Vector3::z().cross(normal)
    };
    u.normalize_mut();
    let v = normal.cross(&u).normalize();
    (u, v)
}

/// Twice the signed area of a 2D loop (positive when counter-clockwise).
pub(crate) fn signed_area(loop_2d: &[[Real; 2]]) -> Real {
    let mut sum = 0.0;
    for i in 0..loop_2d.len() {
        let [x1, y1] = loop_2d[i];
        let [x2, y2] = loop_2d[(i + 1) % loop_2d.len()];
        sum += x1 * y2 - x2 * y1;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_polygon_is_invalid() {
        let p: Polygon<()> = Polygon::from_points(
            &[
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            None,
        );
        assert!(!p.is_valid());
        assert!(p.triangulate().is_empty());
    }

    #[test]
    fn flip_is_involutive() {
        let mut p: Polygon<()> = Polygon::from_points(
            &[
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            None,
        );
        let before = p.clone();
        p.flip();
        assert!((p.plane.normal + before.plane.normal).norm() < EPSILON);
        p.flip();
        assert_eq!(p.vertices[0].pos, before.vertices[0].pos);
        assert!((p.plane.normal - before.plane.normal).norm() < EPSILON);
    }

    #[test]
    fn concave_loop_detected() {
        // L-shape in the XY plane
        let p: Polygon<()> = Polygon::from_points(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            None,
        );
        assert!(!p.is_convex());
        let quad: Polygon<()> = Polygon::from_points(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            None,
        );
        assert!(quad.is_convex());
    }
}
