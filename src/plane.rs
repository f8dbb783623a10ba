//! Planes in 3D space and the polygon splitting routine the BSP tree is
//! built on.

use crate::float_types::{EPSILON, Real};
use crate::polygon::Polygon;
use crate::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

// Vertex/polygon classification relative to a plane. `SPANNING` is the
// bitwise OR of `FRONT` and `BACK`.
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// An infinite plane described by a unit normal and its signed distance
/// from the origin (`dot(normal, p) == w` for every point `p` on the plane).
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
}

impl Plane {
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        Plane { normal: normal.normalize(), w }
    }

    /// Create a plane from three points. The normal follows the right-hand
    /// rule: `(b - a) × (c - a)`. A degenerate triple yields a zero normal,
    /// which marks any polygon carrying this plane as invalid.
    pub fn from_points(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Self {
        let normal = (b - a).cross(&(c - a));
        if normal.norm_squared() < EPSILON * EPSILON {
            return Plane { normal: Vector3::zeros(), w: 0.0 };
        }
        let normal = normal.normalize();
        Plane { w: normal.dot(&a.coords), normal }
    }

    /// Derive a plane from a vertex loop using Newell's method, so that
    /// near-collinear leading vertices do not poison the normal. The
    /// resulting normal agrees with the loop's winding.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        if vertices.len() < 3 {
            return Plane { normal: Vector3::zeros(), w: 0.0 };
        }

        let mut normal = Vector3::zeros();
        for i in 0..vertices.len() {
            let curr = &vertices[i].pos;
            let next = &vertices[(i + 1) % vertices.len()].pos;
            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }

        if normal.norm_squared() < EPSILON * EPSILON {
            // duplicate or collinear points
            return Plane { normal: Vector3::zeros(), w: 0.0 };
        }

        let normal = normal.normalize();
        Plane { w: normal.dot(&vertices[0].pos.coords), normal }
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.w
    }

    /// Flip the plane in place; normal and distance negate together.
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    pub fn flipped(&self) -> Self {
        Plane { normal: -self.normal, w: -self.w }
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] by its signed
    /// distance to the plane, tested against ±[`EPSILON`].
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        let t = self.normal.dot(&point.coords) - self.w;
        if t > EPSILON {
            FRONT
        } else if t < -EPSILON {
            BACK
        } else {
            COPLANAR
        }
    }

    /// Split `polygon` by this plane, returning four buckets:
    /// `(coplanar_front, coplanar_back, front, back)`.
    ///
    /// Coplanar polygons go to the front bucket when their own normal agrees
    /// with this plane's normal, to the back bucket otherwise. A spanning
    /// polygon is walked edge by edge; every edge whose endpoints classify on
    /// opposite sides gains an interpolated crossing vertex shared by both
    /// output loops. Output loops with fewer than 3 vertices are discarded.
    #[allow(clippy::type_complexity)]
    pub fn split_polygon<S: Clone + Send + Sync + Debug>(
        &self,
        polygon: &Polygon<S>,
    ) -> (
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
    ) {
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();

        let types: Vec<i8> = polygon
            .vertices
            .iter()
            .map(|v| self.orient_point(&v.pos))
            .collect();
        let polygon_type = types.iter().fold(0, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            },
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),

            // spanning: do the split
            _ => {
                let mut split_front: Vec<Vertex> = Vec::new();
                let mut split_back: Vec<Vertex> = Vec::new();

                for i in 0..polygon.vertices.len() {
                    let j = (i + 1) % polygon.vertices.len();
                    let type_i = types[i];
                    let type_j = types[j];
                    let vertex_i = &polygon.vertices[i];
                    let vertex_j = &polygon.vertices[j];

                    if type_i != BACK {
                        split_front.push(vertex_i.clone());
                    }
                    if type_i != FRONT {
                        split_back.push(vertex_i.clone());
                    }

                    // Edge crosses the plane: interpolate the exact crossing
                    // and feed it to both output loops.
                    if (type_i | type_j) == SPANNING {
                        let denom = self.normal.dot(&(vertex_j.pos - vertex_i.pos));
                        if denom.abs() > EPSILON {
                            let t = (self.w - self.normal.dot(&vertex_i.pos.coords)) / denom;
                            let crossing = vertex_i.interpolate(vertex_j, t);
                            split_front.push(crossing.clone());
                            split_back.push(crossing);
                        }
                    }
                }

                // Fragments keep the original polygon's plane; recomputing it
                // from split vertices drifts numerically.
                if split_front.len() >= 3 {
                    front.push(Polygon::with_plane(
                        split_front,
                        polygon.plane.clone(),
                        polygon.metadata.clone(),
                    ));
                }
                if split_back.len() >= 3 {
                    back.push(Polygon::with_plane(
                        split_back,
                        polygon.plane.clone(),
                        polygon.metadata.clone(),
                    ));
                }
            },
        }

        (coplanar_front, coplanar_back, front, back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(points: &[[Real; 3]; 3]) -> Polygon<()> {
        let verts: Vec<Vertex> = points
            .iter()
            .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
            .collect();
        Polygon::new(verts, None)
    }

    #[test]
    fn from_points_unit_normal() {
        let plane = Plane::from_points(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert!((plane.normal.norm() - 1.0).abs() < EPSILON);
        assert!((plane.normal.z - 1.0).abs() < EPSILON);
        assert!(plane.w.abs() < EPSILON);
    }

    #[test]
    fn flip_negates_both_fields() {
        let mut plane = Plane::from_normal(Vector3::z(), 2.5);
        plane.flip();
        assert!((plane.normal.z + 1.0).abs() < EPSILON);
        assert!((plane.w + 2.5).abs() < EPSILON);
    }

    #[test]
    fn split_spanning_triangle() {
        let plane = Plane::from_normal(Vector3::x(), 0.5);
        let poly = tri(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        let (cf, cb, front, back) = plane.split_polygon(&poly);
        assert!(cf.is_empty() && cb.is_empty());
        assert_eq!(front.len(), 1);
        assert_eq!(back.len(), 1);
        // every output loop is a valid polygon
        for p in front.iter().chain(back.iter()) {
            assert!(p.vertices.len() >= 3);
        }
        // crossing vertices lie on the plane
        for p in front.iter().chain(back.iter()) {
            for v in &p.vertices {
                assert!(v.pos.x <= 1.0 + EPSILON && v.pos.x >= -EPSILON);
            }
        }
    }

    #[test]
    fn split_coplanar_routing() {
        let plane = Plane::from_normal(Vector3::z(), 0.0);
        let poly = tri(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let (cf, cb, front, back) = plane.split_polygon(&poly);
        assert_eq!(cf.len(), 1);
        assert!(cb.is_empty() && front.is_empty() && back.is_empty());

        let flipped = plane.flipped();
        let (cf2, cb2, ..) = flipped.split_polygon(&poly);
        assert!(cf2.is_empty());
        assert_eq!(cb2.len(), 1);
    }
}
