//! Test support library
//! Provides various helper functions & utilities for tests.

use csgkit::float_types::Real;
use csgkit::polygon::Polygon;
use csgkit::vertex::Vertex;
use nalgebra::{Point3, Vector3};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Helper to make a simple Polygon in 3D with given vertices.
pub fn make_polygon_3d(points: &[[Real; 3]]) -> Polygon<()> {
    let mut verts = Vec::new();
    for p in points {
        let pos = Point3::new(p[0], p[1], p[2]);
        // Polygon::new re-derives the plane; the normal here is a placeholder.
        verts.push(Vertex::new(pos, Vector3::z()));
    }
    Polygon::new(verts, None)
}

/// Area of a planar polygon, via the cross-product fan from its first vertex.
pub fn polygon_area(poly: &Polygon<()>) -> Real {
    let mut doubled = Vector3::zeros();
    let first = poly.vertices[0].pos;
    for i in 1..poly.vertices.len() - 1 {
        let a = poly.vertices[i].pos - first;
        let b = poly.vertices[i + 1].pos - first;
        doubled += a.cross(&b);
    }
    0.5 * doubled.norm()
}

/// Returns the approximate bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// for a set of polygons.
#[allow(dead_code)]
pub fn bounding_box(polygons: &[Polygon<()>]) -> [Real; 6] {
    let mut min_x = Real::MAX;
    let mut min_y = Real::MAX;
    let mut min_z = Real::MAX;
    let mut max_x = Real::MIN;
    let mut max_y = Real::MIN;
    let mut max_z = Real::MIN;

    for poly in polygons {
        for v in &poly.vertices {
            let p = v.pos;
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            min_z = min_z.min(p.z);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
            max_z = max_z.max(p.z);
        }
    }

    [min_x, min_y, min_z, max_x, max_y, max_z]
}
