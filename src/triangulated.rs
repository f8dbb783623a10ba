//! Visitor seam between solids and triangle-based consumers (exporters,
//! volume computation, mesh conversion).

use crate::csg::CSG;
use crate::vertex::Vertex;
use std::fmt::Debug;

/// Anything that can stream itself as triangles. The sole extraction point
/// for exporters: they see triangles, never the BSP structure.
pub trait Triangulated3D {
    fn visit_triangles<F>(&self, f: F)
    where
        F: FnMut([Vertex; 3]);
}

impl<S: Clone + Send + Sync + Debug> Triangulated3D for CSG<S> {
    fn visit_triangles<F>(&self, mut f: F)
    where
        F: FnMut([Vertex; 3]),
    {
        for poly in &self.polygons {
            for tri in poly.triangulate() {
                f(tri);
            }
        }
    }
}
