//! Wavefront OBJ export.

use crate::triangulated::Triangulated3D;
use std::fmt::Debug;
use std::fmt::Write as _;

/// Convert a solid to a **Wavefront OBJ** string with the given object
/// `name`. Vertices are emitted per triangle (no index dedup), with their
/// normals.
pub fn to_obj<T: Triangulated3D>(shape: &T, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "o {name}");

    let mut index = 1usize;
    shape.visit_triangles(|tri| {
        for v in &tri {
            let p = v.pos;
            let _ = writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z);
        }
        for v in &tri {
            let n = v.normal;
            let _ = writeln!(out, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z);
        }
        let _ = writeln!(
            out,
            "f {}//{} {}//{} {}//{}",
            index,
            index,
            index + 1,
            index + 1,
            index + 2,
            index + 2
        );
        index += 3;
    });

    out
}

impl<S: Clone + Debug + Send + Sync> crate::csg::CSG<S> {
    pub fn to_obj(&self, name: &str) -> String {
        self::to_obj(self, name)
    }
}
