//! Export backends. All of them consume triangles through
//! [`Triangulated3D`](crate::triangulated::Triangulated3D); there is no
//! import surface.

pub mod obj;
pub mod stl;
