//! A solid-modeling kernel built around Boolean operations (*union*,
//! *difference*, *intersection*) on sets of polygons stored in
//! [BSP](bsp) trees, plus a constrained Delaunay sweep-line triangulator
//! ([cdt]) for decomposing concave and holed polygons into convex ones.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): binary `.stl` export
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon for multithreaded polygon-list transforms

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod vertex;
pub mod plane;
pub mod polygon;
pub mod bsp;
pub mod csg;
pub mod cdt;
pub mod shapes3d;
pub mod triangulated;
pub mod io;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use csg::{CSG, Optimization};
pub use errors::{CsgError, TriangulationError};
pub use plane::Plane;
pub use polygon::{Polygon, PolygonWithHoles};
pub use triangulated::Triangulated3D;
pub use vertex::Vertex;
