//! Error types for boolean operations and triangulation

use crate::float_types::Real;
use nalgebra::Point3;

/// Failures raised by the solid/boolean layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CsgError {
    /// An operand polygon carries a NaN or infinite coordinate.
    #[error("non-finite vertex coordinate at {0}")]
    NonFiniteVertex(Point3<Real>),

    /// A boolean pipeline produced corrupt output (numeric degeneracy).
    /// `difference` retries once on the overlapping region before
    /// surfacing this.
    #[error("{op} produced degenerate output")]
    BooleanDegeneracy { op: &'static str },

    /// A polyhedron face referenced a point index that does not exist.
    #[error("face {face} references point index {index}, but only {len} points were given")]
    InvalidFaceIndex { face: usize, index: usize, len: usize },

    /// Rejected at the API boundary; no partial output is produced.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
}

/// Failures raised by the constrained Delaunay triangulator.
///
/// `TooFewPoints` and `ZeroLengthConstraint` describe degenerate input.
/// `BrokenTopology` means an internal invariant was violated and the
/// triangulation cannot be trusted; it is a defect, not an input problem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TriangulationError {
    #[error("triangulation requires at least 3 points, got {0}")]
    TooFewPoints(usize),

    /// Two consecutive loop points coincide.
    #[error("constraint edge has identical endpoints")]
    ZeroLengthConstraint,

    /// A sweep point lies exactly on a constrained edge. Per-edge this is
    /// recoverable (the edge is skipped and reported); it becomes an error
    /// only when a skipped boundary leaves the interior walk without a seed.
    #[error("point lies on a constrained edge")]
    PointOnConstrainedEdge,

    /// Two constraint edges cross each other.
    #[error("constraint edges intersect")]
    IntersectingConstraints,

    /// Missing neighbor link, runaway walk, or a legalization
    /// inconsistency.
    #[error("triangulation invariant violated: {0}")]
    BrokenTopology(&'static str),
}
