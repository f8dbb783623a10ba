//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// A vertex of a polygon, holding position, normal and an interpolation
/// weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
    /// Carried through splits by linear interpolation; 1.0 unless a caller
    /// assigns something else (e.g. morph weights).
    pub weight: Real,
}

impl Vertex {
    /// Create a new [`Vertex`] with a weight of 1.0.
    ///
    /// * `pos`    – the position in model space
    /// * `normal` – (optionally non-unit) normal; it is copied verbatim,
    ///   so make sure it is oriented the way the owning polygon needs it.
    pub const fn new(pos: Point3<Real>, normal: Vector3<Real>) -> Self {
        Vertex { pos, normal, weight: 1.0 }
    }

    pub const fn with_weight(pos: Point3<Real>, normal: Vector3<Real>, weight: Real) -> Self {
        Vertex { pos, normal, weight }
    }

    /// Flip vertex normal
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// Return the linear interpolation between `self` (`t = 0`) and `other`
    /// (`t = 1`). Normals and weights are interpolated as well.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        let new_pos = self.pos + (other.pos - self.pos) * t;
        let new_normal = self.normal + (other.normal - self.normal) * t;
        let new_weight = self.weight + (other.weight - self.weight) * t;
        Vertex::with_weight(new_pos, new_normal, new_weight)
    }
}
