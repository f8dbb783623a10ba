//! The `CSG` solid and its boolean operations.

use crate::bsp::Node;
use crate::errors::CsgError;
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
#[cfg(feature = "parallel")]
use crate::float_types::MIN_POLYGONS_FOR_PARALLEL;
use crate::float_types::Real;
use crate::plane::Plane;
use crate::polygon::Polygon;
use crate::vertex::Vertex;
use nalgebra::{Matrix4, Point3, Vector3};
use std::fmt::Debug;
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Bounding-box strategy a solid's boolean operations run under.
///
/// Every mode produces the same boolean result; the bound modes only skip
/// work that box tests prove irrelevant. This used to be process-wide
/// mutable state in older CSG kernels; here it is an explicit per-solid
/// field so concurrent callers get deterministic behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Optimization {
    /// Always run the full BSP algorithm.
    #[default]
    None,
    /// Short-circuit on whole-solid bounding boxes.
    CsgBound,
    /// Partition this solid's polygons by the other solid's bounding box
    /// and only push the possibly-interacting ones through the BSP trees.
    PolygonBound,
}

/// A solid: a flat polygon soup plus the optimization mode its boolean
/// operations use.
///
/// Boolean operations never mutate their operands — BSP trees are built
/// from copies — and always produce a new `CSG` or fail loudly.
#[derive(Debug, Clone)]
pub struct CSG<S: Clone + Send + Sync + Debug> {
    pub polygons: Vec<Polygon<S>>,

    /// Bounding-box strategy for boolean operations on this solid.
    pub opt: Optimization,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,

    /// Metadata
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync + Debug> CSG<S> {
    /// Returns a new empty CSG
    pub fn new() -> Self {
        CSG {
            polygons: Vec::new(),
            opt: Optimization::default(),
            bounding_box: OnceLock::new(),
            metadata: None,
        }
    }

    /// Build a CSG from an existing polygon list. No validity filtering is
    /// applied; strict callers inspect `polygons` before building.
    pub fn from_polygons(polygons: &[Polygon<S>]) -> Self {
        let mut csg = CSG::new();
        csg.polygons = polygons.to_vec();
        csg
    }

    /// Same solid with a different optimization mode.
    pub fn with_optimization(mut self, opt: Optimization) -> Self {
        self.opt = opt;
        self
    }

    /// Drop polygons that cannot participate in BSP builds (fewer than 3
    /// vertices or a degenerate normal). Builds skip them anyway; this is
    /// for callers that want the soup clean up front.
    pub fn retain_valid(&mut self) {
        self.polygons.retain(|p| p.is_valid());
        self.bounding_box = OnceLock::new();
    }

    /// Helper to collect all vertices from the CSG.
    #[cfg(not(feature = "parallel"))]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.clone())
            .collect()
    }

    /// Parallel helper to collect all vertices from the CSG.
    #[cfg(feature = "parallel")]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .par_iter()
            .flat_map(|p| p.vertices.clone())
            .collect()
    }

    /// Split polygons into (may_touch, cannot_touch) using bounding-box tests
    fn partition_polys(
        polys: &[Polygon<S>],
        other_bb: &Aabb,
    ) -> (Vec<Polygon<S>>, Vec<Polygon<S>>) {
        let mut maybe = Vec::new();
        let mut never = Vec::new();
        for p in polys {
            if p.bounding_box().intersects(other_bb) {
                maybe.push(p.clone());
            } else {
                never.push(p.clone());
            }
        }
        (maybe, never)
    }

    /// Reject operands carrying NaN or infinite coordinates before they
    /// poison a BSP build.
    fn screen_finite(&self) -> Result<(), CsgError> {
        for poly in &self.polygons {
            for v in &poly.vertices {
                if !(v.pos.x.is_finite() && v.pos.y.is_finite() && v.pos.z.is_finite()) {
                    return Err(CsgError::NonFiniteVertex(v.pos));
                }
            }
        }
        Ok(())
    }

    fn screen_result(polygons: Vec<Polygon<S>>, op: &'static str) -> Result<Vec<Polygon<S>>, CsgError> {
        for poly in &polygons {
            for v in &poly.vertices {
                if !(v.pos.x.is_finite() && v.pos.y.is_finite() && v.pos.z.is_finite()) {
                    return Err(CsgError::BooleanDegeneracy { op });
                }
            }
        }
        Ok(polygons)
    }

    fn assemble(&self, polygons: Vec<Polygon<S>>) -> CSG<S> {
        CSG {
            polygons,
            opt: self.opt,
            bounding_box: OnceLock::new(),
            metadata: self.metadata.clone(),
        }
    }

    /// Return a new CSG representing the union of the two solids.
    ///
    /// ```text
    /// let c = a.union(&b)?;
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    pub fn union(&self, other: &CSG<S>) -> Result<CSG<S>, CsgError> {
        match self.opt {
            Optimization::PolygonBound => {
                let (inner, outer) = Self::partition_polys(&self.polygons, &other.bounds());
                if inner.is_empty() {
                    let mut polys = self.polygons.clone();
                    polys.extend(other.polygons.iter().cloned());
                    return Ok(self.assemble(polys));
                }
                let inner_csg = CSG::from_polygons(&inner);
                let mut polys = outer;
                polys.extend(inner_csg.union_no_opt(other)?);
                Ok(self.assemble(polys))
            },
            Optimization::CsgBound => {
                if !self.bounds().intersects(&other.bounds()) {
                    let mut polys = self.polygons.clone();
                    polys.extend(other.polygons.iter().cloned());
                    return Ok(self.assemble(polys));
                }
                Ok(self.assemble(self.union_no_opt(other)?))
            },
            Optimization::None => Ok(self.assemble(self.union_no_opt(other)?)),
        }
    }

    /// The textbook BSP union clip sequence. The exact order decides which
    /// of two coplanar duplicates survives; do not reorder.
    fn union_no_opt(&self, other: &CSG<S>) -> Result<Vec<Polygon<S>>, CsgError> {
        self.screen_finite()?;
        other.screen_finite()?;

        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());

        Self::screen_result(a.all_polygons(), "union")
    }

    /// Return a new CSG representing the difference of the two solids
    /// (`self` minus `other`).
    ///
    /// If the selected path fails on numeric degeneracy, the operand is
    /// first reduced to the overlapping region (`other ∩ self`) and the
    /// difference re-attempted once; a second failure propagates.
    ///
    /// ```text
    /// let c = a.difference(&b)?;
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    pub fn difference(&self, other: &CSG<S>) -> Result<CSG<S>, CsgError> {
        match self.difference_dispatch(other) {
            Ok(result) => Ok(result),
            Err(_) => {
                let reduced = other.intersection(self)?;
                Ok(self.assemble(self.difference_no_opt(&reduced)?))
            },
        }
    }

    fn difference_dispatch(&self, other: &CSG<S>) -> Result<CSG<S>, CsgError> {
        match self.opt {
            Optimization::PolygonBound => {
                let (inner, outer) = Self::partition_polys(&self.polygons, &other.bounds());
                if inner.is_empty() {
                    // nothing can interact: the original polygons pass through
                    return Ok(self.assemble(self.polygons.clone()));
                }
                let inner_csg = CSG::from_polygons(&inner);
                let mut polys = outer;
                polys.extend(inner_csg.difference_no_opt(other)?);
                Ok(self.assemble(polys))
            },
            Optimization::CsgBound => {
                if !self.bounds().intersects(&other.bounds()) {
                    return Ok(self.assemble(self.polygons.clone()));
                }
                Ok(self.assemble(self.difference_no_opt(other)?))
            },
            Optimization::None => Ok(self.assemble(self.difference_no_opt(other)?)),
        }
    }

    /// `A − B = ¬(¬A ∪ B)`, realized directly through the inversion
    /// sequence rather than by literally complementing and unioning.
    fn difference_no_opt(&self, other: &CSG<S>) -> Result<Vec<Polygon<S>>, CsgError> {
        self.screen_finite()?;
        other.screen_finite()?;

        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());
        a.invert();

        Self::screen_result(a.all_polygons(), "difference")
    }

    /// Return a new CSG representing the intersection of the two solids.
    ///
    /// ```text
    /// let c = a.intersection(&b)?;
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    pub fn intersection(&self, other: &CSG<S>) -> Result<CSG<S>, CsgError> {
        match self.opt {
            Optimization::CsgBound | Optimization::PolygonBound => {
                if !self.bounds().intersects(&other.bounds()) {
                    return Ok(self.assemble(Vec::new()));
                }
                Ok(self.assemble(self.intersection_no_opt(other)?))
            },
            Optimization::None => Ok(self.assemble(self.intersection_no_opt(other)?)),
        }
    }

    /// Mirror of the difference sequence through the double-complement
    /// identity for intersection.
    fn intersection_no_opt(&self, other: &CSG<S>) -> Result<Vec<Polygon<S>>, CsgError> {
        self.screen_finite()?;
        other.screen_finite()?;

        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.invert();
        b.clip_to(&a);
        b.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        a.build(&b.all_polygons());
        a.invert();

        Self::screen_result(a.all_polygons(), "intersection")
    }

    /// Return a new CSG holding the space in exactly one of the two solids.
    pub fn xor(&self, other: &CSG<S>) -> Result<CSG<S>, CsgError> {
        let a_sub_b = self.difference(other)?;
        let b_sub_a = other.difference(self)?;
        a_sub_b.union(&b_sub_a)
    }

    /// Concatenate the polygon lists without any BSP processing.
    ///
    /// Only valid when the operands provably do not intersect (the caller
    /// asserts this); the resulting surface is undefined if they do.
    pub fn dumb_union(&self, other: &CSG<S>) -> CSG<S> {
        let mut polys = self.polygons.clone();
        polys.extend(other.polygons.iter().cloned());
        self.assemble(polys)
    }

    /// Returns an [`Aabb`] spanning all polygons, computed by scanning every
    /// vertex position, cached until invalidated.
    pub fn bounds(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);

            for poly in &self.polygons {
                for v in &poly.vertices {
                    mins.x = mins.x.min(v.pos.x);
                    mins.y = mins.y.min(v.pos.y);
                    mins.z = mins.z.min(v.pos.z);
                    maxs.x = maxs.x.max(v.pos.x);
                    maxs.y = maxs.y.max(v.pos.y);
                    maxs.z = maxs.z.max(v.pos.z);
                }
            }

            if mins.x > maxs.x {
                // no polygons: trivial AABB at the origin
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Invalidates the cached bounding box.
    pub fn invalidate_bounds(&mut self) {
        self.bounding_box = OnceLock::new();
    }

    /// Invert this solid (flip inside vs. outside).
    pub fn inverse(&self) -> CSG<S> {
        let mut csg = self.clone();
        for p in &mut csg.polygons {
            p.flip();
        }
        csg
    }

    /// Apply an arbitrary 3D transform (as a 4x4 matrix) to the solid:
    /// positions by the matrix, normals by its inverse transpose, planes
    /// re-derived. Polygon lists above
    /// [`MIN_POLYGONS_FOR_PARALLEL`](crate::float_types::MIN_POLYGONS_FOR_PARALLEL)
    /// map in parallel when the `parallel` feature is on.
    pub fn transform(&self, mat: &Matrix4<Real>) -> Result<CSG<S>, CsgError> {
        let inv = mat
            .try_inverse()
            .ok_or(CsgError::Unsupported("singular transform matrix"))?;
        let inv_transpose = inv.transpose();

        let map_poly = |poly: &Polygon<S>| -> Result<Polygon<S>, CsgError> {
            let mut vertices = poly.vertices.clone();
            for vert in &mut vertices {
                let homog = mat * vert.pos.to_homogeneous();
                vert.pos = Point3::from_homogeneous(homog)
                    .ok_or(CsgError::Unsupported("singular transform matrix"))?;
                let n = inv_transpose.transform_vector(&vert.normal);
                if n.norm_squared() > 0.0 {
                    vert.normal = n.normalize();
                }
            }
            let plane = Plane::from_vertices(&vertices);
            Ok(Polygon::with_plane(vertices, plane, poly.metadata.clone()))
        };

        #[cfg(feature = "parallel")]
        let polygons: Result<Vec<_>, CsgError> =
            if self.polygons.len() > MIN_POLYGONS_FOR_PARALLEL {
                self.polygons.par_iter().map(map_poly).collect()
            } else {
                self.polygons.iter().map(map_poly).collect()
            };

        #[cfg(not(feature = "parallel"))]
        let polygons: Result<Vec<_>, CsgError> = self.polygons.iter().map(map_poly).collect();

        Ok(self.assemble(polygons?))
    }

    /// Translate the solid by `(x, y, z)`.
    pub fn translate(&self, x: Real, y: Real, z: Real) -> CSG<S> {
        let delta = Vector3::new(x, y, z);
        let mut csg = self.clone();
        for poly in &mut csg.polygons {
            for vert in &mut poly.vertices {
                vert.pos += delta;
            }
            poly.plane.w += poly.plane.normal.dot(&delta);
            poly.bounding_box = OnceLock::new();
        }
        csg.bounding_box = OnceLock::new();
        csg
    }

    /// Re-derive every polygon's plane and push the plane normal onto its
    /// vertices.
    pub fn renormalize(&mut self) {
        for poly in &mut self.polygons {
            poly.set_new_normal();
        }
        self.bounding_box = OnceLock::new();
    }

    /// Triangulate every polygon, returning a solid made only of triangles.
    pub fn triangulate(&self) -> CSG<S> {
        let map_poly = |poly: &Polygon<S>| -> Vec<Polygon<S>> {
            poly.triangulate()
                .into_iter()
                .map(|tri| {
                    Polygon::with_plane(tri.to_vec(), poly.plane.clone(), poly.metadata.clone())
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        let triangles: Vec<Polygon<S>> = if self.polygons.len() > MIN_POLYGONS_FOR_PARALLEL {
            self.polygons.par_iter().flat_map_iter(map_poly).collect()
        } else {
            self.polygons.iter().flat_map(map_poly).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let triangles: Vec<Polygon<S>> = self.polygons.iter().flat_map(map_poly).collect();

        self.assemble(triangles)
    }

    /// Signed volume of the solid by summing tetrahedra against the origin
    /// (divergence theorem over the triangulated surface). Positive for
    /// outward-wound closed solids.
    pub fn volume(&self) -> Real {
        let mut six_v = 0.0;
        for poly in &self.polygons {
            for tri in poly.triangulate() {
                let a = tri[0].pos.coords;
                let b = tri[1].pos.coords;
                let c = tri[2].pos.coords;
                six_v += a.dot(&b.cross(&c));
            }
        }
        six_v / 6.0
    }
}

impl<S: Clone + Send + Sync + Debug> Default for CSG<S> {
    fn default() -> Self {
        Self::new()
    }
}
