//! Primitive solid generators: cube, sphere, cylinder, polyhedron.
//!
//! Primitives are responsible for correct outward winding and planarity;
//! the boolean engine consumes their polygon lists as-is.

use crate::csg::CSG;
use crate::errors::CsgError;
use crate::float_types::{PI, Real, TAU};
use crate::polygon::Polygon;
use crate::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

impl<S: Clone + Send + Sync + Debug> CSG<S> {
    /// An axis-aligned cube spanning `[0, size]` on every axis.
    pub fn cube(size: Real, metadata: Option<S>) -> CSG<S> {
        Self::cuboid(size, size, size, metadata)
    }

    /// An axis-aligned cuboid spanning `[0, width] × [0, length] × [0, height]`.
    pub fn cuboid(width: Real, length: Real, height: Real, metadata: Option<S>) -> CSG<S> {
        let (w, l, h) = (width, length, height);

        // Each face: four corners wound CCW as seen from outside, plus the
        // outward face normal.
        let faces: [([[Real; 3]; 4], [Real; 3]); 6] = [
            // bottom
            ([[0.0, 0.0, 0.0], [0.0, l, 0.0], [w, l, 0.0], [w, 0.0, 0.0]], [0.0, 0.0, -1.0]),
            // top
            ([[0.0, 0.0, h], [w, 0.0, h], [w, l, h], [0.0, l, h]], [0.0, 0.0, 1.0]),
            // front
            ([[0.0, 0.0, 0.0], [w, 0.0, 0.0], [w, 0.0, h], [0.0, 0.0, h]], [0.0, -1.0, 0.0]),
            // back
            ([[0.0, l, 0.0], [0.0, l, h], [w, l, h], [w, l, 0.0]], [0.0, 1.0, 0.0]),
            // left
            ([[0.0, 0.0, 0.0], [0.0, 0.0, h], [0.0, l, h], [0.0, l, 0.0]], [-1.0, 0.0, 0.0]),
            // right
            ([[w, 0.0, 0.0], [w, l, 0.0], [w, l, h], [w, 0.0, h]], [1.0, 0.0, 0.0]),
        ];

        let polygons = faces
            .iter()
            .map(|(corners, normal)| {
                let normal = Vector3::new(normal[0], normal[1], normal[2]);
                let vertices = corners
                    .iter()
                    .map(|c| Vertex::new(Point3::new(c[0], c[1], c[2]), normal))
                    .collect();
                Polygon::new(vertices, metadata.clone())
            })
            .collect::<Vec<_>>();

        CSG::from_polygons(&polygons)
    }

    /// A sphere of `radius` centered at the origin, tessellated into
    /// `segments` slices around the z axis and `stacks` bands from pole to
    /// pole. Vertex normals are radial.
    pub fn sphere(radius: Real, segments: usize, stacks: usize, metadata: Option<S>) -> CSG<S> {
        let segments = segments.max(3);
        let stacks = stacks.max(2);

        let dir = |i: usize, j: usize| -> Vector3<Real> {
            let theta = TAU * (i % segments) as Real / segments as Real;
            let phi = PI * j as Real / stacks as Real;
            Vector3::new(
                theta.cos() * phi.sin(),
                theta.sin() * phi.sin(),
                phi.cos(),
            )
        };
        let vert = |i: usize, j: usize| -> Vertex {
            let d = dir(i, j);
            Vertex::new(Point3::from(d * radius), d)
        };

        let mut polygons = Vec::with_capacity(segments * stacks);
        for i in 0..segments {
            for j in 0..stacks {
                let mut vertices = Vec::with_capacity(4);
                vertices.push(vert(i, j));
                vertices.push(vert(i, j + 1));
                if j < stacks - 1 {
                    vertices.push(vert(i + 1, j + 1));
                }
                if j > 0 {
                    vertices.push(vert(i + 1, j));
                }
                polygons.push(Polygon::new(vertices, metadata.clone()));
            }
        }

        CSG::from_polygons(&polygons)
    }

    /// A cylinder of `radius` along the z axis from `z = 0` to `z = height`,
    /// with flat caps.
    pub fn cylinder(radius: Real, height: Real, segments: usize, metadata: Option<S>) -> CSG<S> {
        let segments = segments.max(3);

        let rim = |i: usize, z: Real| -> Point3<Real> {
            let theta = TAU * (i % segments) as Real / segments as Real;
            Point3::new(radius * theta.cos(), radius * theta.sin(), z)
        };
        let radial = |i: usize| -> Vector3<Real> {
            let theta = TAU * (i % segments) as Real / segments as Real;
            Vector3::new(theta.cos(), theta.sin(), 0.0)
        };

        let bottom_center = Point3::new(0.0, 0.0, 0.0);
        let top_center = Point3::new(0.0, 0.0, height);
        let down = -Vector3::z();
        let up = Vector3::z();

        let mut polygons = Vec::with_capacity(segments * 3);
        for i in 0..segments {
            let j = i + 1;

            // side
            polygons.push(Polygon::new(
                vec![
                    Vertex::new(rim(i, 0.0), radial(i)),
                    Vertex::new(rim(j, 0.0), radial(j)),
                    Vertex::new(rim(j, height), radial(j)),
                    Vertex::new(rim(i, height), radial(i)),
                ],
                metadata.clone(),
            ));

            // bottom cap
            polygons.push(Polygon::new(
                vec![
                    Vertex::new(bottom_center, down),
                    Vertex::new(rim(j, 0.0), down),
                    Vertex::new(rim(i, 0.0), down),
                ],
                metadata.clone(),
            ));

            // top cap
            polygons.push(Polygon::new(
                vec![
                    Vertex::new(top_center, up),
                    Vertex::new(rim(i, height), up),
                    Vertex::new(rim(j, height), up),
                ],
                metadata.clone(),
            ));
        }

        CSG::from_polygons(&polygons)
    }

    /// A polyhedron from an indexed face list. Faces must be wound CCW as
    /// seen from outside.
    ///
    /// ## Errors
    /// [`CsgError::InvalidFaceIndex`] if a face references a missing point.
    pub fn polyhedron(
        points: &[[Real; 3]],
        faces: &[Vec<usize>],
        metadata: Option<S>,
    ) -> Result<CSG<S>, CsgError> {
        let mut polygons = Vec::with_capacity(faces.len());

        for (face_idx, face) in faces.iter().enumerate() {
            for &idx in face {
                if idx >= points.len() {
                    return Err(CsgError::InvalidFaceIndex {
                        face: face_idx,
                        index: idx,
                        len: points.len(),
                    });
                }
            }
            let face_points: Vec<Point3<Real>> = face
                .iter()
                .map(|&idx| Point3::new(points[idx][0], points[idx][1], points[idx][2]))
                .collect();
            polygons.push(Polygon::from_points(&face_points, metadata.clone()));
        }

        Ok(CSG::from_polygons(&polygons))
    }
}
