mod support;

use csgkit::bsp::Node;
use csgkit::float_types::EPSILON;
use csgkit::plane::Plane;
use csgkit::polygon::Polygon;
use csgkit::vertex::Vertex;
use nalgebra::{Point3, Vector3};

use crate::support::approx_eq;

#[test]
fn new_and_build() {
    // A simple triangle:
    let p: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::origin(), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::z()),
        ],
        None,
    );
    let node: Node<()> = Node::from_polygons(&[p.clone()]);
    // The node adopts the polygon's plane and holds it coplanar, no children
    assert!(node.plane.is_some());
    assert_eq!(node.polygons.len(), 1);
    assert!(node.front.is_none());
    assert!(node.back.is_none());
}

#[test]
fn plane_adopted_from_first_valid_polygon() {
    let degenerate: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::origin(), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::z()),
            Vertex::new(Point3::new(2.0, 0.0, 0.0), Vector3::z()),
        ],
        None,
    );
    let valid: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::new(0.0, 0.0, 2.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 2.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 2.0), Vector3::z()),
        ],
        None,
    );
    let node: Node<()> = Node::from_polygons(&[degenerate, valid.clone()]);
    let plane = node.plane.as_ref().unwrap();
    assert!(approx_eq(plane.normal().z, valid.plane.normal().z, EPSILON));
    assert!(approx_eq(plane.offset(), valid.plane.offset(), EPSILON));
}

#[test]
fn invert_is_involutive() {
    let p: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::origin(), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::z()),
        ],
        None,
    );
    let mut node: Node<()> = Node::from_polygons(&[p.clone()]);
    let original = node.all_polygons();
    let original_normal = node.plane.as_ref().unwrap().normal();

    node.invert();
    let flipped_normal = node.plane.as_ref().unwrap().normal();
    assert!(approx_eq(flipped_normal.x, -original_normal.x, EPSILON));
    assert!(approx_eq(flipped_normal.y, -original_normal.y, EPSILON));
    assert!(approx_eq(flipped_normal.z, -original_normal.z, EPSILON));
    assert_eq!(node.all_polygons().len(), original.len());

    // double inversion restores vertices and windings
    node.invert();
    let restored = node.all_polygons();
    assert_eq!(restored.len(), original.len());
    for (a, b) in original.iter().zip(restored.iter()) {
        assert_eq!(a.vertices.len(), b.vertices.len());
        for (va, vb) in a.vertices.iter().zip(b.vertices.iter()) {
            assert!(approx_eq((va.pos - vb.pos).norm(), 0.0, EPSILON));
            assert!(approx_eq((va.normal - vb.normal).norm(), 0.0, EPSILON));
        }
    }
}

#[test]
fn clip_polygons_drops_back_halves() {
    // A node with a single plane normal to +Z, passing through z=0
    let plane = Plane::from_normal(Vector3::z(), 0.0);
    let node: Node<()> = Node {
        plane: Some(plane),
        front: None,
        back: None,
        polygons: Vec::new(),
    };

    let crossing: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::new(0.0, 0.0, -1.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 1.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 1.0), Vector3::z()),
        ],
        None,
    );
    let clipped = node.clip_polygons(&[crossing]);
    // back fragment removed, front fragment survives
    assert!(!clipped.is_empty());
    for p in &clipped {
        for v in &p.vertices {
            assert!(v.pos.z >= -EPSILON);
        }
    }
}

#[test]
fn clip_to_non_overlapping_tree_keeps_everything() {
    let poly: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::new(0.0, 0.0, 5.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 5.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 5.0), Vector3::z()),
        ],
        None,
    );
    let mut node: Node<()> = Node::from_polygons(&[poly.clone()]);

    // clipping against a tree whose solid is far below keeps the polygon
    let below: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::new(0.0, 0.0, -5.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, -5.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, -5.0), Vector3::z()),
        ],
        None,
    );
    let other: Node<()> = Node::from_polygons(&[below]);
    node.clip_to(&other);
    assert_eq!(node.all_polygons().len(), 1);
}

#[test]
fn all_polygons_flattens_subtrees() {
    let below: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::new(0.0, 0.0, -1.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, -1.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, -1.0), Vector3::z()),
        ],
        None,
    );
    let on: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::origin(), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::z()),
        ],
        None,
    );
    let above: Polygon<()> = Polygon::new(
        vec![
            Vertex::new(Point3::new(0.0, 0.0, 1.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 1.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 1.0), Vector3::z()),
        ],
        None,
    );

    let node: Node<()> = Node::from_polygons(&[on, above, below]);
    assert_eq!(node.all_polygons().len(), 3);
    assert!(node.front.is_some());
    assert!(node.back.is_some());
}
