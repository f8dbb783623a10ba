mod support;

use csgkit::{CSG, Optimization};

use crate::support::approx_eq;

/// Boolean results carry split fragments, so volumes rather than polygon
/// counts are compared.
const VOL_EPS: f64 = 1e-6;

#[test]
fn cube_volume_baseline() {
    let cube: CSG<()> = CSG::cube(1.0, None);
    assert!(approx_eq(cube.volume(), 1.0, VOL_EPS));
}

#[test]
fn union_of_offset_cubes_has_expected_volume() {
    // two unit cubes offset by 0.5 along x overlap in a 0.5 x 1 x 1 slab
    let a: CSG<()> = CSG::cube(1.0, None);
    let b = a.translate(0.5, 0.0, 0.0);
    let result = a.union(&b).unwrap();
    assert!(approx_eq(result.volume(), 1.5, 1e-4));
}

#[test]
fn union_volume_at_least_max_of_operands() {
    let a: CSG<()> = CSG::cube(2.0, None);
    let b = CSG::cube(1.0, None).translate(1.5, 0.5, 0.5);
    let result = a.union(&b).unwrap();
    assert!(result.volume() >= a.volume() - VOL_EPS);
    assert!(result.volume() >= b.volume() - VOL_EPS);
}

#[test]
fn difference_of_disjoint_cube_returns_original_polygons() {
    // non-overlapping operand triggers the bounding-box short-circuit:
    // polygons pass through untouched
    let a: CSG<()> = CSG::cube(1.0, None).with_optimization(Optimization::PolygonBound);
    let b = CSG::cube(1.0, None).translate(3.0, 0.0, 0.0);
    let result = a.difference(&b).unwrap();
    assert_eq!(result.polygons.len(), a.polygons.len());
    assert!(approx_eq(result.volume(), 1.0, VOL_EPS));

    let a_csg_bound: CSG<()> = CSG::cube(1.0, None).with_optimization(Optimization::CsgBound);
    let result = a_csg_bound.difference(&b).unwrap();
    assert_eq!(result.polygons.len(), a_csg_bound.polygons.len());
}

#[test]
fn intersection_of_disjoint_cubes_is_empty() {
    let a: CSG<()> = CSG::cube(1.0, None);
    let b = a.translate(2.0, 0.0, 0.0);
    let result = a.intersection(&b).unwrap();
    assert!(result.polygons.is_empty());
    assert!(approx_eq(result.volume(), 0.0, VOL_EPS));
}

#[test]
fn difference_carves_overlap() {
    let a: CSG<()> = CSG::cube(1.0, None);
    let b = a.translate(0.5, 0.0, 0.0);
    let result = a.difference(&b).unwrap();
    assert!(approx_eq(result.volume(), 0.5, 1e-4));
}

#[test]
fn difference_union_intersection_partition_the_solid() {
    // A = (A - B) ∪ (A ∩ B), by volume
    let a: CSG<()> = CSG::cube(1.0, None);
    let b = a.translate(0.25, 0.25, 0.0);
    let a_minus_b = a.difference(&b).unwrap();
    let a_and_b = a.intersection(&b).unwrap();
    let rebuilt = a_minus_b.union(&a_and_b).unwrap();
    assert!(approx_eq(rebuilt.volume(), a.volume(), 1e-4));
}

#[test]
fn optimization_modes_agree_on_volume() {
    let base: CSG<()> = CSG::cube(1.0, None);
    let other = base.translate(0.5, 0.5, 0.0);

    let mut volumes = Vec::new();
    for opt in [
        Optimization::None,
        Optimization::CsgBound,
        Optimization::PolygonBound,
    ] {
        let a = base.clone().with_optimization(opt);
        volumes.push((
            a.union(&other).unwrap().volume(),
            a.difference(&other).unwrap().volume(),
            a.intersection(&other).unwrap().volume(),
        ));
    }
    for w in volumes.windows(2) {
        assert!(approx_eq(w[0].0, w[1].0, 1e-4));
        assert!(approx_eq(w[0].1, w[1].1, 1e-4));
        assert!(approx_eq(w[0].2, w[1].2, 1e-4));
    }
}

#[test]
fn dumb_union_concatenates() {
    let a: CSG<()> = CSG::cube(1.0, None);
    let b = a.translate(5.0, 0.0, 0.0);
    let result = a.dumb_union(&b);
    assert_eq!(result.polygons.len(), a.polygons.len() + b.polygons.len());
    assert!(approx_eq(result.volume(), 2.0, VOL_EPS));
}

#[test]
fn xor_of_overlapping_cubes() {
    let a: CSG<()> = CSG::cube(1.0, None);
    let b = a.translate(0.5, 0.0, 0.0);
    let result = a.xor(&b).unwrap();
    // 2 * (1 - 0.5) = union minus intersection
    assert!(approx_eq(result.volume(), 1.0, 1e-3));
}

#[test]
fn inverse_is_involutive() {
    let a: CSG<()> = CSG::cube(1.0, None);
    let double = a.inverse().inverse();
    assert_eq!(double.polygons.len(), a.polygons.len());
    for (pa, pb) in a.polygons.iter().zip(double.polygons.iter()) {
        for (va, vb) in pa.vertices.iter().zip(pb.vertices.iter()) {
            assert!(approx_eq((va.pos - vb.pos).norm(), 0.0, 1e-12));
        }
    }
    // inverted solid has negated volume
    assert!(approx_eq(a.inverse().volume(), -a.volume(), VOL_EPS));
}

#[test]
fn bounds_span_all_vertices() {
    let a: CSG<()> = CSG::cube(2.0, None).translate(-1.0, -1.0, -1.0);
    let bb = a.bounds();
    assert!(approx_eq(bb.mins.x, -1.0, 1e-12));
    assert!(approx_eq(bb.maxs.x, 1.0, 1e-12));
    assert!(approx_eq(bb.mins.z, -1.0, 1e-12));
    assert!(approx_eq(bb.maxs.z, 1.0, 1e-12));
}

#[test]
fn non_finite_operand_is_rejected() {
    let a: CSG<()> = CSG::cube(1.0, None);
    let mut b = CSG::cube(1.0, None);
    b.polygons[0].vertices[0].pos.x = f64::NAN;
    assert!(a.union(&b).is_err());
    assert!(a.intersection(&b).is_err());
}

#[test]
fn difference_retry_failure_is_surfaced() {
    // the direct path fails on the corrupt operand; the intersect-then-retry
    // fallback fails on it too, and that failure propagates instead of being
    // swallowed
    let a: CSG<()> = CSG::cube(1.0, None);
    let mut b = CSG::cube(1.0, None);
    b.polygons[0].vertices[0].pos.x = f64::NAN;
    assert!(a.difference(&b).is_err());
}

#[test]
fn transform_scales_volume() {
    let a: CSG<()> = CSG::cube(1.0, None);
    let scaled = a
        .transform(&nalgebra::Matrix4::new_scaling(2.0))
        .unwrap();
    assert!(approx_eq(scaled.volume(), 8.0, 1e-6));
}

#[test]
fn boolean_ops_do_not_mutate_operands() {
    let a: CSG<()> = CSG::cube(1.0, None);
    let b = a.translate(0.5, 0.0, 0.0);
    let a_before = a.volume();
    let b_before = b.volume();
    let _ = a.union(&b).unwrap();
    let _ = a.difference(&b).unwrap();
    let _ = a.intersection(&b).unwrap();
    assert!(approx_eq(a.volume(), a_before, VOL_EPS));
    assert!(approx_eq(b.volume(), b_before, VOL_EPS));
}
