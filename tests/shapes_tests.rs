mod support;

use csgkit::float_types::PI;
use csgkit::{CSG, CsgError};

use crate::support::approx_eq;

#[test]
fn cube_has_six_valid_faces() {
    let cube: CSG<()> = CSG::cube(2.0, None);
    assert_eq!(cube.polygons.len(), 6);
    for poly in &cube.polygons {
        assert!(poly.is_valid());
        assert_eq!(poly.vertices.len(), 4);
    }
    assert!(approx_eq(cube.volume(), 8.0, 1e-9));
}

#[test]
fn cube_normals_point_outward() {
    let cube: CSG<()> = CSG::cube(2.0, None);
    let center = nalgebra::Point3::new(1.0, 1.0, 1.0);
    for poly in &cube.polygons {
        let to_face = poly.vertices[0].pos - center;
        assert!(poly.plane.normal().dot(&to_face) > 0.0);
    }
}

#[test]
fn cuboid_volume() {
    let solid: CSG<()> = CSG::cuboid(2.0, 3.0, 4.0, None);
    assert!(approx_eq(solid.volume(), 24.0, 1e-9));
}

#[test]
fn sphere_volume_approaches_analytic() {
    let sphere: CSG<()> = CSG::sphere(1.0, 32, 16, None);
    let analytic = 4.0 / 3.0 * PI;
    // tessellated volume is always below the analytic ball, within a few %
    let volume = sphere.volume();
    assert!(volume < analytic);
    assert!(volume > analytic * 0.97);
}

#[test]
fn cylinder_volume_approaches_analytic() {
    let cylinder: CSG<()> = CSG::cylinder(1.0, 2.0, 64, None);
    let analytic = 2.0 * PI;
    let volume = cylinder.volume();
    assert!(volume < analytic);
    assert!(volume > analytic * 0.99);
}

#[test]
fn polyhedron_tetrahedron() {
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    // faces wound CCW seen from outside
    let faces = vec![
        vec![0, 2, 1],
        vec![0, 1, 3],
        vec![1, 2, 3],
        vec![0, 3, 2],
    ];
    let tetra: CSG<()> = CSG::polyhedron(&points, &faces, None).unwrap();
    assert_eq!(tetra.polygons.len(), 4);
    assert!(approx_eq(tetra.volume(), 1.0 / 6.0, 1e-9));
}

#[test]
fn polyhedron_rejects_bad_index() {
    let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let faces = vec![vec![0, 1, 7]];
    let err = CSG::<()>::polyhedron(&points, &faces, None).unwrap_err();
    assert!(matches!(err, CsgError::InvalidFaceIndex { index: 7, .. }));
}

#[test]
fn primitives_survive_booleans() {
    let sphere: CSG<()> = CSG::sphere(0.75, 16, 8, None).translate(1.0, 1.0, 1.0);
    let cube: CSG<()> = CSG::cube(2.0, None);
    let carved = cube.difference(&sphere).unwrap();
    let cube_vol = cube.volume();
    let sphere_vol = sphere.volume();
    // the sphere sits fully inside the cube
    assert!(approx_eq(carved.volume(), cube_vol - sphere_vol, 1e-2));
}
