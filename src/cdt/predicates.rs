//! 2D geometric predicates for the sweep.

use crate::float_types::{ORIENT_EPSILON, Real};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Cw,
    Ccw,
    Collinear,
}

/// Orientation of `c` relative to the directed line `a -> b`, with the
/// near-tie band resolved to `Collinear` by [`ORIENT_EPSILON`].
pub fn orient2d(pa: [Real; 2], pb: [Real; 2], pc: [Real; 2]) -> Orientation {
    let det_left = (pa[0] - pc[0]) * (pb[1] - pc[1]);
    let det_right = (pa[1] - pc[1]) * (pb[0] - pc[0]);
    let val = det_left - det_right;
    if val > -ORIENT_EPSILON && val < ORIENT_EPSILON {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Ccw
    } else {
        Orientation::Cw
    }
}

/// Does `pd` lie inside the circumcircle of the CCW triangle `pa, pb, pc`?
///
/// Determinant formulation; no circumcenter or radius is ever constructed.
/// The early sign exits keep the test cheap for points that are obviously
/// outside.
pub fn in_circle(pa: [Real; 2], pb: [Real; 2], pc: [Real; 2], pd: [Real; 2]) -> bool {
    let adx = pa[0] - pd[0];
    let ady = pa[1] - pd[1];
    let bdx = pb[0] - pd[0];
    let bdy = pb[1] - pd[1];

    let oabd = adx * bdy - bdx * ady;
    if oabd <= 0.0 {
        return false;
    }

    let cdx = pc[0] - pd[0];
    let cdy = pc[1] - pd[1];

    let ocad = cdx * ady - adx * cdy;
    if ocad <= 0.0 {
        return false;
    }

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdxcdy - cdxbdy) + blift * ocad + clift * oabd;
    det > 0.0
}

/// Is `pd` inside the quadrilateral scan region bounded by `pa` and the
/// directed lines through `pb` and `pc`? Used to decide whether a triangle
/// pair is safe to flip during constrained-edge enforcement.
pub fn in_scan_area(pa: [Real; 2], pb: [Real; 2], pc: [Real; 2], pd: [Real; 2]) -> bool {
    let oadb = (pa[0] - pb[0]) * (pd[1] - pb[1]) - (pd[0] - pb[0]) * (pa[1] - pb[1]);
    if oadb >= -ORIENT_EPSILON {
        return false;
    }
    let oadc = (pa[0] - pc[0]) * (pd[1] - pc[1]) - (pd[0] - pc[0]) * (pa[1] - pc[1]);
    if oadc <= ORIENT_EPSILON {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_basic() {
        assert_eq!(
            orient2d([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]),
            Orientation::Ccw
        );
        assert_eq!(
            orient2d([0.0, 0.0], [0.0, 1.0], [1.0, 0.0]),
            Orientation::Cw
        );
        assert_eq!(
            orient2d([0.0, 0.0], [1.0, 0.0], [2.0, 0.0]),
            Orientation::Collinear
        );
    }

    #[test]
    fn incircle_basic() {
        // unit-ish CCW triangle, centroid is inside its circumcircle
        let a = [0.0, 0.0];
        let b = [1.0, 0.0];
        let c = [0.0, 1.0];
        assert!(in_circle(a, b, c, [0.3, 0.3]));
        assert!(!in_circle(a, b, c, [5.0, 5.0]));
    }
}
