use super::*;

fn approx(a: [f64; 4], b: [f64; 4]) {
    for i in 0..4 {
        assert!((a[i] - b[i]).abs() < 1e-12, "{a:?} != {b:?}");
    }
}

#[test]
fn identity_is_neutral() {
    let t = Mat4::translation(3.0, -2.0, 1.0);
    assert_eq!(Mat4::IDENTITY * t, t);
    assert_eq!(t * Mat4::IDENTITY, t);
}

#[test]
fn left_operand_applies_first() {
    let m = Mat4::translation(1.0, 0.0, 0.0) * Mat4::scaling(2.0, 2.0, 2.0);
    approx(m.transform_point([0.0, 0.0, 0.0, 1.0]), [2.0, 0.0, 0.0, 1.0]);

    let m = Mat4::scaling(2.0, 2.0, 2.0) * Mat4::translation(1.0, 0.0, 0.0);
    approx(m.transform_point([0.0, 0.0, 0.0, 1.0]), [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn rotations_follow_right_hand_rule() {
    let q = core::f64::consts::FRAC_PI_2;
    approx(
        Mat4::rotation_z(q).transform_point([1.0, 0.0, 0.0, 1.0]),
        [0.0, 1.0, 0.0, 1.0],
    );
    approx(
        Mat4::rotation_x(q).transform_point([0.0, 1.0, 0.0, 1.0]),
        [0.0, 0.0, 1.0, 1.0],
    );
    approx(
        Mat4::rotation_y(q).transform_point([0.0, 0.0, 1.0, 1.0]),
        [1.0, 0.0, 0.0, 1.0],
    );
}

#[test]
fn multiply_matches_hand_computed_product() {
    let a = Mat4::from_rows([
        1.0, 2.0, 3.0, 4.0, //
        5.0, 6.0, 7.0, 8.0, //
        9.0, 10.0, 11.0, 12.0, //
        13.0, 14.0, 15.0, 16.0,
    ]);
    let p = a * Mat4::IDENTITY;
    assert_eq!(p, a);
    let sq = a * a;
    assert_eq!(sq.at(0, 0), 90.0);
    assert_eq!(sq.at(0, 3), 120.0);
    assert_eq!(sq.at(3, 0), 426.0);
    assert_eq!(sq.at(3, 3), 600.0);
}

#[test]
fn pixel_to_clip_maps_canvas_corners() {
    let p = Mat4::pixel_to_clip(200.0, 100.0);
    approx(p.transform_point([0.0, 0.0, 5.0, 1.0]), [-1.0, 1.0, 0.0, 1.0]);
    approx(p.transform_point([200.0, 100.0, 0.0, 1.0]), [1.0, -1.0, 0.0, 1.0]);
}
