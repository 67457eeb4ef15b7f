use super::*;
use crate::foundation::core::Vec3;

fn ramp() -> Vec<Keyframe> {
    vec![
        Keyframe::new(0.0, "opacity", 0.0),
        Keyframe::new(10.0, "opacity", 100.0),
    ]
}

#[test]
fn linear_ramp_is_exact() {
    let keys = ramp();
    assert_eq!(evaluate(&keys, "opacity", 0.0), Some(Value::Number(0.0)));
    assert_eq!(evaluate(&keys, "opacity", 5.0), Some(Value::Number(50.0)));
    assert_eq!(evaluate(&keys, "opacity", 10.0), Some(Value::Number(100.0)));
}

#[test]
fn holds_after_last_and_is_absent_before_first() {
    let keys = vec![
        Keyframe::new(2.0, "opacity", 0.25),
        Keyframe::new(4.0, "opacity", 0.75),
    ];
    assert_eq!(evaluate(&keys, "opacity", 1.999), None);
    assert_eq!(evaluate(&keys, "opacity", 99.0), Some(Value::Number(0.75)));
}

#[test]
fn other_properties_do_not_bracket() {
    let keys = vec![
        Keyframe::new(0.0, "opacity", 0.0),
        Keyframe::new(5.0, "transform.position.x", 500.0),
        Keyframe::new(10.0, "opacity", 1.0),
    ];
    assert_eq!(evaluate(&keys, "opacity", 5.0), Some(Value::Number(0.5)));
    assert_eq!(
        evaluate(&keys, "transform.position.x", 7.0),
        Some(Value::Number(500.0))
    );
    assert_eq!(evaluate(&keys, "transform.position.x", 4.0), None);
}

#[test]
fn easing_shapes_the_weight() {
    let keys = vec![
        Keyframe::new(0.0, "v", 0.0).with_easing(Easing::EaseIn),
        Keyframe::new(1.0, "v", 1.0),
    ];
    assert_eq!(evaluate(&keys, "v", 0.5), Some(Value::Number(0.25)));
}

#[test]
fn step_holds_until_next_key() {
    let keys = vec![
        Keyframe::new(0.0, "v", 1.0).with_interpolation(InterpolationMode::Step),
        Keyframe::new(1.0, "v", 2.0),
    ];
    assert_eq!(evaluate(&keys, "v", 0.99), Some(Value::Number(1.0)));
    assert_eq!(evaluate(&keys, "v", 1.0), Some(Value::Number(2.0)));
}

#[test]
fn bezier_mode_defaults_to_css_ease() {
    let keys = vec![
        Keyframe::new(0.0, "v", 0.0).with_interpolation(InterpolationMode::Bezier),
        Keyframe::new(1.0, "v", 1.0),
    ];
    let v = evaluate(&keys, "v", 0.5).unwrap().as_f64().unwrap();
    assert!((v - CubicBezier::EASE.apply(0.5)).abs() < 1e-12);
}

#[test]
fn duplicate_times_resolve_by_list_order() {
    let keys = vec![
        Keyframe::new(0.0, "v", 0.0),
        Keyframe::new(0.0, "v", 10.0),
        Keyframe::new(2.0, "v", 20.0),
    ];
    // The later duplicate wins and brackets toward t=2.
    assert_eq!(evaluate(&keys, "v", 1.0), Some(Value::Number(15.0)));
}

#[test]
fn sort_is_stable() {
    let mut keys = vec![
        Keyframe::new(3.0, "v", 3.0),
        Keyframe::new(1.0, "v", 1.0),
        Keyframe::new(1.0, "v", 2.0),
    ];
    sort_keyframes(&mut keys);
    let values: Vec<f64> = keys.iter().map(|k| k.value.as_f64().unwrap()).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
}

#[test]
fn apply_writes_each_property_once() {
    let mut state = Value::map();
    state
        .set_path("transform.position", Value::Vec3(Vec3::new(1.0, 2.0, 3.0)))
        .unwrap();
    state.set_path("opacity", Value::Number(1.0)).unwrap();

    let keys = vec![
        Keyframe::new(0.0, "transform.position.x", 0.0),
        Keyframe::new(4.0, "transform.position.x", 40.0),
        Keyframe::new(5.0, "opacity", 0.0),
    ];
    apply_keyframes(&mut state, &keys, 1.0).unwrap();
    assert_eq!(
        state.get_path("transform.position"),
        Some(Value::Vec3(Vec3::new(10.0, 2.0, 3.0)))
    );
    // Keyframes after `t` leave the static value untouched.
    assert_eq!(state.get_path("opacity"), Some(Value::Number(1.0)));
}

#[test]
fn validate_rejects_bad_keys() {
    assert!(Keyframe::new(f64::NAN, "v", 0.0).validate().is_err());
    assert!(Keyframe::new(0.0, "a..b", 0.0).validate().is_err());
    assert!(Keyframe::new(0.0, "a.b", 0.0).validate().is_ok());
}

#[test]
fn keyframe_json_defaults() {
    let k: Keyframe =
        serde_json::from_str(r#"{"time":1.5,"property":"opacity","value":0.5}"#).unwrap();
    assert_eq!(k.easing, Easing::Linear);
    assert_eq!(k.interpolation, InterpolationMode::Linear);
}
