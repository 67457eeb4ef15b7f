use super::*;
use crate::foundation::core::{Rgba, Vec2, Vec3};

#[test]
fn numbers_coerce_to_scalars() {
    let v = Value::Number(2.6);
    assert_eq!(
        UniformValue::coerce(&v, UniformType::Float),
        Some(UniformValue::Float(2.6))
    );
    assert_eq!(
        UniformValue::coerce(&v, UniformType::Int),
        Some(UniformValue::Int(3))
    );
    assert_eq!(
        UniformValue::coerce(&v, UniformType::Bool),
        Some(UniformValue::Bool(true))
    );
}

#[test]
fn colors_feed_vec3_and_vec4() {
    let c = Value::Color(Rgba::new(1.0, 0.5, 0.25, 0.5));
    assert_eq!(
        UniformValue::coerce(&c, UniformType::Vec3),
        Some(UniformValue::Vec3([1.0, 0.5, 0.25]))
    );
    assert_eq!(
        UniformValue::coerce(&c, UniformType::Vec4),
        Some(UniformValue::Vec4([1.0, 0.5, 0.25, 0.5]))
    );
}

#[test]
fn vectors_narrow_but_do_not_widen() {
    let v3 = Value::Vec3(Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(
        UniformValue::coerce(&v3, UniformType::Vec2),
        Some(UniformValue::Vec2([1.0, 2.0]))
    );
    let v2 = Value::Vec2(Vec2::new(1.0, 2.0));
    assert_eq!(UniformValue::coerce(&v2, UniformType::Vec3), None);
}

#[test]
fn incompatible_shapes_are_rejected() {
    assert_eq!(
        UniformValue::coerce(&Value::from("loud"), UniformType::Float),
        None
    );
    assert_eq!(
        UniformValue::coerce(&Value::Number(1.0), UniformType::Sampler),
        None
    );
}

#[test]
fn descriptor_type_follows_default() {
    let d = UniformDescriptor::vec2("u_offset", [0.0, 1.0]);
    assert_eq!(d.ty, UniformType::Vec2);
    assert_eq!(d.default.uniform_type(), UniformType::Vec2);
}

#[test]
fn uniform_values_roundtrip_through_json() {
    let v = UniformValue::Vec3([0.1, 0.2, 0.3]);
    let s = serde_json::to_string(&v).unwrap();
    assert_eq!(s, r#"{"type":"vec3","value":[0.1,0.2,0.3]}"#);
    let back: UniformValue = serde_json::from_str(&s).unwrap();
    assert_eq!(back, v);
}
