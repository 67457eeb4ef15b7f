use std::collections::BTreeMap;

use crate::foundation::core::{Rgba, Vec2, Vec3};
use crate::foundation::error::{ReelfxError, ReelfxResult};

/// Tagged property value carried by keyframes, effect parameters, and resolved layer state.
///
/// Interpolation is defined for numbers, vectors, colours, and maps of those; every other
/// pairing steps at the midpoint.
///
/// In JSON a vector or colour is an object whose keys are exactly `x,y`, `x,y,z`, or `r,g,b,a`
/// with numeric values. Any other object stays a [`Value::Map`] with every key kept.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Scalar.
    Number(f64),
    /// Boolean flag.
    Bool(bool),
    /// Text or enum-like key.
    String(String),
    /// Three-component vector.
    Vec3(Vec3),
    /// Two-component vector.
    Vec2(Vec2),
    /// Straight-alpha colour.
    Color(Rgba),
    /// Nested named values.
    Map(BTreeMap<String, Value>),
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Bool(bool),
    String(String),
    Map(BTreeMap<String, Value>),
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match <RawValue as serde::Deserialize>::deserialize(deserializer)? {
            RawValue::Number(v) => Self::Number(v),
            RawValue::Bool(b) => Self::Bool(b),
            RawValue::String(s) => Self::String(s),
            RawValue::Map(m) => from_map(m),
        })
    }
}

// Only an exact, all-numeric key set becomes a vector or colour.
fn from_map(m: BTreeMap<String, Value>) -> Value {
    let exact = |keys: &[&str]| {
        m.len() == keys.len()
            && keys
                .iter()
                .all(|k| matches!(m.get(*k), Some(Value::Number(_))))
    };
    let n = |k: &str| match m.get(k) {
        Some(Value::Number(v)) => *v,
        _ => 0.0,
    };
    if exact(&["x", "y", "z"]) {
        Value::Vec3(Vec3::new(n("x"), n("y"), n("z")))
    } else if exact(&["x", "y"]) {
        Value::Vec2(Vec2::new(n("x"), n("y")))
    } else if exact(&["r", "g", "b", "a"]) {
        Value::Color(Rgba::new(
            n("r") as f32,
            n("g") as f32,
            n("b") as f32,
            n("a") as f32,
        ))
    } else {
        Value::Map(m)
    }
}

impl Value {
    /// Empty map.
    pub fn map() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Vec3(_) => "vec3",
            Self::Vec2(_) => "vec2",
            Self::Color(_) => "color",
            Self::Map(_) => "map",
        }
    }

    /// Numeric view; booleans coerce to `0`/`1`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Boolean view; numbers coerce to `!= 0`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(v) => Some(*v != 0.0),
            _ => None,
        }
    }

    /// String view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 2-vector view; also accepts a map with numeric `x` and `y`.
    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Self::Vec2(v) => Some(*v),
            Self::Vec3(v) => Some(Vec2::new(v.x, v.y)),
            Self::Map(m) => Some(Vec2::new(num(m, "x")?, num(m, "y")?)),
            _ => None,
        }
    }

    /// 3-vector view; also accepts a map with numeric `x`, `y`, and `z`.
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            Self::Map(m) => Some(Vec3::new(num(m, "x")?, num(m, "y")?, num(m, "z")?)),
            _ => None,
        }
    }

    /// Colour view; also accepts a map with numeric `r`, `g`, `b` and optional `a`.
    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Map(m) => Some(Rgba::new(
                num(m, "r")? as f32,
                num(m, "g")? as f32,
                num(m, "b")? as f32,
                m.get("a").and_then(Value::as_f64).unwrap_or(1.0) as f32,
            )),
            _ => None,
        }
    }

    /// Map view.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Read the value at a dot-separated path.
    ///
    /// A trailing `x`/`y`/`z` segment addresses a vector component and `r`/`g`/`b`/`a` a colour
    /// channel.
    pub fn get_path(&self, path: &str) -> Option<Value> {
        let mut node = self;
        let mut segments = path.split('.').peekable();
        while let Some(seg) = segments.next() {
            let last = segments.peek().is_none();
            match node {
                Self::Map(m) => node = m.get(seg)?,
                _ if last => return component(node, seg).map(Value::Number),
                _ => return None,
            }
        }
        Some(node.clone())
    }

    /// Write `value` at a dot-separated path, creating intermediate maps as needed.
    ///
    /// Writing through a non-map intermediate, or writing a non-number into a vector
    /// component, is rejected.
    pub fn set_path(&mut self, path: &str, value: Value) -> ReelfxResult<()> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(ReelfxError::animation(format!(
                "invalid property path '{path}'"
            )));
        }

        let mut node = self;
        let mut segments = path.split('.').peekable();
        while let Some(seg) = segments.next() {
            let last = segments.peek().is_none();
            match node {
                Self::Map(m) => {
                    if last {
                        m.insert(seg.to_string(), value);
                        return Ok(());
                    }
                    node = m.entry(seg.to_string()).or_insert_with(Value::map);
                }
                _ if last => return set_component(node, seg, &value, path),
                other => {
                    return Err(ReelfxError::animation(format!(
                        "cannot descend into {} at '{seg}' of '{path}'",
                        other.kind()
                    )));
                }
            }
        }
        Ok(())
    }
}

fn num(m: &BTreeMap<String, Value>, key: &str) -> Option<f64> {
    m.get(key).and_then(Value::as_f64)
}

fn component(node: &Value, name: &str) -> Option<f64> {
    match node {
        Value::Vec3(v) => v.component(name),
        Value::Vec2(v) => match name {
            "x" => Some(v.x),
            "y" => Some(v.y),
            _ => None,
        },
        Value::Color(c) => c.channel(name).map(f64::from),
        _ => None,
    }
}

fn set_component(node: &mut Value, name: &str, value: &Value, path: &str) -> ReelfxResult<()> {
    let Some(v) = value.as_f64() else {
        return Err(ReelfxError::animation(format!(
            "component '{path}' expects a number, got {}",
            value.kind()
        )));
    };
    let slot = match node {
        Value::Vec3(vec) => vec.component_mut(name),
        Value::Vec2(vec) => match name {
            "x" => Some(&mut vec.x),
            "y" => Some(&mut vec.y),
            _ => None,
        },
        Value::Color(c) => {
            if let Some(ch) = c.channel_mut(name) {
                *ch = v as f32;
                return Ok(());
            }
            None
        }
        _ => None,
    };
    match slot {
        Some(slot) => {
            *slot = v;
            Ok(())
        }
        None => Err(ReelfxError::animation(format!(
            "'{name}' is not a component of {} in '{path}'",
            node.kind()
        ))),
    }
}

/// Interpolate between two values at weight `u`.
///
/// Numbers lerp, vectors and colours lerp per component, maps recurse per key of `a` (keys only
/// in `a` keep `a`'s value), and everything else steps: `a` below `u = 0.5`, `b` from there on.
pub fn interpolate(a: &Value, b: &Value, u: f64) -> Value {
    fn lerp(a: f64, b: f64, u: f64) -> f64 {
        a + (b - a) * u
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Value::Number(lerp(*x, *y, u)),
        (Value::Vec2(x), Value::Vec2(y)) => {
            Value::Vec2(Vec2::new(lerp(x.x, y.x, u), lerp(x.y, y.y, u)))
        }
        (Value::Vec3(x), Value::Vec3(y)) => Value::Vec3(Vec3::new(
            lerp(x.x, y.x, u),
            lerp(x.y, y.y, u),
            lerp(x.z, y.z, u),
        )),
        (Value::Color(x), Value::Color(y)) => {
            let ch = |p: f32, q: f32| lerp(f64::from(p), f64::from(q), u) as f32;
            Value::Color(Rgba::new(
                ch(x.r, y.r),
                ch(x.g, y.g),
                ch(x.b, y.b),
                ch(x.a, y.a),
            ))
        }
        (Value::Map(x), Value::Map(y)) => Value::Map(
            x.iter()
                .map(|(k, av)| {
                    let v = match y.get(k) {
                        Some(bv) => interpolate(av, bv, u),
                        None => av.clone(),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        _ => {
            if u < 0.5 {
                a.clone()
            } else {
                b.clone()
            }
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Rgba> for Value {
    fn from(v: Rgba) -> Self {
        Self::Color(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/value.rs"]
mod tests;
