use crate::animation::value::Value;

/// Declared GLSL type of an effect uniform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniformType {
    /// `float`.
    Float,
    /// `vec2`.
    Vec2,
    /// `vec3`.
    Vec3,
    /// `vec4`.
    Vec4,
    /// `int`.
    Int,
    /// `bool`.
    Bool,
    /// `mat4`.
    Mat4,
    /// `sampler2D` texture unit.
    Sampler,
}

/// A value ready to hand to [`GpuContext::set_uniform`](crate::GpuContext::set_uniform).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum UniformValue {
    /// `float`.
    Float(f32),
    /// `vec2`.
    Vec2([f32; 2]),
    /// `vec3`.
    Vec3([f32; 3]),
    /// `vec4`.
    Vec4([f32; 4]),
    /// `int`.
    Int(i32),
    /// `bool`.
    Bool(bool),
    /// `mat4`, column-major as GLSL expects.
    Mat4([f32; 16]),
    /// Texture unit for a `sampler2D`.
    Sampler(u32),
}

impl UniformValue {
    /// Declared type this value satisfies.
    pub fn uniform_type(&self) -> UniformType {
        match self {
            Self::Float(_) => UniformType::Float,
            Self::Vec2(_) => UniformType::Vec2,
            Self::Vec3(_) => UniformType::Vec3,
            Self::Vec4(_) => UniformType::Vec4,
            Self::Int(_) => UniformType::Int,
            Self::Bool(_) => UniformType::Bool,
            Self::Mat4(_) => UniformType::Mat4,
            Self::Sampler(_) => UniformType::Sampler,
        }
    }

    /// Coerce a tagged parameter value into `ty`.
    ///
    /// Numbers feed floats/ints/bools, vectors feed vectors of equal or smaller arity, colours
    /// feed `vec3`/`vec4`. Returns `None` when the shapes are incompatible.
    pub fn coerce(value: &Value, ty: UniformType) -> Option<Self> {
        match ty {
            UniformType::Float => value.as_f64().map(|v| Self::Float(v as f32)),
            UniformType::Int => value.as_f64().map(|v| Self::Int(v.round() as i32)),
            UniformType::Bool => value.as_bool().map(Self::Bool),
            UniformType::Vec2 => value
                .as_vec2()
                .map(|v| Self::Vec2([v.x as f32, v.y as f32])),
            UniformType::Vec3 => match value {
                Value::Color(c) => Some(Self::Vec3([c.r, c.g, c.b])),
                other => other
                    .as_vec3()
                    .map(|v| Self::Vec3([v.x as f32, v.y as f32, v.z as f32])),
            },
            UniformType::Vec4 => value.as_color().map(|c| Self::Vec4(c.to_array())),
            UniformType::Mat4 | UniformType::Sampler => None,
        }
    }
}

/// One uniform an effect declares, with the value used when nothing overrides it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UniformDescriptor {
    /// GLSL name, e.g. `u_amount`.
    pub name: String,
    /// Declared type.
    pub ty: UniformType,
    /// Default value; its type matches `ty`.
    pub default: UniformValue,
}

impl UniformDescriptor {
    /// Descriptor whose type is taken from the default value.
    pub fn new(name: impl Into<String>, default: UniformValue) -> Self {
        Self {
            name: name.into(),
            ty: default.uniform_type(),
            default,
        }
    }

    /// `float` descriptor.
    pub fn float(name: impl Into<String>, default: f32) -> Self {
        Self::new(name, UniformValue::Float(default))
    }

    /// `vec2` descriptor.
    pub fn vec2(name: impl Into<String>, default: [f32; 2]) -> Self {
        Self::new(name, UniformValue::Vec2(default))
    }

    /// `vec3` descriptor.
    pub fn vec3(name: impl Into<String>, default: [f32; 3]) -> Self {
        Self::new(name, UniformValue::Vec3(default))
    }

    /// `vec4` descriptor.
    pub fn vec4(name: impl Into<String>, default: [f32; 4]) -> Self {
        Self::new(name, UniformValue::Vec4(default))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/uniform.rs"]
mod tests;
