use crate::foundation::error::{ReelfxError, ReelfxResult};

pub use kurbo::Vec2;

/// Three-component vector used for layer position, rotation, and scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// All-zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All-one vector.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Build a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component by name (`x`, `y`, or `z`).
    pub fn component(&self, name: &str) -> Option<f64> {
        match name {
            "x" => Some(self.x),
            "y" => Some(self.y),
            "z" => Some(self.z),
            _ => None,
        }
    }

    /// Mutable component by name (`x`, `y`, or `z`).
    pub fn component_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "x" => Some(&mut self.x),
            "y" => Some(&mut self.y),
            "z" => Some(&mut self.z),
            _ => None,
        }
    }
}

/// Straight-alpha floating point colour in `[0, 1]` per channel.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Build a colour from channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a colour from 8-bit straight-alpha channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Quantize to 8-bit channels with round-to-nearest.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn q(c: f32) -> u8 {
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Channels as an array in `r, g, b, a` order.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Channel by name (`r`, `g`, `b`, or `a`).
    pub fn channel(&self, name: &str) -> Option<f32> {
        match name {
            "r" => Some(self.r),
            "g" => Some(self.g),
            "b" => Some(self.b),
            "a" => Some(self.a),
            _ => None,
        }
    }

    /// Mutable channel by name (`r`, `g`, `b`, or `a`).
    pub fn channel_mut(&mut self, name: &str) -> Option<&mut f32> {
        match name {
            "r" => Some(&mut self.r),
            "g" => Some(&mut self.g),
            "b" => Some(&mut self.b),
            "a" => Some(&mut self.a),
            _ => None,
        }
    }
}

/// Layer placement in canvas pixel space.
///
/// Rotation is in degrees. `anchor` is normalized to the layer's own size: `(0, 0)` is the
/// top-left corner, `(0.5, 0.5)` the center.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Translation in pixels; `z` orders layers back to front.
    pub position: Vec3,
    /// Euler rotation in degrees, applied X then Y then Z.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Normalized pivot inside the layer.
    pub anchor: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            anchor: Vec2::ZERO,
        }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Largest accepted edge length.
    pub const MAX_EDGE: u32 = 16_384;

    /// Create a validated canvas with non-zero edges no larger than [`Canvas::MAX_EDGE`].
    pub fn new(width: u32, height: u32) -> ReelfxResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelfxError::validation("canvas width and height must be > 0"));
        }
        if width > Self::MAX_EDGE || height > Self::MAX_EDGE {
            return Err(ReelfxError::validation(format!(
                "canvas edges must be <= {}",
                Self::MAX_EDGE
            )));
        }
        Ok(Self { width, height })
    }

    /// Scale both edges by `factor`, never going below one pixel.
    pub fn scaled(self, factor: f64) -> Self {
        fn edge(v: u32, factor: f64) -> u32 {
            ((f64::from(v) * factor).round() as u32).max(1)
        }
        Self {
            width: edge(self.width, factor),
            height: edge(self.height, factor),
        }
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
