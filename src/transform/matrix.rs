//! Row-major 4×4 matrices.
//!
//! Points are row vectors: `p' = p · M`. Consequently `a * b` applies `a` first, then `b`, and
//! translation lives in elements 12, 13 and 14. Uploading the 16 elements unchanged to a GLSL
//! `mat4` (column-major) yields the equivalent column-vector matrix, so `u_matrix * pos` in a
//! shader matches [`Mat4::transform_point`].

use core::ops::Mul;

/// Row-major 4×4 matrix of `f64`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    /// Elements, `m[row * 4 + col]`.
    pub m: [f64; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Build from row-major elements.
    pub const fn from_rows(m: [f64; 16]) -> Self {
        Self { m }
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.m[row * 4 + col]
    }

    /// Pure translation.
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut out = Self::IDENTITY;
        out.m[12] = x;
        out.m[13] = y;
        out.m[14] = z;
        out
    }

    /// Non-uniform scale.
    pub fn scaling(x: f64, y: f64, z: f64) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0] = x;
        out.m[5] = y;
        out.m[10] = z;
        out
    }

    /// Rotation around the X axis (radians).
    pub fn rotation_x(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_rows([
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, s, 0.0, //
            0.0, -s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation around the Y axis (radians).
    pub fn rotation_y(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_rows([
            c, 0.0, -s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation around the Z axis (radians).
    pub fn rotation_z(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_rows([
            c, s, 0.0, 0.0, //
            -s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Map canvas pixels (origin top-left, y down) to clip space. Depth is flattened to zero;
    /// layers are ordered by draw order, not by a depth test.
    pub fn pixel_to_clip(width: f64, height: f64) -> Self {
        let sx = 2.0 / width;
        let sy = -2.0 / height;
        Self::from_rows([
            sx, 0.0, 0.0, 0.0, //
            0.0, sy, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, //
            -1.0, 1.0, 0.0, 1.0,
        ])
    }

    /// Standard matrix product `self · rhs`.
    pub fn multiply(&self, rhs: &Self) -> Self {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = a[row * 4] * b[col]
                    + a[row * 4 + 1] * b[4 + col]
                    + a[row * 4 + 2] * b[8 + col]
                    + a[row * 4 + 3] * b[12 + col];
            }
        }
        Self { m: out }
    }

    /// Transform a homogeneous row vector.
    pub fn transform_point(&self, p: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (col, slot) in out.iter_mut().enumerate() {
            *slot = p[0] * self.m[col]
                + p[1] * self.m[4 + col]
                + p[2] * self.m[8 + col]
                + p[3] * self.m[12 + col];
        }
        out
    }

    /// Elements narrowed to `f32` for uniform upload.
    pub fn to_f32_array(&self) -> [f32; 16] {
        self.m.map(|v| v as f32)
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        self.multiply(&rhs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/matrix.rs"]
mod tests;
