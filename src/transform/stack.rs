use crate::foundation::core::Transform;
use crate::transform::matrix::Mat4;

/// Current matrix plus a stack of saved matrices for per-layer isolation.
#[derive(Clone, Debug, Default)]
pub struct MatrixStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl MatrixStack {
    /// Stack whose current matrix is the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// The matrix subsequent draws use.
    pub fn current(&self) -> &Mat4 {
        &self.current
    }

    /// Number of saved matrices.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Reset to identity and drop every saved matrix.
    pub fn reset(&mut self) {
        self.current = Mat4::IDENTITY;
        self.saved.clear();
    }

    /// Save a copy of the current matrix.
    pub fn push_matrix(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the most recently saved matrix.
    ///
    /// Popping an empty stack leaves the current matrix unchanged. Unbalanced push/pop pairs are
    /// therefore masked rather than reported.
    pub fn pop_matrix(&mut self) {
        match self.saved.pop() {
            Some(m) => self.current = m,
            None => tracing::debug!("pop_matrix on empty stack ignored"),
        }
    }

    /// `current = current · m`.
    pub fn multiply_matrix(&mut self, m: &Mat4) {
        self.current = self.current.multiply(m);
    }

    /// Replace the current matrix.
    pub fn load(&mut self, m: Mat4) {
        self.current = m;
    }

    /// Apply translate, rotate X, rotate Y, rotate Z, then scale, each right-multiplied.
    pub fn apply_transform(&mut self, t: &Transform) {
        let p = t.position;
        let r = t.rotation;
        let s = t.scale;
        self.multiply_matrix(&Mat4::translation(p.x, p.y, p.z));
        self.multiply_matrix(&Mat4::rotation_x(r.x.to_radians()));
        self.multiply_matrix(&Mat4::rotation_y(r.y.to_radians()));
        self.multiply_matrix(&Mat4::rotation_z(r.z.to_radians()));
        self.multiply_matrix(&Mat4::scaling(s.x, s.y, s.z));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/stack.rs"]
mod tests;
