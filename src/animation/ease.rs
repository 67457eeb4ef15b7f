/// Easing functions used to map normalized keyframe progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "params")]
pub enum Easing {
    /// `u`.
    #[default]
    Linear,
    /// `u²`.
    EaseIn,
    /// `1 − (1 − u)²`.
    EaseOut,
    /// Quadratic in for the first half, quadratic out for the second.
    EaseInOut,
    /// CSS-style cubic Bézier through `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)`.
    CubicBezier(CubicBezier),
}

impl Easing {
    /// Apply this easing to normalized progress `u`.
    ///
    /// The polynomial easings are not clamped; callers pass `u` in `[0, 1]`.
    pub fn apply(self, u: f64) -> f64 {
        match self {
            Self::Linear => u,
            Self::EaseIn => u * u,
            Self::EaseOut => 1.0 - (1.0 - u) * (1.0 - u),
            Self::EaseInOut => {
                if u < 0.5 {
                    2.0 * u * u
                } else {
                    1.0 - 2.0 * (1.0 - u) * (1.0 - u)
                }
            }
            Self::CubicBezier(curve) => curve.apply(u),
        }
    }
}

/// Control points of a cubic Bézier timing curve.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct CubicBezier {
    /// First control point X.
    pub x1: f64,
    /// First control point Y.
    pub y1: f64,
    /// Second control point X.
    pub x2: f64,
    /// Second control point Y.
    pub y2: f64,
}

impl CubicBezier {
    /// CSS `ease`.
    pub const EASE: Self = Self::new(0.25, 0.1, 0.25, 1.0);

    const NEWTON_ITERATIONS: usize = 8;
    const EPSILON: f64 = 1e-6;

    /// Build a curve from its two inner control points.
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Y of the curve at the parameter whose X equals `u`.
    pub fn apply(&self, u: f64) -> f64 {
        sample(self.solve_t(u), self.y1, self.y2)
    }

    /// Newton–Raphson solve for the curve parameter whose X component equals `u`.
    ///
    /// Starts at `t = u`, runs at most eight iterations, and stops early once the X residual
    /// drops below `1e-6` or the derivative vanishes.
    pub fn solve_t(&self, u: f64) -> f64 {
        let mut t = u;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let residual = sample(t, self.x1, self.x2) - u;
            if residual.abs() < Self::EPSILON {
                return t;
            }
            let d = slope(t, self.x1, self.x2);
            if d.abs() < Self::EPSILON {
                break;
            }
            t -= residual / d;
        }
        t
    }

    /// X component of the curve at parameter `t`.
    pub fn x_at(&self, t: f64) -> f64 {
        sample(t, self.x1, self.x2)
    }
}

impl From<[f64; 4]> for CubicBezier {
    fn from(p: [f64; 4]) -> Self {
        Self::new(p[0], p[1], p[2], p[3])
    }
}

impl From<CubicBezier> for [f64; 4] {
    fn from(c: CubicBezier) -> Self {
        [c.x1, c.y1, c.x2, c.y2]
    }
}

// One axis of a Bézier with endpoints fixed at 0 and 1.
fn sample(t: f64, p1: f64, p2: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

fn slope(t: f64, p1: f64, p2: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
