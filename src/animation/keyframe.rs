use crate::{
    animation::ease::{CubicBezier, Easing},
    animation::value::{Value, interpolate},
    foundation::error::{ReelfxError, ReelfxResult},
};

/// How a keyframe's segment toward the next keyframe is shaped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Interpolate with the keyframe's easing.
    #[default]
    Linear,
    /// Interpolate along a cubic Bézier; falls back to CSS `ease` when the keyframe's easing is
    /// not itself a Bézier.
    Bezier,
    /// Hold the keyframe's value until the next keyframe.
    Step,
}

/// One sample of an animated property curve.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Time in seconds.
    pub time: f64,
    /// Dot-separated target path, e.g. `transform.position.x`.
    pub property: String,
    /// Value at `time`.
    pub value: Value,
    /// Easing applied toward the next keyframe of the same property.
    #[serde(default)]
    pub easing: Easing,
    /// Segment shape toward the next keyframe.
    #[serde(default)]
    pub interpolation: InterpolationMode,
}

impl Keyframe {
    /// Linear keyframe.
    pub fn new(time: f64, property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            time,
            property: property.into(),
            value: value.into(),
            easing: Easing::Linear,
            interpolation: InterpolationMode::Linear,
        }
    }

    /// Builder-style easing override.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Builder-style interpolation override.
    pub fn with_interpolation(mut self, interpolation: InterpolationMode) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Check the keyframe is usable by the engine.
    pub fn validate(&self) -> ReelfxResult<()> {
        if !self.time.is_finite() {
            return Err(ReelfxError::validation(format!(
                "keyframe time for '{}' must be finite",
                self.property
            )));
        }
        if self.property.is_empty() || self.property.split('.').any(str::is_empty) {
            return Err(ReelfxError::validation(format!(
                "invalid keyframe property path '{}'",
                self.property
            )));
        }
        Ok(())
    }

    fn weight(&self, u: f64) -> Option<f64> {
        match self.interpolation {
            InterpolationMode::Step => None,
            InterpolationMode::Linear => Some(self.easing.apply(u)),
            InterpolationMode::Bezier => Some(match self.easing {
                Easing::CubicBezier(curve) => curve.apply(u),
                _ => CubicBezier::EASE.apply(u),
            }),
        }
    }
}

/// Stable sort by time; keyframes sharing a time keep their insertion order.
pub fn sort_keyframes(keys: &mut [Keyframe]) {
    keys.sort_by(|a, b| a.time.total_cmp(&b.time));
}

/// Resolve `property` at time `t` from a time-sorted keyframe list.
///
/// The last keyframe `K` of the property with `K.time <= t` is interpolated toward the first
/// later keyframe of the same property whose time is strictly greater. Without such a successor
/// `K`'s value is held. Returns `None` when `t` precedes every keyframe of the property.
pub fn evaluate(keys: &[Keyframe], property: &str, t: f64) -> Option<Value> {
    let (idx, current) = keys
        .iter()
        .enumerate()
        .rev()
        .find(|(_, k)| k.property == property && t >= k.time)?;

    let next = keys[idx + 1..]
        .iter()
        .find(|k| k.property == property && k.time > current.time);

    let Some(next) = next else {
        return Some(current.value.clone());
    };

    let u = (t - current.time) / (next.time - current.time);
    match current.weight(u) {
        Some(w) => Some(interpolate(&current.value, &next.value, w)),
        None => Some(current.value.clone()),
    }
}

/// Evaluate every distinct property in `keys` at `t` and write the results into `target`.
///
/// Properties whose keyframes all lie after `t` leave `target` untouched.
pub fn apply_keyframes(target: &mut Value, keys: &[Keyframe], t: f64) -> ReelfxResult<()> {
    let mut seen: Vec<&str> = Vec::new();
    for k in keys {
        if seen.contains(&k.property.as_str()) {
            continue;
        }
        seen.push(&k.property);
        if let Some(v) = evaluate(keys, &k.property, t) {
            target.set_path(&k.property, v)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframe.rs"]
mod tests;
