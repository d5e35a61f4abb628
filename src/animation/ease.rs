use std::f64::consts::PI;

use crate::foundation::error::{LayersError, LayersResult};

/// Interpolator applied to linear animation progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    /// Starts slow, ends at full speed.
    Accelerate,
    /// Starts at full speed, settles at the end.
    Decelerate,
    /// Cosine ramp in and out.
    #[default]
    AccelerateDecelerate,
}

impl Ease {
    /// Progress `t`, clamped to `[0, 1]`, mapped through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Accelerate => t.powi(2),
            Self::Decelerate => {
                let rest = 1.0 - t;
                1.0 - rest * rest
            }
            Self::AccelerateDecelerate => 0.5 - (PI * t).cos() / 2.0,
        }
    }

    /// Accepts `"decelerate"`, `"AccelerateDecelerate"`, `"accelerate-decelerate"` and the
    /// like.
    pub fn parse(name: &str) -> LayersResult<Self> {
        let key = name
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let ease = match key.as_str() {
            "linear" => Self::Linear,
            "accelerate" => Self::Accelerate,
            "decelerate" => Self::Decelerate,
            "acceleratedecelerate" => Self::AccelerateDecelerate,
            _ => return Err(LayersError::argument(format!("unknown ease '{name}'"))),
        };
        Ok(ease)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
