use std::time::Duration;

use kurbo::Vec2;

use crate::animation::ease::Ease;
use crate::foundation::error::{LayersError, LayersResult};
use crate::foundation::ids::AnimRes;

/// Role of a layer in a transition, and the slot its animation lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AnimationType {
    /// Existing layer underneath an incoming one.
    LowerOut = 0,
    /// Layer being added on top.
    UpperIn = 1,
    /// Layer being removed from the top.
    UpperOut = 2,
    /// Layer revealed by a removal.
    LowerIn = 3,
}

impl AnimationType {
    /// All slots in storage order.
    pub const ALL: [Self; 4] = [Self::LowerOut, Self::UpperIn, Self::UpperOut, Self::LowerIn];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Per-entry animation resources, one optional slot per [`AnimationType`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationSet {
    slots: [Option<AnimRes>; 4],
}

impl AnimationSet {
    /// Resource stored for `kind`.
    pub fn get(&self, kind: AnimationType) -> Option<AnimRes> {
        self.slots[kind.slot()]
    }

    /// Store the resource for `kind`.
    pub fn set(&mut self, kind: AnimationType, res: Option<AnimRes>) {
        self.slots[kind.slot()] = res;
    }

    pub(crate) fn to_raw(self) -> [i32; 4] {
        self.slots
            .map(|s| crate::foundation::ids::res_to_raw(s.map(|r| r.0)))
    }

    pub(crate) fn from_raw(raw: &[i32]) -> LayersResult<Self> {
        if raw.len() != 4 {
            return Err(LayersError::serde(format!(
                "animation set needs 4 slots, found {}",
                raw.len()
            )));
        }
        let mut set = Self::default();
        for (kind, value) in AnimationType::ALL.into_iter().zip(raw) {
            set.set(kind, crate::foundation::ids::raw_to_res(*value).map(AnimRes));
        }
        Ok(set)
    }
}

/// Linear interpolation between two values.
pub trait Lerp: Sized {
    /// Value at `t` between `a` (t = 0) and `b` (t = 1).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// Visual properties an animation writes onto a view.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimFrame {
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Translation as a fraction of the view size.
    pub offset: Vec2,
    /// Uniform scale factor.
    pub scale: f64,
}

impl AnimFrame {
    /// Untouched view.
    pub const IDENTITY: Self = Self {
        alpha: 1.0,
        offset: Vec2::ZERO,
        scale: 1.0,
    };
}

impl Default for AnimFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Lerp for AnimFrame {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            alpha: <f64 as Lerp>::lerp(&a.alpha, &b.alpha, t),
            offset: <Vec2 as Lerp>::lerp(&a.offset, &b.offset, t),
            scale: <f64 as Lerp>::lerp(&a.scale, &b.scale, t),
        }
    }
}

/// Direction for slide animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SlideDir {
    /// From or towards the left edge.
    Left,
    /// From or towards the right edge.
    Right,
    /// From or towards the top edge.
    Top,
    /// From or towards the bottom edge.
    Bottom,
}

impl SlideDir {
    fn offset(self) -> Vec2 {
        match self {
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Top => Vec2::new(0.0, -1.0),
            Self::Bottom => Vec2::new(0.0, 1.0),
        }
    }
}

/// A single view animation: two frames, a duration and an easing curve.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationSpec {
    /// Frame at progress 0.
    pub from: AnimFrame,
    /// Frame at progress 1.
    pub to: AnimFrame,
    /// Total playback time.
    pub duration: Duration,
    /// Curve applied to progress.
    #[serde(default)]
    pub ease: Ease,
}

impl AnimationSpec {
    /// Animation between two explicit frames.
    pub fn new(from: AnimFrame, to: AnimFrame, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            ease: Ease::default(),
        }
    }

    /// Replace the easing curve.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Fade from fully transparent to opaque.
    pub fn fade_in(duration: Duration) -> Self {
        let from = AnimFrame {
            alpha: 0.0,
            ..AnimFrame::IDENTITY
        };
        Self::new(from, AnimFrame::IDENTITY, duration)
    }

    /// Fade from opaque to fully transparent.
    pub fn fade_out(duration: Duration) -> Self {
        let to = AnimFrame {
            alpha: 0.0,
            ..AnimFrame::IDENTITY
        };
        Self::new(AnimFrame::IDENTITY, to, duration)
    }

    /// Slide in from `dir` to the resting position.
    pub fn slide_in(dir: SlideDir, duration: Duration) -> Self {
        let from = AnimFrame {
            offset: dir.offset(),
            ..AnimFrame::IDENTITY
        };
        Self::new(from, AnimFrame::IDENTITY, duration)
    }

    /// Slide out from the resting position towards `dir`.
    pub fn slide_out(dir: SlideDir, duration: Duration) -> Self {
        let to = AnimFrame {
            offset: dir.offset(),
            ..AnimFrame::IDENTITY
        };
        Self::new(AnimFrame::IDENTITY, to, duration)
    }

    /// Frame at elapsed time `elapsed`. Zero-length animations jump to the end.
    pub fn sample(&self, elapsed: Duration) -> AnimFrame {
        AnimFrame::lerp(&self.from, &self.to, self.ease.apply(self.progress(elapsed)))
    }

    /// Linear progress in `[0, 1]` at `elapsed`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Build a preset from a kind name and JSON params.
    ///
    /// Kinds: `fade_in`, `fade_out`, `slide_in`, `slide_out`. Params: `duration_ms`
    /// (default 300), `ease`, and `dir` for slides (default `right`).
    pub fn parse(kind: &str, params: &serde_json::Value) -> LayersResult<Self> {
        let kind = kind.trim().to_ascii_lowercase();
        if kind.is_empty() {
            return Err(LayersError::argument("animation kind must be non-empty"));
        }
        let params = if params.is_null() {
            None
        } else {
            Some(
                params
                    .as_object()
                    .ok_or_else(|| LayersError::argument("animation params must be an object"))?,
            )
        };

        let duration = match params
            .and_then(|p| p.get("duration_ms"))
            .and_then(|v| v.as_u64())
        {
            None => Duration::from_millis(300),
            Some(ms) => Duration::from_millis(ms),
        };
        let dir = match params.and_then(|p| p.get("dir")).and_then(|v| v.as_str()) {
            None => SlideDir::Right,
            Some(s) => match s.trim().to_ascii_lowercase().as_str() {
                "left" => SlideDir::Left,
                "right" => SlideDir::Right,
                "top" | "up" => SlideDir::Top,
                "bottom" | "down" => SlideDir::Bottom,
                other => {
                    return Err(LayersError::argument(format!(
                        "unknown slide dir '{other}'"
                    )));
                }
            },
        };

        let spec = match kind.as_str() {
            "fade_in" => Self::fade_in(duration),
            "fade_out" => Self::fade_out(duration),
            "slide_in" => Self::slide_in(dir, duration),
            "slide_out" => Self::slide_out(dir, duration),
            _ => {
                return Err(LayersError::argument(format!(
                    "unknown animation kind '{kind}'"
                )));
            }
        };
        match params.and_then(|p| p.get("ease")).and_then(|v| v.as_str()) {
            None => Ok(spec),
            Some(name) => Ok(spec.with_ease(Ease::parse(name)?)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spec.rs"]
mod tests;
