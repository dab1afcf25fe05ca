//! Easing curves and value interpolation.

use std::rc::Rc;

use crate::TweenError;

/// The built-in easing curves. All map `t in [0, 1]` to an eased progress value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    SmoothStep,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutCubic,
}

impl Easing {
    pub fn sample(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => t * (2.0 - t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
        }
    }
}

/// An easing function: one of the named curves or a custom closure.
#[derive(Clone)]
pub enum Ease {
    Named(Easing),
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Default for Ease {
    fn default() -> Self {
        Self::Named(Easing::Linear)
    }
}

impl core::fmt::Debug for Ease {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Named(e) => f.debug_tuple("Named").field(e).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<Easing> for Ease {
    fn from(e: Easing) -> Self {
        Self::Named(e)
    }
}

impl Ease {
    /// Resolves a curve from the named-easing registry.
    ///
    /// Both kebab-case and the source-style camelCase spellings are accepted.
    pub fn by_name(name: &str) -> Result<Self, TweenError> {
        let easing = match name {
            "linear" => Easing::Linear,
            "smooth-step" | "smoothStep" => Easing::SmoothStep,
            "ease-in-quad" | "easeInQuad" => Easing::EaseInQuad,
            "ease-out-quad" | "easeOutQuad" => Easing::EaseOutQuad,
            "ease-in-out-cubic" | "easeInOutCubic" => Easing::EaseInOutCubic,
            _ => return Err(TweenError::UnknownEasing(name.to_string())),
        };
        Ok(Self::Named(easing))
    }

    pub fn sample(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Named(e) => e.sample(t),
            Self::Custom(f) => f(t),
        }
    }
}

/// How a property value travels between its endpoints at eased progress `t`.
#[derive(Clone)]
pub enum Interpolate {
    /// `from + (to - from) * t`.
    Lerp,
    Custom(Rc<dyn Fn(f64, f64, f64) -> f64>),
}

impl Default for Interpolate {
    fn default() -> Self {
        Self::Lerp
    }
}

impl core::fmt::Debug for Interpolate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Lerp => f.write_str("Lerp"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Interpolate {
    pub fn apply(&self, from: f64, to: f64, t: f64) -> f64 {
        match self {
            Self::Lerp => from + (to - from) * t,
            Self::Custom(f) => f(from, to, t),
        }
    }
}
