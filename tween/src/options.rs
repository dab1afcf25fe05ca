//! Scheduling options.

use std::rc::Rc;

use crate::easing::{Ease, Interpolate};

/// How a new tween treats tweens already scheduled for the same target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Cancel the target's existing ordinary tweens first; quick tweens survive.
    Cancel,
    /// Cancel everything already scheduled for the target, quick tweens included.
    CancelAll,
    /// Refuse to schedule while anything is already scheduled for the target.
    Exclusive,
}

/// Options accepted by every scheduling call. All fields have workable defaults;
/// build with the `with_*` chain.
#[derive(Clone, Default)]
pub struct TweenOptions {
    pub(crate) duration_ms: Option<u64>,
    pub(crate) delay_ms: u64,
    pub(crate) ease: Ease,
    pub(crate) interpolate: Interpolate,
    pub(crate) strategy: Option<Strategy>,
    /// Keys whose pre-tween values are captured and written back at retirement.
    pub(crate) restore: Vec<String>,
    pub(crate) cleanup: Option<Rc<dyn Fn()>>,
    pub(crate) connected: Option<Rc<dyn Fn() -> bool>>,
}

pub(crate) const DEFAULT_DURATION_MS: u64 = 1000;

impl TweenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms.unwrap_or(DEFAULT_DURATION_MS)
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// In-place duration retune, for handles that expose `&mut` options.
    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = Some(duration_ms);
    }

    /// In-place easing retune.
    pub fn set_ease(&mut self, ease: impl Into<Ease>) {
        self.ease = ease.into();
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_ease(mut self, ease: impl Into<Ease>) -> Self {
        self.ease = ease.into();
        self
    }

    pub fn with_interpolate(mut self, interpolate: Interpolate) -> Self {
        self.interpolate = interpolate;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Captures the named keys before the tween starts and restores them when it
    /// retires, finished or cancelled alike.
    pub fn with_restore(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.restore = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Runs at retirement, after any restore write-back.
    pub fn with_cleanup(mut self, cleanup: impl Fn() + 'static) -> Self {
        self.cleanup = Some(Rc::new(cleanup));
        self
    }

    /// Liveness probe checked every tick; a `false` answer retires the tween as
    /// cancelled. The probe must not schedule or cancel tweens.
    pub fn with_connected(mut self, connected: impl Fn() -> bool + 'static) -> Self {
        self.connected = Some(Rc::new(connected));
        self
    }
}
