//! The per-tween bookkeeping record owned by the scheduler.

use std::rc::Rc;

use crate::control::Finished;
use crate::easing::{Ease, Interpolate};
use crate::target::{Props, Target};

pub(crate) struct TweenRecord {
    pub(crate) target: Target,
    /// Property values at schedule (or retarget) time; interpolation starting points.
    pub(crate) initial: Props,
    pub(crate) destination: Props,
    pub(crate) duration_ms: u64,
    pub(crate) delay_ms: u64,
    /// Stamped on the record's first pending tick; activation happens on the first
    /// tick at or past this deadline.
    pub(crate) delay_until_ms: Option<u64>,
    /// Stamped at activation. `None` on an active record means the clock was reset by
    /// a retarget and is re-stamped on the next tick.
    pub(crate) start_ms: Option<u64>,
    pub(crate) ease: Ease,
    pub(crate) interpolate: Interpolate,
    pub(crate) active: bool,
    pub(crate) cancelled: bool,
    /// Quick records are spared by the default cancellation predicate.
    pub(crate) quick: bool,
    /// Values written to the target once, at activation.
    pub(crate) start_props: Option<Props>,
    /// Values captured at schedule time and written back at retirement.
    pub(crate) restore_props: Option<Props>,
    /// Liveness probe; a `false` answer retires the record as cancelled. Must not
    /// call back into the scheduler.
    pub(crate) connected: Option<Rc<dyn Fn() -> bool>>,
    pub(crate) cleanup: Option<Rc<dyn Fn()>>,
    pub(crate) finished: Finished,
}

impl TweenRecord {
    pub(crate) fn is_connected(&self) -> bool {
        self.connected.as_ref().is_none_or(|probe| probe())
    }

    /// Interpolation progress for this frame, eased, in `[0, 1]`.
    pub(crate) fn progress(&self, elapsed_ms: u64) -> f64 {
        let t = elapsed_ms as f64 / self.duration_ms.max(1) as f64;
        self.ease.sample(t.clamp(0.0, 1.0))
    }

    /// The batched property values for eased progress `t`.
    pub(crate) fn frame_props(&self, t: f64) -> Props {
        let mut out = Props::with_capacity(self.destination.len());
        for (key, to) in &self.destination {
            let from = self.initial.get(key).copied().unwrap_or(*to);
            out.insert(key.clone(), self.interpolate.apply(from, *to, t));
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn dummy_for_tests() -> Self {
        use std::cell::RefCell;

        struct Still;
        impl crate::Positionable for Still {
            fn get(&self, _out: &mut Props) {}
            fn set(&mut self, _data: &Props) {}
        }

        Self {
            target: Rc::new(RefCell::new(Still)),
            initial: Props::new(),
            destination: Props::new(),
            duration_ms: 1,
            delay_ms: 0,
            delay_until_ms: None,
            start_ms: None,
            ease: Ease::default(),
            interpolate: Interpolate::default(),
            active: false,
            cancelled: false,
            quick: false,
            start_props: None,
            restore_props: None,
            connected: None,
            cleanup: None,
            finished: Finished::new(),
        }
    }
}
