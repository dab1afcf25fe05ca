//! Reusable retargeting over a fixed key set.

use crate::control::{Finished, TweenControl};
use crate::options::TweenOptions;
use crate::record::TweenRecord;
use crate::scheduler::TweenScheduler;
use crate::target::{Props, Target, snapshot};

/// A two-state (idle / in-flight) retargeting handle built by
/// [`Tweener::quick_to`](crate::Tweener::quick_to).
///
/// Each call re-reads the target's current values as the new starting point. While a
/// flight is in progress, a call retargets it in place: the clock restarts from now
/// without re-counting the configured delay. When idle, a call schedules a fresh
/// record.
///
/// Quick records are spared by the scheduler's default cancellation; conflict
/// strategies in the stored options are ignored.
pub struct QuickTo {
    scheduler: TweenScheduler,
    target: Target,
    keys: Vec<String>,
    options: TweenOptions,
    in_flight: Option<TweenControl>,
}

impl core::fmt::Debug for QuickTo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuickTo")
            .field("keys", &self.keys)
            .field("in_flight", &self.in_flight.is_some())
            .finish_non_exhaustive()
    }
}

impl QuickTo {
    pub(crate) fn new(
        scheduler: TweenScheduler,
        target: Target,
        keys: Vec<String>,
        options: TweenOptions,
    ) -> Self {
        Self {
            scheduler,
            target,
            keys,
            options,
            in_flight: None,
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The stored options; duration and easing edits apply from the next call (and to
    /// in-flight retargets).
    pub fn options(&mut self) -> &mut TweenOptions {
        &mut self.options
    }

    /// Whether the last scheduled flight is still live.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|c| !c.is_finished() && self.scheduler.record_is_live(c.id()))
    }

    /// Retargets positionally: `values[i]` becomes the destination of `keys[i]`.
    /// Extra values are ignored; an empty slice is a no-op.
    pub fn to(&mut self, values: &[f64]) -> Option<TweenControl> {
        let mut destination = Props::new();
        for (key, value) in self.keys.iter().zip(values) {
            destination.insert(key.clone(), *value);
        }
        self.retarget(destination)
    }

    /// Retargets by key. Keys outside the handle's fixed set are warn-logged and
    /// skipped.
    pub fn to_keyed(&mut self, props: &Props) -> Option<TweenControl> {
        let mut destination = Props::new();
        for (key, value) in props {
            if self.keys.iter().any(|k| k == key) {
                destination.insert(key.clone(), *value);
            } else {
                twarn!(key = %key, "key not covered by this quick handle, skipping");
            }
        }
        self.retarget(destination)
    }

    fn retarget(&mut self, mut destination: Props) -> Option<TweenControl> {
        if destination.is_empty() {
            return None;
        }
        if !self.target.borrow().positionable() {
            twarn!("target is not positionable, skipping");
            return None;
        }
        // The whole key set restarts from current values, including keys this call
        // did not retarget. Keys without a finite current value cannot restart.
        let mut current = snapshot(&self.target, self.keys.iter());
        current.retain(|_, value| value.is_finite());
        destination.retain(|key, _| current.contains_key(key));
        if destination.is_empty() {
            twarn!("no retargeted key has a finite current value, skipping");
            return None;
        }

        if self.is_in_flight() {
            let control = self.in_flight.clone()?;
            let duration_ms = self.options.duration_ms();
            let ease = self.options.ease.clone();
            let interpolate = self.options.interpolate.clone();
            self.scheduler.with_record(control.id(), move |rec| {
                rec.initial = current;
                for (key, value) in destination {
                    rec.destination.insert(key, value);
                }
                // Restart the clock from the next tick; the delay already served is
                // not counted again.
                rec.start_ms = None;
                rec.duration_ms = duration_ms;
                rec.ease = ease;
                rec.interpolate = interpolate;
            })?;
            return Some(control);
        }

        let record = TweenRecord {
            target: self.target.clone(),
            initial: current,
            destination,
            duration_ms: self.options.duration_ms(),
            delay_ms: self.options.delay_ms,
            delay_until_ms: None,
            start_ms: None,
            ease: self.options.ease.clone(),
            interpolate: self.options.interpolate.clone(),
            active: false,
            cancelled: false,
            quick: true,
            start_props: None,
            restore_props: None,
            connected: self.options.connected.clone(),
            cleanup: self.options.cleanup.clone(),
            finished: Finished::new(),
        };
        let control = self.scheduler.add(record);
        self.in_flight = Some(control.clone());
        Some(control)
    }
}
