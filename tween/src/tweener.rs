//! Declarative scheduling over a shared scheduler.

use std::rc::Rc;

use crate::control::{Finished, TweenControl, TweenGroupControl};
use crate::options::{Strategy, TweenOptions};
use crate::quick::QuickTo;
use crate::record::TweenRecord;
use crate::scheduler::TweenScheduler;
use crate::target::{Props, Target, snapshot};
use crate::TweenError;

/// Schedules tweens against one [`TweenScheduler`].
#[derive(Clone)]
pub struct Tweener {
    scheduler: TweenScheduler,
}

impl Tweener {
    pub fn new(scheduler: &TweenScheduler) -> Self {
        Self {
            scheduler: scheduler.clone(),
        }
    }

    pub fn scheduler(&self) -> &TweenScheduler {
        &self.scheduler
    }

    /// Animates the target from its current values to `props`.
    ///
    /// Keys the target does not report, and keys already at their destination value,
    /// are dropped; an empty remainder is a silent no-op (`None`).
    pub fn to(&self, target: &Target, props: Props, options: TweenOptions) -> Option<TweenControl> {
        if !self.admit(target, &options) {
            return None;
        }
        let current = snapshot(target, props.keys());
        let mut initial = Props::new();
        let mut destination = Props::new();
        for (key, to) in props {
            match current.get(&key) {
                Some(&cur) if !cur.is_finite() => {
                    twarn!(key = %key, "non-finite current value, skipping")
                }
                Some(&cur) if cur != to => {
                    initial.insert(key.clone(), cur);
                    destination.insert(key, to);
                }
                Some(_) => {}
                None => twarn!(key = %key, "target does not report this key, skipping"),
            }
        }
        self.schedule(target, initial, destination, None, options)
    }

    /// Animates the target from `props` back to its current values. The target jumps
    /// to `props` at activation.
    pub fn from(
        &self,
        target: &Target,
        props: Props,
        options: TweenOptions,
    ) -> Option<TweenControl> {
        if !self.admit(target, &options) {
            return None;
        }
        let current = snapshot(target, props.keys());
        let mut initial = Props::new();
        let mut destination = Props::new();
        for (key, from) in props {
            if !from.is_finite() {
                twarn!(key = %key, "non-finite start value, skipping");
                continue;
            }
            match current.get(&key) {
                Some(&cur) if cur != from => {
                    initial.insert(key.clone(), from);
                    destination.insert(key, cur);
                }
                Some(_) => {}
                None => twarn!(key = %key, "target does not report this key, skipping"),
            }
        }
        let start = (!initial.is_empty()).then(|| initial.clone());
        self.schedule(target, initial, destination, start, options)
    }

    /// Animates the target between two explicit endpoint sets. The target jumps to
    /// the `from` values at activation.
    ///
    /// Keys present in `from` but absent from `to` are warn-logged and skipped; keys
    /// only in `to` are ignored.
    pub fn from_to(
        &self,
        target: &Target,
        from: Props,
        to: Props,
        options: TweenOptions,
    ) -> Option<TweenControl> {
        if !self.admit(target, &options) {
            return None;
        }
        let mut initial = Props::new();
        let mut destination = Props::new();
        for (key, start) in from {
            if !start.is_finite() {
                twarn!(key = %key, "non-finite start value, skipping");
                continue;
            }
            match to.get(&key) {
                Some(&end) if end != start => {
                    initial.insert(key.clone(), start);
                    destination.insert(key, end);
                }
                Some(_) => {}
                None => twarn!(key = %key, "missing destination for key, skipping"),
            }
        }
        let start = (!initial.is_empty()).then(|| initial.clone());
        self.schedule(target, initial, destination, start, options)
    }

    /// Builds a reusable retargeting handle over a fixed key set.
    pub fn quick_to(
        &self,
        target: &Target,
        keys: impl IntoIterator<Item = impl Into<String>>,
        options: TweenOptions,
    ) -> Result<QuickTo, TweenError> {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(TweenError::NoKeys);
        }
        Ok(QuickTo::new(
            self.scheduler.clone(),
            target.clone(),
            keys,
            options,
        ))
    }

    /// Positionability gate plus conflict-strategy handling. `false` aborts the
    /// schedule.
    fn admit(&self, target: &Target, options: &TweenOptions) -> bool {
        if !target.borrow().positionable() {
            twarn!("target is not positionable, skipping");
            return false;
        }
        match options.strategy {
            Some(Strategy::Cancel) => {
                self.scheduler.cancel(target);
            }
            Some(Strategy::CancelAll) => {
                self.scheduler.cancel_all_for(target);
            }
            Some(Strategy::Exclusive) => {
                if self.scheduler.is_scheduled(target) {
                    tdebug!("target already scheduled, exclusive tween skipped");
                    return false;
                }
            }
            None => {}
        }
        true
    }

    fn schedule(
        &self,
        target: &Target,
        initial: Props,
        destination: Props,
        start_props: Option<Props>,
        options: TweenOptions,
    ) -> Option<TweenControl> {
        if destination.is_empty() {
            return None;
        }
        let restore_props = (!options.restore.is_empty())
            .then(|| snapshot(target, options.restore.iter()));
        let record = TweenRecord {
            target: target.clone(),
            initial,
            destination,
            duration_ms: options.duration_ms(),
            delay_ms: options.delay_ms,
            delay_until_ms: None,
            start_ms: None,
            ease: options.ease,
            interpolate: options.interpolate,
            active: false,
            cancelled: false,
            quick: false,
            start_props,
            restore_props,
            connected: options.connected,
            cleanup: options.cleanup,
            finished: Finished::new(),
        };
        Some(self.scheduler.add(record))
    }

    /// Schedules one `to` tween per target. Per-target callbacks may skip entries by
    /// answering `None`; skipped and no-op entries simply contribute no member.
    pub fn to_group(
        &self,
        targets: impl IntoIterator<Item = Target>,
        props: impl Into<GroupValue<Props>>,
        options: impl Into<GroupValue<TweenOptions>>,
    ) -> TweenGroupControl {
        let props = props.into();
        let options = options.into();
        self.group(targets, |tweener, ctx| {
            let p = props.resolve(ctx)?;
            let o = options.resolve(ctx)?;
            tweener.to(&ctx.target, p, o)
        })
    }

    /// Group counterpart of [`from`](Self::from).
    pub fn from_group(
        &self,
        targets: impl IntoIterator<Item = Target>,
        props: impl Into<GroupValue<Props>>,
        options: impl Into<GroupValue<TweenOptions>>,
    ) -> TweenGroupControl {
        let props = props.into();
        let options = options.into();
        self.group(targets, |tweener, ctx| {
            let p = props.resolve(ctx)?;
            let o = options.resolve(ctx)?;
            tweener.from(&ctx.target, p, o)
        })
    }

    /// Group counterpart of [`from_to`](Self::from_to).
    pub fn from_to_group(
        &self,
        targets: impl IntoIterator<Item = Target>,
        from: impl Into<GroupValue<Props>>,
        to: impl Into<GroupValue<Props>>,
        options: impl Into<GroupValue<TweenOptions>>,
    ) -> TweenGroupControl {
        let from = from.into();
        let to = to.into();
        let options = options.into();
        self.group(targets, |tweener, ctx| {
            let f = from.resolve(ctx)?;
            let t = to.resolve(ctx)?;
            let o = options.resolve(ctx)?;
            tweener.from_to(&ctx.target, f, t, o)
        })
    }

    fn group(
        &self,
        targets: impl IntoIterator<Item = Target>,
        schedule: impl Fn(&Self, &GroupContext) -> Option<TweenControl>,
    ) -> TweenGroupControl {
        let mut controls = Vec::new();
        for (index, target) in targets.into_iter().enumerate() {
            let ctx = GroupContext { index, target };
            match schedule(self, &ctx) {
                Some(control) => controls.push(control),
                None => ttrace!(index = ctx.index, "group entry contributed no tween"),
            }
        }
        TweenGroupControl::new(controls)
    }
}

/// Position of one entry within a group schedule, handed to per-target callbacks.
pub struct GroupContext {
    pub index: usize,
    pub target: Target,
}

/// A group argument: one shared value, or a callback producing a value per target.
/// A callback answering `None` skips that entry.
#[derive(Clone)]
pub enum GroupValue<T> {
    Value(T),
    PerTarget(Rc<dyn Fn(&GroupContext) -> Option<T>>),
}

impl<T: Clone> GroupValue<T> {
    pub fn per_target(f: impl Fn(&GroupContext) -> Option<T> + 'static) -> Self {
        Self::PerTarget(Rc::new(f))
    }

    fn resolve(&self, ctx: &GroupContext) -> Option<T> {
        match self {
            Self::Value(v) => Some(v.clone()),
            Self::PerTarget(f) => f(ctx),
        }
    }
}

impl<T: Clone> From<T> for GroupValue<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}
