//! The shared frame scheduler.
//!
//! The host drives it: call [`TweenScheduler::tick`] once per frame with the current
//! monotonic time in milliseconds, and keep ticking while [`TweenScheduler::has_work`]
//! answers `true`. There is no global instance; every tweener holds a clone of one
//! explicitly created scheduler.

use std::cell::RefCell;
use std::rc::Rc;

use crate::control::{Finished, TweenControl, TweenResult};
use crate::record::TweenRecord;
use crate::slab::{RecordId, RecordSlab};
use crate::target::{Props, Target, same_target};

pub(crate) struct SchedulerCore {
    slab: RecordSlab,
    pending: Vec<RecordId>,
    active: Vec<RecordId>,
}

/// The facts about a scheduled record that a cancellation predicate may consult.
#[derive(Clone, Copy, Debug)]
pub struct RecordInfo {
    /// Whether the record was scheduled by a `quick_to` retargeter.
    pub quick: bool,
    /// Whether the record has activated (false while still delayed).
    pub active: bool,
}

/// Everything a retiring record does to the outside world, deferred until the
/// scheduler borrow is released so user callbacks can re-enter the scheduler.
struct Retirement {
    target: Target,
    restore: Option<Props>,
    cleanup: Option<Rc<dyn Fn()>>,
    finished: Finished,
    cancelled: bool,
}

impl Retirement {
    fn from_record(record: TweenRecord, cancelled: bool) -> Self {
        Self {
            target: record.target,
            restore: record.restore_props,
            cleanup: record.cleanup,
            finished: record.finished,
            cancelled: cancelled || record.cancelled,
        }
    }

    fn run(self) {
        if let Some(restore) = &self.restore {
            self.target.borrow_mut().set(restore);
        }
        if let Some(cleanup) = &self.cleanup {
            cleanup();
        }
        self.finished.resolve(TweenResult {
            cancelled: self.cancelled,
        });
    }
}

enum PendingAction {
    Drop,
    Retire,
    Activate(Option<(Target, Props)>),
    Keep,
}

enum ActiveAction {
    Drop,
    Retire,
    Complete(Target, Props),
    Step(Target, Props),
}

/// The shared animation scheduler. Cheap to clone; all clones drive the same records.
#[derive(Clone, Default)]
pub struct TweenScheduler {
    core: Rc<RefCell<SchedulerCore>>,
}

impl Default for SchedulerCore {
    fn default() -> Self {
        Self {
            slab: RecordSlab::default(),
            pending: Vec::new(),
            active: Vec::new(),
        }
    }
}

impl TweenScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether another frame is needed. A host loop polls this to stop and restart
    /// its timer lazily.
    pub fn has_work(&self) -> bool {
        let core = self.core.borrow();
        !core.pending.is_empty() || !core.active.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.core.borrow().pending.len()
    }

    pub fn active_len(&self) -> usize {
        self.core.borrow().active.len()
    }

    /// Whether any record, delayed or running, is scheduled for this target.
    pub fn is_scheduled(&self, target: &Target) -> bool {
        let core = self.core.borrow();
        core.pending
            .iter()
            .chain(core.active.iter())
            .any(|&id| {
                core.slab
                    .get(id)
                    .is_some_and(|rec| same_target(&rec.target, target))
            })
    }

    /// Registers a record. Already-cancelled records retire immediately and are never
    /// scheduled.
    pub(crate) fn add(&self, record: TweenRecord) -> TweenControl {
        let finished = record.finished.clone();
        if record.cancelled {
            let (id, retirement) = {
                let mut core = self.core.borrow_mut();
                let id = core.slab.insert(record);
                let r = core.slab.remove(id).map(|r| Retirement::from_record(r, true));
                (id, r)
            };
            if let Some(r) = retirement {
                r.run();
            }
            return TweenControl::new(self.clone(), id, finished);
        }
        let id = {
            let mut core = self.core.borrow_mut();
            let id = core.slab.insert(record);
            core.pending.push(id);
            id
        };
        ttrace!(pending = self.pending_len(), "record scheduled");
        TweenControl::new(self.clone(), id, finished)
    }

    /// Advances every scheduled tween to `now_ms`.
    ///
    /// Target writes and retirement side effects run after the internal borrow is
    /// released, so `Positionable::set`, cleanup callbacks and `Finished` waiters may
    /// schedule or cancel tweens freely.
    pub fn tick(&self, now_ms: u64) {
        let mut writes: Vec<(Target, Props)> = Vec::new();
        let mut retired: Vec<Retirement> = Vec::new();
        {
            let mut core = self.core.borrow_mut();

            // Pending pass: activation and pre-activation sweeping.
            let mut i = core.pending.len();
            while i > 0 {
                i -= 1;
                let id = core.pending[i];
                let action = match core.slab.get_mut(id) {
                    None => PendingAction::Drop,
                    Some(rec) if rec.cancelled || !rec.is_connected() => PendingAction::Retire,
                    Some(rec) => {
                        let deadline = *rec
                            .delay_until_ms
                            .get_or_insert(now_ms.saturating_add(rec.delay_ms));
                        if now_ms >= deadline {
                            rec.active = true;
                            rec.start_ms = Some(now_ms);
                            PendingAction::Activate(
                                rec.start_props.take().map(|sp| (rec.target.clone(), sp)),
                            )
                        } else {
                            PendingAction::Keep
                        }
                    }
                };
                match action {
                    PendingAction::Drop => {
                        core.pending.remove(i);
                    }
                    PendingAction::Retire => {
                        core.pending.remove(i);
                        if let Some(rec) = core.slab.remove(id) {
                            retired.push(Retirement::from_record(rec, true));
                        }
                    }
                    PendingAction::Activate(start_write) => {
                        if let Some(w) = start_write {
                            writes.push(w);
                        }
                        core.pending.remove(i);
                        core.active.push(id);
                    }
                    PendingAction::Keep => {}
                }
            }

            // Active pass: interpolation, completion, sweeping.
            let mut i = core.active.len();
            while i > 0 {
                i -= 1;
                let id = core.active[i];
                let action = match core.slab.get_mut(id) {
                    None => ActiveAction::Drop,
                    Some(rec) if rec.cancelled || !rec.is_connected() => ActiveAction::Retire,
                    Some(rec) => {
                        let start = *rec.start_ms.get_or_insert(now_ms);
                        let elapsed = now_ms.saturating_sub(start);
                        if elapsed >= rec.duration_ms {
                            // Land exactly on the destination, no residual easing error.
                            ActiveAction::Complete(rec.target.clone(), rec.destination.clone())
                        } else {
                            let t = rec.progress(elapsed);
                            ActiveAction::Step(rec.target.clone(), rec.frame_props(t))
                        }
                    }
                };
                match action {
                    ActiveAction::Drop => {
                        core.active.remove(i);
                    }
                    ActiveAction::Retire => {
                        core.active.remove(i);
                        if let Some(rec) = core.slab.remove(id) {
                            retired.push(Retirement::from_record(rec, true));
                        }
                    }
                    ActiveAction::Complete(target, props) => {
                        writes.push((target, props));
                        core.active.remove(i);
                        if let Some(rec) = core.slab.remove(id) {
                            retired.push(Retirement::from_record(rec, false));
                        }
                    }
                    ActiveAction::Step(target, props) => {
                        writes.push((target, props));
                    }
                }
            }
        }
        ttrace!(
            now_ms,
            writes = writes.len(),
            retired = retired.len(),
            "tick"
        );
        for (target, props) in writes {
            target.borrow_mut().set(&props);
        }
        for r in retired {
            r.run();
        }
    }

    /// Cancels the target's ordinary tweens. Quick tweens survive; cancel those with
    /// [`cancel_all_for`](Self::cancel_all_for) or an explicit predicate.
    pub fn cancel(&self, target: &Target) -> usize {
        self.cancel_where(|rec| same_target(&rec.target, target) && !rec.quick)
    }

    /// Cancels the target's tweens matching `pred`.
    pub fn cancel_matching(
        &self,
        target: &Target,
        pred: impl Fn(&RecordInfo) -> bool,
    ) -> usize {
        self.cancel_where(|rec| {
            same_target(&rec.target, target)
                && pred(&RecordInfo {
                    quick: rec.quick,
                    active: rec.active,
                })
        })
    }

    /// Cancels everything scheduled for the target, quick tweens included.
    pub fn cancel_all_for(&self, target: &Target) -> usize {
        self.cancel_where(|rec| same_target(&rec.target, target))
    }

    /// Cancels every scheduled tween.
    pub fn cancel_all(&self) -> usize {
        self.cancel_where(|_| true)
    }

    fn cancel_where(&self, pred: impl Fn(&TweenRecord) -> bool) -> usize {
        let mut retired: Vec<Retirement> = Vec::new();
        {
            let mut core = self.core.borrow_mut();
            let SchedulerCore {
                slab,
                pending,
                active,
            } = &mut *core;
            for list in [pending, active] {
                let mut i = list.len();
                while i > 0 {
                    i -= 1;
                    let id = list[i];
                    if slab.get(id).is_some_and(&pred) {
                        list.remove(i);
                        if let Some(rec) = slab.remove(id) {
                            retired.push(Retirement::from_record(rec, true));
                        }
                    }
                }
            }
        }
        let count = retired.len();
        if count > 0 {
            tdebug!(count, "tweens cancelled");
        }
        for r in retired {
            r.run();
        }
        count
    }

    /// Retires one record eagerly. Finished or unknown ids are ignored.
    pub(crate) fn cancel_record(&self, id: RecordId) {
        let retirement = {
            let mut core = self.core.borrow_mut();
            core.pending.retain(|&p| p != id);
            core.active.retain(|&a| a != id);
            core.slab.remove(id).map(|r| Retirement::from_record(r, true))
        };
        if let Some(r) = retirement {
            r.run();
        }
    }

    pub(crate) fn record_is_active(&self, id: RecordId) -> bool {
        self.core
            .borrow()
            .slab
            .get(id)
            .is_some_and(|r| r.active && !r.cancelled)
    }

    pub(crate) fn record_is_cancelled(&self, id: RecordId) -> bool {
        self.core.borrow().slab.get(id).is_some_and(|r| r.cancelled)
    }

    pub(crate) fn record_is_live(&self, id: RecordId) -> bool {
        self.core
            .borrow()
            .slab
            .get(id)
            .is_some_and(|r| !r.cancelled)
    }

    pub(crate) fn with_record<R>(
        &self,
        id: RecordId,
        f: impl FnOnce(&mut TweenRecord) -> R,
    ) -> Option<R> {
        self.core.borrow_mut().slab.get_mut(id).map(f)
    }
}
