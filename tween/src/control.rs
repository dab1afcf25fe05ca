//! Completion signals and cancellation handles.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::scheduler::TweenScheduler;
use crate::slab::RecordId;

/// The terminal outcome of a tween. Cancellation is a result, not a failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TweenResult {
    pub cancelled: bool,
}

struct FinishedInner {
    result: Option<TweenResult>,
    waiters: Vec<Box<dyn FnOnce(TweenResult)>>,
}

/// A single-threaded, resolve-once completion cell.
///
/// Resolution is synchronous: waiters registered before resolution run inside the
/// resolving call; waiters registered after run immediately.
#[derive(Clone)]
pub struct Finished {
    inner: Rc<RefCell<FinishedInner>>,
}

impl Finished {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(FinishedInner {
                result: None,
                waiters: Vec::new(),
            })),
        }
    }

    pub(crate) fn resolved(result: TweenResult) -> Self {
        let f = Self::new();
        f.resolve(result);
        f
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.borrow().result.is_some()
    }

    pub fn result(&self) -> Option<TweenResult> {
        self.inner.borrow().result
    }

    /// Registers a completion callback, invoking it at once when already resolved.
    pub fn on_resolve(&self, f: impl FnOnce(TweenResult) + 'static) {
        let resolved = self.inner.borrow().result;
        match resolved {
            Some(result) => f(result),
            None => self.inner.borrow_mut().waiters.push(Box::new(f)),
        }
    }

    /// Resolves the cell. Later calls are ignored; waiters run after the cell borrow
    /// is released so they may re-inspect the signal.
    pub(crate) fn resolve(&self, result: TweenResult) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            if inner.result.is_some() {
                return;
            }
            inner.result = Some(result);
            std::mem::take(&mut inner.waiters)
        };
        for w in waiters {
            w(result);
        }
    }
}

/// A handle to one scheduled tween.
#[derive(Clone)]
pub struct TweenControl {
    scheduler: TweenScheduler,
    id: RecordId,
    finished: Finished,
}

impl TweenControl {
    pub(crate) fn new(scheduler: TweenScheduler, id: RecordId, finished: Finished) -> Self {
        Self {
            scheduler,
            id,
            finished,
        }
    }

    /// Cancels the tween. The record is retired immediately with
    /// `TweenResult { cancelled: true }`; already-finished tweens ignore the call.
    pub fn cancel(&self) {
        self.scheduler.cancel_record(self.id);
    }

    /// Whether the tween has activated and is still running.
    pub fn is_active(&self) -> bool {
        !self.finished.is_resolved() && self.scheduler.record_is_active(self.id)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_resolved()
    }

    pub fn is_cancelled(&self) -> bool {
        match self.finished.result() {
            Some(r) => r.cancelled,
            None => self.scheduler.record_is_cancelled(self.id),
        }
    }

    pub fn finished(&self) -> Finished {
        self.finished.clone()
    }

    pub(crate) fn id(&self) -> RecordId {
        self.id
    }
}

/// Aggregated control over the tweens of one group schedule.
///
/// Cancellation is reported when any member was cancelled; completion only when every
/// member has finished.
#[derive(Clone)]
pub struct TweenGroupControl {
    members: Rc<Vec<TweenControl>>,
}

impl TweenGroupControl {
    pub(crate) fn new(members: Vec<TweenControl>) -> Self {
        Self {
            members: Rc::new(members),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[TweenControl] {
        &self.members
    }

    pub fn cancel(&self) {
        for m in self.members.iter() {
            m.cancel();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.members.iter().all(TweenControl::is_finished)
    }

    pub fn is_cancelled(&self) -> bool {
        self.members.iter().any(TweenControl::is_cancelled)
    }

    /// A signal resolving once every member has resolved; the aggregate result is
    /// cancelled when any member was.
    pub fn finished(&self) -> Finished {
        if self.members.is_empty() {
            return Finished::resolved(TweenResult::default());
        }
        let aggregate = Finished::new();
        let remaining = Rc::new(Cell::new(self.members.len()));
        let any_cancelled = Rc::new(Cell::new(false));
        for m in self.members.iter() {
            let aggregate = aggregate.clone();
            let remaining = Rc::clone(&remaining);
            let any_cancelled = Rc::clone(&any_cancelled);
            m.finished().on_resolve(move |result| {
                if result.cancelled {
                    any_cancelled.set(true);
                }
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    aggregate.resolve(TweenResult {
                        cancelled: any_cancelled.get(),
                    });
                }
            });
        }
        aggregate
    }
}
