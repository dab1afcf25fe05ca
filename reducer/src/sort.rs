//! The single active comparator and its live subscription.

use core::cmp::Ordering;
use std::rc::Rc;

use crate::filter::{SubscribeFn, Unsubscribe};

/// A comparator over backing-store values.
pub type CompareFn<T> = Rc<dyn Fn(&T, &T) -> Ordering>;

/// The active sort: a comparator plus an optional live subscription with the same
/// contract as filters (singular, no weight).
pub struct Sort<T: ?Sized> {
    compare: CompareFn<T>,
    subscribe: Option<SubscribeFn>,
}

impl<T: ?Sized> Clone for Sort<T> {
    fn clone(&self) -> Self {
        Self {
            compare: Rc::clone(&self.compare),
            subscribe: self.subscribe.clone(),
        }
    }
}

impl<T: ?Sized> Sort<T> {
    pub fn new(compare: impl Fn(&T, &T) -> Ordering + 'static) -> Self {
        Self::from_fn(Rc::new(compare))
    }

    pub fn from_fn(compare: CompareFn<T>) -> Self {
        Self {
            compare,
            subscribe: None,
        }
    }

    pub fn with_subscribe(
        mut self,
        subscribe: impl Fn(crate::filter::NotifyFn) -> Unsubscribe + 'static,
    ) -> Self {
        self.subscribe = Some(Rc::new(subscribe));
        self
    }

    pub(crate) fn subscribe_fn(&self) -> Option<SubscribeFn> {
        self.subscribe.clone()
    }
}

pub(crate) struct SortAdapter<T: ?Sized> {
    current: Option<Sort<T>>,
    unsubscribe: Option<Unsubscribe>,
}

impl<T: ?Sized> Default for SortAdapter<T> {
    fn default() -> Self {
        Self {
            current: None,
            unsubscribe: None,
        }
    }
}

impl<T: ?Sized> SortAdapter<T> {
    pub(crate) fn is_set(&self) -> bool {
        self.current.is_some()
    }

    pub(crate) fn compare(&self, a: &T, b: &T) -> Ordering {
        match &self.current {
            Some(s) => (s.compare)(a, b),
            None => Ordering::Equal,
        }
    }

    /// Replaces the comparator; returns the previous live unsubscriber for the caller
    /// to run outside its borrows.
    pub(crate) fn set(&mut self, sort: Sort<T>) -> Option<Unsubscribe> {
        let old = self.unsubscribe.take();
        self.current = Some(sort);
        old
    }

    pub(crate) fn track(&mut self, unsubscribe: Unsubscribe) {
        self.unsubscribe = Some(unsubscribe);
    }

    pub(crate) fn clear(&mut self) -> Option<Unsubscribe> {
        self.current = None;
        self.unsubscribe.take()
    }
}
