//! Weight-ordered filter entries and their live-subscription bookkeeping.

use std::rc::Rc;

use crate::ReducerError;

/// A filter predicate over backing-store values.
pub type FilterFn<T> = Rc<dyn Fn(&T) -> bool>;

/// The notify callback handed to live filters/sorts; invoking it forces a re-index.
pub type NotifyFn = Rc<dyn Fn()>;

/// Detaches a live subscription. Returned by [`SubscribeFn`].
pub type Unsubscribe = Box<dyn FnOnce()>;

/// The minimal store-subscription shape: called once with the reducer's notify
/// callback, returns the unsubscriber.
pub type SubscribeFn = Rc<dyn Fn(NotifyFn) -> Unsubscribe>;

/// One filter entry: predicate, optional identity, weight, optional live subscription.
///
/// Lower weights are evaluated (and positioned) earlier; the default weight is `1.0`.
pub struct Filter<T: ?Sized> {
    id: Option<String>,
    weight: f64,
    filter: FilterFn<T>,
    subscribe: Option<SubscribeFn>,
}

impl<T: ?Sized> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            weight: self.weight,
            filter: Rc::clone(&self.filter),
            subscribe: self.subscribe.clone(),
        }
    }
}

impl<T: ?Sized> Filter<T> {
    pub fn new(filter: impl Fn(&T) -> bool + 'static) -> Self {
        Self::from_fn(Rc::new(filter))
    }

    pub fn from_fn(filter: FilterFn<T>) -> Self {
        Self {
            id: None,
            weight: 1.0,
            filter,
            subscribe: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the ordering weight. Validated against `[0, 1]` when the filter is added.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Attaches a live subscription. The function is invoked once at registration with
    /// the reducer's notify callback and must return the unsubscriber.
    pub fn with_subscribe(mut self, subscribe: impl Fn(NotifyFn) -> Unsubscribe + 'static) -> Self {
        self.subscribe = Some(Rc::new(subscribe));
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn filter_fn(&self) -> &FilterFn<T> {
        &self.filter
    }

    pub(crate) fn subscribe_fn(&self) -> Option<SubscribeFn> {
        self.subscribe.clone()
    }

    /// Predicate identity, used for `remove` matching and double-live detection.
    pub(crate) fn ptr_key(&self) -> usize {
        Rc::as_ptr(&self.filter) as *const () as usize
    }
}

struct LiveEntry {
    key: usize,
    unsubscribe: Option<Unsubscribe>,
}

/// The filter half of the filter/sort adapter: entries sorted ascending by weight,
/// equal weights preserving insertion order.
pub(crate) struct FilterAdapter<T: ?Sized> {
    entries: Vec<Filter<T>>,
    live: Vec<LiveEntry>,
}

impl<T: ?Sized> Default for FilterAdapter<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            live: Vec::new(),
        }
    }
}

impl<T: ?Sized> FilterAdapter<T> {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tests a value against every filter in weight order, short-circuiting on the
    /// first failing predicate.
    pub(crate) fn test(&self, value: &T) -> bool {
        self.entries.iter().all(|e| (e.filter)(value))
    }

    /// Whole-batch validation: weights in range, no predicate registered live twice
    /// (against existing live entries or within the batch itself). Nothing is
    /// committed when any entry fails.
    pub(crate) fn validate_batch(&self, batch: &[Filter<T>]) -> Result<(), ReducerError> {
        let mut batch_live: Vec<usize> = Vec::new();
        for f in batch {
            if !(0.0..=1.0).contains(&f.weight) {
                return Err(ReducerError::InvalidWeight { weight: f.weight });
            }
            if f.subscribe.is_some() {
                let key = f.ptr_key();
                if self.live.iter().any(|l| l.key == key) || batch_live.contains(&key) {
                    return Err(ReducerError::DuplicateLiveFilter);
                }
                batch_live.push(key);
            }
        }
        Ok(())
    }

    /// First-fit insertion from the front: before the first entry with a strictly
    /// greater weight, so ties land after their elders.
    pub(crate) fn insert(&mut self, filter: Filter<T>) {
        let pos = self
            .entries
            .iter()
            .position(|e| e.weight > filter.weight)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, filter);
    }

    pub(crate) fn track(&mut self, key: usize, unsubscribe: Unsubscribe) {
        self.live.push(LiveEntry {
            key,
            unsubscribe: Some(unsubscribe),
        });
    }

    /// Removes entries matching `pred`, detaching their live subscriptions.
    ///
    /// The unsubscribers are returned rather than run so the caller can invoke them
    /// after releasing its borrows.
    pub(crate) fn remove_where(
        &mut self,
        pred: impl Fn(&Filter<T>) -> bool,
    ) -> (usize, Vec<Unsubscribe>) {
        let before = self.entries.len();
        let mut removed_keys = Vec::new();
        self.entries.retain(|e| {
            if pred(e) {
                removed_keys.push(e.ptr_key());
                false
            } else {
                true
            }
        });

        let mut unsubs = Vec::new();
        self.live.retain_mut(|l| {
            if removed_keys.contains(&l.key) {
                if let Some(u) = l.unsubscribe.take() {
                    unsubs.push(u);
                }
                false
            } else {
                true
            }
        });

        (before - self.entries.len(), unsubs)
    }

    /// Removes every entry; returns all unsubscribers for the caller to run.
    pub(crate) fn clear(&mut self) -> Vec<Unsubscribe> {
        self.entries.clear();
        self.live
            .drain(..)
            .filter_map(|mut l| l.unsubscribe.take())
            .collect()
    }

    pub(crate) fn for_each(&self, f: &mut dyn FnMut(&Filter<T>)) {
        for e in &self.entries {
            f(e);
        }
    }
}
