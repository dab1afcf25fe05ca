//! The public reducer façade: a cheap-to-clone handle over one backing store with
//! filters, an optional sort, derived children and subscribers.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::backing::{Backing, DataCell, DataSlot};
use crate::derived::DerivedRegistry;
use crate::engine::{self, IndexState, SharedIndexState};
use crate::filter::{Filter, FilterAdapter, FilterFn, NotifyFn};
use crate::sort::{Sort, SortAdapter};
use crate::ReducerError;

/// A reducer over a `Vec<T>`; keys are positions.
pub type ArrayReducer<T> = Reducer<Vec<T>>;

/// A reducer over an insertion-ordered map; keys are the map keys.
pub type MapReducer<K, V> = Reducer<IndexMap<K, V>>;

pub(crate) struct Core<S: Backing> {
    pub(crate) data: Option<DataSlot<S>>,
    pub(crate) filters: FilterAdapter<S::Value>,
    pub(crate) sort: SortAdapter<S::Value>,
    pub(crate) state: SharedIndexState<S::Key>,
    pub(crate) parent_state: Option<SharedIndexState<S::Key>>,
    pub(crate) derived: DerivedRegistry<S>,
    pub(crate) subscribers: Vec<SubscriberEntry<S>>,
    pub(crate) reversed: bool,
    pub(crate) destroyed: bool,
}

impl<S: Backing> Core<S> {
    pub(crate) fn data_cell(&self) -> Option<DataCell<S>> {
        self.data.as_ref().and_then(|slot| slot.borrow().clone())
    }
}

pub(crate) struct SubscriberEntry<S: Backing> {
    key: usize,
    handler: Rc<dyn Fn(&Reducer<S>)>,
}

/// A non-destructive, filterable/sortable read-through view over one backing store.
///
/// The handle is cheap to clone; all clones observe the same state. Everything is
/// single-threaded and synchronous: mutating calls recompute the index immediately and
/// notify subscribers before they return.
pub struct Reducer<S: Backing> {
    core: Rc<RefCell<Core<S>>>,
}

impl<S: Backing> Clone for Reducer<S> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: 'static> Reducer<Vec<T>> {
    /// Builds a list reducer from any iterator of values.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        Self::new(items.into_iter().collect())
    }
}

impl<K, V> Reducer<IndexMap<K, V>>
where
    K: Clone + Eq + core::hash::Hash + 'static,
    V: 'static,
{
    /// Builds a map reducer from any iterator of key/value pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::new(pairs.into_iter().collect())
    }
}

impl<S: Backing> Reducer<S> {
    /// Builds a reducer owning `data`.
    pub fn new(data: S) -> Self {
        let r = Self::from_parts(
            Some(Rc::new(RefCell::new(Some(Rc::new(RefCell::new(data)))))),
            None,
        );
        r.update(true);
        r
    }

    pub(crate) fn from_parts(
        slot: Option<DataSlot<S>>,
        parent: Option<SharedIndexState<S::Key>>,
    ) -> Self {
        Self {
            core: Rc::new(RefCell::new(Core {
                data: slot,
                filters: FilterAdapter::default(),
                sort: SortAdapter::default(),
                state: Rc::new(RefCell::new(IndexState::default())),
                parent_state: parent,
                derived: DerivedRegistry::default(),
                subscribers: Vec::new(),
                reversed: false,
                destroyed: false,
            })),
        }
    }

    /// A reducer with no backing store; `set_data` installs one.
    pub fn empty() -> Self {
        Self::from_parts(Some(Rc::new(RefCell::new(None))), None)
    }

    /// Adopts an externally owned backing store by reference.
    ///
    /// The caller keeps its clone of the cell and may mutate the store directly;
    /// there is no observation mechanism over raw mutation, so the caller must follow
    /// up with `update(true)`.
    pub fn from_shared(cell: DataCell<S>) -> Self {
        let r = Self::from_parts(Some(Rc::new(RefCell::new(Some(cell)))), None);
        r.update(true);
        r
    }

    /// Builds a reducer from data plus initial filters and sort.
    pub fn with_options(options: ReducerOptions<S>) -> Result<Self, ReducerError> {
        let slot: DataSlot<S> = Rc::new(RefCell::new(
            options.data.map(|d| Rc::new(RefCell::new(d))),
        ));
        let r = Self::from_parts(Some(slot), None);
        if !options.filters.is_empty() {
            r.filters().add_all(options.filters)?;
        }
        if let Some(sort) = options.sort {
            r.sort().set(sort)?;
        }
        r.update(true);
        Ok(r)
    }

    /// The current backing-store cell, if any.
    pub fn data(&self) -> Option<DataCell<S>> {
        self.core.borrow().data_cell()
    }

    /// Replaces the backing-store content.
    ///
    /// With `replace == false` and an existing store, content is merged in place
    /// (lists truncate and re-extend; maps diff-merge), preserving the cell identity
    /// external holders may share. With `replace == true` or no existing store, a
    /// fresh cell is installed and external holders of the old cell are detached.
    pub fn set_data(&self, data: S, replace: bool) {
        let slot = {
            let core = self.core.borrow();
            if core.destroyed {
                rwarn!("set_data on a destroyed reducer ignored");
                return;
            }
            core.data.clone()
        };
        let Some(slot) = slot else { return };
        let existing = slot.borrow().clone();
        match existing {
            Some(cell) if !replace => cell.borrow_mut().merge_in_place(data),
            _ => *slot.borrow_mut() = Some(Rc::new(RefCell::new(data))),
        }
        self.update(true);
    }

    /// Reduced length when the index is active, else the raw backing-store size.
    pub fn len(&self) -> usize {
        let core = self.core.borrow();
        {
            let st = core.state.borrow();
            if st.active {
                if let Some(idx) = &st.index {
                    return idx.len();
                }
            }
        }
        core.data_cell().map_or(0, |d| d.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iteration-direction flag. Never alters the computed index.
    pub fn reversed(&self) -> bool {
        self.core.borrow().reversed
    }

    pub fn set_reversed(&self, reversed: bool) {
        {
            let mut core = self.core.borrow_mut();
            if core.reversed == reversed {
                return;
            }
            core.reversed = reversed;
        }
        self.update(true);
    }

    pub fn destroyed(&self) -> bool {
        self.core.borrow().destroyed
    }

    /// Visits every surviving value, respecting filters, sort and `reversed`.
    pub fn for_each(&self, mut f: impl FnMut(&S::Value)) {
        self.for_each_with_key(|_, v| f(v));
    }

    /// Visits every surviving `(key, value)` pair in reduced order.
    pub fn for_each_with_key(&self, mut f: impl FnMut(&S::Key, &S::Value)) {
        let (data, state, reversed) = {
            let core = self.core.borrow();
            (core.data_cell(), core.state.clone(), core.reversed)
        };
        let Some(data) = data else { return };
        let data = data.borrow();
        let st = state.borrow();
        match (st.active, &st.index) {
            (true, Some(idx)) => {
                if reversed {
                    for k in idx.iter().rev() {
                        if let Some(v) = data.get(k) {
                            f(k, v);
                        }
                    }
                } else {
                    for k in idx {
                        if let Some(v) = data.get(k) {
                            f(k, v);
                        }
                    }
                }
            }
            _ => {
                // Pass-through: walk the backing store directly.
                let each = &mut |k: &S::Key| {
                    if let Some(v) = data.get(k) {
                        f(k, v);
                    }
                };
                if reversed {
                    data.for_each_key_rev(each);
                } else {
                    data.for_each_key(each);
                }
            }
        }
    }

    /// Snapshot of the reduced view.
    pub fn to_vec(&self) -> Vec<S::Value>
    where
        S::Value: Clone,
    {
        let mut out = Vec::new();
        self.for_each(|v| out.push(v.clone()));
        out
    }

    /// Registers a change handler; it is invoked immediately once, and after every
    /// index recomputation that changed the view (or was forced).
    ///
    /// Re-subscribing the identical handler `Rc` is a no-op add.
    pub fn subscribe(&self, handler: Rc<dyn Fn(&Reducer<S>)>) -> Subscription {
        let key = Rc::as_ptr(&handler) as *const () as usize;
        self.subscribe_keyed(key, handler)
    }

    pub(crate) fn subscribe_keyed(
        &self,
        key: usize,
        handler: Rc<dyn Fn(&Reducer<S>)>,
    ) -> Subscription {
        {
            let mut core = self.core.borrow_mut();
            if !core.subscribers.iter().any(|s| s.key == key) {
                core.subscribers.push(SubscriberEntry {
                    key,
                    handler: Rc::clone(&handler),
                });
            }
        }
        handler(self);
        let weak = Rc::downgrade(&self.core);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(core) = weak.upgrade() {
                    core.borrow_mut().subscribers.retain(|s| s.key != key);
                }
            })),
        }
    }

    fn notify_subscribers(&self) {
        let handlers: Vec<Rc<dyn Fn(&Reducer<S>)>> = {
            self.core
                .borrow()
                .subscribers
                .iter()
                .map(|s| Rc::clone(&s.handler))
                .collect()
        };
        for h in handlers {
            h(self);
        }
    }

    pub(crate) fn notify_fn(&self) -> NotifyFn {
        let weak: Weak<RefCell<Core<S>>> = Rc::downgrade(&self.core);
        Rc::new(move || {
            if let Some(core) = weak.upgrade() {
                Reducer { core }.update(true);
            }
        })
    }

    /// Recomputes the index, notifies subscribers on meaningful change (or `force`),
    /// then propagates to every derived child unconditionally.
    pub fn update(&self, force: bool) {
        let notify = {
            let mut core = self.core.borrow_mut();
            engine::refresh(&mut core, force)
        };
        if notify {
            self.notify_subscribers();
        }
        let children = { self.core.borrow().derived.children() };
        for c in children {
            c.update(force);
        }
    }

    /// Destroys the reducer: derived children first, then the backing reference, one
    /// final forced notification, subscribers, filters and sort. Idempotent.
    pub fn destroy(&self) {
        let children = {
            let mut core = self.core.borrow_mut();
            if core.destroyed {
                return;
            }
            core.destroyed = true;
            core.derived.destroy_take()
        };
        for c in children {
            c.destroy();
        }
        {
            self.core.borrow_mut().data = None;
        }
        // Subscribers observe the terminal empty state exactly once.
        self.update(true);
        let (filter_unsubs, sort_unsub, state) = {
            let mut core = self.core.borrow_mut();
            core.subscribers.clear();
            (
                core.filters.clear(),
                core.sort.clear(),
                core.state.clone(),
            )
        };
        for u in filter_unsubs {
            u();
        }
        if let Some(u) = sort_unsub {
            u();
        }
        let mut st = state.borrow_mut();
        st.index = None;
        st.hash = None;
        st.active = false;
    }

    /// Filter management.
    pub fn filters(&self) -> FiltersApi<'_, S> {
        FiltersApi { r: self }
    }

    /// Sort management.
    pub fn sort(&self) -> SortApi<'_, S> {
        SortApi { r: self }
    }

    /// Read access to the computed index.
    pub fn index(&self) -> IndexApi<'_, S> {
        IndexApi { r: self }
    }

    /// Derived-reducer management.
    pub fn derived(&self) -> DerivedApi<'_, S> {
        DerivedApi { r: self }
    }
}

/// Unsubscribe guard returned by `subscribe`. Consuming it detaches the handler;
/// dropping it leaves the subscription in place.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.cancel.take() {
            f();
        }
    }
}

/// Initial configuration for [`Reducer::with_options`].
pub struct ReducerOptions<S: Backing> {
    pub data: Option<S>,
    pub filters: Vec<Filter<S::Value>>,
    pub sort: Option<Sort<S::Value>>,
}

impl<S: Backing> Default for ReducerOptions<S> {
    fn default() -> Self {
        Self {
            data: None,
            filters: Vec::new(),
            sort: None,
        }
    }
}

impl<S: Backing> ReducerOptions<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, data: S) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_filters(mut self, filters: Vec<Filter<S::Value>>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort: Sort<S::Value>) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Filter API, scoped to a borrow of the owning reducer.
pub struct FiltersApi<'a, S: Backing> {
    r: &'a Reducer<S>,
}

impl<S: Backing> FiltersApi<'_, S> {
    pub fn len(&self) -> usize {
        self.r.core.borrow().filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.core.borrow().filters.is_empty()
    }

    pub fn add(&self, filter: Filter<S::Value>) -> Result<(), ReducerError> {
        self.add_all(vec![filter])
    }

    pub fn add_fn(&self, f: impl Fn(&S::Value) -> bool + 'static) -> Result<(), ReducerError> {
        self.add(Filter::new(f))
    }

    /// Adds a batch of filters atomically: the whole batch is validated before any
    /// entry is committed.
    ///
    /// Live filters are subscribed immediately after commit, then one forced update
    /// covers the whole batch.
    pub fn add_all(&self, filters: Vec<Filter<S::Value>>) -> Result<(), ReducerError> {
        if filters.is_empty() {
            return Ok(());
        }
        let added = filters.len();
        let mut live = Vec::new();
        {
            let mut core = self.r.core.borrow_mut();
            if core.destroyed {
                return Err(ReducerError::Destroyed);
            }
            core.filters.validate_batch(&filters)?;
            for f in filters {
                if let Some(sub) = f.subscribe_fn() {
                    live.push((f.ptr_key(), sub));
                }
                core.filters.insert(f);
            }
        }
        rdebug!(added, live = live.len(), "filters added");
        for (key, sub) in live {
            let unsub = sub(self.r.notify_fn());
            self.r.core.borrow_mut().filters.track(key, unsub);
        }
        self.r.update(true);
        Ok(())
    }

    /// Removes the entry registered for this exact predicate `Rc`.
    pub fn remove(&self, predicate: &FilterFn<S::Value>) {
        let key = Rc::as_ptr(predicate) as *const () as usize;
        self.remove_where(move |f| f.ptr_key() == key);
    }

    /// Removes every entry for which `pred(id, weight)` returns true.
    pub fn remove_by(&self, pred: impl Fn(Option<&str>, f64) -> bool) {
        self.remove_where(move |f| pred(f.id(), f.weight()));
    }

    pub fn remove_by_id(&self, id: &str) {
        self.remove_by_ids(&[id]);
    }

    pub fn remove_by_ids(&self, ids: &[&str]) {
        self.remove_where(move |f| f.id().is_some_and(|fid| ids.contains(&fid)));
    }

    fn remove_where(&self, pred: impl Fn(&Filter<S::Value>) -> bool) {
        let (removed, unsubs) = {
            let mut core = self.r.core.borrow_mut();
            core.filters.remove_where(pred)
        };
        for u in unsubs {
            u();
        }
        if removed > 0 {
            rdebug!(removed, "filters removed");
            self.r.update(true);
        }
    }

    /// Removes all filters and notifies unconditionally.
    pub fn clear(&self) {
        let unsubs = { self.r.core.borrow_mut().filters.clear() };
        for u in unsubs {
            u();
        }
        self.r.update(true);
    }

    /// Visits each registered filter in evaluation order.
    pub fn for_each(&self, mut f: impl FnMut(&Filter<S::Value>)) {
        self.r.core.borrow().filters.for_each(&mut f);
    }
}

/// Sort API, scoped to a borrow of the owning reducer.
pub struct SortApi<'a, S: Backing> {
    r: &'a Reducer<S>,
}

impl<S: Backing> SortApi<'_, S> {
    pub fn is_set(&self) -> bool {
        self.r.core.borrow().sort.is_set()
    }

    pub fn set(&self, sort: Sort<S::Value>) -> Result<(), ReducerError> {
        let sub = sort.subscribe_fn();
        let old_unsub = {
            let mut core = self.r.core.borrow_mut();
            if core.destroyed {
                return Err(ReducerError::Destroyed);
            }
            core.sort.set(sort)
        };
        if let Some(u) = old_unsub {
            u();
        }
        if let Some(sub) = sub {
            let unsub = sub(self.r.notify_fn());
            self.r.core.borrow_mut().sort.track(unsub);
        }
        // One forced update regardless of a live subscription, matching filter
        // registration; a subscription firing on subscribe coalesces by hash.
        self.r.update(true);
        Ok(())
    }

    pub fn set_fn(
        &self,
        compare: impl Fn(&S::Value, &S::Value) -> core::cmp::Ordering + 'static,
    ) -> Result<(), ReducerError> {
        self.set(Sort::new(compare))
    }

    pub fn clear(&self) {
        let unsub = { self.r.core.borrow_mut().sort.clear() };
        if let Some(u) = unsub {
            u();
        }
        self.r.update(true);
    }
}

/// Read access to the computed index.
pub struct IndexApi<'a, S: Backing> {
    r: &'a Reducer<S>,
}

impl<S: Backing> IndexApi<'_, S> {
    /// True when a filter, a sort, or an active parent index is in effect.
    pub fn active(&self) -> bool {
        self.r.core.borrow().state.borrow().active
    }

    /// The order-sensitive hash of the current index, when one is materialized.
    pub fn hash(&self) -> Option<u64> {
        self.r.core.borrow().state.borrow().hash
    }

    /// Length of the materialized index; `None` when pass-through.
    pub fn len(&self) -> Option<usize> {
        self.r
            .core
            .borrow()
            .state
            .borrow()
            .index
            .as_ref()
            .map(Vec::len)
    }

    /// Visits surviving keys in reduced order, respecting `reversed`.
    pub fn for_each_key(&self, mut f: impl FnMut(&S::Key)) {
        self.r.for_each_with_key(|k, _| f(k));
    }

    pub fn update(&self, force: bool) {
        self.r.update(force);
    }
}

/// Options for creating a derived reducer.
pub struct DerivedOptions<T> {
    pub name: String,
    pub filters: Vec<Filter<T>>,
    pub sort: Option<Sort<T>>,
}

impl<T> DerivedOptions<T> {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: Vec::new(),
            sort: None,
        }
    }

    pub fn with_filters(mut self, filters: Vec<Filter<T>>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort: Sort<T>) -> Self {
        self.sort = Some(sort);
        self
    }
}

impl<T> From<&str> for DerivedOptions<T> {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl<T> From<String> for DerivedOptions<T> {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

/// Derived-reducer management, scoped to a borrow of the owning reducer.
pub struct DerivedApi<'a, S: Backing> {
    r: &'a Reducer<S>,
}

impl<S: Backing> DerivedApi<'_, S> {
    /// Creates (or replaces) a named derived reducer reading through this reducer's
    /// index.
    ///
    /// An existing entry under the same name is destroyed before being replaced.
    pub fn create(
        &self,
        options: impl Into<DerivedOptions<S::Value>>,
    ) -> Result<DerivedReducer<S>, ReducerError> {
        let opts = options.into();
        if opts.name.is_empty() {
            return Err(ReducerError::EmptyDerivedName);
        }
        let (slot, state) = {
            let core = self.r.core.borrow();
            if core.destroyed || core.derived.destroyed() {
                return Err(ReducerError::Destroyed);
            }
            match &core.data {
                Some(slot) => (slot.clone(), core.state.clone()),
                None => return Err(ReducerError::Destroyed),
            }
        };

        let child = Reducer::from_parts(Some(slot), Some(state));
        {
            // Validate before touching the registry so a bad batch leaves the
            // previous entry untouched.
            let core = child.core.borrow();
            core.filters.validate_batch(&opts.filters)?;
        }

        let old = { self.r.core.borrow_mut().derived.remove(&opts.name) };
        if let Some(old) = old {
            rdebug!(name = %opts.name, "replacing derived reducer");
            old.destroy();
        }

        let derived = DerivedReducer {
            inner: child.clone(),
        };
        if !opts.filters.is_empty() {
            derived.filters().add_all(opts.filters)?;
        }
        if let Some(sort) = opts.sort {
            derived.sort().set(sort)?;
        }
        child.update(true);
        self.r
            .core
            .borrow_mut()
            .derived
            .insert(opts.name, child);
        Ok(derived)
    }

    pub fn get(&self, name: &str) -> Result<Option<DerivedReducer<S>>, ReducerError> {
        let core = self.r.core.borrow();
        if core.derived.destroyed() {
            return Err(ReducerError::Destroyed);
        }
        Ok(core
            .derived
            .get(name)
            .map(|inner| DerivedReducer { inner }))
    }

    /// Destroys and removes the named entry; reports whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool, ReducerError> {
        let removed = {
            let mut core = self.r.core.borrow_mut();
            if core.derived.destroyed() {
                return Err(ReducerError::Destroyed);
            }
            core.derived.remove(name)
        };
        match removed {
            Some(child) => {
                child.destroy();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Destroys and removes every entry. No-op after destroy.
    pub fn clear(&self) {
        let children = {
            let mut core = self.r.core.borrow_mut();
            if core.derived.destroyed() {
                return;
            }
            core.derived.take_all()
        };
        for c in children {
            c.destroy();
        }
    }

    /// Fans a forced/unforced index update out to every derived child. No-op after
    /// destroy.
    pub fn update(&self, force: bool) {
        let children = {
            let core = self.r.core.borrow();
            if core.derived.destroyed() {
                return;
            }
            core.derived.children()
        };
        for c in children {
            c.update(force);
        }
    }
}

/// A reducer chained off a parent's already-filtered index.
///
/// Shares the parent's backing store without copying; adds its own filters and sort on
/// top of what the parent's index lets through. Exposes the read surface of
/// [`Reducer`] minus `set_data`.
pub struct DerivedReducer<S: Backing> {
    inner: Reducer<S>,
}

impl<S: Backing> Clone for DerivedReducer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Backing> core::fmt::Debug for DerivedReducer<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DerivedReducer")
            .field("len", &self.len())
            .field("destroyed", &self.destroyed())
            .finish_non_exhaustive()
    }
}

impl<S: Backing> DerivedReducer<S> {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn reversed(&self) -> bool {
        self.inner.reversed()
    }

    pub fn set_reversed(&self, reversed: bool) {
        self.inner.set_reversed(reversed);
    }

    pub fn destroyed(&self) -> bool {
        self.inner.destroyed()
    }

    pub fn for_each(&self, f: impl FnMut(&S::Value)) {
        self.inner.for_each(f);
    }

    pub fn for_each_with_key(&self, f: impl FnMut(&S::Key, &S::Value)) {
        self.inner.for_each_with_key(f);
    }

    pub fn to_vec(&self) -> Vec<S::Value>
    where
        S::Value: Clone,
    {
        self.inner.to_vec()
    }

    pub fn filters(&self) -> FiltersApi<'_, S> {
        self.inner.filters()
    }

    pub fn sort(&self) -> SortApi<'_, S> {
        self.inner.sort()
    }

    pub fn index(&self) -> IndexApi<'_, S> {
        self.inner.index()
    }

    pub fn derived(&self) -> DerivedApi<'_, S> {
        self.inner.derived()
    }

    pub fn update(&self, force: bool) {
        self.inner.update(force);
    }

    pub fn destroy(&self) {
        self.inner.destroy();
    }

    pub fn subscribe(&self, handler: Rc<dyn Fn(&DerivedReducer<S>)>) -> Subscription {
        let key = Rc::as_ptr(&handler) as *const () as usize;
        let wrapped: Rc<dyn Fn(&Reducer<S>)> = Rc::new(move |r| {
            handler(&DerivedReducer { inner: r.clone() });
        });
        self.inner.subscribe_keyed(key, wrapped)
    }
}
