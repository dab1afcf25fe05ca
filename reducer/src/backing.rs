//! Storage abstraction shared by the list and map reducers.

use core::hash::Hash;
use std::cell::RefCell;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

/// The shared cell holding one backing store. External owners keep a clone and mutate
/// it directly, then call `Reducer::update(true)` by hand.
pub type DataCell<S> = Rc<RefCell<S>>;

/// The slot a reducer and all of its derived children read the current cell through.
///
/// Replacing the data (`set_data(_, true)`) swaps the cell inside the slot, so children
/// observe the replacement without re-wiring. `None` means no backing store.
pub(crate) type DataSlot<S> = Rc<RefCell<Option<DataCell<S>>>>;

/// A reducible backing store: an ordered sequence of values addressed by keys.
///
/// Implemented for `Vec<T>` (keys are positions) and `indexmap::IndexMap<K, V>` (keys
/// iterate in insertion order).
pub trait Backing: 'static {
    type Key: Clone + Eq + Hash;
    type Value;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &Self::Key) -> Option<&Self::Value>;

    /// Visits every key in natural order.
    fn for_each_key(&self, f: &mut dyn FnMut(&Self::Key));

    /// Visits every key in reverse natural order.
    fn for_each_key_rev(&self, f: &mut dyn FnMut(&Self::Key));

    /// Visits every value in natural order.
    fn for_each_value(&self, f: &mut dyn FnMut(&Self::Value));

    /// Visits every value in reverse natural order.
    fn for_each_value_rev(&self, f: &mut dyn FnMut(&Self::Value));

    /// Non-destructive content replacement: the receiving store keeps its identity
    /// while its content is brought in line with `new`.
    fn merge_in_place(&mut self, new: Self);
}

impl<T: 'static> Backing for Vec<T> {
    type Key = usize;
    type Value = T;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, key: &usize) -> Option<&T> {
        self.as_slice().get(*key)
    }

    fn for_each_key(&self, f: &mut dyn FnMut(&usize)) {
        for i in 0..self.as_slice().len() {
            f(&i);
        }
    }

    fn for_each_key_rev(&self, f: &mut dyn FnMut(&usize)) {
        for i in (0..self.as_slice().len()).rev() {
            f(&i);
        }
    }

    fn for_each_value(&self, f: &mut dyn FnMut(&T)) {
        for v in self.iter() {
            f(v);
        }
    }

    fn for_each_value_rev(&self, f: &mut dyn FnMut(&T)) {
        for v in self.iter().rev() {
            f(v);
        }
    }

    fn merge_in_place(&mut self, new: Self) {
        // Truncate and re-push so external holders of the cell keep their view.
        self.clear();
        self.extend(new);
    }
}

impl<K, V> Backing for IndexMap<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: 'static,
{
    type Key = K;
    type Value = V;

    fn len(&self) -> usize {
        IndexMap::len(self)
    }

    fn get(&self, key: &K) -> Option<&V> {
        IndexMap::get(self, key)
    }

    fn for_each_key(&self, f: &mut dyn FnMut(&K)) {
        for k in self.keys() {
            f(k);
        }
    }

    fn for_each_key_rev(&self, f: &mut dyn FnMut(&K)) {
        for k in self.keys().rev() {
            f(k);
        }
    }

    fn for_each_value(&self, f: &mut dyn FnMut(&V)) {
        for v in self.values() {
            f(v);
        }
    }

    fn for_each_value_rev(&self, f: &mut dyn FnMut(&V)) {
        for v in self.values().rev() {
            f(v);
        }
    }

    fn merge_in_place(&mut self, new: Self) {
        // Diff-merge: set every incoming key, then drop every key absent from `new`.
        // Updated keys keep their original insertion position.
        let keep: IndexSet<K> = new.keys().cloned().collect();
        for (k, v) in new {
            self.insert(k, v);
        }
        self.retain(|k, _| keep.contains(k));
    }
}
