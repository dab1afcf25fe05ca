//! Name-keyed registry of derived reducers chained off a parent index.

use indexmap::IndexMap;

use crate::Backing;
use crate::reducer::Reducer;

pub(crate) struct DerivedRegistry<S: Backing> {
    children: IndexMap<String, Reducer<S>>,
    destroyed: bool,
}

impl<S: Backing> Default for DerivedRegistry<S> {
    fn default() -> Self {
        Self {
            children: IndexMap::new(),
            destroyed: false,
        }
    }
}

impl<S: Backing> DerivedRegistry<S> {
    pub(crate) fn destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn get(&self, name: &str) -> Option<Reducer<S>> {
        self.children.get(name).cloned()
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Reducer<S>> {
        self.children.shift_remove(name)
    }

    pub(crate) fn insert(&mut self, name: String, child: Reducer<S>) {
        self.children.insert(name, child);
    }

    pub(crate) fn children(&self) -> Vec<Reducer<S>> {
        self.children.values().cloned().collect()
    }

    pub(crate) fn take_all(&mut self) -> Vec<Reducer<S>> {
        self.children.drain(..).map(|(_, c)| c).collect()
    }

    /// Empties the registry and permanently marks it destroyed.
    pub(crate) fn destroy_take(&mut self) -> Vec<Reducer<S>> {
        self.destroyed = true;
        self.take_all()
    }
}
