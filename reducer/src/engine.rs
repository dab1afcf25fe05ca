//! Index recomputation: which backing-store keys survive filtering, in what order,
//! and whether the result warrants notifying subscribers.

use core::cmp::Ordering;
use std::cell::RefCell;
use std::rc::Rc;

use crate::Backing;
use crate::hash;
use crate::reducer::Core;

/// The materialized reduction of one reducer.
///
/// `index == None` means pass-through: no filter, no sort, no active parent, so
/// iteration walks the backing store directly and nothing is allocated.
pub(crate) struct IndexState<K> {
    pub(crate) index: Option<Vec<K>>,
    pub(crate) hash: Option<u64>,
    pub(crate) active: bool,
}

impl<K> Default for IndexState<K> {
    fn default() -> Self {
        Self {
            index: None,
            hash: None,
            active: false,
        }
    }
}

pub(crate) type SharedIndexState<K> = Rc<RefCell<IndexState<K>>>;

/// Recomputes the index from scratch and stores it.
///
/// Returns whether subscribers must be notified: `force`, a hash change, or an
/// element-wise difference under colliding hashes.
pub(crate) fn refresh<S: Backing>(core: &mut Core<S>, force: bool) -> bool {
    let have_filters = !core.filters.is_empty();
    let have_sort = core.sort.is_set();

    let parent = core.parent_state.clone();
    let parent_ref = parent.as_ref().map(|p| p.borrow());
    let parent_active = parent_ref.as_deref().is_some_and(|p| p.active);

    let data = core.data_cell();
    let data_ref = data.as_ref().map(|d| d.borrow());
    let data_ref = data_ref.as_deref();

    let mut next: Option<Vec<S::Key>> = None;

    if have_filters {
        let mut out = Vec::new();
        if let Some(d) = data_ref {
            let parent_index = parent_ref
                .as_deref()
                .filter(|p| p.active)
                .and_then(|p| p.index.as_ref());
            match parent_index {
                // The parent already reduced the key space; only re-test its survivors.
                Some(pidx) => {
                    for key in pidx {
                        if d.get(key).is_some_and(|v| core.filters.test(v)) {
                            out.push(key.clone());
                        }
                    }
                }
                None => {
                    d.for_each_key(&mut |k| {
                        if d.get(k).is_some_and(|v| core.filters.test(v)) {
                            out.push(k.clone());
                        }
                    });
                }
            }
        }
        next = Some(out);
    }

    // No own filtering, but an active parent: inherit its index verbatim.
    if next.is_none() && parent_active {
        next = parent_ref.as_deref().and_then(|p| p.index.clone());
    }

    if have_sort {
        let mut keys = match next.take() {
            Some(keys) => keys,
            None => {
                let mut all = Vec::new();
                if let Some(d) = data_ref {
                    d.for_each_key(&mut |k| all.push(k.clone()));
                }
                all
            }
        };
        if let Some(d) = data_ref {
            // The comparator sees values, not keys.
            keys.sort_by(|a, b| match (d.get(a), d.get(b)) {
                (Some(x), Some(y)) => core.sort.compare(x, y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        next = Some(keys);
    }

    let active = have_filters || have_sort || parent_active;
    let new_hash = next.as_deref().map(hash::index_hash);

    let mut st = core.state.borrow_mut();
    let changed = hash::index_changed(
        st.index.as_deref(),
        st.hash,
        next.as_deref(),
        new_hash,
    );
    rtrace!(
        active,
        changed,
        force,
        len = next.as_ref().map_or(0, Vec::len),
        "index refresh"
    );
    st.index = next;
    st.hash = new_hash;
    st.active = active;

    force || changed
}
