//! The animated-target contract.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

/// One batch of named numeric properties. Insertion order is preserved so a target can
/// rely on the order its keys were requested in.
pub type Props = IndexMap<String, f64>;

/// Anything with named numeric properties that a tween can read and write.
///
/// `set` receives one batched map per frame: a single atomic update covering every
/// animated key, never per-key writes.
pub trait Positionable {
    /// Writes the target's current property values into `out`.
    fn get(&self, out: &mut Props);

    /// Applies one frame's batch of property values.
    fn set(&mut self, data: &Props);

    /// Whether the target can currently be positioned. A target answering `false` is
    /// skipped at schedule time.
    fn positionable(&self) -> bool {
        true
    }
}

/// A shared animated target. Identity is pointer identity (`Rc::ptr_eq`).
pub type Target = Rc<RefCell<dyn Positionable>>;

pub(crate) fn same_target(a: &Target, b: &Target) -> bool {
    Rc::ptr_eq(a, b)
}

/// Reads the current values of `keys` from a target. Keys the target does not report
/// are absent from the result.
pub(crate) fn snapshot(target: &Target, keys: impl Iterator<Item = impl AsRef<str>>) -> Props {
    let mut all = Props::new();
    target.borrow().get(&mut all);
    let mut out = Props::new();
    for key in keys {
        let key = key.as_ref();
        if let Some(v) = all.get(key) {
            out.insert(key.to_string(), *v);
        }
    }
    out
}
