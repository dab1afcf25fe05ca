//! Generation-checked record storage.
//!
//! Controls refer to records by `RecordId` instead of holding them, so a retired slot
//! can be reused without a stale handle ever observing the new occupant.

use crate::record::TweenRecord;

/// A stable handle to one slab slot. The generation is bumped on removal, so an id
/// outliving its record simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordId {
    index: usize,
    generation: u64,
}

struct Slot {
    generation: u64,
    record: Option<TweenRecord>,
}

#[derive(Default)]
pub(crate) struct RecordSlab {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl RecordSlab {
    pub(crate) fn insert(&mut self, record: TweenRecord) -> RecordId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.record = Some(record);
                RecordId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                RecordId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<&TweenRecord> {
        self.slots
            .get(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.record.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: RecordId) -> Option<&mut TweenRecord> {
        self.slots
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.record.as_mut())
    }

    pub(crate) fn remove(&mut self, id: RecordId) -> Option<TweenRecord> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation)?;
        let record = slot.record.take()?;
        slot.generation += 1;
        self.free.push(id.index);
        Some(record)
    }
}
