//! Fixed-capacity positional storage shared by invaders and towers.

use lane_defence_core::LANE_LENGTH;

/// One occupant slot per lane position. Indices beyond the lane read as empty
/// and ignore writes.
#[derive(Clone, Debug)]
pub(crate) struct Lane<T> {
    slots: Vec<Option<T>>,
}

impl<T> Lane<T> {
    /// Creates an empty lane.
    pub(crate) fn new() -> Self {
        Self {
            slots: (0..LANE_LENGTH).map(|_| None).collect(),
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub(crate) fn is_occupied(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Stores `occupant` at `index`, replacing whatever was there.
    pub(crate) fn set(&mut self, index: usize, occupant: T) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(occupant);
        }
    }

    /// Empties the slot at `index`, returning its former occupant.
    pub(crate) fn clear(&mut self, index: usize) -> Option<T> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Occupied slots ordered from the spawn end to the far end.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }
}
