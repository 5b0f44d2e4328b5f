//! Frame Entropy Context Store.
//!
//! Holds the working context of the frame being coded, `K` addressable
//! slots the entropy coder reads and writes across frames, and a defaults
//! snapshot. Every reset or copy moves a whole [`FrameEntropyContext`];
//! there is no per-table reset.

use crate::context::FrameEntropyContext;
use framestate_core::{AllocBudget, FrameStateError, Result};
use tracing::{debug, info};

/// Address of a snapshot in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextSlot {
    /// One of the `K` addressable slots.
    Frame(u8),
    /// The reserved defaults snapshot.
    Defaults,
}

/// Owner of every probability-context snapshot of a session.
pub struct EntropyContextStore {
    working: Box<FrameEntropyContext>,
    slots: Vec<FrameEntropyContext>,
    defaults: Box<FrameEntropyContext>,
}

impl EntropyContextStore {
    /// Create a store with `num_slots` addressable slots, all seeded from the
    /// static defaults for `base_qindex`.
    pub fn new(num_slots: usize, base_qindex: u8, budget: &AllocBudget) -> Result<Self> {
        if num_slots > usize::from(u8::MAX) {
            return Err(FrameStateError::InvalidParameter(format!(
                "{num_slots} entropy context slots exceeds 255"
            )));
        }
        let initial = FrameEntropyContext::boxed(base_qindex);
        let mut slots: Vec<FrameEntropyContext> =
            budget.zeroed_vec(num_slots, "entropy context slots")?;
        slots.fill(*initial);

        info!(
            num_slots,
            bytes_per_context = std::mem::size_of::<FrameEntropyContext>(),
            "Created entropy context store"
        );
        Ok(Self {
            working: initial.clone(),
            slots,
            defaults: initial,
        })
    }

    /// Number of addressable slots, `K`.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Context of the frame being coded.
    #[inline]
    pub fn working(&self) -> &FrameEntropyContext {
        &self.working
    }

    /// Mutable context of the frame being coded.
    #[inline]
    pub fn working_mut(&mut self) -> &mut FrameEntropyContext {
        &mut self.working
    }

    /// The defaults baseline.
    #[inline]
    pub fn defaults(&self) -> &FrameEntropyContext {
        &self.defaults
    }

    /// Overwrite the working context with the defaults snapshot.
    pub fn reset_to_defaults(&mut self) {
        *self.working = *self.defaults;
        debug!("Working entropy context reset to defaults");
    }

    /// Make the working context the new defaults baseline.
    pub fn snapshot_as_defaults(&mut self) {
        *self.defaults = *self.working;
        debug!("Captured working entropy context as defaults");
    }

    /// Copy the working context into every addressable slot.
    pub fn fan_out_to_all_slots(&mut self) {
        self.slots.fill(*self.working);
        debug!(num_slots = self.slots.len(), "Fanned working entropy context out to all slots");
    }

    /// Snapshot at `slot`.
    pub fn get_slot(&self, slot: ContextSlot) -> Result<&FrameEntropyContext> {
        match slot {
            ContextSlot::Defaults => Ok(&self.defaults),
            ContextSlot::Frame(index) => {
                let len = self.slots.len();
                self.slots
                    .get(usize::from(index))
                    .ok_or_else(|| out_of_range(index, len))
            }
        }
    }

    /// Mutable snapshot at `slot`.
    pub fn get_slot_mut(&mut self, slot: ContextSlot) -> Result<&mut FrameEntropyContext> {
        match slot {
            ContextSlot::Defaults => Ok(&mut self.defaults),
            ContextSlot::Frame(index) => {
                let len = self.slots.len();
                self.slots
                    .get_mut(usize::from(index))
                    .ok_or_else(|| out_of_range(index, len))
            }
        }
    }

    /// Overwrite the snapshot at `slot` with `context`.
    pub fn copy_into(&mut self, slot: ContextSlot, context: &FrameEntropyContext) -> Result<()> {
        *self.get_slot_mut(slot)? = *context;
        Ok(())
    }

    /// Store the working context into `slot`.
    pub fn save_working_to(&mut self, slot: ContextSlot) -> Result<()> {
        let working = *self.working;
        self.copy_into(slot, &working)
    }

    /// Load the snapshot at `slot` into the working context.
    pub fn load_working_from(&mut self, slot: ContextSlot) -> Result<()> {
        let source = *self.get_slot(slot)?;
        *self.working = source;
        Ok(())
    }

    /// Reload the working context from the static tables for `base_qindex`.
    ///
    /// The defaults snapshot is left alone until
    /// [`setup_frame_contexts`](Self::setup_frame_contexts) captures it.
    pub fn load_static_defaults(&mut self, base_qindex: u8) {
        *self.working = FrameEntropyContext::new(base_qindex);
        debug!(base_qindex, "Loaded static entropy defaults into working context");
    }

    /// Capture the working context as defaults and, in large-scale-tile
    /// mode, seed every slot from it so all tiles start identically.
    pub fn setup_frame_contexts(&mut self, large_scale_tile: bool) {
        self.snapshot_as_defaults();
        if large_scale_tile {
            self.fan_out_to_all_slots();
        }
    }
}

impl std::fmt::Debug for EntropyContextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyContextStore")
            .field("num_slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

fn out_of_range(index: u8, len: usize) -> FrameStateError {
    FrameStateError::InvalidParameter(format!(
        "entropy context slot {index} out of range (have {len})"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(slots: usize) -> EntropyContextStore {
        EntropyContextStore::new(slots, 0, &AllocBudget::default()).unwrap()
    }

    /// Scribble on a few tables so the context differs from every default.
    fn adapt(fc: &mut FrameEntropyContext, seed: u16) {
        fc.skip[0][0] = seed;
        fc.partition[7][2] = seed.wrapping_add(1);
        fc.coef.coeff_base[2][1][40][1] = seed.wrapping_add(2);
        fc.nmv.comps[1].bits[9][0] = seed.wrapping_add(3);
    }

    #[test]
    fn test_new_seeds_every_snapshot() {
        let store = store(8);
        assert_eq!(store.num_slots(), 8);
        assert_eq!(*store.working(), *store.defaults());
        for i in 0..8 {
            assert_eq!(*store.get_slot(ContextSlot::Frame(i)).unwrap(), *store.defaults());
        }
    }

    #[test]
    fn test_reset_to_defaults_is_byte_identical() {
        let mut store = store(2);
        adapt(store.working_mut(), 1234);
        assert_ne!(store.working().as_bytes(), store.defaults().as_bytes());

        store.reset_to_defaults();
        assert_eq!(store.working().as_bytes(), store.defaults().as_bytes());
    }

    #[test]
    fn test_snapshot_as_defaults() {
        let mut store = store(2);
        adapt(store.working_mut(), 77);
        store.snapshot_as_defaults();
        assert_eq!(store.defaults().skip[0][0], 77);

        store.working_mut().skip[0][0] = 5;
        store.reset_to_defaults();
        assert_eq!(store.working().skip[0][0], 77);
    }

    #[test]
    fn test_fan_out_makes_all_slots_identical() {
        let mut store = store(8);
        adapt(store.get_slot_mut(ContextSlot::Frame(3)).unwrap(), 9);
        adapt(store.working_mut(), 4000);

        store.fan_out_to_all_slots();
        for i in 0..8 {
            let slot = store.get_slot(ContextSlot::Frame(i)).unwrap();
            assert_eq!(slot.as_bytes(), store.working().as_bytes());
        }
    }

    #[test]
    fn test_setup_without_large_scale_tile_keeps_slots() {
        let mut store = store(4);
        adapt(store.get_slot_mut(ContextSlot::Frame(1)).unwrap(), 11);
        store.load_static_defaults(200);

        store.setup_frame_contexts(false);
        assert_eq!(*store.defaults(), FrameEntropyContext::new(200));
        assert_eq!(store.get_slot(ContextSlot::Frame(1)).unwrap().skip[0][0], 11);
        assert_eq!(*store.get_slot(ContextSlot::Frame(0)).unwrap(), FrameEntropyContext::new(0));
    }

    #[test]
    fn test_setup_with_large_scale_tile_fans_out() {
        let mut store = store(4);
        adapt(store.get_slot_mut(ContextSlot::Frame(1)).unwrap(), 11);
        store.load_static_defaults(200);

        store.setup_frame_contexts(true);
        for i in 0..4 {
            assert_eq!(
                *store.get_slot(ContextSlot::Frame(i)).unwrap(),
                FrameEntropyContext::new(200)
            );
        }
    }

    #[test]
    fn test_copy_and_load_round_trip_through_slot() {
        let mut store = store(3);
        let mut adapted = FrameEntropyContext::new(50);
        adapt(&mut adapted, 321);
        store.copy_into(ContextSlot::Frame(2), &adapted).unwrap();

        store.load_working_from(ContextSlot::Frame(2)).unwrap();
        assert_eq!(*store.working(), adapted);

        store.working_mut().skip[1][0] = 1;
        store.save_working_to(ContextSlot::Frame(0)).unwrap();
        assert_eq!(store.get_slot(ContextSlot::Frame(0)).unwrap().skip[1][0], 1);
    }

    #[test]
    fn test_out_of_range_slot() {
        let mut store = store(2);
        assert!(matches!(
            store.get_slot(ContextSlot::Frame(2)),
            Err(FrameStateError::InvalidParameter(_))
        ));
        let fc = FrameEntropyContext::new(0);
        assert!(store.copy_into(ContextSlot::Frame(200), &fc).is_err());
        assert!(store.load_working_from(ContextSlot::Frame(9)).is_err());
    }

    #[test]
    fn test_defaults_handle_is_addressable() {
        let mut store = store(1);
        let mut fc = FrameEntropyContext::new(255);
        adapt(&mut fc, 8);
        store.copy_into(ContextSlot::Defaults, &fc).unwrap();
        assert_eq!(*store.defaults(), fc);
        assert_eq!(*store.get_slot(ContextSlot::Defaults).unwrap(), fc);
    }

    #[test]
    fn test_slot_budget_enforced() {
        let budget = AllocBudget::new(std::mem::size_of::<FrameEntropyContext>() as u64);
        assert!(EntropyContextStore::new(1, 0, &budget).is_ok());
        assert!(matches!(
            EntropyContextStore::new(2, 0, &budget),
            Err(FrameStateError::OutOfMemory(_))
        ));
    }

    #[test]
    fn test_too_many_slots_rejected() {
        assert!(matches!(
            EntropyContextStore::new(256, 0, &AllocBudget::default()),
            Err(FrameStateError::InvalidParameter(_))
        ));
    }
}
