//! Slot table owned by a grid controller
//!
//! The table is the single place where slot records and selection live. It is
//! mutated only by its owner, so no locking is involved.

use crate::cctv::CctvId;
use crate::error::{CamwallError, CamwallResult};
use crate::selection::SelectionState;
use crate::slot::{CameraSlot, DeviceId, SlotState};

/// Fixed-size set of camera slots plus selection
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    slots: Vec<CameraSlot>,
    selection: SelectionState,
}

impl SlotTable {
    /// Create `slot_count` unbound slots with ids `CCTV1..=CCTV{slot_count}`
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: (0..slot_count).map(CameraSlot::new).collect(),
            selection: SelectionState::default(),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in index order
    pub fn slots(&self) -> &[CameraSlot] {
        &self.slots
    }

    /// Slot at `index`
    pub fn get(&self, index: usize) -> CamwallResult<&CameraSlot> {
        let slot_count = self.slots.len();
        self.slots
            .get(index)
            .ok_or(CamwallError::InvalidSlotIndex { index, slot_count })
    }

    /// Mutable slot at `index`
    pub fn get_mut(&mut self, index: usize) -> CamwallResult<&mut CameraSlot> {
        let slot_count = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(CamwallError::InvalidSlotIndex { index, slot_count })
    }

    /// Index of the slot for `cctv_id`
    pub fn index_of(&self, cctv_id: &CctvId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.cctv_id() == cctv_id)
    }

    /// Index of the slot holding `device_id`
    pub fn index_of_device(&self, device_id: &DeviceId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.device_id() == Some(device_id))
    }

    /// Camera ids in slot order
    pub fn cctv_ids(&self) -> Vec<CctvId> {
        self.slots.iter().map(|slot| slot.cctv_id().clone()).collect()
    }

    /// Resolve a slot index to its camera id
    pub fn cctv_id_at(&self, index: usize) -> CamwallResult<CctvId> {
        self.get(index).map(|slot| slot.cctv_id().clone())
    }

    /// Highlight `index` and clear every other slot's highlight
    pub fn highlight(&mut self, index: usize) -> CamwallResult<()> {
        // Validate before touching anything so a stale index leaves state intact.
        self.get(index)?;
        for slot in &mut self.slots {
            slot.set_highlighted(slot.index() == index);
        }
        self.selection.highlighted_index = Some(index);
        Ok(())
    }

    /// Show only the slot for `cctv_id`
    pub fn show_only(&mut self, cctv_id: &CctvId) -> CamwallResult<()> {
        if self.index_of(cctv_id).is_none() {
            return Err(CamwallError::UnknownCamera {
                cctv_id: cctv_id.to_string(),
            });
        }
        for slot in &mut self.slots {
            let visible = slot.cctv_id() == cctv_id;
            slot.set_visible(visible);
        }
        Ok(())
    }

    /// Make every slot visible again
    pub fn show_all(&mut self) {
        for slot in &mut self.slots {
            slot.set_visible(true);
        }
    }

    /// Record a confirmed focus
    pub fn set_focused(&mut self, cctv_id: CctvId) {
        self.selection.focused_cctv_id = Some(cctv_id);
    }

    /// Current selection
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Number of slots in `state`
    pub fn count_in(&self, state: SlotState) -> usize {
        self.slots.iter().filter(|slot| slot.state() == state).count()
    }

    /// Drop every slot along with highlight and focus
    pub fn clear(&mut self) {
        self.slots.clear();
        self.selection.clear();
    }
}
