//! Grid slots and their binding lifecycle

use crate::cctv::CctvId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Opaque reference to a physical capture device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap a host device reference
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binding state of a slot
///
/// `Unbound → Binding → {Bound, Empty}`, and `Bound → Empty` when the stream ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// Created, no device assigned yet
    Unbound,
    /// Stream acquisition in flight
    Binding,
    /// Live stream attached
    Bound,
    /// Placeholder shown (no device, failed bind or ended stream)
    Empty,
}

impl SlotState {
    /// Whether moving to `next` is a legal transition
    pub fn can_transition_to(self, next: SlotState) -> bool {
        use SlotState::*;
        matches!(
            (self, next),
            (Unbound, Binding) | (Unbound, Empty) | (Binding, Bound) | (Binding, Empty) | (Bound, Empty)
        )
    }

    /// Whether the slot has settled (no bind outstanding)
    pub fn is_settled(self) -> bool {
        matches!(self, SlotState::Bound | SlotState::Empty)
    }
}

/// One grid position mapped to a stable camera identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraSlot {
    index: usize,
    cctv_id: CctvId,
    device_id: Option<DeviceId>,
    state: SlotState,
    highlighted: bool,
    visible: bool,
}

impl CameraSlot {
    /// Create an unbound slot for grid position `index`
    pub fn new(index: usize) -> Self {
        Self {
            index,
            cctv_id: CctvId::from_slot_index(index),
            device_id: None,
            state: SlotState::Unbound,
            highlighted: false,
            visible: true,
        }
    }

    /// Grid position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Camera identifier
    pub fn cctv_id(&self) -> &CctvId {
        &self.cctv_id
    }

    /// Device assigned to this slot, if any
    pub fn device_id(&self) -> Option<&DeviceId> {
        self.device_id.as_ref()
    }

    /// Current binding state
    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Whether a live stream is attached
    pub fn is_bound(&self) -> bool {
        self.state == SlotState::Bound
    }

    /// Whether the slot shows its placeholder
    pub fn is_empty(&self) -> bool {
        self.state == SlotState::Empty
    }

    /// Whether the slot carries the highlight
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Whether the slot is currently shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Assign a device and start binding.
    ///
    /// Returns `false` if the slot already had a device this session or is not
    /// `Unbound`; the slot is left untouched in that case.
    pub fn begin_binding(&mut self, device_id: DeviceId) -> bool {
        if self.device_id.is_some() || !self.state.can_transition_to(SlotState::Binding) {
            return false;
        }
        debug!("{}: binding device {}", self.cctv_id, device_id);
        self.device_id = Some(device_id);
        self.state = SlotState::Binding;
        true
    }

    /// Stream acquisition succeeded
    pub fn mark_bound(&mut self) -> bool {
        self.transition(SlotState::Bound)
    }

    /// No device, failed bind, or stream ended
    pub fn mark_empty(&mut self) -> bool {
        self.transition(SlotState::Empty)
    }

    pub(crate) fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Show or hide the slot
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn transition(&mut self, next: SlotState) -> bool {
        if !self.state.can_transition_to(next) {
            debug!(
                "{}: ignoring transition {:?} -> {:?}",
                self.cctv_id, self.state, next
            );
            return false;
        }
        self.state = next;
        true
    }
}
