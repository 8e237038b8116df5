//! Selection state of a grid

use crate::cctv::CctvId;

/// Highlight and focus of a single grid instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Slot carrying the highlight (single click)
    pub highlighted_index: Option<usize>,
    /// Camera last focused (double click, confirmed navigation)
    pub focused_cctv_id: Option<CctvId>,
}

impl SelectionState {
    /// Drop highlight and focus
    pub fn clear(&mut self) {
        self.highlighted_index = None;
        self.focused_cctv_id = None;
    }
}
