//! Drag-and-drop hover tracking for the upload area.
//!
//! Nested elements fire their own enter/leave pairs, so "is a file hovering
//! over the drop zone" is a depth count rather than a flag. The counter lives
//! in the session and is reset on drop, cancel, or drag end.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragCounter {
    depth: u32,
}

impl DragCounter {
    pub fn enter(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    /// Unmatched leaves are ignored.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.depth = 0;
    }

    pub fn is_active(&self) -> bool {
        self.depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_enter_leave() {
        let mut d = DragCounter::default();
        d.enter();
        d.enter();
        d.leave();
        assert!(d.is_active());
        d.leave();
        assert!(!d.is_active());
    }

    #[test]
    fn extra_leave_does_not_underflow() {
        let mut d = DragCounter::default();
        d.leave();
        d.enter();
        assert!(d.is_active());
    }

    #[test]
    fn reset_clears_depth() {
        let mut d = DragCounter::default();
        d.enter();
        d.enter();
        d.reset();
        assert!(!d.is_active());
    }
}
