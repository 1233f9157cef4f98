//! Navigable element index
//!
//! The ordered list of elements the simulated reader can land on, built
//! by one pre-order scan, plus a cursor that wraps at both ends.

use crate::document::Document;
use crate::navigability::is_navigable;
use crate::Result;
use ego_tree::NodeId;
use serde::Serialize;
use tracing::debug;

/// Which boundary the last cursor move crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapState {
    #[default]
    None,
    /// Moved forward past the last element back to the first
    WrappedToStart,
    /// Moved backward past the first element to the last
    WrappedToEnd,
}

impl WrapState {
    /// Short notice for the user, if the cursor wrapped
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            WrapState::None => None,
            WrapState::WrappedToStart => Some("wrapped to start"),
            WrapState::WrappedToEnd => Some("wrapped to end"),
        }
    }
}

/// Summary of one document scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScanReport {
    /// Elements visited
    pub scanned: usize,
    /// Elements added to the index
    pub navigable: usize,
    /// Elements given a synthetic `tabindex="-1"`
    pub marked_focusable: usize,
}

/// Position reached after `step` moves from `start` over `len` slots,
/// wrapping at both ends. With no start, forward begins at the first slot
/// and backward at the last.
pub(crate) fn cycle_position(start: Option<usize>, len: usize, step: usize, backwards: bool) -> usize {
    match (start, backwards) {
        (Some(s), false) => (s + step) % len,
        (Some(s), true) => (s + len - step % len) % len,
        (None, false) => (step - 1) % len,
        (None, true) => len - 1 - (step - 1) % len,
    }
}

/// Ordered navigable elements with a wrapping cursor
#[derive(Debug, Clone, Default)]
pub struct NavigableIndex {
    elements: Vec<NodeId>,
    cursor: Option<usize>,
    wrap: WrapState,
}

impl NavigableIndex {
    /// An empty index with the cursor unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the descendants of `root`, replacing the whole index.
    ///
    /// Elements that need synthetic focusability get `tabindex="-1"` on the
    /// document. If `root` cannot be scanned, neither the index nor the
    /// document is touched.
    pub fn rebuild(&mut self, doc: &mut Document, root: NodeId) -> Result<ScanReport> {
        let candidates = doc.descendant_elements(root)?;

        let mut elements = Vec::new();
        let mut to_mark = Vec::new();
        for &id in &candidates {
            let navigability = is_navigable(doc, id);
            if navigability.focusable_needed {
                to_mark.push(id);
            }
            if navigability.navigable {
                elements.push(id);
            }
        }

        for &id in &to_mark {
            doc.set_attr(id, "tabindex", "-1")?;
        }

        let report = ScanReport {
            scanned: candidates.len(),
            navigable: elements.len(),
            marked_focusable: to_mark.len(),
        };
        debug!(
            "Scanned {} elements: {} navigable, {} marked focusable",
            report.scanned, report.navigable, report.marked_focusable
        );

        self.elements = elements;
        self.cursor = None;
        self.wrap = WrapState::None;
        Ok(report)
    }

    /// Navigable elements in scan order
    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Cursor position, `None` before the first move
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn wrap_state(&self) -> WrapState {
        self.wrap
    }

    /// Position of an element in the index
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.elements.iter().position(|&el| el == id)
    }

    /// Advance the cursor, wrapping from the last element to the first
    pub fn next_node(&mut self) -> Option<NodeId> {
        if self.elements.is_empty() {
            return None;
        }
        let last = self.elements.len() - 1;
        let next = match self.cursor {
            None => {
                self.wrap = WrapState::None;
                0
            }
            Some(i) if i >= last => {
                self.wrap = WrapState::WrappedToStart;
                0
            }
            Some(i) => {
                self.wrap = WrapState::None;
                i + 1
            }
        };
        self.cursor = Some(next);
        debug!("Cursor -> {} ({:?})", next, self.wrap);
        Some(self.elements[next])
    }

    /// Move the cursor back, wrapping from the first element to the last
    pub fn previous_node(&mut self) -> Option<NodeId> {
        if self.elements.is_empty() {
            return None;
        }
        let last = self.elements.len() - 1;
        let previous = match self.cursor {
            None => {
                self.wrap = WrapState::None;
                last
            }
            Some(0) => {
                self.wrap = WrapState::WrappedToEnd;
                last
            }
            Some(i) => {
                self.wrap = WrapState::None;
                i - 1
            }
        };
        self.cursor = Some(previous);
        debug!("Cursor -> {} ({:?})", previous, self.wrap);
        Some(self.elements[previous])
    }

    /// The element under the cursor.
    ///
    /// When `focused` is given and is part of the index, the cursor jumps to
    /// it first; this resynchronises after the host moved focus on its own
    /// (for example through native Tab order).
    pub fn current_node(&mut self, focused: Option<NodeId>) -> Option<NodeId> {
        if let Some(position) = focused.and_then(|id| self.position(id)) {
            self.cursor = Some(position);
            self.wrap = WrapState::None;
        }
        self.peek()
    }

    /// The element under the cursor, without resynchronising
    pub fn peek(&self) -> Option<NodeId> {
        self.cursor.and_then(|i| self.elements.get(i).copied())
    }
}
