use std::collections::BTreeSet;

use crate::MessageId;

/// Per-message expanded/collapsed flags for source lists.
///
/// Keyed by message identity so that re-ordering or filtering the rendered list
/// never moves a flag to another message. Everything starts collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceDisclosure {
    expanded: BTreeSet<MessageId>,
}

impl SourceDisclosure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: MessageId) -> bool {
        self.expanded.contains(&id)
    }

    /// Flips the flag of `id` and returns the new state.
    pub fn toggle(&mut self, id: MessageId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }
}
