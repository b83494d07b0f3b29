// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe selection state.

use crate::keyframe::KeyframeId;
use crate::store::KeyframeStore;
use std::collections::HashSet;

/// Tracks which keyframes are selected in the editor.
///
/// Single-value editing is only offered when exactly one keyframe is
/// selected; bulk deletion operates on the whole set.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selected: HashSet<KeyframeId>,
}

impl SelectionController {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyframe to the selection
    pub fn select(&mut self, id: KeyframeId) {
        self.selected.insert(id);
    }

    /// Replace the selection with a single keyframe
    pub fn select_only(&mut self, id: KeyframeId) {
        self.selected.clear();
        self.selected.insert(id);
    }

    /// Toggle a keyframe in or out of the selection
    pub fn toggle(&mut self, id: KeyframeId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Remove a keyframe from the selection
    pub fn deselect(&mut self, id: KeyframeId) {
        self.selected.remove(&id);
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Select every keyframe in an iterator (typically one track)
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = KeyframeId>) {
        self.selected.extend(ids);
    }

    /// Whether a keyframe is selected
    pub fn is_selected(&self, id: KeyframeId) -> bool {
        self.selected.contains(&id)
    }

    /// Number of selected keyframes
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The selected keyframe, if exactly one is selected. This gates
    /// the value-editing UI.
    pub fn single_selection(&self) -> Option<KeyframeId> {
        if self.selected.len() == 1 {
            self.selected.iter().next().copied()
        } else {
            None
        }
    }

    /// Iterate over the selected ids (unordered)
    pub fn iter(&self) -> impl Iterator<Item = KeyframeId> + '_ {
        self.selected.iter().copied()
    }

    /// Delete every selected keyframe from the store and clear the
    /// selection. Deletion is idempotent per id, so the bulk operation
    /// cannot partially fail; returns how many keyframes existed.
    pub fn delete_selected(&mut self, store: &mut KeyframeStore) -> usize {
        let mut removed = 0;
        for id in self.selected.drain() {
            if store.contains(id) {
                store.delete(id);
                removed += 1;
            }
        }
        removed
    }

    /// Drop selected ids that no longer exist in the store
    pub fn prune(&mut self, store: &KeyframeStore) {
        self.selected.retain(|id| store.contains(*id));
    }
}
