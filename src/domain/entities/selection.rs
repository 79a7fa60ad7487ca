use std::collections::HashSet;
use std::hash::Hash;

/// Row ids marked for bulk actions. Keyed by stable row id, so a selection
/// outlives paging and re-sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionStore<K: Eq + Hash> {
    selected: HashSet<K>,
}

impl<K: Eq + Hash> Default for SelectionStore<K> {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> SelectionStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: K) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Deselects `visible` when every id in it is already selected, otherwise
    /// adds the missing ones. Ids outside `visible` are left alone.
    pub fn select_all(&mut self, visible: &[K]) {
        if self.is_all_selected(visible) {
            for id in visible {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(visible.iter().cloned());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &K) -> bool {
        self.selected.contains(id)
    }

    pub fn is_all_selected(&self, visible: &[K]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id))
    }

    pub fn is_some_selected(&self, visible: &[K]) -> bool {
        let hits = visible
            .iter()
            .filter(|id| self.selected.contains(*id))
            .count();
        hits > 0 && hits < visible.len()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selected_ids(&self) -> Vec<K>
    where
        K: Ord,
    {
        let mut ids: Vec<K> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }
}
