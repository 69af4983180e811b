use std::collections::BTreeSet;

/// Ids of the records picked for a bulk action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: i64) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Clears `visible` when every one of them is already selected,
    /// otherwise selects all of them.
    pub fn toggle_all(&mut self, visible: &[i64]) {
        if self.all_selected(visible) {
            for id in visible {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(visible.iter().copied());
        }
    }

    pub fn all_selected(&self, visible: &[i64]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Drops ids that no longer exist in the collection.
    pub fn retain_existing(&mut self, existing: &[i64]) {
        self.ids.retain(|id| existing.contains(id));
    }

    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_selection() {
        let mut sel = Selection::new();
        sel.toggle(3);
        let before = sel.clone();
        sel.toggle(7);
        sel.toggle(7);
        assert_eq!(sel, before);
        sel.toggle(3);
        sel.toggle(3);
        assert_eq!(sel, before);
    }

    #[test]
    fn select_all_then_again_deselects() {
        let visible = [1, 2, 3];
        let mut sel = Selection::new();
        sel.toggle(2);

        sel.toggle_all(&visible);
        assert!(sel.all_selected(&visible));
        assert_eq!(sel.len(), 3);

        sel.toggle_all(&visible);
        assert!(sel.is_empty());
    }

    #[test]
    fn select_all_leaves_hidden_ids_alone() {
        let mut sel = Selection::new();
        sel.toggle(9);
        sel.toggle_all(&[1, 2]);
        sel.toggle_all(&[1, 2]);
        assert_eq!(sel.ids(), vec![9]);
        sel.retain_existing(&[1, 2]);
        assert!(sel.is_empty());
    }
}
