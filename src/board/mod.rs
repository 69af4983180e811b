//! The list/filter/mutate state every dashboard section is built on.

pub mod command;
pub mod filter;
pub mod selection;
pub mod sort;

pub use command::{Applied, Mutation, Record};
pub use filter::{Filter, Filterable};
pub use selection::Selection;
pub use sort::{Sort, SortValue, Sortable};

use crate::service::{Envelope, Notifier};

/// A loaded collection plus the criteria and flags of the screen showing it.
#[derive(Debug, Clone)]
pub struct Board<T: Filterable> {
    items: Vec<T>,
    pub filter: Filter<T::Facet>,
    pub sort: Option<Sort>,
    pub selection: Selection,
    pub loading: bool,
    pub focus: usize,
    pub detail_open: bool,
}

impl<T: Filterable> Default for Board<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            filter: Filter::default(),
            sort: None,
            selection: Selection::new(),
            loading: false,
            focus: 0,
            detail_open: false,
        }
    }
}

impl<T> Board<T>
where
    T: Record + Filterable + Sortable + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Replaces the collection from a store envelope. A failed envelope
    /// leaves the board empty and reports its message.
    pub fn load(&mut self, envelope: Envelope<Vec<T>>, notifier: &mut dyn Notifier) -> bool {
        self.loading = false;
        match (envelope.success, envelope.data) {
            (true, Some(items)) => {
                self.items = items;
                let ids: Vec<i64> = self.items.iter().map(|i| i.id()).collect();
                self.selection.retain_existing(&ids);
                self.clamp_focus();
                true
            }
            _ => {
                self.items.clear();
                self.selection.clear();
                self.focus = 0;
                let message = envelope
                    .message
                    .unwrap_or_else(|| "Failed to load records".to_string());
                notifier.notify(crate::service::NoticeKind::Error, &message);
                false
            }
        }
    }

    /// Filtered then sorted view, recomputed on every call.
    pub fn visible(&self) -> Vec<&T> {
        let mut rows = self.filter.apply(&self.items);
        if let Some(sort) = &self.sort {
            sort.apply(&mut rows);
        }
        rows
    }

    pub fn visible_ids(&self) -> Vec<i64> {
        self.visible().iter().map(|r| r.id()).collect()
    }

    pub fn focused(&self) -> Option<&T> {
        self.visible().get(self.focus).copied()
    }

    pub fn move_focus(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.focus = 0;
            return;
        }
        let next = self.focus as isize + delta;
        self.focus = next.clamp(0, len as isize - 1) as usize;
    }

    /// Moves focus to the visible record with `id`, if any.
    pub fn focus_id(&mut self, id: i64) -> bool {
        match self.visible().iter().position(|r| r.id() == id) {
            Some(idx) => {
                self.focus = idx;
                true
            }
            None => false,
        }
    }

    pub fn clamp_focus(&mut self) {
        let len = self.visible().len();
        if self.focus >= len {
            self.focus = len.saturating_sub(1);
        }
    }

    pub fn toggle_focused(&mut self) {
        if let Some(id) = self.focused().map(|r| r.id()) {
            self.selection.toggle(id);
        }
    }

    pub fn toggle_all_visible(&mut self) {
        let ids = self.visible_ids();
        self.selection.toggle_all(&ids);
    }

    pub fn selected_items(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|r| self.selection.contains(r.id()))
            .collect()
    }

    /// Applies `mutation` locally, then runs `remote`. On failure the local
    /// change is rolled back; on success the returned record replaces the
    /// optimistic one.
    pub fn commit<F>(
        &mut self,
        mutation: Mutation<T>,
        remote: F,
        notifier: &mut dyn Notifier,
        action: &str,
        done: &str,
    ) -> bool
    where
        F: FnOnce() -> anyhow::Result<Option<T>>,
    {
        let applied = match mutation.apply(&mut self.items) {
            Ok(applied) => applied,
            Err(err) => {
                notifier.failure(action, &anyhow::Error::from(err));
                return false;
            }
        };

        let ok = match remote() {
            Ok(confirmed) => {
                applied.settle(&mut self.items, confirmed);
                notifier.success(done);
                true
            }
            Err(err) => {
                applied.rollback(&mut self.items);
                notifier.failure(action, &err);
                false
            }
        };

        let ids: Vec<i64> = self.items.iter().map(|i| i.id()).collect();
        self.selection.retain_existing(&ids);
        self.clamp_focus();
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{NoticeKind, Toasts};
    use anyhow::anyhow;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: i64,
        name: &'static str,
    }

    impl Record for Item {
        const ENTITY: &'static str = "item";

        fn id(&self) -> i64 {
            self.id
        }
    }

    impl Filterable for Item {
        type Facet = ();

        fn haystacks(&self) -> Vec<&str> {
            vec![self.name]
        }

        fn facets(&self) -> Vec<()> {
            Vec::new()
        }
    }

    impl Sortable for Item {
        fn sort_keys() -> &'static [&'static str] {
            &["name"]
        }

        fn sort_value(&self, _key: usize) -> SortValue {
            SortValue::Text(self.name.to_string())
        }
    }

    fn loaded() -> (Board<Item>, Toasts) {
        let mut board = Board::new();
        let mut toasts = Toasts::default();
        board.load(
            Envelope::ok(vec![
                Item { id: 1, name: "Bulletin" },
                Item { id: 2, name: "Altar flowers" },
            ]),
            &mut toasts,
        );
        (board, toasts)
    }

    #[test]
    fn failed_envelope_reports_and_empties() {
        let (mut board, mut toasts) = loaded();
        board.load(Envelope::fail("Failed to load items: offline"), &mut toasts);
        assert!(board.items().is_empty());
        let notice = toasts.latest().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Failed to load items: offline");
    }

    #[test]
    fn failed_remote_rolls_back() {
        let (mut board, mut toasts) = loaded();
        let before = board.items().to_vec();
        let ok = board.commit(
            Mutation::Remove(1),
            || Err(anyhow!("locked")),
            &mut toasts,
            "remove item",
            "Removed",
        );
        assert!(!ok);
        assert_eq!(board.items(), before.as_slice());
        assert_eq!(toasts.latest().unwrap().kind, NoticeKind::Error);
    }

    #[test]
    fn successful_insert_takes_store_id() {
        let (mut board, mut toasts) = loaded();
        let ok = board.commit(
            Mutation::Insert(Item { id: 0, name: "Candles" }),
            || Ok(Some(Item { id: 3, name: "Candles" })),
            &mut toasts,
            "add item",
            "Added",
        );
        assert!(ok);
        assert_eq!(board.items().len(), 3);
        assert!(board.items().iter().any(|i| i.id == 3));
        assert_eq!(toasts.latest().unwrap().message, "Added");
    }

    #[test]
    fn sorted_view_and_focus() {
        let (mut board, _) = loaded();
        board.sort = Some(Sort { key: 0, descending: false });
        assert_eq!(board.visible()[0].name, "Altar flowers");
        board.move_focus(5);
        assert_eq!(board.focused().map(|i| i.id), Some(1));
        board.filter.set_search("altar");
        board.clamp_focus();
        assert_eq!(board.focused().map(|i| i.id), Some(2));
    }
}
