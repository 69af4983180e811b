use crate::error::FlockError;

/// A stored record with a numeric id. Unsaved records carry id 0.
pub trait Record {
    const ENTITY: &'static str;

    fn id(&self) -> i64;
}

/// A local change to a board's collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    Insert(T),
    Replace(T),
    Remove(i64),
}

/// What a mutation overwrote, kept until the store confirms or rejects it.
#[derive(Debug)]
pub struct Applied<T> {
    prior: Prior<T>,
}

#[derive(Debug)]
enum Prior<T> {
    Inserted { index: usize },
    Replaced { index: usize, previous: T },
    Removed { index: usize, previous: T },
}

impl<T: Record> Mutation<T> {
    pub fn apply(self, items: &mut Vec<T>) -> Result<Applied<T>, FlockError> {
        let prior = match self {
            Mutation::Insert(item) => {
                items.push(item);
                Prior::Inserted {
                    index: items.len() - 1,
                }
            }
            Mutation::Replace(item) => {
                let id = item.id();
                let index = position(items, id)?;
                let previous = std::mem::replace(&mut items[index], item);
                Prior::Replaced { index, previous }
            }
            Mutation::Remove(id) => {
                let index = position(items, id)?;
                let previous = items.remove(index);
                Prior::Removed { index, previous }
            }
        };
        Ok(Applied { prior })
    }
}

fn position<T: Record>(items: &[T], id: i64) -> Result<usize, FlockError> {
    items
        .iter()
        .position(|item| item.id() == id)
        .ok_or(FlockError::not_found(T::ENTITY, id))
}

impl<T> Applied<T> {
    /// Puts the collection back the way it was before the mutation.
    pub fn rollback(self, items: &mut Vec<T>) {
        match self.prior {
            Prior::Inserted { index } => {
                if index < items.len() {
                    items.remove(index);
                }
            }
            Prior::Replaced { index, previous } => {
                if let Some(slot) = items.get_mut(index) {
                    *slot = previous;
                }
            }
            Prior::Removed { index, previous } => {
                let index = index.min(items.len());
                items.insert(index, previous);
            }
        }
    }

    /// Swaps the optimistic record for the one the store returned.
    pub fn settle(self, items: &mut [T], confirmed: Option<T>) {
        let index = match self.prior {
            Prior::Inserted { index } | Prior::Replaced { index, .. } => index,
            Prior::Removed { .. } => return,
        };
        if let (Some(slot), Some(record)) = (items.get_mut(index), confirmed) {
            *slot = record;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note(i64, &'static str);

    impl Record for Note {
        const ENTITY: &'static str = "note";

        fn id(&self) -> i64 {
            self.0
        }
    }

    fn notes() -> Vec<Note> {
        vec![Note(1, "a"), Note(2, "b"), Note(3, "c")]
    }

    #[test]
    fn rollback_restores_each_kind() {
        for mutation in [
            Mutation::Insert(Note(0, "new")),
            Mutation::Replace(Note(2, "changed")),
            Mutation::Remove(2),
        ] {
            let mut items = notes();
            let applied = mutation.apply(&mut items).unwrap();
            assert_ne!(items, notes());
            applied.rollback(&mut items);
            assert_eq!(items, notes());
        }
    }

    #[test]
    fn settle_keeps_the_confirmed_record() {
        let mut items = notes();
        let applied = Mutation::Insert(Note(0, "d")).apply(&mut items).unwrap();
        applied.settle(&mut items, Some(Note(4, "d")));
        assert_eq!(items.last(), Some(&Note(4, "d")));
    }

    #[test]
    fn unknown_id_is_rejected_without_change() {
        let mut items = notes();
        let err = Mutation::Remove(42).apply(&mut items).unwrap_err();
        assert_eq!(err, FlockError::not_found("note", 42));
        assert_eq!(items, notes());
    }
}
