use std::cmp::Ordering;

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// A record with named sort keys. Key indices refer to `sort_keys()`.
pub trait Sortable {
    fn sort_keys() -> &'static [&'static str];
    fn sort_value(&self, key: usize) -> SortValue;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sort {
    pub key: usize,
    pub descending: bool,
}

impl Sort {
    /// Stable, so ties keep load order.
    pub fn apply<T: Sortable>(&self, items: &mut [&T]) {
        items.sort_by(|a, b| {
            let ord = a.sort_value(self.key).compare(&b.sort_value(self.key));
            if self.descending { ord.reverse() } else { ord }
        });
    }

    /// Next step in the cycle key0 asc, key0 desc, key1 asc, ... back to unsorted.
    pub fn cycle<T: Sortable>(current: Option<Sort>) -> Option<Sort> {
        let keys = T::sort_keys().len();
        match current {
            None if keys > 0 => Some(Sort { key: 0, descending: false }),
            None => None,
            Some(Sort { key, descending: false }) => Some(Sort { key, descending: true }),
            Some(Sort { key, descending: true }) if key + 1 < keys => Some(Sort {
                key: key + 1,
                descending: false,
            }),
            Some(_) => None,
        }
    }

    pub fn describe<T: Sortable>(&self) -> String {
        let name = T::sort_keys().get(self.key).copied().unwrap_or("?");
        format!("{} {}", name, if self.descending { "↓" } else { "↑" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gift(&'static str, f64);

    impl Sortable for Gift {
        fn sort_keys() -> &'static [&'static str] {
            &["donor", "amount"]
        }

        fn sort_value(&self, key: usize) -> SortValue {
            match key {
                0 => SortValue::Text(self.0.to_string()),
                _ => SortValue::Number(self.1),
            }
        }
    }

    #[test]
    fn sorts_by_key_and_direction() {
        let gifts = [Gift("carol", 50.0), Gift("Alice", 200.0), Gift("bob", 50.0)];
        let mut refs: Vec<&Gift> = gifts.iter().collect();

        Sort { key: 0, descending: false }.apply(&mut refs);
        let names: Vec<&str> = refs.iter().map(|g| g.0).collect();
        assert_eq!(names, ["Alice", "bob", "carol"]);

        Sort { key: 1, descending: true }.apply(&mut refs);
        let names: Vec<&str> = refs.iter().map(|g| g.0).collect();
        // ties keep the previous order
        assert_eq!(names, ["Alice", "bob", "carol"]);
    }

    #[test]
    fn cycle_walks_every_key_then_clears() {
        let mut sort = None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            sort = Sort::cycle::<Gift>(sort);
            seen.push(sort);
        }
        assert_eq!(seen[0], Some(Sort { key: 0, descending: false }));
        assert_eq!(seen[1], Some(Sort { key: 0, descending: true }));
        assert_eq!(seen[2], Some(Sort { key: 1, descending: false }));
        assert_eq!(seen[3], Some(Sort { key: 1, descending: true }));
        assert_eq!(seen[4], None);
    }
}
