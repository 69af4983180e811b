use std::mem::discriminant;

/// A record that can be narrowed by free-text search and categorical facets.
pub trait Filterable {
    /// One variant per filterable dimension (status, department, category, ...).
    type Facet: Clone + PartialEq + std::fmt::Debug;

    /// Text fields the search term is matched against.
    fn haystacks(&self) -> Vec<&str>;

    /// The facet values this record carries, one per dimension.
    fn facets(&self) -> Vec<Self::Facet>;
}

/// Search term plus at most one selected value per facet kind.
///
/// A kind with no selected value means "all".
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<F> {
    search: String,
    facets: Vec<F>,
}

impl<F> Default for Filter<F> {
    fn default() -> Self {
        Self {
            search: String::new(),
            facets: Vec::new(),
        }
    }
}

impl<F: Clone + PartialEq> Filter<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.set_search(term);
        self
    }

    pub fn with(mut self, facet: F) -> Self {
        self.set(facet);
        self
    }

    /// Adds `facet` only when present, for optional CLI flags.
    pub fn with_opt(self, facet: Option<F>) -> Self {
        match facet {
            Some(f) => self.with(f),
            None => self,
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Selects `facet`, replacing any selected value of the same kind.
    pub fn set(&mut self, facet: F) {
        self.clear_kind(&facet);
        self.facets.push(facet);
    }

    pub fn clear_kind(&mut self, like: &F) {
        let kind = discriminant(like);
        self.facets.retain(|f| discriminant(f) != kind);
    }

    /// The selected value of the same kind as `like`, if any.
    pub fn selected_like(&self, like: &F) -> Option<&F> {
        let kind = discriminant(like);
        self.facets.iter().find(|f| discriminant(*f) == kind)
    }

    pub fn selected(&self) -> &[F] {
        &self.facets
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.facets.is_empty()
    }

    pub fn matches<T>(&self, item: &T) -> bool
    where
        T: Filterable<Facet = F>,
    {
        let term = self.search.trim().to_lowercase();
        if !term.is_empty()
            && !item
                .haystacks()
                .iter()
                .any(|h| h.to_lowercase().contains(&term))
        {
            return false;
        }
        let carried = item.facets();
        self.facets.iter().all(|f| carried.contains(f))
    }

    pub fn apply<'a, T>(&self, items: &'a [T]) -> Vec<&'a T>
    where
        T: Filterable<Facet = F>,
    {
        items.iter().filter(|item| self.matches(*item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Facet {
        Status(&'static str),
        Dept(&'static str),
    }

    struct Row {
        name: &'static str,
        dept: &'static str,
        status: &'static str,
    }

    impl Filterable for Row {
        type Facet = Facet;

        fn haystacks(&self) -> Vec<&str> {
            vec![self.name, self.dept]
        }

        fn facets(&self) -> Vec<Facet> {
            vec![Facet::Status(self.status), Facet::Dept(self.dept)]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Youth Camp", dept: "Youth", status: "open" },
            Row { name: "Choir Robes", dept: "Music", status: "closed" },
            Row { name: "Sound Desk", dept: "Music", status: "open" },
        ]
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let rows = rows();
        let hits = Filter::<Facet>::new().search("MUSIC").apply(&rows);
        assert_eq!(hits.len(), 2);
        let hits = Filter::<Facet>::new().search("camp").apply(&rows);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Youth Camp");
    }

    #[test]
    fn facets_combine_with_search() {
        let rows = rows();
        let filter = Filter::new().search("music").with(Facet::Status("open"));
        let hits = filter.apply(&rows);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sound Desk");
        for row in &hits {
            assert!(filter.matches(*row));
        }
    }

    #[test]
    fn setting_a_facet_replaces_same_kind() {
        let mut filter = Filter::new().with(Facet::Status("open"));
        filter.set(Facet::Dept("Music"));
        filter.set(Facet::Status("closed"));
        assert_eq!(filter.selected().len(), 2);
        assert_eq!(
            filter.selected_like(&Facet::Status("")),
            Some(&Facet::Status("closed"))
        );
        filter.clear_kind(&Facet::Status(""));
        assert_eq!(filter.selected(), &[Facet::Dept("Music")]);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let rows = rows();
        let filter = Filter::<Facet>::new().search("   ");
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&rows).len(), 3);
    }
}
