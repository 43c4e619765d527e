//! An in-memory queryable over a `Vec`, for direct evaluation and tests.
//!
//! This is the simplest possible query-execution collaborator: filtering is
//! applied immediately, ordering and paging are deferred until the query is
//! evaluated with [`VecQuery::into_vec`], and eager-load paths are recorded
//! so callers can inspect what a real data source would have been asked to
//! load.

use std::cmp::Ordering;

use crate::expr::{KeySelector, Predicate};
use crate::project::Queryable;
use crate::types::{FetchPath, SortOrder};

/// In-memory implementation of [`Queryable`].
#[derive(Debug)]
pub struct VecQuery<T> {
    items: Vec<T>,
    orderings: Vec<(KeySelector<T>, SortOrder)>,
    skip: Option<u64>,
    take: Option<u64>,
    fetched: Vec<FetchPath>,
}

impl<T> VecQuery<T> {
    /// Create a query over the given items.
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            orderings: Vec::new(),
            skip: None,
            take: None,
            fetched: Vec::new(),
        }
    }

    /// Paths requested for eager loading, in request order.
    pub fn fetched_paths(&self) -> &[FetchPath] {
        &self.fetched
    }

    /// Number of items currently matching, before paging applies.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no items match.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Evaluate the query: sort by the accumulated ordering chain, then
    /// apply skip and take.
    pub fn into_vec(mut self) -> Vec<T> {
        if !self.orderings.is_empty() {
            let orderings = &self.orderings;
            self.items.sort_by(|a, b| {
                for (key, order) in orderings {
                    let by_key = key.key(a).cmp(&key.key(b));
                    let by_key = match order {
                        SortOrder::Asc => by_key,
                        SortOrder::Desc => by_key.reverse(),
                    };
                    if by_key != Ordering::Equal {
                        return by_key;
                    }
                }
                Ordering::Equal
            });
        }

        let skip = self.skip.unwrap_or(0) as usize;
        let mut items: Vec<T> = self.items.into_iter().skip(skip).collect();
        if let Some(take) = self.take {
            items.truncate(take as usize);
        }
        items
    }
}

impl<T> Queryable<T> for VecQuery<T> {
    fn filter(mut self, condition: Predicate<T>) -> Self {
        self.items.retain(|item| condition.test(item));
        self
    }

    fn order_by(mut self, key: KeySelector<T>, order: SortOrder) -> Self {
        self.orderings.clear();
        self.orderings.push((key, order));
        self
    }

    fn then_by(mut self, key: KeySelector<T>, order: SortOrder) -> Self {
        self.orderings.push((key, order));
        self
    }

    fn skip(mut self, count: u64) -> Self {
        self.skip = Some(count);
        self
    }

    fn take(mut self, count: u64) -> Self {
        self.take = Some(count);
        self
    }

    fn fetch(mut self, path: FetchPath) -> Self {
        self.fetched.push(path);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: &'static str,
        age: i64,
    }

    fn people() -> Vec<Person> {
        vec![
            Person { name: "ada", age: 36 },
            Person { name: "bo", age: 17 },
            Person { name: "cy", age: 30 },
            Person { name: "dee", age: 30 },
        ]
    }

    fn age_key() -> KeySelector<Person> {
        KeySelector::new("p", |p: &Person| p.age)
    }

    fn name_key() -> KeySelector<Person> {
        KeySelector::new("p", |p: &Person| p.name)
    }

    #[test]
    fn test_filter_applies_immediately() {
        let query = VecQuery::new(people())
            .filter(Predicate::new("p", |p: &Person| p.age >= 18));
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn test_order_by_descending() {
        let names: Vec<_> = VecQuery::new(people())
            .order_by(age_key(), SortOrder::Desc)
            .into_vec()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names[0], "ada");
        assert_eq!(names[3], "bo");
    }

    #[test]
    fn test_then_by_breaks_ties() {
        let names: Vec<_> = VecQuery::new(people())
            .order_by(age_key(), SortOrder::Asc)
            .then_by(name_key(), SortOrder::Desc)
            .into_vec()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["bo", "dee", "cy", "ada"]);
    }

    #[test]
    fn test_order_by_resets_chain() {
        let names: Vec<_> = VecQuery::new(people())
            .order_by(name_key(), SortOrder::Desc)
            .order_by(age_key(), SortOrder::Asc)
            .into_vec()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names[0], "bo");
    }

    #[test]
    fn test_skip_and_take() {
        let ages: Vec<_> = VecQuery::new(people())
            .order_by(age_key(), SortOrder::Asc)
            .skip(1)
            .take(2)
            .into_vec()
            .into_iter()
            .map(|p| p.age)
            .collect();
        assert_eq!(ages, [30, 30]);
    }

    #[test]
    fn test_fetch_is_recorded() {
        let query = VecQuery::new(people()).fetch(FetchPath::new("orders"));
        assert_eq!(query.fetched_paths(), [FetchPath::new("orders")]);
    }
}
