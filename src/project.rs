//! Projection of a specification onto an external queryable collaborator.
//!
//! The collaborator implements [`Queryable`]; [`project`] replays a
//! specification's filter, ordering, and eager-load directives onto it in a
//! fixed order. Paging is deliberately not applied by `project`: apply it
//! through the combinator engine before projecting, or replay it on the
//! projected query with [`apply_paging`].

use tracing::debug;

use crate::expr::{CallOp, Expr, KeySelector, Predicate};
use crate::extract::{extract_condition, extract_fetch, extract_order, extract_paging};
use crate::specification::Specification;
use crate::types::{FetchPath, SortOrder};

/// The boundary contract a query-execution collaborator implements.
///
/// All methods are by-value and return the shaped query; the collaborator
/// owns any I/O, blocking, or retry behavior behind them.
pub trait Queryable<T>: Sized {
    /// Narrow the query with a filter condition.
    fn filter(self, condition: Predicate<T>) -> Self;

    /// Establish the primary ordering.
    fn order_by(self, key: KeySelector<T>, order: SortOrder) -> Self;

    /// Append a secondary ordering.
    fn then_by(self, key: KeySelector<T>, order: SortOrder) -> Self;

    /// Skip a number of records.
    fn skip(self, count: u64) -> Self;

    /// Take at most a number of records.
    fn take(self, count: u64) -> Self;

    /// Eager-load a relation path.
    fn fetch(self, path: FetchPath) -> Self;
}

/// Apply a specification's filter, ordering, and eager-load paths to a
/// queryable source, in that order.
///
/// Paging directives present in the specification are not applied here;
/// callers needing paging apply it through the combinator engine before
/// projection or replay it afterwards with [`apply_paging`].
///
/// # Panics
///
/// Panics when the specification holds no reachable filter condition.
pub fn project<T, Q: Queryable<T>>(source: Q, specification: &Specification<T>) -> Q {
    let expr = specification.expression();
    let condition = match extract_condition(expr) {
        Some(condition) => condition,
        None => panic!("cannot project a specification without a reachable filter condition"),
    };
    debug!(specification = %specification, "projecting specification onto queryable");
    let queryable = source.filter(condition);
    let queryable = apply_ordering(queryable, expr);
    apply_fetching(queryable, expr)
}

/// Replay the ordering directives of a tree onto a queryable, primary
/// orders first.
pub fn apply_ordering<T, Q: Queryable<T>>(mut queryable: Q, expr: &Expr<T>) -> Q {
    if let Some(key) = extract_order(expr, CallOp::OrderBy) {
        queryable = queryable.order_by(key, SortOrder::Asc);
    }
    if let Some(key) = extract_order(expr, CallOp::OrderByDescending) {
        queryable = queryable.order_by(key, SortOrder::Desc);
    }
    if let Some(key) = extract_order(expr, CallOp::ThenBy) {
        queryable = queryable.then_by(key, SortOrder::Asc);
    }
    if let Some(key) = extract_order(expr, CallOp::ThenByDescending) {
        queryable = queryable.then_by(key, SortOrder::Desc);
    }
    queryable
}

/// Replay the paging directives of a tree onto a queryable.
///
/// A zero count means "not set" and is skipped.
pub fn apply_paging<T, Q: Queryable<T>>(mut queryable: Q, expr: &Expr<T>) -> Q {
    let skip = extract_paging(expr, CallOp::Skip);
    if skip != 0 {
        queryable = queryable.skip(skip);
    }
    let take = extract_paging(expr, CallOp::Take);
    if take != 0 {
        queryable = queryable.take(take);
    }
    queryable
}

/// Replay the eager-load directive of a tree onto a queryable.
pub fn apply_fetching<T, Q: Queryable<T>>(queryable: Q, expr: &Expr<T>) -> Q {
    match extract_fetch(expr) {
        Some(path) => queryable.fetch(path),
        None => queryable,
    }
}

/// Pre-filter a queryable with the always-true condition.
pub fn all<T, Q: Queryable<T>>(source: Q) -> Q {
    r#where(source, Predicate::always())
}

/// Pre-filter a queryable with a raw condition, without wrapping it in a
/// specification.
pub fn r#where<T, Q: Queryable<T>>(source: Q, condition: Predicate<T>) -> Q {
    source.filter(condition)
}
