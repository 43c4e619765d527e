//! Combinators that build new specifications from existing ones.
//!
//! Every operation here rebuilds a fresh tree around a condition extracted
//! from its operand(s) and reattaches the operand's shaping metadata so it
//! survives the rebuild. Only one directive per slot (order, then-order,
//! skip, take, fetch) is ever reattached; when a caller applies conflicting
//! directives the last-applied one wins.
//!
//! `and`/`or`/`not` carry order, then-order, skip, and take across the
//! rebuild but deliberately drop any eager-load path; `fetch` carries the
//! full set.

use tracing::debug;

use crate::expr::{CallOp, Expr, KeySelector, Predicate};
use crate::extract::{extract_order, extract_paging};
use crate::specification::Specification;
use crate::types::FetchPath;

/// Conversion into a bare filter condition.
///
/// Lets combinators accept either a raw predicate or another specification.
/// A specification operand contributes only its condition; its own shaping
/// metadata is discarded.
pub trait IntoCondition<T> {
    /// Produce the condition.
    ///
    /// # Panics
    ///
    /// The specification impls panic when the operand holds no reachable
    /// filter condition, per the fail-late contract.
    fn into_condition(self) -> Predicate<T>;
}

impl<T> IntoCondition<T> for Predicate<T> {
    fn into_condition(self) -> Predicate<T> {
        self
    }
}

impl<T> IntoCondition<T> for &Specification<T> {
    fn into_condition(self) -> Predicate<T> {
        self.require_condition()
    }
}

impl<T> IntoCondition<T> for Specification<T> {
    fn into_condition(self) -> Predicate<T> {
        self.require_condition()
    }
}

impl<T: 'static> Specification<T> {
    /// Combine with another condition using logical AND.
    ///
    /// Order, then-order, skip, and take directives of `self` are
    /// reattached; an eager-load path is not.
    pub fn and(&self, other: impl IntoCondition<T>) -> Self {
        let combined = combine(self.require_condition(), other.into_condition(), "&&", |a, b| {
            a && b
        });
        self.rebuild_with_condition(combined)
    }

    /// Combine with another condition using logical OR.
    ///
    /// Metadata handling is identical to [`and`](Self::and).
    pub fn or(&self, other: impl IntoCondition<T>) -> Self {
        let combined = combine(self.require_condition(), other.into_condition(), "||", |a, b| {
            a || b
        });
        self.rebuild_with_condition(combined)
    }

    /// Negate the condition.
    ///
    /// Only the combined condition is negated, never its operands
    /// individually; metadata handling is identical to [`and`](Self::and).
    pub fn not(&self) -> Self {
        let current = self.require_condition();
        let label = current.label().map(|l| format!("!({l})"));
        let inner = current.clone();
        let mut negated = Predicate::new(current.param().to_string(), move |item: &T| {
            !inner.test(item)
        });
        if let Some(label) = label {
            negated = negated.labeled(label);
        }
        self.rebuild_with_condition(negated)
    }

    /// Limit the number of results.
    ///
    /// A pre-existing skip persists across the added take, as does the
    /// ordering chain. A pre-existing take is replaced.
    pub fn take(&self, count: u64) -> Self {
        let mut expr = Expr::source().filter(self.require_condition()).take(count);
        let skip = extract_paging(self.expression(), CallOp::Skip);
        if skip != 0 {
            expr = expr.skip(skip);
        }
        expr = reattach_ordering(expr, self.expression());
        Self::from_expr(expr)
    }

    /// Skip a number of results.
    ///
    /// Symmetric to [`take`](Self::take): a pre-existing take persists, the
    /// ordering chain is reattached, and a pre-existing skip is replaced.
    pub fn skip(&self, count: u64) -> Self {
        let mut expr = Expr::source().filter(self.require_condition()).skip(count);
        let take = extract_paging(self.expression(), CallOp::Take);
        if take != 0 {
            expr = expr.take(take);
        }
        expr = reattach_ordering(expr, self.expression());
        Self::from_expr(expr)
    }

    /// Establish a fresh ascending primary order, replacing any prior
    /// order and then-order. Skip and take are reattached.
    pub fn order_by(&self, key: KeySelector<T>) -> Self {
        let mut expr = Expr::source()
            .order_by(key)
            .filter(self.require_condition());
        expr = reattach_paging(expr, self.expression());
        Self::from_expr(expr)
    }

    /// Establish a fresh descending primary order, replacing any prior
    /// order and then-order. Skip and take are reattached.
    pub fn order_by_descending(&self, key: KeySelector<T>) -> Self {
        let mut expr = Expr::source()
            .order_by_descending(key)
            .filter(self.require_condition());
        expr = reattach_paging(expr, self.expression());
        Self::from_expr(expr)
    }

    /// Append an ascending secondary order to the existing ordering chain.
    pub fn then_by(&self, key: KeySelector<T>) -> Self {
        let mut expr = reattach_ordering(Expr::source(), self.expression());
        expr = expr.then_by(key).filter(self.require_condition());
        expr = reattach_paging(expr, self.expression());
        Self::from_expr(expr)
    }

    /// Append a descending secondary order to the existing ordering chain.
    pub fn then_by_descending(&self, key: KeySelector<T>) -> Self {
        let mut expr = reattach_ordering(Expr::source(), self.expression());
        expr = expr.then_by_descending(key).filter(self.require_condition());
        expr = reattach_paging(expr, self.expression());
        Self::from_expr(expr)
    }

    /// Attach an eager-load path. Unlike `and`/`or`/`not`, the full shaping
    /// metadata (ordering and paging) is reattached.
    pub fn fetch(&self, path: impl Into<FetchPath>) -> Self {
        let mut expr = Expr::source()
            .filter(self.require_condition())
            .fetch(path.into());
        expr = reattach_ordering(expr, self.expression());
        expr = reattach_paging(expr, self.expression());
        Self::from_expr(expr)
    }

    fn rebuild_with_condition(&self, condition: Predicate<T>) -> Self {
        debug!(source = %self.expression(), "rebuilding specification with combined condition");
        let mut expr = Expr::source().filter(condition);
        expr = reattach_ordering(expr, self.expression());
        expr = reattach_paging(expr, self.expression());
        Self::from_expr(expr)
    }
}

/// Combine two conditions over a shared parameter binding.
fn combine<T: 'static>(
    lhs: Predicate<T>,
    rhs: Predicate<T>,
    op: &str,
    apply: impl Fn(bool, bool) -> bool + Send + Sync + 'static,
) -> Predicate<T> {
    let label = match (lhs.label(), rhs.label()) {
        (Some(l), Some(r)) => Some(format!("({l} {op} {r})")),
        _ => None,
    };
    let mut combined = Predicate::new("x", move |item: &T| apply(lhs.test(item), rhs.test(item)));
    if let Some(label) = label {
        combined = combined.labeled(label);
    }
    combined
}

fn reattach_ordering<T>(mut expr: Expr<T>, source: &Expr<T>) -> Expr<T> {
    if let Some(key) = extract_order(source, CallOp::OrderBy) {
        expr = expr.order_by(key);
    }
    if let Some(key) = extract_order(source, CallOp::OrderByDescending) {
        expr = expr.order_by_descending(key);
    }
    if let Some(key) = extract_order(source, CallOp::ThenBy) {
        expr = expr.then_by(key);
    }
    if let Some(key) = extract_order(source, CallOp::ThenByDescending) {
        expr = expr.then_by_descending(key);
    }
    expr
}

fn reattach_paging<T>(mut expr: Expr<T>, source: &Expr<T>) -> Expr<T> {
    let skip = extract_paging(source, CallOp::Skip);
    if skip != 0 {
        expr = expr.skip(skip);
    }
    let take = extract_paging(source, CallOp::Take);
    if take != 0 {
        expr = expr.take(take);
    }
    expr
}
