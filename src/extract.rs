//! Read-only traversal that locates the filter condition and individual
//! shaping directives inside an arbitrary expression tree.
//!
//! All functions here are total: absence is reported as `None` (or `0` for
//! paging counts), never as an error, because a tree without a given
//! directive is a normal state. Search is depth-first in argument order with
//! a first-match policy, so when a directive kind occurs more than once the
//! outermost (most recently applied) occurrence wins.

use crate::expr::{Call, CallOp, Expr, KeySelector, Predicate};
use crate::types::FetchPath;

/// Extract the first reachable filter condition from a tree.
///
/// A bare predicate leaf is its own condition; composite calls are searched
/// argument by argument; conversion wrappers are unwrapped transparently.
pub fn extract_condition<T>(expr: &Expr<T>) -> Option<Predicate<T>> {
    match expr {
        Expr::Predicate(condition) => Some(condition.clone()),
        Expr::Call(call) => call.args.iter().find_map(extract_condition),
        Expr::Convert(inner) => extract_condition(inner),
        _ => None,
    }
}

/// Find the first composite call with the given operation name.
///
/// The root is checked before its arguments; arguments are searched left to
/// right.
pub fn find_call<'a, T>(expr: &'a Expr<T>, op: CallOp) -> Option<&'a Call<T>> {
    match expr {
        Expr::Call(call) if call.op == op => Some(call),
        Expr::Call(call) => call.args.iter().find_map(|arg| find_call(arg, op)),
        Expr::Convert(inner) => find_call(inner, op),
        _ => None,
    }
}

/// Extract the key selector attached to the named ordering call.
///
/// The payload sits behind one conversion wrapper when the selector was
/// widened at construction; the wrapper is unwrapped here. Returns `None`
/// when the call is absent or its payload is not a key selector.
pub fn extract_order<T>(expr: &Expr<T>, op: CallOp) -> Option<KeySelector<T>> {
    debug_assert!(op.is_ordering(), "extract_order expects an ordering op");
    match unwrap_payload(find_call(expr, op)?)? {
        Expr::Key(key) => Some(key.clone()),
        _ => None,
    }
}

/// Extract the literal count of the named paging call.
///
/// Returns `0` when the call is absent. An explicit count of zero is
/// therefore indistinguishable from "not set"; this is a documented
/// limitation of the paging contract, not a defect.
pub fn extract_paging<T>(expr: &Expr<T>, op: CallOp) -> u64 {
    debug_assert!(op.is_paging(), "extract_paging expects a paging op");
    match find_call(expr, op).and_then(Call::payload) {
        Some(Expr::Count(count)) => *count,
        _ => 0,
    }
}

/// Extract the eager-load path, if any.
pub fn extract_fetch<T>(expr: &Expr<T>) -> Option<FetchPath> {
    match unwrap_payload(find_call(expr, CallOp::Fetch)?)? {
        Expr::Path(path) => Some(path.clone()),
        _ => None,
    }
}

/// Count the reachable filter leaves of a tree.
pub(crate) fn condition_count<T>(expr: &Expr<T>) -> usize {
    match expr {
        Expr::Predicate(_) => 1,
        Expr::Call(call) => call.args.iter().map(condition_count).sum(),
        Expr::Convert(inner) => condition_count(inner),
        _ => 0,
    }
}

/// The payload of a call with one conversion wrapper stripped.
fn unwrap_payload<T>(call: &Call<T>) -> Option<&Expr<T>> {
    match call.payload()? {
        Expr::Convert(inner) => Some(inner.as_ref()),
        payload => Some(payload),
    }
}
