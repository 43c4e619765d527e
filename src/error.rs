//! Error types for specification validation.
//!
//! The core is deliberately lenient at construction time: a malformed tree is
//! only discovered at the point of use, matching the fail-late contract
//! documented on [`Specification::from_expr`](crate::Specification::from_expr).
//! These errors are returned by the opt-in
//! [`Specification::validate`](crate::Specification::validate) check for
//! callers who prefer to fail fast.

use thiserror::Error;

use crate::expr::CallOp;

/// Result type for fallible specification operations.
pub type SpecResult<T> = Result<T, Error>;

/// Errors reported by eager specification validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The tree holds no reachable filter condition.
    #[error("expression tree contains no reachable filter condition")]
    MissingCondition,

    /// The tree holds more than one reachable filter condition.
    #[error("expression tree contains {count} filter conditions, expected exactly one")]
    MultipleConditions {
        /// Number of filter leaves found.
        count: usize,
    },

    /// A directive payload had an unexpected shape.
    #[error("`{op}` payload is not a {expected}")]
    InvalidPayload {
        /// The offending operation.
        op: CallOp,
        /// The payload shape the operation requires.
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::MissingCondition.to_string(),
            "expression tree contains no reachable filter condition"
        );
        assert_eq!(
            Error::MultipleConditions { count: 2 }.to_string(),
            "expression tree contains 2 filter conditions, expected exactly one"
        );
        assert_eq!(
            Error::InvalidPayload {
                op: CallOp::Take,
                expected: "literal count",
            }
            .to_string(),
            "`take` payload is not a literal count"
        );
    }
}
