//! The specification value type: an immutable, combinable filter condition
//! with attached query-shaping metadata.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use crate::error::{Error, SpecResult};
use crate::expr::{Call, CallOp, Expr, Predicate};
use crate::extract::{condition_count, extract_condition};

/// An immutable filter condition over items of type `T`, represented as an
/// inspectable expression tree.
///
/// A specification can be evaluated directly against an in-memory item with
/// [`is_satisfied_by`](Self::is_satisfied_by), combined with others through
/// the combinator methods (`and`, `or`, `not`, `order_by`, `take`, ...), or
/// handed to [`project`](crate::project) for translation into a live query.
/// Every combinator returns a new specification; an existing tree is never
/// mutated.
///
/// Two specifications are equal when their trees are structurally equal;
/// hashing agrees with equality.
///
/// # Example
///
/// ```rust
/// use criteria::{Predicate, Specification};
///
/// struct Person { age: i64 }
///
/// let adults = Specification::new(Predicate::new("p", |p: &Person| p.age >= 18));
/// assert!(adults.is_satisfied_by(&Person { age: 20 }));
/// assert!(!adults.is_satisfied_by(&Person { age: 17 }));
/// ```
pub struct Specification<T> {
    expr: Expr<T>,
    compiled: OnceLock<Predicate<T>>,
}

impl<T> Specification<T> {
    /// Create a specification from a bare condition.
    pub fn new(condition: Predicate<T>) -> Self {
        Self::from_expr(Expr::Predicate(condition))
    }

    /// Wrap a caller-supplied expression tree.
    ///
    /// The tree is expected to contain exactly one reachable filter
    /// condition, but is not validated here: a malformed tree only surfaces
    /// at the point of use, as `None` from extraction or a panic from
    /// evaluation. Call [`validate`](Self::validate) to check eagerly.
    pub fn from_expr(expr: Expr<T>) -> Self {
        Self {
            expr,
            compiled: OnceLock::new(),
        }
    }

    /// The specification satisfied by every item.
    pub fn always() -> Self {
        Self::new(Predicate::always())
    }

    /// The wrapped expression tree.
    pub fn expression(&self) -> &Expr<T> {
        &self.expr
    }

    /// The reachable filter condition, if any.
    pub fn condition(&self) -> Option<Predicate<T>> {
        extract_condition(&self.expr)
    }

    /// Evaluate the condition against a single item.
    ///
    /// The condition is extracted and compiled on first use and cached for
    /// the lifetime of this instance; concurrent first calls observe at most
    /// one compilation. A failure inside the caller-supplied predicate body
    /// propagates unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the tree holds no reachable filter condition (see
    /// [`from_expr`](Self::from_expr) for the fail-late contract).
    pub fn is_satisfied_by(&self, item: &T) -> bool {
        self.compiled().test(item)
    }

    /// Check the tree shape eagerly: exactly one reachable filter condition,
    /// and every directive payload of the expected kind.
    pub fn validate(&self) -> SpecResult<()> {
        match condition_count(&self.expr) {
            1 => {}
            0 => return Err(Error::MissingCondition),
            count => return Err(Error::MultipleConditions { count }),
        }
        validate_payloads(&self.expr)
    }

    pub(crate) fn require_condition(&self) -> Predicate<T> {
        match extract_condition(&self.expr) {
            Some(condition) => condition,
            None => panic!("specification expression contains no reachable filter condition"),
        }
    }

    fn compiled(&self) -> &Predicate<T> {
        self.compiled.get_or_init(|| self.require_condition())
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            compiled: self.compiled.clone(),
        }
    }
}

impl<T> PartialEq for Specification<T> {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl<T> Eq for Specification<T> {}

impl<T> Hash for Specification<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.expr.hash(state);
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("expr", &self.expr)
            .finish()
    }
}

impl<T> fmt::Display for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

impl<T> From<Predicate<T>> for Specification<T> {
    fn from(condition: Predicate<T>) -> Self {
        Self::new(condition)
    }
}

fn validate_payloads<T>(expr: &Expr<T>) -> SpecResult<()> {
    match expr {
        Expr::Call(call) => {
            if !payload_shape_ok(call) {
                return Err(Error::InvalidPayload {
                    op: call.op,
                    expected: expected_payload(call.op),
                });
            }
            for arg in &call.args {
                validate_payloads(arg)?;
            }
            Ok(())
        }
        Expr::Convert(inner) => validate_payloads(inner),
        _ => Ok(()),
    }
}

fn payload_shape_ok<T>(call: &Call<T>) -> bool {
    let Some(payload) = call.payload() else {
        return false;
    };
    let payload = match payload {
        Expr::Convert(inner) => inner.as_ref(),
        other => other,
    };
    match call.op {
        CallOp::Where => matches!(payload, Expr::Predicate(_)),
        CallOp::OrderBy | CallOp::OrderByDescending | CallOp::ThenBy | CallOp::ThenByDescending => {
            matches!(payload, Expr::Key(_))
        }
        CallOp::Skip | CallOp::Take => matches!(payload, Expr::Count(_)),
        CallOp::Fetch => matches!(payload, Expr::Path(_)),
    }
}

fn expected_payload(op: CallOp) -> &'static str {
    match op {
        CallOp::Where => "filter condition",
        CallOp::OrderBy | CallOp::OrderByDescending | CallOp::ThenBy | CallOp::ThenByDescending => {
            "key selector"
        }
        CallOp::Skip | CallOp::Take => "literal count",
        CallOp::Fetch => "fetch path",
    }
}
