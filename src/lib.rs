//! # criteria
//!
//! Composable, inspectable query specifications.
//!
//! A [`Specification`] wraps a filter condition over a typed collection as
//! an expression tree, together with optional query-shaping metadata:
//! ordering, paging, and eager-load paths. Specifications are immutable;
//! logical combinators (`and`, `or`, `not`) and shaping operators
//! (`order_by`, `then_by`, `skip`, `take`, `fetch`) each produce a new
//! specification, preserving the metadata already attached. A specification
//! can be evaluated directly against an in-memory item, or replayed onto an
//! external data source through the [`Queryable`] boundary.
//!
//! ## Building and evaluating
//!
//! ```rust
//! use criteria::{Predicate, Specification};
//!
//! struct Person { age: i64 }
//!
//! let adults = Specification::new(Predicate::new("p", |p: &Person| p.age >= 18));
//! assert!(adults.is_satisfied_by(&Person { age: 20 }));
//! assert!(!adults.is_satisfied_by(&Person { age: 17 }));
//! ```
//!
//! ## Combining
//!
//! ```rust
//! use criteria::{Predicate, Specification};
//!
//! struct Person { age: i64 }
//!
//! let minors = Specification::new(Predicate::new("p", |p: &Person| p.age < 18));
//! let seniors = Specification::new(Predicate::new("p", |p: &Person| p.age >= 65));
//! let discounted = minors.or(&seniors);
//!
//! assert!(discounted.is_satisfied_by(&Person { age: 10 }));
//! assert!(!discounted.is_satisfied_by(&Person { age: 30 }));
//! assert!(discounted.is_satisfied_by(&Person { age: 70 }));
//! ```
//!
//! ## Shaping and projecting
//!
//! ```rust
//! use criteria::{apply_paging, project, KeySelector, Predicate, Specification, VecQuery};
//!
//! struct Person { name: &'static str, age: i64 }
//!
//! let adults = Specification::new(Predicate::new("p", |p: &Person| p.age >= 18));
//! let oldest = adults
//!     .order_by_descending(KeySelector::new("p", |p: &Person| p.age))
//!     .take(1);
//!
//! let people = vec![
//!     Person { name: "ada", age: 36 },
//!     Person { name: "bo", age: 17 },
//!     Person { name: "cy", age: 30 },
//! ];
//!
//! // `project` applies filter, ordering, and eager loading; paging is
//! // replayed separately.
//! let query = project(VecQuery::new(people), &oldest);
//! let query = apply_paging(query, oldest.expression());
//!
//! let result = query.into_vec();
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].name, "ada");
//! ```

pub mod combine;
pub mod error;
pub mod expr;
pub mod extract;
pub mod logging;
pub mod memory;
pub mod project;
pub mod specification;
pub mod types;

pub use combine::IntoCondition;
pub use error::{Error, SpecResult};
pub use expr::{Call, CallOp, Expr, KeySelector, Predicate};
pub use extract::{extract_condition, extract_fetch, extract_order, extract_paging, find_call};
pub use memory::VecQuery;
pub use project::{Queryable, all, apply_fetching, apply_ordering, apply_paging, project, r#where};
pub use specification::Specification;
pub use types::{FetchPath, SortKey, SortOrder};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::combine::IntoCondition;
    pub use crate::error::{Error, SpecResult};
    pub use crate::expr::{CallOp, Expr, KeySelector, Predicate};
    pub use crate::memory::VecQuery;
    pub use crate::project::{Queryable, apply_paging, project};
    pub use crate::specification::Specification;
    pub use crate::types::{FetchPath, SortKey, SortOrder};
}
