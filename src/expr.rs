//! The predicate node model: tagged expression trees representing a filter
//! condition together with the query-shaping directives layered around it.
//!
//! A tree is built from three families of nodes:
//! - payload leaves: a [`Predicate`], a [`KeySelector`], a literal count, or
//!   a [`FetchPath`], plus the [`Expr::Source`] root the call chain hangs off;
//! - composite calls: a [`CallOp`] applied to ordered argument subtrees, the
//!   last argument being the operation's payload;
//! - conversion wrappers marking a key-selector widening, which every
//!   traversal unwraps transparently.
//!
//! Trees compare by deep structure. Function-valued leaves compare by shared
//! function identity: cloning a leaf into two trees makes those subtrees
//! equal, two independently written closures never are.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::types::{FetchPath, SortKey};

/// A leaf predicate: a pure function from an item to a boolean, carrying the
/// item-binding parameter name it was built with.
///
/// An optional label is used only for display; equality is shared-function
/// identity.
pub struct Predicate<T> {
    param: Cow<'static, str>,
    label: Option<Cow<'static, str>>,
    func: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Predicate<T> {
    /// Create a new predicate over the given parameter binding.
    pub fn new(
        param: impl Into<Cow<'static, str>>,
        func: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            param: param.into(),
            label: None,
            func: Arc::new(func),
        }
    }

    /// The predicate that accepts every item.
    pub fn always() -> Self {
        Self::new("x", |_: &T| true).labeled("true")
    }

    /// Attach a display label.
    pub fn labeled(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Evaluate the predicate against a single item.
    pub fn test(&self, item: &T) -> bool {
        (self.func)(item)
    }

    /// The item-binding parameter name.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// The display label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            param: self.param.clone(),
            label: self.label.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<T> PartialEq for Predicate<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl<T> Eq for Predicate<T> {}

impl<T> Hash for Predicate<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.func) as *const () as usize).hash(state);
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("param", &self.param)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|{}| {}",
            self.param,
            self.label.as_deref().unwrap_or("<predicate>")
        )
    }
}

/// A key selector widened to the uniform [`SortKey`] domain.
///
/// The widening happens at construction, so keys over heterogeneous field
/// types can be compared by any downstream consumer.
pub struct KeySelector<T> {
    param: Cow<'static, str>,
    label: Option<Cow<'static, str>>,
    func: Arc<dyn Fn(&T) -> SortKey + Send + Sync>,
}

impl<T> KeySelector<T> {
    /// Create a new key selector over the given parameter binding.
    pub fn new<K: Into<SortKey>>(
        param: impl Into<Cow<'static, str>>,
        func: impl Fn(&T) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            param: param.into(),
            label: None,
            func: Arc::new(move |item| func(item).into()),
        }
    }

    /// Attach a display label.
    pub fn labeled(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Compute the key for a single item.
    pub fn key(&self, item: &T) -> SortKey {
        (self.func)(item)
    }

    /// The item-binding parameter name.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// The display label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<T> Clone for KeySelector<T> {
    fn clone(&self) -> Self {
        Self {
            param: self.param.clone(),
            label: self.label.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<T> PartialEq for KeySelector<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl<T> Eq for KeySelector<T> {}

impl<T> Hash for KeySelector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.func) as *const () as usize).hash(state);
    }
}

impl<T> fmt::Debug for KeySelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySelector")
            .field("param", &self.param)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for KeySelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|{}| {}",
            self.param,
            self.label.as_deref().unwrap_or("<key>")
        )
    }
}

/// Names of the composite-call operations a tree can contain.
///
/// The set is closed: new directive kinds are added here, never discovered by
/// open-ended inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOp {
    /// Filter by a predicate.
    Where,
    /// Primary ascending order.
    OrderBy,
    /// Primary descending order.
    OrderByDescending,
    /// Secondary ascending order.
    ThenBy,
    /// Secondary descending order.
    ThenByDescending,
    /// Skip a number of records.
    Skip,
    /// Take at most a number of records.
    Take,
    /// Eager-load a relation path.
    Fetch,
}

impl CallOp {
    /// The operation name as written in tree renderings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Where => "where",
            Self::OrderBy => "order_by",
            Self::OrderByDescending => "order_by_descending",
            Self::ThenBy => "then_by",
            Self::ThenByDescending => "then_by_descending",
            Self::Skip => "skip",
            Self::Take => "take",
            Self::Fetch => "fetch",
        }
    }

    /// Check if this is one of the four ordering operations.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Self::OrderBy | Self::OrderByDescending | Self::ThenBy | Self::ThenByDescending
        )
    }

    /// Check if this is a paging operation.
    pub fn is_paging(&self) -> bool {
        matches!(self, Self::Skip | Self::Take)
    }
}

impl fmt::Display for CallOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A composite call: a named operation applied to ordered argument subtrees.
///
/// The first argument is the upstream chain, the last argument the
/// operation's own payload.
pub struct Call<T> {
    /// The operation name.
    pub op: CallOp,
    /// Argument subtrees, in call order.
    pub args: SmallVec<[Expr<T>; 2]>,
}

impl<T> Call<T> {
    /// The payload argument (the last one), if any.
    pub fn payload(&self) -> Option<&Expr<T>> {
        self.args.last()
    }
}

impl<T> Clone for Call<T> {
    fn clone(&self) -> Self {
        Self {
            op: self.op,
            args: self.args.clone(),
        }
    }
}

impl<T> PartialEq for Call<T> {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.args == other.args
    }
}

impl<T> Eq for Call<T> {}

impl<T> Hash for Call<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.op.hash(state);
        self.args.hash(state);
    }
}

impl<T> fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("op", &self.op)
            .field("args", &self.args)
            .finish()
    }
}

/// A node in a predicate tree.
pub enum Expr<T> {
    /// The query-root placeholder the call chain hangs off.
    Source,
    /// A leaf filter condition.
    Predicate(Predicate<T>),
    /// A key-selector payload.
    Key(KeySelector<T>),
    /// A literal paging count.
    Count(u64),
    /// An eager-load relation path.
    Path(FetchPath),
    /// A named operation over argument subtrees.
    Call(Box<Call<T>>),
    /// A single-operand conversion wrapper, unwrapped by all traversals.
    Convert(Box<Expr<T>>),
}

impl<T> Expr<T> {
    /// The query-root node.
    pub fn source() -> Self {
        Self::Source
    }

    /// Wrap a subtree in a conversion node.
    pub fn convert(inner: Expr<T>) -> Self {
        Self::Convert(Box::new(inner))
    }

    /// Append a `where` call carrying the given condition.
    pub fn filter(self, condition: Predicate<T>) -> Self {
        Self::call(CallOp::Where, self, Expr::Predicate(condition))
    }

    /// Append an ascending primary-order call.
    pub fn order_by(self, key: KeySelector<T>) -> Self {
        Self::call(CallOp::OrderBy, self, Expr::convert(Expr::Key(key)))
    }

    /// Append a descending primary-order call.
    pub fn order_by_descending(self, key: KeySelector<T>) -> Self {
        Self::call(
            CallOp::OrderByDescending,
            self,
            Expr::convert(Expr::Key(key)),
        )
    }

    /// Append an ascending secondary-order call.
    pub fn then_by(self, key: KeySelector<T>) -> Self {
        Self::call(CallOp::ThenBy, self, Expr::convert(Expr::Key(key)))
    }

    /// Append a descending secondary-order call.
    pub fn then_by_descending(self, key: KeySelector<T>) -> Self {
        Self::call(
            CallOp::ThenByDescending,
            self,
            Expr::convert(Expr::Key(key)),
        )
    }

    /// Append a `skip` call with a literal count.
    pub fn skip(self, count: u64) -> Self {
        Self::call(CallOp::Skip, self, Expr::Count(count))
    }

    /// Append a `take` call with a literal count.
    pub fn take(self, count: u64) -> Self {
        Self::call(CallOp::Take, self, Expr::Count(count))
    }

    /// Append an eager-load call.
    pub fn fetch(self, path: FetchPath) -> Self {
        Self::call(CallOp::Fetch, self, Expr::Path(path))
    }

    /// View this node as a composite call.
    pub fn as_call(&self) -> Option<&Call<T>> {
        match self {
            Self::Call(call) => Some(&**call),
            _ => None,
        }
    }

    fn call(op: CallOp, chain: Expr<T>, payload: Expr<T>) -> Self {
        Self::Call(Box::new(Call {
            op,
            args: smallvec![chain, payload],
        }))
    }
}

impl<T> Clone for Expr<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Source => Self::Source,
            Self::Predicate(p) => Self::Predicate(p.clone()),
            Self::Key(k) => Self::Key(k.clone()),
            Self::Count(n) => Self::Count(*n),
            Self::Path(p) => Self::Path(p.clone()),
            Self::Call(c) => Self::Call(c.clone()),
            Self::Convert(inner) => Self::Convert(inner.clone()),
        }
    }
}

impl<T> PartialEq for Expr<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Source, Self::Source) => true,
            (Self::Predicate(a), Self::Predicate(b)) => a == b,
            (Self::Key(a), Self::Key(b)) => a == b,
            (Self::Count(a), Self::Count(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (Self::Call(a), Self::Call(b)) => a == b,
            (Self::Convert(a), Self::Convert(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> Eq for Expr<T> {}

impl<T> Hash for Expr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Source => {}
            Self::Predicate(p) => p.hash(state),
            Self::Key(k) => k.hash(state),
            Self::Count(n) => n.hash(state),
            Self::Path(p) => p.hash(state),
            Self::Call(c) => c.hash(state),
            Self::Convert(inner) => inner.hash(state),
        }
    }
}

impl<T> fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("Source"),
            Self::Predicate(p) => f.debug_tuple("Predicate").field(p).finish(),
            Self::Key(k) => f.debug_tuple("Key").field(k).finish(),
            Self::Count(n) => f.debug_tuple("Count").field(n).finish(),
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Call(c) => f.debug_tuple("Call").field(c).finish(),
            Self::Convert(inner) => f.debug_tuple("Convert").field(inner).finish(),
        }
    }
}

impl<T> fmt::Display for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Predicate(p) => write!(f, "{}", p),
            Self::Key(k) => write!(f, "{}", k),
            Self::Count(n) => write!(f, "{}", n),
            Self::Path(p) => write!(f, "\"{}\"", p),
            Self::Convert(inner) => write!(f, "convert({})", inner),
            Self::Call(call) => {
                let mut args = call.args.iter();
                match args.next() {
                    Some(chain) => {
                        write!(f, "{}.{}(", chain, call.op)?;
                        for (i, arg) in args.enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{}", arg)?;
                        }
                        f.write_str(")")
                    }
                    None => write!(f, "{}()", call.op),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    #[derive(Debug)]
    struct Item {
        value: i64,
    }

    fn hash_of<V: Hash>(value: &V) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_predicate_test() {
        let positive = Predicate::new("x", |item: &Item| item.value > 0);
        assert!(positive.test(&Item { value: 1 }));
        assert!(!positive.test(&Item { value: -1 }));
        assert_eq!(positive.param(), "x");
    }

    #[test]
    fn test_predicate_equality_is_shared_function_identity() {
        let p = Predicate::new("x", |item: &Item| item.value > 0);
        let q = p.clone();
        let r = Predicate::new("x", |item: &Item| item.value > 0);
        assert_eq!(p, q);
        assert_ne!(p, r);
        assert_eq!(hash_of(&p), hash_of(&q));
    }

    #[test]
    fn test_key_selector_widens() {
        let key = KeySelector::new("x", |item: &Item| item.value);
        assert_eq!(key.key(&Item { value: 9 }), SortKey::Int(9));
    }

    #[test]
    fn test_call_op_kinds() {
        assert!(CallOp::OrderBy.is_ordering());
        assert!(CallOp::ThenByDescending.is_ordering());
        assert!(CallOp::Skip.is_paging());
        assert!(!CallOp::Where.is_ordering());
        assert!(!CallOp::Fetch.is_paging());
        assert_eq!(CallOp::OrderByDescending.as_str(), "order_by_descending");
    }

    #[test]
    fn test_tree_equality() {
        let p = Predicate::new("x", |item: &Item| item.value > 0);
        let key = KeySelector::new("x", |item: &Item| item.value);

        let a = Expr::source()
            .filter(p.clone())
            .order_by(key.clone())
            .take(5);
        let b = Expr::source().filter(p.clone()).order_by(key).take(5);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = Expr::source().filter(p).take(5);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_renders_chain() {
        let p = Predicate::new("x", |item: &Item| item.value > 0).labeled("value > 0");
        let key = KeySelector::new("x", |item: &Item| item.value).labeled("value");
        let expr = Expr::source().filter(p).order_by(key).take(5);
        assert_eq!(
            expr.to_string(),
            "source.where(|x| value > 0).order_by(convert(|x| value)).take(5)"
        );
    }

    #[test]
    fn test_payload_is_last_argument() {
        let expr = Expr::<Item>::source().skip(3);
        let call = expr.as_call().expect("skip call");
        assert_eq!(call.op, CallOp::Skip);
        assert_eq!(call.payload(), Some(&Expr::Count(3)));
    }
}
