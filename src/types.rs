//! Common value types used by shaping directives.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Sort order for a single ordering step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (smallest key first).
    Asc,
    /// Descending order (largest key first).
    Desc,
}

impl SortOrder {
    /// Check if this order is descending.
    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Desc)
    }

    /// Short lowercase name for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Asc
    }
}

/// A sort key widened to a uniform domain.
///
/// Key selectors over heterogeneous field types all produce a `SortKey`, so
/// downstream consumers can compare keys from different specifications
/// without per-key-type specialization. The ordering is total: within a
/// variant keys compare naturally (floats by `total_cmp`), and keys of
/// different kinds compare by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortKey {
    /// Absent value.
    Null,
    /// Boolean key.
    Bool(bool),
    /// Integer key.
    Int(i64),
    /// Floating-point key.
    Float(f64),
    /// String key.
    Str(String),
}

impl SortKey {
    /// Check if this is the null key.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn kind(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Float(_) => 3,
            Self::Str(_) => 4,
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl Hash for SortKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(x) => x.to_bits().hash(state),
            Self::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<bool> for SortKey {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SortKey {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for SortKey {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for SortKey {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for SortKey {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for SortKey {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for SortKey {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl<V: Into<SortKey>> From<Option<V>> for SortKey {
    fn from(v: Option<V>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A relation path for eager loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchPath(SmolStr);

impl FetchPath {
    /// Create a new fetch path.
    pub fn new(path: impl Into<SmolStr>) -> Self {
        Self(path.into())
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FetchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FetchPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for FetchPath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order() {
        assert_eq!(SortOrder::Asc.as_str(), "asc");
        assert_eq!(SortOrder::Desc.as_str(), "desc");
        assert!(SortOrder::Desc.is_descending());
        assert_eq!(SortOrder::default(), SortOrder::Asc);
    }

    #[test]
    fn test_sort_key_from() {
        assert_eq!(SortKey::from(42i32), SortKey::Int(42));
        assert_eq!(SortKey::from("hello"), SortKey::Str("hello".to_string()));
        assert_eq!(SortKey::from(true), SortKey::Bool(true));
        assert_eq!(SortKey::from(None::<i64>), SortKey::Null);
        assert_eq!(SortKey::from(Some(7i64)), SortKey::Int(7));
    }

    #[test]
    fn test_sort_key_ordering_within_kind() {
        assert!(SortKey::Int(1) < SortKey::Int(2));
        assert!(SortKey::Str("a".into()) < SortKey::Str("b".into()));
        assert!(SortKey::Float(1.5) < SortKey::Float(2.5));
    }

    #[test]
    fn test_sort_key_ordering_across_kinds() {
        assert!(SortKey::Null < SortKey::Bool(false));
        assert!(SortKey::Bool(true) < SortKey::Int(0));
        assert!(SortKey::Int(i64::MAX) < SortKey::Float(f64::MIN));
        assert!(SortKey::Float(f64::MAX) < SortKey::Str(String::new()));
    }

    #[test]
    fn test_sort_key_float_total_order() {
        assert!(SortKey::Float(f64::NEG_INFINITY) < SortKey::Float(0.0));
        assert!(SortKey::Float(0.0) < SortKey::Float(f64::NAN));
        assert_eq!(SortKey::Float(f64::NAN), SortKey::Float(f64::NAN));
    }

    #[test]
    fn test_fetch_path() {
        let path = FetchPath::from("orders");
        assert_eq!(path.as_str(), "orders");
        assert_eq!(path.to_string(), "orders");
        assert_eq!(path, FetchPath::new("orders"));
    }
}
