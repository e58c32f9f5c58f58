//! Key Canonicalizer
//!
//! Turns a call's positional and named arguments into a stable, hashable
//! cache identity.

use std::collections::BTreeMap;

use serde::Serialize;

// == Cache Key ==
/// Canonical form of a call's arguments.
///
/// Positional arguments keep call order. Named arguments are sorted by name,
/// so `f(a=1, b=2)` and `f(b=2, a=1)` produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey<A> {
    positional: Vec<A>,
    named: Vec<(String, A)>,
}

impl<A> CacheKey<A> {
    /// Builds the canonical key for a call.
    ///
    /// If a name appears more than once, the last value wins.
    pub fn canonicalize<N, S>(positional: Vec<A>, named: N) -> Self
    where
        N: IntoIterator<Item = (S, A)>,
        S: Into<String>,
    {
        let sorted: BTreeMap<String, A> = named
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();

        Self {
            positional,
            named: sorted.into_iter().collect(),
        }
    }

    /// Key for a call with positional arguments only.
    pub fn positional(args: Vec<A>) -> Self {
        Self {
            positional: args,
            named: Vec::new(),
        }
    }

    /// Positional arguments in call order.
    pub fn args(&self) -> &[A] {
        &self.positional
    }

    /// Positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&A> {
        self.positional.get(index)
    }

    /// Named arguments sorted by name.
    pub fn named_args(&self) -> impl Iterator<Item = (&str, &A)> {
        self.named.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Named argument by name.
    pub fn named(&self, name: &str) -> Option<&A> {
        self.named
            .binary_search_by(|(n, _)| n.as_str().cmp(name))
            .ok()
            .map(|idx| &self.named[idx].1)
    }
}

// == Arg Value ==
/// A hashable argument value for calls with mixed argument types.
///
/// Floats are deliberately absent: they have no total equality and cannot
/// serve as lookup keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Unit,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<ArgValue>),
}

impl ArgValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(v) => Some(*v),
            ArgValue::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<()> for ArgValue {
    fn from(_: ()) -> Self {
        ArgValue::Unit
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(v.into())
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<u32> for ArgValue {
    fn from(v: u32) -> Self {
        ArgValue::UInt(v.into())
    }
}

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        ArgValue::UInt(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(v: Vec<T>) -> Self {
        ArgValue::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_order_independent() {
        let a = CacheKey::canonicalize(vec![], [("a", 1), ("b", 2)]);
        let b = CacheKey::canonicalize(vec![], [("b", 2), ("a", 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_positional_order_dependent() {
        let a = CacheKey::canonicalize(vec![1, 2], Vec::<(String, i32)>::new());
        let b = CacheKey::canonicalize(vec![2, 1], Vec::<(String, i32)>::new());
        assert_ne!(a, b);
    }

    #[test]
    fn test_positional_and_named_are_distinct() {
        let a = CacheKey::canonicalize(vec![1], Vec::<(String, i32)>::new());
        let b = CacheKey::canonicalize(vec![], [("x", 1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_duplicate_name_last_wins() {
        let key = CacheKey::canonicalize(vec![], [("a", 1), ("a", 5)]);
        assert_eq!(key.named("a"), Some(&5));
        assert_eq!(key.named_args().count(), 1);
    }

    #[test]
    fn test_accessors() {
        let key = CacheKey::canonicalize(vec![10, 20], [("z", 3), ("m", 4)]);
        assert_eq!(key.args(), &[10, 20]);
        assert_eq!(key.arg(1), Some(&20));
        assert_eq!(key.arg(2), None);
        assert_eq!(key.named("m"), Some(&4));
        assert_eq!(key.named("q"), None);

        let names: Vec<&str> = key.named_args().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["m", "z"]);
    }

    #[test]
    fn test_positional_shorthand_matches_canonicalize() {
        let a = CacheKey::positional(vec![7]);
        let b = CacheKey::canonicalize(vec![7], Vec::<(String, i32)>::new());
        assert_eq!(a, b);
    }

    #[test]
    fn test_arg_value_mixed_key() {
        let a = CacheKey::canonicalize(
            vec![ArgValue::from(1i64), ArgValue::from("x")],
            [("flag", ArgValue::from(true))],
        );
        let b = CacheKey::canonicalize(
            vec![ArgValue::Int(1), ArgValue::Str("x".to_string())],
            [("flag", ArgValue::Bool(true))],
        );
        assert_eq!(a, b);
        assert_eq!(a.arg(0).and_then(ArgValue::as_int), Some(1));
        assert_eq!(a.arg(1).and_then(ArgValue::as_str), Some("x"));
    }

    #[test]
    fn test_arg_value_list_conversion() {
        let v = ArgValue::from(vec![1i64, 2]);
        assert_eq!(v, ArgValue::List(vec![ArgValue::Int(1), ArgValue::Int(2)]));
    }
}
