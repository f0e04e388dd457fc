/// Strategy deciding whether two keys are the same key.
///
/// A [`HashMap`](crate::HashMap) holds one of these next to its hash builder
/// for its whole lifetime. Implementations must be reflexive, symmetric and
/// transitive, and must agree with the hash builder: keys that compare equal
/// must hash equally, otherwise lookups may miss and duplicate keys may be
/// stored.
///
/// Any `Fn(&K, &K) -> bool` closure is a strategy:
///
/// ```rust
/// use flat_hash::KeyEq;
///
/// let case_insensitive = |a: &String, b: &String| a.eq_ignore_ascii_case(b);
/// assert!(case_insensitive.key_eq(&"Apple".to_string(), &"APPLE".to_string()));
/// ```
pub trait KeyEq<K: ?Sized> {
    /// Returns `true` if `a` and `b` identify the same entry.
    fn key_eq(&self, a: &K, b: &K) -> bool;
}

/// Equality strategy that defers to the key's [`Eq`] implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultEq;

impl<K: Eq + ?Sized> KeyEq<K> for DefaultEq {
    #[inline(always)]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

impl<K: ?Sized, F> KeyEq<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline(always)]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}
