use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ops::Index;

use crate::error::ConfigError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::key_eq::DefaultEq;
use crate::key_eq::KeyEq;

/// A hash map stored in a flat [`HashTable`] of `(K, V)` slots.
///
/// The map is configured with two independent strategies that stay fixed for
/// its lifetime:
///
/// - `S`, a [`BuildHasher`] that turns keys into 64-bit hashes;
/// - `E`, a [`KeyEq`] strategy that decides whether two keys are the same key.
///   [`DefaultEq`] uses the key's [`Eq`] implementation, and any
///   `Fn(&K, &K) -> bool` closure may be used instead.
///
/// The two must agree: keys that compare equal must hash equally.
///
/// # Reference invalidation
///
/// Every reference returned by [`find`](Self::find),
/// [`find_mut`](Self::find_mut),
/// [`insert_or_assign`](Self::insert_or_assign) or
/// [`get_or_insert_default`](Self::get_or_insert_default) borrows the map.
/// Inserting may grow the slot array and erasing may compact it, so the
/// borrow checker ends those references before any further mutation.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use flat_hash::DefaultHashBuilder;
/// use flat_hash::HashMap;
///
/// let mut fruit: HashMap<i32, String, DefaultHashBuilder> = HashMap::new();
/// fruit.reserve(8);
///
/// fruit.insert_or_assign(1, "apple".to_string());
/// fruit.insert_or_assign(2, "banana".to_string());
/// *fruit.get_or_insert_default(3) = "cherry".to_string();
///
/// assert_eq!(fruit.find(&2).map(String::as_str), Some("banana"));
/// assert!(fruit.erase(&1));
/// assert_eq!(fruit.len(), 2);
/// # }
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, S, E = DefaultEq> {
    table: HashTable<(K, V)>,
    hash_builder: S,
    key_eq: E,
}

impl<K, V, S, E> Debug for HashMap<K, V, S, E>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S, E> HashMap<K, V, S, E>
where
    E: Default,
{
    /// Creates an empty map with the given hasher builder. Nothing is
    /// allocated until the first insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use flat_hash::HashMap;
    ///
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(RandomState::new());
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), 0);
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_hasher_and_eq(hash_builder, E::default())
    }

    /// Creates an empty map with `bucket_count` slots, rounded up to a power
    /// of two.
    pub fn with_bucket_count_and_hasher(bucket_count: usize, hash_builder: S) -> Self {
        Self::with_bucket_count_hasher_and_eq(bucket_count, hash_builder, E::default())
    }

    /// Creates an empty map able to hold `capacity` entries without growing.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
            key_eq: E::default(),
        }
    }
}

impl<K, V, S, E> HashMap<K, V, S, E> {
    /// Creates an empty map with the given hasher builder and key equality
    /// strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use flat_hash::HashMap;
    ///
    /// let mut map: HashMap<u32, &str, _, _> =
    ///     HashMap::with_hasher_and_eq(RandomState::new(), |a: &u32, b: &u32| a == b);
    /// map.insert(7, "seven");
    /// assert_eq!(map.find(&7), Some(&"seven"));
    /// # }
    /// ```
    pub fn with_hasher_and_eq(hash_builder: S, key_eq: E) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
            key_eq,
        }
    }

    /// Creates an empty map with `bucket_count` slots, the given hasher
    /// builder and the given key equality strategy.
    pub fn with_bucket_count_hasher_and_eq(
        bucket_count: usize,
        hash_builder: S,
        key_eq: E,
    ) -> Self {
        Self {
            table: HashTable::with_bucket_count(bucket_count),
            hash_builder,
            key_eq,
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the underlying table. Zero before the
    /// first insert, a power of two afterwards.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Returns the number of tombstones left by erased entries.
    pub fn tombstone_count(&self) -> usize {
        self.table.tombstone_count()
    }

    /// Returns the number of entries the map can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the fraction of slots that are filled or tombstoned.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the maximum load factor.
    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    /// Sets the maximum load factor.
    ///
    /// Fails with [`ConfigError::InvalidConfiguration`] unless
    /// `0.1 < factor < 0.95`, leaving the map unchanged. Otherwise the map
    /// grows right away if it is already above the new bound.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use flat_hash::ConfigError;
    /// use flat_hash::DefaultHashBuilder;
    /// use flat_hash::HashMap;
    ///
    /// let mut map: HashMap<u32, u32, DefaultHashBuilder> = HashMap::new();
    /// assert_eq!(
    ///     map.set_max_load_factor(0.05),
    ///     Err(ConfigError::InvalidConfiguration { factor: 0.05 })
    /// );
    /// assert!(map.set_max_load_factor(0.99).is_err());
    /// assert_eq!(map.max_load_factor(), 0.7);
    ///
    /// map.set_max_load_factor(0.5).unwrap();
    /// assert_eq!(map.max_load_factor(), 0.5);
    /// # }
    /// ```
    pub fn set_max_load_factor(&mut self, factor: f32) -> Result<(), ConfigError> {
        self.table.set_max_load_factor(factor)
    }

    /// Removes every entry, keeping the slot array.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Rebuilds the table with at least `bucket_count` slots, dropping every
    /// tombstone. See [`HashTable::rehash`].
    pub fn rehash(&mut self, bucket_count: usize) {
        self.table.rehash(bucket_count);
    }

    /// Returns the hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the key equality strategy.
    pub fn key_eq(&self) -> &E {
        &self.key_eq
    }

    /// Iterates over `(&K, &V)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Iterates over `(&K, &mut V)` pairs in slot order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Iterates over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Iterates over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Iterates over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes every entry and yields it. The slot array keeps its size.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<K, V, S, E> HashMap<K, V, S, E>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
{
    /// Inserts `value` under `key`, or overwrites the value already stored
    /// under an equal key.
    ///
    /// Returns `true` if the key was not present, and a mutable reference to
    /// the stored value. The stored key is kept when a value is overwritten.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use flat_hash::DefaultHashBuilder;
    /// use flat_hash::HashMap;
    ///
    /// let mut map: HashMap<&str, u32, DefaultHashBuilder> = HashMap::new();
    ///
    /// let (inserted, value) = map.insert_or_assign("a", 1);
    /// assert!(inserted);
    /// *value += 10;
    ///
    /// let (inserted, value) = map.insert_or_assign("a", 2);
    /// assert!(!inserted);
    /// assert_eq!(*value, 2);
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (bool, &mut V) {
        let hash = self.hash_builder.hash_one(&key);
        self.insert_hashed(hash, key, value)
    }

    /// Inserts a key-value pair, returning the previous value stored under an
    /// equal key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use flat_hash::DefaultHashBuilder;
    /// use flat_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str, DefaultHashBuilder> = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.find(&37), Some(&"b"));
    /// # }
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        let key_eq = &self.key_eq;
        match self.table.entry(hash, |(k, _)| key_eq.key_eq(k, &key)) {
            TableEntry::Occupied(entry) => {
                Some(core::mem::replace(&mut entry.into_mut().1, value))
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                None
            }
        }
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// Never fails: a missing key, including on a map that has not allocated
    /// yet, is `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use flat_hash::DefaultHashBuilder;
    /// use flat_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str, DefaultHashBuilder> = HashMap::new();
    /// assert_eq!(map.find(&1), None);
    /// map.insert(1, "a");
    /// assert_eq!(map.find(&1), Some(&"a"));
    /// # }
    /// ```
    pub fn find(&self, key: &K) -> Option<&V> {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |(k, _)| self.key_eq.key_eq(k, key))
            .map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        let key_eq = &self.key_eq;
        self.table
            .find_mut(hash, |(k, _)| key_eq.key_eq(k, key))
            .map(|(_, v)| v)
    }

    /// Returns `true` if an entry is stored under `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns the value stored under `key`, inserting `V::default()` first if
    /// the key is absent.
    ///
    /// A present key is looked up without touching the table; only an absent
    /// key goes through the insert path, and with it the growth check.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use flat_hash::DefaultHashBuilder;
    /// use flat_hash::HashMap;
    ///
    /// let mut counts: HashMap<&str, u32, DefaultHashBuilder> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts.find(&"a"), Some(&2));
    /// assert_eq!(counts.find(&"b"), Some(&1));
    /// # }
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let hash = self.hash_builder.hash_one(&key);
        let key_eq = &self.key_eq;
        if let Some(index) = self.table.find_index(hash, |(k, _)| key_eq.key_eq(k, &key)) {
            return &mut self.table.get_index_mut(index).1;
        }
        self.insert_hashed(hash, key, V::default()).1
    }

    /// Removes the entry stored under `key`, returning whether there was one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use flat_hash::DefaultHashBuilder;
    /// use flat_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str, DefaultHashBuilder> = HashMap::new();
    /// map.insert(1, "a");
    /// assert!(map.erase(&1));
    /// assert!(!map.erase(&1));
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn erase(&mut self, key: &K) -> bool {
        self.remove_entry(key).is_some()
    }

    /// Removes the entry stored under `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes the entry stored under `key` and returns the stored key and
    /// value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_builder.hash_one(key);
        let key_eq = &self.key_eq;
        self.table.remove(hash, |(k, _)| key_eq.key_eq(k, key))
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use flat_hash::DefaultHashBuilder;
    /// use flat_hash::HashMap;
    ///
    /// let mut map: HashMap<&str, Vec<u32>, DefaultHashBuilder> = HashMap::new();
    /// map.entry("evens").or_default().push(2);
    /// map.entry("evens").or_default().push(4);
    /// map.entry("odds").or_insert_with(Vec::new).push(1);
    ///
    /// assert_eq!(map.find(&"evens"), Some(&vec![2, 4]));
    /// assert_eq!(map.find(&"odds"), Some(&vec![1]));
    /// # }
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_builder.hash_one(&key);
        let key_eq = &self.key_eq;
        match self.table.entry(hash, |(k, _)| key_eq.key_eq(k, &key)) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    fn insert_hashed(&mut self, hash: u64, key: K, value: V) -> (bool, &mut V) {
        let key_eq = &self.key_eq;
        match self.table.entry(hash, |(k, _)| key_eq.key_eq(k, &key)) {
            TableEntry::Occupied(entry) => {
                let slot = &mut entry.into_mut().1;
                *slot = value;
                (false, slot)
            }
            TableEntry::Vacant(entry) => (true, &mut entry.insert((key, value)).1),
        }
    }
}

impl<K, V, S, E> HashMap<K, V, S, E>
where
    S: Default,
    E: Default,
{
    /// Creates an empty map with default strategies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use flat_hash::DefaultHashBuilder;
    /// use flat_hash::HashMap;
    ///
    /// let map: HashMap<i32, String, DefaultHashBuilder> = HashMap::new();
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty map able to hold `capacity` entries without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use flat_hash::DefaultHashBuilder;
    /// use flat_hash::HashMap;
    ///
    /// let map: HashMap<i32, String, DefaultHashBuilder> = HashMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// # }
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    /// Creates an empty map with `bucket_count` slots, rounded up to a power
    /// of two.
    pub fn with_bucket_count(bucket_count: usize) -> Self {
        Self::with_bucket_count_and_hasher(bucket_count, S::default())
    }
}

impl<K, V, S, E> Default for HashMap<K, V, S, E>
where
    S: Default,
    E: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, E> Index<&K> for HashMap<K, V, S, E>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &K) -> &V {
        self.find(key).expect("key not found in HashMap")
    }
}

impl<K, V, S, E> Extend<(K, V)> for HashMap<K, V, S, E>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > 0 {
            self.reserve(lower);
        }
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S, E> FromIterator<(K, V)> for HashMap<K, V, S, E>
where
    K: Hash,
    S: BuildHasher + Default,
    E: KeyEq<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S, E> IntoIterator for &'a HashMap<K, V, S, E> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Runs `f` on the value of an occupied entry.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns the key of this entry.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts `V::default()` if the entry is vacant.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A vacant entry of a [`HashMap`].
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Returns the key that will be stored.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Gives the key back without inserting.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts `value` under the entry's key.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// An occupied entry of a [`HashMap`].
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Returns the stored key.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Returns the value.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Returns the value mutably.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Replaces the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Erases the entry and returns its value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Erases the entry and returns the stored key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// Iterator over the entries of a [`HashMap`].
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over the entries of a [`HashMap`] with mutable values.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator over mutable references to the values of a [`HashMap`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Draining iterator over the entries of a [`HashMap`].
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Hashes a `u32` by its last decimal digit, so keys equal modulo 10 land
    /// on the same hash.
    #[derive(Clone, Default)]
    struct LastDigit;

    struct LastDigitHasher(u64);

    impl Hasher for LastDigitHasher {
        fn finish(&self) -> u64 {
            self.0.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        }

        fn write(&mut self, bytes: &[u8]) {
            for b in bytes {
                self.0 = self.0.wrapping_mul(31).wrapping_add(*b as u64);
            }
        }

        fn write_u32(&mut self, n: u32) {
            self.0 = (n % 10) as u64;
        }
    }

    impl BuildHasher for LastDigit {
        type Hasher = LastDigitHasher;

        fn build_hasher(&self) -> Self::Hasher {
            LastDigitHasher(0)
        }
    }

    type Map<K, V> = HashMap<K, V, SipHashBuilder>;

    #[test]
    fn test_new_and_with_hasher() {
        let map: Map<i32, String> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.bucket_count(), 0);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert_eq!(map2.len(), 0);
    }

    #[test]
    fn test_with_capacity_and_bucket_count() {
        let map: Map<i32, String> = HashMap::with_capacity(100);
        assert!(map.capacity() >= 100);
        assert!(map.is_empty());

        let map2: Map<i32, String> = HashMap::with_bucket_count(100);
        assert_eq!(map2.bucket_count(), 128);

        let map3 = HashMap::<i32, String, _>::with_bucket_count_and_hasher(
            5,
            SipHashBuilder::default(),
        );
        assert_eq!(map3.bucket_count(), 8);
    }

    #[test]
    fn test_insert_and_find() {
        let mut map: Map<i32, String> = HashMap::new();

        assert_eq!(map.insert(1, "hello".to_string()), None);
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.find(&1), Some(&"hello".to_string()));
        assert_eq!(map.find(&2), None);

        assert_eq!(
            map.insert(1, "world".to_string()),
            Some("hello".to_string())
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.find(&1), Some(&"world".to_string()));
    }

    #[test]
    fn test_insert_or_assign_reports_insertion() {
        let mut map: Map<u64, u64> = HashMap::new();
        let (inserted, value) = map.insert_or_assign(5, 50);
        assert!(inserted);
        assert_eq!(*value, 50);

        let (inserted, value) = map.insert_or_assign(5, 51);
        assert!(!inserted);
        *value += 1;
        assert_eq!(map.find(&5), Some(&52));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_find_mut() {
        let mut map: Map<i32, String> = HashMap::new();
        map.insert(1, "hello".to_string());

        if let Some(value) = map.find_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.find(&1), Some(&"hello world".to_string()));
        assert_eq!(map.find_mut(&2), None);
    }

    #[test]
    fn test_contains_key() {
        let mut map: Map<i32, String> = HashMap::new();
        assert!(!map.contains_key(&1));

        map.insert(1, "value".to_string());
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_erase_and_remove() {
        let mut map: Map<i32, String> = HashMap::new();
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());
        map.insert(3, "again".to_string());

        assert!(map.erase(&1));
        assert!(!map.erase(&1));
        assert_eq!(map.len(), 2);
        assert_eq!(map.tombstone_count(), 1);
        assert!(!map.contains_key(&1));

        assert_eq!(map.remove(&2), Some("world".to_string()));
        assert_eq!(map.remove(&2), None);
        assert_eq!(map.remove_entry(&3), Some((3, "again".to_string())));
        assert!(map.is_empty());
    }

    #[test]
    fn test_erase_on_unallocated_map() {
        let mut map: Map<i32, String> = HashMap::new();
        assert!(!map.erase(&1));
        assert_eq!(map.find(&1), None);
        assert_eq!(map.bucket_count(), 0);
    }

    #[test]
    fn test_get_or_insert_default() {
        let mut map: Map<&str, u32> = HashMap::new();
        *map.get_or_insert_default("a") += 1;
        *map.get_or_insert_default("a") += 1;
        *map.get_or_insert_default("b") += 5;
        assert_eq!(map.find(&"a"), Some(&2));
        assert_eq!(map.find(&"b"), Some(&5));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_get_or_insert_default_skips_growth_for_present_key() {
        let mut map: Map<u32, u32> = HashMap::with_bucket_count(16);
        // 11 entries leave the 16-slot table exactly at its bound.
        for k in 0..11 {
            map.insert(k, k);
        }
        assert_eq!(map.bucket_count(), 16);

        *map.get_or_insert_default(3) += 1;
        assert_eq!(map.bucket_count(), 16);
        assert_eq!(map.find(&3), Some(&4));

        map.get_or_insert_default(100);
        assert_eq!(map.bucket_count(), 32);
        assert_eq!(map.find(&100), Some(&0));
    }

    #[test]
    fn test_custom_key_equality() {
        let mut map: HashMap<u32, &str, LastDigit, _> =
            HashMap::with_hasher_and_eq(LastDigit, |a: &u32, b: &u32| a % 10 == b % 10);

        assert_eq!(map.insert(3, "three"), None);
        assert_eq!(map.insert(13, "thirteen"), Some("three"));
        assert_eq!(map.len(), 1);

        // The first key is kept, the value is replaced.
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3]);
        assert_eq!(map.find(&23), Some(&"thirteen"));
        assert!(map.erase(&43));
        assert!(map.is_empty());
    }

    #[test]
    fn test_set_max_load_factor() {
        let mut map: Map<u32, u32> = HashMap::new();
        for k in 0..10 {
            map.insert(k, k);
        }
        let buckets = map.bucket_count();

        assert_eq!(
            map.set_max_load_factor(0.05),
            Err(ConfigError::InvalidConfiguration { factor: 0.05 })
        );
        assert_eq!(
            map.set_max_load_factor(0.99),
            Err(ConfigError::InvalidConfiguration { factor: 0.99 })
        );
        assert_eq!(map.max_load_factor(), 0.7);
        assert_eq!(map.bucket_count(), buckets);

        map.set_max_load_factor(0.3).unwrap();
        assert!(map.load_factor() <= 0.3);
        for k in 0..10 {
            assert_eq!(map.find(&k), Some(&k));
        }
    }

    #[test]
    fn test_clear() {
        let mut map: Map<i32, String> = HashMap::new();
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());
        let buckets = map.bucket_count();

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.bucket_count(), buckets);
        assert!(!map.contains_key(&1));
    }

    #[test]
    fn test_rehash_keeps_entries() {
        let mut map: Map<u32, u32> = HashMap::new();
        for k in 0..40 {
            map.insert(k, k * 3);
        }
        for k in 0..10 {
            map.erase(&k);
        }
        map.rehash(256);
        assert_eq!(map.bucket_count(), 256);
        assert_eq!(map.tombstone_count(), 0);
        for k in 10..40 {
            assert_eq!(map.find(&k), Some(&(k * 3)));
        }
    }

    #[test]
    fn test_entry_or_insert() {
        let mut map: Map<i32, String> = HashMap::new();

        let value = map.entry(1).or_insert("hello".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        let value = map.entry(1).or_insert("world".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_entry_and_modify() {
        let mut map: Map<i32, i32> = HashMap::new();
        map.insert(1, 10);

        map.entry(1).and_modify(|v| *v += 5).or_insert(0);
        map.entry(2).and_modify(|v| *v += 5).or_insert(7);
        assert_eq!(map.find(&1), Some(&15));
        assert_eq!(map.find(&2), Some(&7));
    }

    #[test]
    fn test_entry_key_and_occupied_ops() {
        let mut map: Map<i32, String> = HashMap::new();
        assert_eq!(map.entry(4).key(), &4);

        match map.entry(4) {
            Entry::Vacant(v) => {
                assert_eq!(v.key(), &4);
                v.insert("four".to_string());
            }
            Entry::Occupied(_) => panic!("expected vacant"),
        }

        match map.entry(4) {
            Entry::Occupied(mut o) => {
                assert_eq!(o.key(), &4);
                assert_eq!(o.insert("FOUR".to_string()), "four");
                assert_eq!(o.get(), "FOUR");
                assert_eq!(o.remove_entry(), (4, "FOUR".to_string()));
            }
            Entry::Vacant(_) => panic!("expected occupied"),
        }
        assert!(map.is_empty());

        match map.entry(9) {
            Entry::Vacant(v) => assert_eq!(v.into_key(), 9),
            Entry::Occupied(_) => panic!("expected vacant"),
        }
        assert!(map.is_empty());
    }

    #[test]
    fn test_iterators() {
        let mut map: Map<u32, u32> = HashMap::new();
        for k in 0..20 {
            map.insert(k, k * 2);
        }

        let mut pairs: Vec<(u32, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        pairs.sort();
        assert_eq!(pairs, (0..20).map(|k| (k, k * 2)).collect::<Vec<_>>());

        let mut keys: Vec<u32> = map.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, (0..20).collect::<Vec<_>>());

        for v in map.values_mut() {
            *v += 1;
        }
        for (k, v) in map.iter_mut() {
            assert_eq!(*v, k * 2 + 1);
            *v -= 1;
        }
        let total: u32 = map.values().sum();
        assert_eq!(total, (0..20).map(|k| k * 2).sum());

        let mut count = 0;
        for (_k, _v) in &map {
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[test]
    fn test_drain() {
        let mut map: Map<u32, String> = HashMap::new();
        for k in 0..5 {
            map.insert(k, k.to_string());
        }
        let buckets = map.bucket_count();

        let mut drained: Vec<(u32, String)> = map.drain().collect();
        drained.sort();
        assert_eq!(drained.len(), 5);
        assert_eq!(drained[0], (0, "0".to_string()));
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), buckets);
    }

    #[test]
    fn test_extend_and_from_iter() {
        let map: Map<u32, u32> = (0..50).map(|k| (k, k + 1)).collect();
        assert_eq!(map.len(), 50);
        assert_eq!(map[&49], 50);

        let mut map2: Map<u32, u32> = HashMap::new();
        map2.extend([(1, 1), (2, 2), (1, 3)]);
        assert_eq!(map2.len(), 2);
        assert_eq!(map2[&1], 3);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_missing_key_panics() {
        let map: Map<u32, u32> = HashMap::new();
        let _ = map[&1];
    }

    #[test]
    fn test_clone_is_independent() {
        let mut map: Map<u32, String> = HashMap::new();
        map.insert(1, "one".to_string());
        let mut cloned = map.clone();
        cloned.insert(1, "uno".to_string());
        cloned.insert(2, "dos".to_string());

        assert_eq!(map.find(&1), Some(&"one".to_string()));
        assert_eq!(map.len(), 1);
        assert_eq!(cloned.len(), 2);
    }

    #[test]
    fn test_debug_lists_entries() {
        let mut map: Map<u32, &str> = HashMap::new();
        map.insert(1, "a");
        assert_eq!(alloc::format!("{:?}", map), "{1: \"a\"}");
    }
}
