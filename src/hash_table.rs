use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::mem;

use tracing::debug;
use tracing::trace;

use crate::error::ConfigError;

/// Bucket count used when the first insert materializes storage.
const DEFAULT_BUCKET_COUNT: usize = 16;

/// Load factor a table starts with.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 0.7;

/// Exclusive lower bound accepted by [`HashTable::set_max_load_factor`].
const LOAD_FACTOR_FLOOR: f32 = 0.1;

/// Exclusive upper bound accepted by [`HashTable::set_max_load_factor`]. Kept
/// below 1.0 so that at least one slot is always `Empty` and every probe walk
/// terminates.
const LOAD_FACTOR_CEILING: f32 = 0.95;

/// Smallest power of two `>= n`, never less than 2.
#[inline(always)]
fn next_pow2(n: usize) -> usize {
    n.max(2)
        .checked_next_power_of_two()
        .expect("capacity overflow")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Capacity {
    buckets: usize,
}

impl From<usize> for Capacity {
    #[inline(always)]
    fn from(value: usize) -> Self {
        // Masking the hash with `buckets - 1` only covers every slot when
        // `buckets` is a power of two.
        Capacity {
            buckets: next_pow2(value),
        }
    }
}

impl Capacity {
    /// Capacity large enough to hold `entries` live slots without exceeding
    /// `max_load_factor`: `ceil(entries / max_load_factor) + 1`, rounded up.
    #[inline]
    fn for_entries(entries: usize, max_load_factor: f32) -> Self {
        // `as usize` saturates, so absurd requests end in the overflow panic
        // of `next_pow2` instead of wrapping.
        let scaled = (entries as f64 / max_load_factor as f64).ceil() as usize;
        scaled.saturating_add(1).into()
    }
}

#[derive(Clone)]
enum Slot<V> {
    Empty,
    Filled { hash: u64, value: V },
    Deleted,
}

impl<V> Slot<V> {
    #[inline(always)]
    fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline(always)]
    fn value(&self) -> Option<&V> {
        match self {
            Slot::Filled { value, .. } => Some(value),
            _ => None,
        }
    }

    #[inline(always)]
    fn value_mut(&mut self) -> Option<&mut V> {
        match self {
            Slot::Filled { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Turns a filled slot into a tombstone and hands back its value. Other
    /// states are left untouched.
    #[inline]
    fn take(&mut self) -> Option<V> {
        match mem::replace(self, Slot::Deleted) {
            Slot::Filled { value, .. } => Some(value),
            other => {
                *self = other;
                None
            }
        }
    }
}

fn empty_slots<V>(capacity: Capacity) -> Vec<Slot<V>> {
    let mut slots = Vec::with_capacity(capacity.buckets);
    slots.resize_with(capacity.buckets, || Slot::Empty);
    slots
}

/// Outcome of walking a probe sequence.
enum Probe {
    /// A filled slot matched the predicate.
    Occupied(usize),
    /// The key is absent; a new entry belongs at this index. This is the
    /// first tombstone passed on the way, or the `Empty` slot that ended the
    /// walk.
    Vacant(usize),
    /// Every slot was visited without a match and without a reusable slot.
    Exhausted,
}

/// An open-addressing hash table with linear probing.
///
/// `HashTable<V>` stores values of type `V` in a single flat array of slots.
/// Like the raw tables of other hash map crates, it does not hash anything
/// itself: every operation takes the 64-bit hash of the key and an equality
/// predicate that recognises the wanted value. The hash is cached next to the
/// value so growing the table never calls back into a hasher.
///
/// ## Storage
///
/// - The slot count is always a power of two, so `hash & (buckets - 1)` picks
///   the home slot of a key and `(index + 1) & (buckets - 1)` steps to the next
///   one, wrapping around at the end of the array.
/// - Removing a value leaves a tombstone behind so that probe sequences
///   passing through the slot stay intact. Later inserts reuse the first
///   tombstone they pass. A tombstone is only a marker: the removed value is
///   moved out and handed to the caller (or dropped) at removal time, not
///   kept in the slot until the next rebuild.
/// - Before an insert, the table doubles when occupied slots plus tombstones
///   would exceed [`max_load_factor`](Self::max_load_factor) of the slot count.
///   After a removal, the table is rebuilt at the same size once tombstones
///   outnumber half of the slots.
///
/// References handed out by the table borrow it, so they cannot outlive the
/// next insert or removal, either of which may rebuild the slot array.
///
/// ## Example
///
/// ```rust
/// use flat_hash::hash_table::Entry;
/// use flat_hash::hash_table::HashTable;
///
/// #[derive(Debug, PartialEq)]
/// struct Person {
///     id: u64,
///     name: String,
/// }
///
/// // Any well-mixed 64-bit hash of the key works here.
/// fn hash_id(id: u64) -> u64 {
///     id.wrapping_mul(0x9E37_79B9_7F4A_7C15)
/// }
///
/// let mut table = HashTable::new();
/// match table.entry(hash_id(123), |p: &Person| p.id == 123) {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// let alice = table.find(hash_id(123), |p| p.id == 123).unwrap();
/// assert_eq!(alice.name, "Alice");
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Vec<Slot<V>>,
    populated: usize,
    tombstones: usize,
    max_load_factor: f32,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let slots: String = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Empty => '.',
                Slot::Filled { .. } => '#',
                Slot::Deleted => 'x',
            })
            .collect();

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("tombstones", &self.tombstones)
            .field("buckets", &self.slots.len())
            .field("max_load_factor", &self.max_load_factor)
            .field("slots", &slots)
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table without allocating.
    ///
    /// Storage for 16 slots is allocated by the first insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::new();
    /// assert_eq!(table.bucket_count(), 0);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            populated: 0,
            tombstones: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }

    /// Creates a table with `bucket_count` slots, rounded up to a power of two
    /// (at least 2).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::with_bucket_count(100);
    /// assert_eq!(table.bucket_count(), 128);
    ///
    /// let table: HashTable<u64> = HashTable::with_bucket_count(0);
    /// assert_eq!(table.bucket_count(), 2);
    /// ```
    pub fn with_bucket_count(bucket_count: usize) -> Self {
        Self {
            slots: empty_slots(bucket_count.into()),
            ..Self::new()
        }
    }

    /// Creates a table that can hold at least `capacity` values without
    /// growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let mut table = Self::new();
        if capacity > 0 {
            table.reserve(capacity);
        }
        table
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no values.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots, filled or not. Zero until storage is
    /// first allocated, a power of two afterwards.
    pub fn bucket_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of tombstones left behind by removals that have
    /// not yet been reused or flushed by a rehash.
    pub fn tombstone_count(&self) -> usize {
        self.tombstones
    }

    /// Returns the number of values the table can hold before the next insert
    /// grows it.
    pub fn capacity(&self) -> usize {
        let limit = (self.slots.len() as f64 * self.max_load_factor as f64) as usize;
        limit.saturating_sub(self.tombstones)
    }

    /// Returns the fraction of slots that are filled or tombstoned.
    pub fn load_factor(&self) -> f32 {
        if self.slots.is_empty() {
            return 0.0;
        }
        (self.populated + self.tombstones) as f32 / self.slots.len() as f32
    }

    /// Returns the current maximum load factor.
    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Sets the maximum load factor.
    ///
    /// The factor must lie strictly between 0.1 and 0.95; anything else
    /// (including NaN) is rejected with [`ConfigError::InvalidConfiguration`]
    /// and the table is left untouched. A valid factor is followed by the same
    /// growth check an insert runs: an unallocated table gets its first 16
    /// slots, and a table above the new bound is grown until it is not.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::ConfigError;
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// assert!(table.set_max_load_factor(0.5).is_ok());
    /// assert_eq!(table.max_load_factor(), 0.5);
    /// assert_eq!(table.bucket_count(), 16);
    ///
    /// assert_eq!(
    ///     table.set_max_load_factor(0.99),
    ///     Err(ConfigError::InvalidConfiguration { factor: 0.99 })
    /// );
    /// assert_eq!(table.max_load_factor(), 0.5);
    /// ```
    pub fn set_max_load_factor(&mut self, factor: f32) -> Result<(), ConfigError> {
        if !(factor > LOAD_FACTOR_FLOOR && factor < LOAD_FACTOR_CEILING) {
            return Err(ConfigError::InvalidConfiguration { factor });
        }

        self.max_load_factor = factor;
        if self.slots.is_empty() || self.exceeds_load(0) {
            self.grow(0);
        }
        Ok(())
    }

    /// Removes all values, keeping the slot array and its size.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |&v: &u64| v == 1).or_insert(1);
    /// table.entry(2, |&v: &u64| v == 2).or_insert(2);
    /// let buckets = table.bucket_count();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.bucket_count(), buckets);
    /// ```
    pub fn clear(&mut self) {
        trace!(
            buckets = self.slots.len(),
            len = self.populated,
            tombstones = self.tombstones,
            "clearing table"
        );
        self.slots.fill_with(|| Slot::Empty);
        self.populated = 0;
        self.tombstones = 0;
    }

    /// Reserves room for at least `additional` more values.
    ///
    /// After this call, `additional` inserts of new values do not grow the
    /// table. Tombstones count against that room: if the live values alone
    /// would fit, the table is rebuilt at its current size to flush them,
    /// otherwise it grows to `ceil((len + additional) / max_load_factor) + 1`
    /// slots, rounded up. An unallocated table is always allocated, so
    /// `reserve(0)` gives it the minimum of 2 slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.reserve(8);
    /// assert_eq!(table.bucket_count(), 16);
    ///
    /// // Already large enough.
    /// table.reserve(4);
    /// assert_eq!(table.bucket_count(), 16);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        if !self.slots.is_empty() && !self.exceeds_load(additional) {
            return;
        }

        let entries = self.populated.saturating_add(additional);
        let target = if !self.slots.is_empty() && !self.overloaded(entries) {
            Capacity::from(self.slots.len())
        } else {
            Capacity::for_entries(entries, self.max_load_factor)
        };

        debug!(
            from = self.slots.len(),
            to = target.buckets,
            len = self.populated,
            tombstones = self.tombstones,
            "reserving buckets"
        );
        self.resize(target);
    }

    /// Rebuilds the slot array with `bucket_count` slots, rounded up to a
    /// power of two, and drops every tombstone.
    ///
    /// The table never shrinks below what its current values need under the
    /// maximum load factor, so asking for fewer slots only compacts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for i in 0..10u64 {
    ///     table.entry(i, |&v: &u64| v == i).or_insert(i);
    /// }
    ///
    /// table.rehash(64);
    /// assert_eq!(table.bucket_count(), 64);
    ///
    /// table.rehash(2);
    /// assert_eq!(table.bucket_count(), 16);
    /// assert_eq!(table.len(), 10);
    /// ```
    pub fn rehash(&mut self, bucket_count: usize) {
        let requested: Capacity = bucket_count.into();
        let floor = Capacity::for_entries(self.populated, self.max_load_factor);
        let target = if requested.buckets < floor.buckets {
            floor
        } else {
            requested
        };

        debug!(
            from = self.slots.len(),
            to = target.buckets,
            len = self.populated,
            tombstones = self.tombstones,
            "rehashing table"
        );
        self.resize(target);
    }

    /// Finds a value by its hash and an equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&v: &u64| v == 42).or_insert(42);
    ///
    /// assert_eq!(table.find(42, |&v| v == 42), Some(&42));
    /// assert_eq!(table.find(99, |&v| v == 99), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        match self.probe(hash, eq) {
            Probe::Occupied(index) => Some(self.filled(index)),
            _ => None,
        }
    }

    /// Finds a value by its hash and an equality predicate, returning a
    /// mutable reference.
    ///
    /// Changing the part of the value that `eq` and the hash are computed from
    /// leaves the table unable to find it again.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(7, |v: &(u64, u32)| v.0 == 7).or_insert((7, 1));
    ///
    /// if let Some(v) = table.find_mut(7, |v| v.0 == 7) {
    ///     v.1 += 1;
    /// }
    /// assert_eq!(table.find(7, |v| v.0 == 7), Some(&(7, 2)));
    /// ```
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        match self.probe(hash, eq) {
            Probe::Occupied(index) => Some(self.filled_mut(index)),
            _ => None,
        }
    }

    /// Returns the slot index holding the value matched by `eq`, if any.
    #[inline]
    pub(crate) fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        match self.probe(hash, eq) {
            Probe::Occupied(index) => Some(index),
            _ => None,
        }
    }

    /// Mutable access to a slot returned by [`find_index`](Self::find_index)
    /// with no mutation in between.
    #[inline]
    pub(crate) fn get_index_mut(&mut self, index: usize) -> &mut V {
        self.filled_mut(index)
    }

    /// Gets the entry for the given hash and equality predicate, growing the
    /// table first if one more value would break the load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::Entry;
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    ///
    /// match table.entry(5, |v: &(u64, &str)| v.0 == 5) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert((5, "five"));
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         entry.get_mut().1 = "updated";
    ///     }
    /// }
    ///
    /// let value = table.entry(5, |v| v.0 == 5).or_insert((5, "other"));
    /// assert_eq!(value.1, "five");
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        self.maybe_grow();
        loop {
            match self.probe(hash, &eq) {
                Probe::Occupied(index) => {
                    return Entry::Occupied(OccupiedEntry { table: self, index });
                }
                Probe::Vacant(index) => {
                    return Entry::Vacant(VacantEntry {
                        table: self,
                        hash,
                        index,
                    });
                }
                Probe::Exhausted => self.grow(1),
            }
        }
    }

    /// Inserts `value`, or overwrites the value matched by `eq`.
    ///
    /// Returns `true` if the value was newly inserted and `false` if it
    /// replaced an existing one, together with a reference to the stored
    /// value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    ///
    /// let (inserted, _) = table.insert_or_assign(1, (1u64, "a"), |v| v.0 == 1);
    /// assert!(inserted);
    ///
    /// let (inserted, value) = table.insert_or_assign(1, (1u64, "b"), |v| v.0 == 1);
    /// assert!(!inserted);
    /// assert_eq!(value.1, "b");
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert_or_assign(
        &mut self,
        hash: u64,
        value: V,
        eq: impl Fn(&V) -> bool,
    ) -> (bool, &mut V) {
        match self.entry(hash, eq) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = value;
                (false, slot)
            }
            Entry::Vacant(entry) => (true, entry.insert(value)),
        }
    }

    /// Removes and returns the value matched by `eq`.
    ///
    /// The slot becomes a tombstone. If tombstones now make up more than half
    /// of the slots, the table is rebuilt at its current size to flush them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&v: &u64| v == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&v| v == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(42, |&v| v == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        match self.probe(hash, eq) {
            Probe::Occupied(index) => Some(self.remove_at(index)),
            _ => None,
        }
    }

    /// Returns an iterator over all values, in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for i in 0..4u64 {
    ///     table.entry(i, |&v: &u64| v == i).or_insert(i);
    /// }
    ///
    /// let mut values: Vec<u64> = table.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, [0, 1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator yielding mutable references to all values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.populated,
        }
    }

    /// Removes every value and yields it by value. The slot array keeps its
    /// size.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |&v: &u64| v == 1).or_insert(1);
    /// table.entry(2, |&v: &u64| v == 2).or_insert(2);
    ///
    /// let mut drained: Vec<u64> = table.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, [1, 2]);
    /// assert!(table.is_empty());
    /// assert_eq!(table.bucket_count(), 16);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            index: 0,
        }
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.slots.len().wrapping_sub(1)
    }

    /// Walks the probe sequence of `hash`.
    ///
    /// `Empty` ends the walk, `Deleted` is remembered as the first reusable
    /// slot and stepped over, and `Filled` slots are tested with `eq`. The walk
    /// visits each slot at most once.
    #[inline]
    fn probe(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        if self.slots.is_empty() {
            return Probe::Exhausted;
        }

        let mask = self.mask();
        let mut index = hash as usize & mask;
        let mut first_deleted = None;

        for _ in 0..self.slots.len() {
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(first_deleted.unwrap_or(index)),
                Slot::Deleted => {
                    first_deleted.get_or_insert(index);
                }
                Slot::Filled { hash: stored, value } => {
                    if *stored == hash && eq(value) {
                        return Probe::Occupied(index);
                    }
                }
            }
            index = (index + 1) & mask;
        }

        match first_deleted {
            Some(index) => Probe::Vacant(index),
            None => Probe::Exhausted,
        }
    }

    #[inline(always)]
    fn filled(&self, index: usize) -> &V {
        match self.slots[index].value() {
            Some(value) => value,
            None => unreachable!("slot {index} is not filled"),
        }
    }

    #[inline(always)]
    fn filled_mut(&mut self, index: usize) -> &mut V {
        match self.slots[index].value_mut() {
            Some(value) => value,
            None => unreachable!("slot {index} is not filled"),
        }
    }

    /// Writes a new value into a slot picked by [`probe`](Self::probe).
    fn fill(&mut self, index: usize, hash: u64, value: V) -> &mut V {
        let slot = &mut self.slots[index];
        match slot {
            Slot::Deleted => self.tombstones -= 1,
            Slot::Empty => {}
            Slot::Filled { .. } => unreachable!("slot {index} is already filled"),
        }
        *slot = Slot::Filled { hash, value };
        self.populated += 1;
        self.filled_mut(index)
    }

    fn remove_at(&mut self, index: usize) -> V {
        let Some(value) = self.slots[index].take() else {
            unreachable!("slot {index} is not filled");
        };
        self.populated -= 1;
        self.tombstones += 1;
        self.maybe_compact();
        value
    }

    #[inline(always)]
    fn exceeds_load(&self, additional: usize) -> bool {
        let used = (self.populated + self.tombstones).saturating_add(additional);
        self.overloaded(used)
    }

    /// Whether `used` occupied slots would break the load factor.
    #[inline(always)]
    fn overloaded(&self, used: usize) -> bool {
        used as f64 > self.slots.len() as f64 * self.max_load_factor as f64
    }

    #[inline]
    fn maybe_grow(&mut self) {
        if self.slots.is_empty() || self.exceeds_load(1) {
            self.grow(1);
        }
    }

    /// Doubles the slot count (or allocates the default count), going further
    /// if `additional` more values would still break the load factor.
    #[cold]
    #[inline(never)]
    fn grow(&mut self, additional: usize) {
        let doubled = if self.slots.is_empty() {
            DEFAULT_BUCKET_COUNT
        } else {
            self.slots.len().checked_mul(2).expect("capacity overflow")
        };
        let needed = Capacity::for_entries(self.populated + additional, self.max_load_factor);
        let target: Capacity = doubled.max(needed.buckets).into();

        debug!(
            from = self.slots.len(),
            to = target.buckets,
            len = self.populated,
            tombstones = self.tombstones,
            "growing table"
        );
        self.resize(target);
    }

    #[inline]
    fn maybe_compact(&mut self) {
        if self.tombstones > self.slots.len() / 2 {
            debug!(
                buckets = self.slots.len(),
                len = self.populated,
                tombstones = self.tombstones,
                "compacting tombstones"
            );
            self.resize(self.slots.len().into());
        }
    }

    /// Replaces the slot array with `capacity` empty slots and moves every
    /// filled slot over. Tombstones are not carried across.
    fn resize(&mut self, capacity: Capacity) {
        debug_assert!(capacity.buckets > self.populated);

        let old = mem::replace(&mut self.slots, empty_slots(capacity));
        self.populated = 0;
        self.tombstones = 0;

        for slot in old {
            if let Slot::Filled { hash, value } = slot {
                self.reinsert(hash, value);
            }
        }
    }

    /// Places a value known to be absent into a table without tombstones:
    /// the first `Empty` slot of its probe sequence.
    #[inline]
    fn reinsert(&mut self, hash: u64, value: V) {
        let mask = self.mask();
        let mut index = hash as usize & mask;
        while !self.slots[index].is_empty() {
            index = (index + 1) & mask;
        }
        self.slots[index] = Slot::Filled { hash, value };
        self.populated += 1;
    }
}

/// A view into a single slot of a [`HashTable`], either vacant or occupied.
///
/// Created by [`HashTable::entry`].
pub enum Entry<'a, V> {
    /// No value matched; inserting will fill a slot.
    Vacant(VacantEntry<'a, V>),
    /// A value matched.
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the stored value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// let hash = 17;
    ///
    /// let value = table.entry(hash, |s: &String| s == "key").or_insert("key".to_string());
    /// assert_eq!(value, "key");
    ///
    /// let existing = table.entry(hash, |s| s == "key").or_insert("other".to_string());
    /// assert_eq!(existing, "key");
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Like [`or_insert`](Self::or_insert), computing the value only when the
    /// entry is vacant.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Runs `f` on the value if the entry is occupied, and returns the value.
    /// Returns `None` for a vacant entry.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts `V::default()` if the entry is vacant.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A vacant slot of a [`HashTable`], ready to receive a value.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
    index: usize,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Stores `value` and returns a mutable reference to it.
    ///
    /// The value goes into the first tombstone on the probe sequence if there
    /// was one, otherwise into the empty slot that ended the search.
    pub fn insert(self, value: V) -> &'a mut V {
        self.table.fill(self.index, self.hash, value)
    }
}

/// An occupied slot of a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns a reference to the value.
    pub fn get(&self) -> &V {
        self.table.filled(self.index)
    }

    /// Returns a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.filled_mut(self.index)
    }

    /// Converts the entry into a mutable reference bound to the table's
    /// borrow.
    pub fn into_mut(self) -> &'a mut V {
        self.table.filled_mut(self.index)
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        self.table.remove_at(self.index)
    }
}

/// Iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.slots.find_map(Slot::value)?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over mutable references to the values of a [`HashTable`].
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, V> {
    slots: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.slots.find_map(Slot::value_mut)?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// Draining iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::drain`]. Values not consumed are dropped when the
/// iterator is, and the table is left empty with its slot array intact.
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.table.slots.len() && self.table.populated > 0 {
            let index = self.index;
            self.index += 1;

            // Taken slots become tombstones so the table stays consistent if
            // the iterator is leaked; `drop` wipes them.
            if let Some(value) = self.table.slots[index].take() {
                self.table.populated -= 1;
                self.table.tombstones += 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
        self.table.slots.fill_with(|| Slot::Empty);
        self.table.tombstones = 0;
    }
}
