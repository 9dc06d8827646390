//! ChainedHashMap: separate chaining over a prime-sized bucket array.

use crate::primes::{prime_below, CapacityError, MAX_PRIME};
use crate::reentry::ReentryFlag;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Capacity request substituted when a constructor is given 0.
pub const DEFAULT_CAPACITY_REQUEST: usize = 101;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    // Cached at insert; indexing and rehashing use this stored hash so
    // `K: Hash` never runs again after insertion.
    hash: u64,
}

/// What to do when a rehash would need a capacity above [`MAX_PRIME`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Report [`InsertError::CapacityExhausted`] and leave capacity as-is.
    #[default]
    Fail,
    /// Pin capacity at [`MAX_PRIME`]; chains absorb further load silently.
    Saturate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// The key is already present. Entries are immutable once inserted;
    /// updating a value requires an explicit remove + insert.
    DuplicateKey,
    /// The entry was stored, but the table needed to grow past [`MAX_PRIME`]
    /// and the growth policy is [`GrowthPolicy::Fail`]. No data was lost;
    /// only the capacity increase was refused.
    CapacityExhausted,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey => f.write_str("key already present in table"),
            InsertError::CapacityExhausted => {
                write!(f, "table cannot grow beyond {MAX_PRIME} buckets")
            }
        }
    }
}

impl std::error::Error for InsertError {}

/// Hash map with one insertion-ordered chain per bucket.
///
/// Capacities are always primes produced by [`prime_below`]; a rehash to
/// `prime_below(2 * capacity)` runs whenever the entry count exceeds the
/// bucket count (load factor 1.0). Lookups are O(1) average, O(chain)
/// worst case. Single-threaded by design: `&mut self` is the only
/// mutation path and there is no interior mutability in the data itself.
pub struct ChainedHashMap<K, V, S = RandomState> {
    hasher: S,
    buckets: Vec<Vec<Entry<K, V>>>,
    len: usize,
    growth: GrowthPolicy,
    reentry: ReentryFlag,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Table with the default capacity request (101 buckets).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY_REQUEST)
            .expect("default capacity request is within the supported range")
    }

    /// Table with `prime_below(request)` buckets. A request of 0 substitutes
    /// the default request; a request of 1 or above [`MAX_PRIME`] is an
    /// error, never silently adjusted.
    pub fn with_capacity(request: usize) -> Result<Self, CapacityError> {
        Self::with_capacity_and_hasher(request, RandomState::default())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        match Self::with_capacity_and_hasher(DEFAULT_CAPACITY_REQUEST, hasher) {
            Ok(map) => map,
            Err(_) => unreachable!("default capacity request is within the supported range"),
        }
    }

    pub fn with_capacity_and_hasher(request: usize, hasher: S) -> Result<Self, CapacityError> {
        let request = if request == 0 {
            DEFAULT_CAPACITY_REQUEST
        } else {
            request
        };
        let capacity = prime_below(request)?;
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, Vec::new);
        Ok(Self {
            hasher,
            buckets,
            len: 0,
            growth: GrowthPolicy::default(),
            reentry: ReentryFlag::new(),
        })
    }

    /// Select the behavior for growth past [`MAX_PRIME`]. Defaults to
    /// [`GrowthPolicy::Fail`].
    pub fn with_growth_policy(mut self, policy: GrowthPolicy) -> Self {
        self.growth = policy;
        self
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current bucket count; always prime.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn bucket_index(&self, hash: u64) -> usize {
        // Capacity is at least 2 (prime_below floor), so no mod-by-zero.
        (hash % self.buckets.len() as u64) as usize
    }

    fn find_entry<Q>(&self, q: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.bucket_index(self.make_hash(q));
        self.buckets[idx].iter().find(|e| e.key.borrow() == q)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _active = self.reentry.activate();
        self.find_entry(q).is_some()
    }

    /// Reference to the stored value for `q`, or `None` on a miss.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _active = self.reentry.activate();
        self.find_entry(q).map(|e| &e.value)
    }

    /// True iff `q` is present and its stored value equals `value`.
    ///
    /// Lets a caller verify a claimed value against the stored one in a
    /// single scan, without a separate fetch step.
    pub fn matches<Q>(&self, q: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: PartialEq,
    {
        let _active = self.reentry.activate();
        self.find_entry(q).is_some_and(|e| e.value == *value)
    }

    /// Insert `key -> value`, taking ownership of both.
    ///
    /// Rejects duplicates with no state change. On success the entry is
    /// appended to its chain; if the entry count now exceeds the bucket
    /// count, the table rehashes to `prime_below(2 * capacity)` before
    /// returning. `Err(CapacityExhausted)` means the entry was stored but
    /// that growth step was refused (see [`GrowthPolicy`]).
    pub fn insert(&mut self, key: K, value: V) -> Result<(), InsertError> {
        {
            let _active = self.reentry.activate();
            let hash = self.make_hash(&key);
            let idx = self.bucket_index(hash);
            if self.buckets[idx].iter().any(|e| e.key == key) {
                return Err(InsertError::DuplicateKey);
            }
            self.buckets[idx].push(Entry { key, value, hash });
            self.len += 1;
        }
        if self.len > self.buckets.len() {
            self.grow()?;
        }
        Ok(())
    }

    /// Remove the entry for `q`, returning the owned pair. Chain order of
    /// the remaining entries is preserved; capacity never shrinks.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _active = self.reentry.activate();
        let idx = self.bucket_index(self.make_hash(q));
        let bucket = &mut self.buckets[idx];
        let pos = bucket.iter().position(|e| e.key.borrow() == q)?;
        let entry = bucket.remove(pos);
        self.len -= 1;
        Some((entry.key, entry.value))
    }

    /// Drop every entry; capacity (bucket count) is left unchanged.
    pub fn clear(&mut self) {
        let _active = self.reentry.activate();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Entries in bucket order, then chain (insertion) order within each
    /// bucket. Deterministic for a given hasher and operation history.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            outer: self.buckets.iter(),
            inner: Default::default(),
            remaining: self.len,
        }
    }

    /// Rebuild into `prime_below(2 * capacity)` buckets, placing every entry
    /// by its stored hash. Old bucket order and chain order are walked in
    /// sequence, so relative order of entries sharing a new bucket is kept.
    fn grow(&mut self) -> Result<(), InsertError> {
        let doubled = self.buckets.len().saturating_mul(2);
        let next = match self.growth {
            GrowthPolicy::Fail => match prime_below(doubled) {
                Ok(p) => p,
                Err(CapacityError::TooLarge { .. }) => {
                    return Err(InsertError::CapacityExhausted)
                }
                Err(CapacityError::TooSmall { .. }) => {
                    unreachable!("doubled capacity is at least 4")
                }
            },
            GrowthPolicy::Saturate => {
                if self.buckets.len() == MAX_PRIME {
                    return Ok(());
                }
                match prime_below(doubled.min(MAX_PRIME)) {
                    Ok(p) => p,
                    Err(_) => unreachable!("clamped request is within the supported range"),
                }
            }
        };

        let mut fresh = Vec::with_capacity(next);
        fresh.resize_with(next, Vec::new);
        let old = core::mem::replace(&mut self.buckets, fresh);
        for bucket in old {
            for entry in bucket {
                let idx = (entry.hash % next as u64) as usize;
                self.buckets[idx].push(entry);
            }
        }
        Ok(())
    }
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Full-traversal iterator: buckets in table order, chains in insertion
/// order.
pub struct Iter<'a, K, V> {
    outer: std::slice::Iter<'a, Vec<Entry<K, V>>>,
    inner: std::slice::Iter<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.inner.next() {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            self.inner = self.outer.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
