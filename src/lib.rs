//! chained-hashmap: a separately-chained hash map over a prime-sized
//! bucket array, with load-factor-triggered growth.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable associative container whose layout and
//!   growth schedule are fully deterministic given a hasher and an
//!   operation history. Originally the storage backend of a credential
//!   registry; the registry and its shell are external collaborators and
//!   only the in-memory API lives here.
//! - Layers:
//!   - primes: `prime_below` computes the largest prime not exceeding a
//!     bound via a one-shot sieve; the sole source of capacities.
//!   - ChainedHashMap<K, V, S>: the table itself. One `Vec` chain per
//!     bucket, insertion-ordered; keys route by `stored_hash % capacity`.
//!
//! Constraints
//! - Capacity is always a prime (a request of 10 realizes as 7), bounded
//!   by `MAX_PRIME`; growth doubles-then-rounds-down and never shrinks.
//! - Keys are unique table-wide and immutable once inserted; duplicate
//!   inserts are rejected with no state change.
//! - `len` is exact at every observable point; rehash is pure
//!   reorganization and never drops a pair.
//! - Single-threaded: all mutation goes through `&mut self`; callers
//!   needing sharing must wrap the table in their own exclusion.
//!
//! Hasher and rehashing invariants
//! - Each entry caches its `u64` hash at insert. Bucket indexing and
//!   rehashing use the cached hash, so `K: Hash` runs exactly once per
//!   key and rehash never re-enters user hashing code. `K: Eq` still runs
//!   during chain scans; a debug-only reentrancy flag catches `Eq`
//!   implementations that call back into the table mid-operation.
//!
//! Failure boundaries
//! - Ordinary misses are `false`/`None`, never errors. The only error
//!   conditions are range failures of the prime helper: construction
//!   requests outside `[2, MAX_PRIME]` (`CapacityError`) and growth past
//!   `MAX_PRIME` (`InsertError::CapacityExhausted`, or silent saturation
//!   under `GrowthPolicy::Saturate`; the policy is a caller-visible choice).
//!
//! Notes and non-goals
//! - Values are opaque: the table moves them by value and compares them
//!   only in `matches`. Any value encoding (the registry's reversible
//!   obfuscation included) happens outside and is not a security
//!   mechanism.
//! - No persistence or wire format; `iter` exposes the deterministic
//!   traversal (bucket order, then chain order) that dump/persist
//!   collaborators rely on.
//! - No shrinking, no entry API, no concurrent variant.

mod chained_hash_map;
mod chained_hash_map_proptest;
pub mod primes;
mod reentry;

// Public surface
pub use chained_hash_map::{
    ChainedHashMap, GrowthPolicy, InsertError, Iter, DEFAULT_CAPACITY_REQUEST,
};
pub use primes::{prime_below, CapacityError, MAX_PRIME};
