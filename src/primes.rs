//! Prime-capacity helper: largest prime not exceeding a requested bound.
//!
//! Bucket-array sizes are always primes so that `hash % capacity` spreads
//! keys even when hashes share low-bit structure. `prime_below` is the only
//! source of capacities; it rejects out-of-range requests instead of
//! clamping them, so callers can distinguish "table cannot grow further"
//! from an ordinary miss.

use core::fmt;

/// Largest capacity the helper supports. Known prime; requests equal to it
/// short-circuit the sieve.
pub const MAX_PRIME: usize = 1_301_081;

/// Range failure from [`prime_below`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    /// The request exceeds [`MAX_PRIME`].
    TooLarge { requested: usize },
    /// The request is below 2, so no prime can satisfy it.
    TooSmall { requested: usize },
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityError::TooLarge { requested } => {
                write!(f, "capacity request {requested} exceeds maximum {MAX_PRIME}")
            }
            CapacityError::TooSmall { requested } => {
                write!(f, "capacity request {requested} is below the minimum of 2")
            }
        }
    }
}

impl std::error::Error for CapacityError {}

/// Returns the largest prime `p` with `2 <= p <= n`.
///
/// Runs a one-shot boolean sieve of Eratosthenes over `[0, n]` and scans
/// downward from `n`. The sieve is recomputed per call; capacities are small
/// enough (`<= MAX_PRIME`) that the O(n log log n) cost is acceptable at
/// construction and rehash frequency.
pub fn prime_below(n: usize) -> Result<usize, CapacityError> {
    if n > MAX_PRIME {
        return Err(CapacityError::TooLarge { requested: n });
    }
    if n == MAX_PRIME {
        return Ok(MAX_PRIME);
    }
    if n <= 1 {
        return Err(CapacityError::TooSmall { requested: n });
    }

    let sieve = sieve_primes(n);
    let mut candidate = n;
    while candidate > 2 {
        if sieve[candidate] {
            return Ok(candidate);
        }
        candidate -= 1;
    }
    // 2 is prime and always marked; this is the floor.
    Ok(2)
}

/// Boolean sieve over `[0, n]`; `sieve[i]` is true iff `i` is prime.
fn sieve_primes(n: usize) -> Vec<bool> {
    let mut sieve = vec![true; n + 1];
    sieve[0] = false;
    if n >= 1 {
        sieve[1] = false;
    }
    let mut i = 2;
    while i * i <= n {
        if sieve[i] {
            let mut j = i * i;
            while j <= n {
                sieve[j] = false;
                j += i;
            }
        }
        i += 1;
    }
    sieve
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the result is prime, `<= n`, and equals `n` when `n` is prime.
    #[test]
    fn returns_largest_prime_not_exceeding_n() {
        assert_eq!(prime_below(10), Ok(7));
        assert_eq!(prime_below(7), Ok(7));
        assert_eq!(prime_below(101), Ok(101));
        assert_eq!(prime_below(14), Ok(13));
        assert_eq!(prime_below(100), Ok(97));
        assert_eq!(prime_below(202), Ok(199));
    }

    /// Invariant: 2 and 3 are the smallest valid inputs and are returned as-is.
    #[test]
    fn small_bounds() {
        assert_eq!(prime_below(2), Ok(2));
        assert_eq!(prime_below(3), Ok(3));
        assert_eq!(prime_below(4), Ok(3));
    }

    /// Invariant: requests of 0 and 1 are rejected, not rounded up.
    #[test]
    fn rejects_degenerate_requests() {
        assert_eq!(prime_below(0), Err(CapacityError::TooSmall { requested: 0 }));
        assert_eq!(prime_below(1), Err(CapacityError::TooSmall { requested: 1 }));
    }

    /// Invariant: `MAX_PRIME` is accepted directly; anything above it fails.
    #[test]
    fn max_prime_boundary() {
        assert_eq!(prime_below(MAX_PRIME), Ok(MAX_PRIME));
        assert_eq!(
            prime_below(MAX_PRIME + 1),
            Err(CapacityError::TooLarge {
                requested: MAX_PRIME + 1
            })
        );
    }

    /// Cross-check the sieve against trial division over a modest range.
    #[test]
    fn sieve_matches_trial_division() {
        fn is_prime(n: usize) -> bool {
            if n < 2 {
                return false;
            }
            let mut d = 2;
            while d * d <= n {
                if n % d == 0 {
                    return false;
                }
                d += 1;
            }
            true
        }
        let sieve = super::sieve_primes(1_000);
        for i in 0..=1_000 {
            assert_eq!(sieve[i], is_prime(i), "disagreement at {i}");
        }
    }

    /// Errors render their requested size for diagnostics.
    #[test]
    fn error_display() {
        let e = CapacityError::TooLarge { requested: MAX_PRIME + 1 };
        assert!(e.to_string().contains("1301082"));
        let e = CapacityError::TooSmall { requested: 0 };
        assert!(e.to_string().contains("below the minimum"));
    }
}
