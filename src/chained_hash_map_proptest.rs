#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can
// assert on capacity and other internals without feature gates.

use crate::chained_hash_map::{ChainedHashMap, InsertError};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(usize),
    Matches(usize, i32),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Matches(i, v)),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

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

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Duplicate inserts are rejected exactly when the model holds the key.
// - `get`/`contains_key`/`matches` parity with the model at every step.
// - `remove` returns the owned pair the model predicts.
// - `len` parity after each op; capacity is prime after each op and only
//   ever grows (except never across `clear`, which must keep it).
// - `iter` yields exactly `len` pairs forming the model's pair set.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        // Small starting capacity so rehashes happen often.
        let mut sut: ChainedHashMap<String, i32> = ChainedHashMap::with_capacity(3).unwrap();
        let mut model: HashMap<String, i32> = HashMap::new();
        let mut last_capacity = sut.capacity();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i].clone();
                    let already = model.contains_key(&k);
                    match sut.insert(k.clone(), v) {
                        Ok(()) => {
                            prop_assert!(!already, "insert must fail on duplicate");
                            model.insert(k, v);
                        }
                        Err(InsertError::DuplicateKey) => {
                            prop_assert!(already, "duplicate error only when key exists");
                        }
                        Err(e) => prop_assert!(false, "unexpected insert error: {e:?}"),
                    }
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    let expected = model.remove(k).map(|v| (k.clone(), v));
                    prop_assert_eq!(sut.remove(k.as_str()), expected);
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k.as_str()), model.get(k));
                }
                OpI::Contains(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.contains_key(k.as_str()), model.contains_key(k));
                }
                OpI::Matches(i, v) => {
                    let k = &pool[i];
                    let expected = model.get(k) == Some(&v);
                    prop_assert_eq!(sut.matches(k.as_str(), &v), expected);
                }
                OpI::Clear => {
                    let cap_before = sut.capacity();
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), cap_before, "clear must not reallocate");
                }
                OpI::Iterate => {
                    let mut seen: Vec<(String, i32)> =
                        sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    seen.sort();
                    let mut expected: Vec<(String, i32)> =
                        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    expected.sort();
                    prop_assert_eq!(seen, expected);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(is_prime(sut.capacity()), "capacity {} not prime", sut.capacity());
            prop_assert!(
                sut.capacity() >= last_capacity,
                "capacity must never shrink"
            );
            last_capacity = sut.capacity();
        }
    }

    // Property: rehashes are transparent. Inserting any number of distinct
    // keys leaves every pair retrievable, with the capacity following the
    // double-then-round-down schedule from the initial prime.
    #[test]
    fn prop_rehash_preserves_all_pairs(n in 1usize..400, request in 2usize..50) {
        let mut sut: ChainedHashMap<u64, u64> =
            ChainedHashMap::with_capacity(request).unwrap();
        let initial = sut.capacity();

        for i in 0..n as u64 {
            sut.insert(i, i.wrapping_mul(0x9e37_79b9)).unwrap();
        }

        // Replay the growth schedule to predict the final capacity.
        let mut cap = initial;
        while n > cap {
            cap = crate::primes::prime_below(2 * cap).unwrap();
        }
        prop_assert_eq!(sut.capacity(), cap);
        prop_assert_eq!(sut.len(), n);
        for i in 0..n as u64 {
            prop_assert_eq!(sut.get(&i), Some(&i.wrapping_mul(0x9e37_79b9)));
        }
    }
}
