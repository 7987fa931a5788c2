#![no_main]

use libfuzzer_sys::fuzz_target;
use tiny2q::policy::two_q::{Condition, TwoQCache};

// Fuzz the test/observe protocol, raw observe calls (including protocol
// violations), peeks and clears, checking structural invariants throughout.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = (data[0] as usize % 64).max(1);
    let mut cache: TwoQCache<u8, u16> = TwoQCache::new(capacity);

    for pair in data[1..].chunks_exact(2) {
        let key = pair[1];
        let value = u16::from(key) * 7;
        match pair[0] % 8 {
            0..=4 => {
                let mut v = 0;
                let cond = cache.test(&key, &mut v);
                if cond == Condition::Frequent {
                    assert_eq!(v, value);
                    assert_eq!(cache.frequent_keys().next(), Some(&key));
                }
                cache.observe(cond, key, value);
            },
            5 => {
                // Unpaired promotion
                cache.observe(Condition::Recent, key, value);
                assert!(cache.contains(&key));
            },
            6 => {
                if let Some(v) = cache.peek(&key) {
                    assert_eq!(*v, value);
                }
            },
            _ => {
                if pair[1] == 0 {
                    cache.clear();
                    assert!(cache.is_empty());
                }
            },
        }
        assert!(cache.len() <= capacity);
        cache.check_invariants().unwrap();
    }
});
