#![no_main]

use libfuzzer_sys::fuzz_target;
use tiny2q::ds::RecencyBuffer;

// Fuzz arbitrary add/test/clear sequences on RecencyBuffer against a
// VecDeque model holding the last `capacity` added keys.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let capacity = (data[0] % 33) as usize;
    let mut recents = RecencyBuffer::new(capacity);
    let mut model = std::collections::VecDeque::with_capacity(capacity);

    for pair in data[1..].chunks_exact(2) {
        let key = pair[1];
        match pair[0] % 4 {
            0 | 1 => {
                recents.add(key);
                if capacity > 0 {
                    if model.len() == capacity {
                        model.pop_front();
                    }
                    model.push_back(key);
                }
            },
            2 => {
                assert_eq!(recents.test(&key), model.contains(&key));
            },
            _ => {
                recents.clear();
                model.clear();
            },
        }
        recents.debug_validate_invariants();
    }

    let newest: Vec<u8> = recents.iter().copied().collect();
    let expected: Vec<u8> = model.iter().rev().copied().collect();
    assert_eq!(newest, expected);
});
