#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use resettable::{HistoryConfig, Resettable, ResettableError};

#[derive(Debug, Arbitrary)]
enum Op {
    Swap(u8, u8),
    Remove(u8),
    Insert(u8, i16),
    Append(i16),
    Undo,
    Redo,
    Dump,
}

fuzz_target!(|input: (Vec<i16>, u8, Vec<Op>)| {
    let (initial, depth, ops) = input;
    // Depth 0 means unlimited.
    let config = if depth == 0 {
        HistoryConfig::unlimited()
    } else {
        HistoryConfig::new(depth as usize)
    };
    let mut r = Resettable::with_config(initial.clone(), config);

    // Reachable states oldest first; eviction trims the front.
    let mut states = vec![initial];
    let mut cursor = 0usize;

    for op in ops.iter().take(256) {
        let mut next = states[cursor].clone();
        let len = next.len();
        let result = match *op {
            Op::Swap(a, b) => {
                let (a, b) = (a as usize, b as usize);
                let result = r.collection().try_swap_at(a, b).map(|_| ());
                if a < len && b < len {
                    next.swap(a, b);
                }
                Some((result, a < len && b < len))
            }
            Op::Remove(i) => {
                let i = i as usize;
                let result = r.collection().try_remove(i).map(|_| ());
                if i < len {
                    next.remove(i);
                }
                Some((result, i < len))
            }
            Op::Insert(i, e) => {
                let i = i as usize;
                let result = r.collection().try_insert(i, e).map(|_| ());
                if i <= len {
                    next.insert(i, e);
                }
                Some((result, i <= len))
            }
            Op::Append(e) => {
                r.collection().append(e);
                next.push(e);
                Some((Ok(()), true))
            }
            Op::Undo => {
                r.undo();
                cursor = cursor.saturating_sub(1);
                None
            }
            Op::Redo => {
                r.redo();
                cursor = (cursor + 1).min(states.len() - 1);
                None
            }
            Op::Dump => {
                let position = r.position();
                let text = r.dump();
                assert!(text.starts_with("\"\"\"") && text.ends_with("\"\"\""));
                assert_eq!(r.position(), position);
                None
            }
        };

        if let Some((result, valid)) = result {
            assert_eq!(result.is_ok(), valid, "bounds disagree for {op:?}");
            match result {
                Ok(()) => {
                    states.truncate(cursor + 1);
                    states.push(next);
                    cursor += 1;
                    let max = r.config().max_depth;
                    if states.len() - 1 > max {
                        let excess = states.len() - 1 - max;
                        states.drain(..excess);
                        cursor -= excess;
                    }
                }
                Err(ResettableError::PositionOutOfBounds { position, length }) => {
                    assert!(position >= length, "rejected in-bounds position: {op:?}");
                }
            }
        }

        assert_eq!(r.value(), &states[cursor], "value diverged after {op:?}");
        assert_eq!(r.len(), states.len() - 1);
    }

    r.reset();
    assert_eq!(r.value(), &states[0]);
});
