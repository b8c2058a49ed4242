//! Epoch boundary math and timeline lookup.
//!
//! The timeline is a dense, append-only sequence of epochs whose start times
//! increase by exactly `epoch_duration`, so any wall-clock time maps to at
//! most one epoch and lookup is a plain binary search.

use crate::state::Epoch;

/// Truncate a timestamp to the start of its epoch bucket.
/// Timestamps are non-negative by construction (Solana clock).
pub fn epoch_start(ts: i64, epoch_duration: i64) -> i64 {
    ts / epoch_duration * epoch_duration
}

/// Greatest index `i` such that `epochs[i].start_time <= epoch_start(time)`.
///
/// Times before the genesis epoch resolve to index 0; times between epochs
/// resolve to the epoch in progress. Iteration count is bounded by the
/// timeline length.
pub fn find_epoch_index(epochs: &[Epoch], time: i64, epoch_duration: i64) -> usize {
    if epochs.is_empty() {
        return 0;
    }
    let target = epoch_start(time, epoch_duration);
    if target <= epochs[0].start_time {
        return 0;
    }
    let mut lo = 0usize;
    let mut hi = epochs.len() - 1;
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        if epochs[mid].start_time <= target {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EPOCH_DURATION;

    fn timeline(n: usize, genesis: i64) -> Vec<Epoch> {
        (0..n)
            .map(|i| Epoch {
                supply: 0,
                start_time: genesis + (i as i64) * EPOCH_DURATION,
            })
            .collect()
    }

    #[test]
    fn epoch_start_truncates() {
        assert_eq!(epoch_start(0, EPOCH_DURATION), 0);
        assert_eq!(epoch_start(EPOCH_DURATION - 1, EPOCH_DURATION), 0);
        assert_eq!(epoch_start(EPOCH_DURATION, EPOCH_DURATION), EPOCH_DURATION);
        assert_eq!(
            epoch_start(5 * EPOCH_DURATION + 12_345, EPOCH_DURATION),
            5 * EPOCH_DURATION
        );
    }

    #[test]
    fn finds_exact_and_in_between() {
        let genesis = 100 * EPOCH_DURATION;
        let epochs = timeline(10, genesis);
        for i in 0..10 {
            let at = genesis + (i as i64) * EPOCH_DURATION;
            // exact boundary
            assert_eq!(find_epoch_index(&epochs, at, EPOCH_DURATION), i);
            // mid-epoch
            assert_eq!(
                find_epoch_index(&epochs, at + EPOCH_DURATION / 2, EPOCH_DURATION),
                i
            );
        }
    }

    #[test]
    fn clamps_outside_timeline() {
        let genesis = 100 * EPOCH_DURATION;
        let epochs = timeline(4, genesis);
        // before genesis
        assert_eq!(find_epoch_index(&epochs, 0, EPOCH_DURATION), 0);
        // far past the last stored epoch
        assert_eq!(
            find_epoch_index(&epochs, genesis + 50 * EPOCH_DURATION, EPOCH_DURATION),
            3
        );
    }

    #[test]
    fn unique_index_property() {
        // The returned index is the unique i with start <= target and either
        // i is last or the next epoch starts after the target.
        let genesis = 7 * EPOCH_DURATION;
        let epochs = timeline(17, genesis);
        for t in (genesis..genesis + 17 * EPOCH_DURATION).step_by(EPOCH_DURATION as usize / 3) {
            let i = find_epoch_index(&epochs, t, EPOCH_DURATION);
            let target = epoch_start(t, EPOCH_DURATION);
            assert!(epochs[i].start_time <= target);
            if i + 1 < epochs.len() {
                assert!(epochs[i + 1].start_time > target);
            }
        }
    }

    #[test]
    fn single_epoch_timeline() {
        let epochs = timeline(1, 0);
        assert_eq!(find_epoch_index(&epochs, 0, EPOCH_DURATION), 0);
        assert_eq!(find_epoch_index(&epochs, 123_456_789, EPOCH_DURATION), 0);
    }
}
