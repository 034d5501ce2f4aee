//! Sliding-window majority-vote debouncer.
//!
//! Single-frame recognition is unreliable (motion blur, partial occlusion,
//! card-play animation), so a raw classification only becomes a game event
//! once it holds a majority of the recent window. The filter reports a stable
//! value exactly once, on the transition.

use std::collections::VecDeque;

/// Per-slot stream smoother converting a noisy frame-by-frame signal into a
/// rate-limited discrete output.
///
/// `null_value` is the sentinel meaning "nothing detected this frame". Each
/// tick pushes one `(value, distance)` sample; the oldest sample is evicted
/// once the window holds `window_size` entries. No decision is made before
/// `window_min_count` samples have been collected. A non-null value becomes
/// the stable output when it is the most frequent value in the window,
/// strictly out-counts the null samples, and occurs at least `valid_count`
/// times; otherwise the stable output reverts to null.
#[derive(Debug, Clone)]
pub struct StreamFilter<T> {
    null_value: T,
    window_size: usize,
    valid_count: usize,
    window_min_count: usize,
    window: VecDeque<(T, u32)>,
    stable: T,
}

impl<T: Copy + PartialEq> StreamFilter<T> {
    /// Filter with the default window parameters.
    pub fn new(null_value: T) -> Self {
        Self::with_params(null_value, 5, 3, 1)
    }

    pub fn with_params(
        null_value: T,
        window_size: usize,
        valid_count: usize,
        window_min_count: usize,
    ) -> Self {
        assert!(window_size > 0, "window_size must be positive");
        Self {
            null_value,
            window_size,
            valid_count,
            window_min_count,
            window: VecDeque::with_capacity(window_size),
            stable: null_value,
        }
    }

    /// Push one raw sample and return the newly stable value, or null.
    ///
    /// The stable value is returned exactly once, on the tick where it first
    /// wins the window majority; every other tick returns `null_value`.
    pub fn filter(&mut self, value: T, distance: u32) -> T {
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back((value, distance));

        if self.window.len() < self.window_min_count {
            return self.null_value;
        }

        let mut null_count = 0usize;
        // (value, occurrences, summed distance)
        let mut candidates: Vec<(T, usize, u64)> = Vec::new();
        for &(v, d) in &self.window {
            if v == self.null_value {
                null_count += 1;
                continue;
            }
            match candidates.iter_mut().find(|c| c.0 == v) {
                Some(c) => {
                    c.1 += 1;
                    c.2 += u64::from(d);
                }
                None => candidates.push((v, 1, u64::from(d))),
            }
        }

        // Most frequent non-null value; ties break toward lower mean distance.
        let winner = candidates.into_iter().max_by(|a, b| {
            a.1.cmp(&b.1).then_with(|| {
                let mean_a = a.2 as f64 / a.1 as f64;
                let mean_b = b.2 as f64 / b.1 as f64;
                mean_b
                    .partial_cmp(&mean_a)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        match winner {
            Some((v, count, _)) if count >= self.valid_count && count > null_count => {
                if self.stable != v {
                    self.stable = v;
                    v
                } else {
                    self.null_value
                }
            }
            _ => {
                self.stable = self.null_value;
                self.null_value
            }
        }
    }

    /// Current stable output (null when no value holds the majority).
    pub fn stable(&self) -> T {
        self.stable
    }

    /// Clear the window and the stable state. Called on round/game boundaries.
    pub fn reset(&mut self) {
        self.window.clear();
        self.stable = self.null_value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_hit_in_null_run_stays_null() {
        let mut filter = StreamFilter::with_params(-1, 10, 1, 6);
        for v in [-1, -1, -1, -1, -1, 3] {
            assert_eq!(filter.filter(v, 0), -1);
        }
        assert_eq!(filter.stable(), -1);
    }

    #[test]
    fn test_steady_run_transitions_exactly_once() {
        let mut filter = StreamFilter::with_params(-1, 10, 1, 6);
        let outputs: Vec<i32> = (0..6).map(|_| filter.filter(3, 2)).collect();
        assert_eq!(outputs, vec![-1, -1, -1, -1, -1, 3]);
        // Still stable: no repeated report.
        assert_eq!(filter.filter(3, 2), -1);
        assert_eq!(filter.stable(), 3);
    }

    #[test]
    fn test_no_output_before_window_min_count() {
        let mut filter = StreamFilter::with_params(-1, 10, 1, 6);
        for _ in 0..5 {
            assert_eq!(filter.filter(7, 0), -1);
        }
        assert_eq!(filter.stable(), -1);
    }

    #[test]
    fn test_reverts_to_null_and_can_retrigger() {
        let mut filter = StreamFilter::with_params(-1, 3, 2, 1);
        assert_eq!(filter.filter(5, 0), -1);
        assert_eq!(filter.filter(5, 0), 5);
        // Nulls flush the window; stability is lost.
        for _ in 0..3 {
            filter.filter(-1, 0);
        }
        assert_eq!(filter.stable(), -1);
        // The same value may then be reported again.
        filter.filter(5, 0);
        assert_eq!(filter.filter(5, 0), 5);
    }

    #[test]
    fn test_minority_below_valid_count_rejected() {
        let mut filter = StreamFilter::with_params(-1, 5, 3, 1);
        assert_eq!(filter.filter(2, 0), -1);
        assert_eq!(filter.filter(2, 0), -1);
        // Two occurrences < valid_count of three.
        assert_eq!(filter.stable(), -1);
        assert_eq!(filter.filter(2, 0), 2);
    }

    #[test]
    fn test_tie_breaks_toward_lower_distance() {
        let mut filter = StreamFilter::with_params(-1, 4, 2, 4);
        filter.filter(8, 30);
        filter.filter(8, 30);
        filter.filter(9, 4);
        assert_eq!(filter.filter(9, 4), 9);
    }

    #[test]
    fn test_bool_slot() {
        let mut filter = StreamFilter::with_params(false, 5, 3, 1);
        assert!(!filter.filter(true, 0));
        assert!(!filter.filter(true, 0));
        assert!(filter.filter(true, 0));
        assert!(!filter.filter(true, 0));
    }

    #[test]
    fn test_reset_clears_stability() {
        let mut filter = StreamFilter::with_params(-1, 5, 1, 1);
        assert_eq!(filter.filter(4, 0), 4);
        filter.reset();
        assert_eq!(filter.stable(), -1);
        assert_eq!(filter.filter(4, 0), 4);
    }
}
