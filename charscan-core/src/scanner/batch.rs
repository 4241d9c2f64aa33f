//! Partitioning of a key interval into fixed-width batches.

use crate::Result;
use crate::error::CharScanError;
use crate::models::ScanRange;

/// Iterator over contiguous, non-overlapping [`ScanRange`]s covering
/// `[min, max]` exactly once.
///
/// Every batch except possibly the last spans `width` keys; the last one is
/// clipped to `max`.
///
/// # Example
/// ```rust
/// use charscan_core::scanner::BatchPlan;
///
/// let ranges: Vec<_> = BatchPlan::new(1, 5, 2)?.map(|r| (r.start, r.end)).collect();
/// assert_eq!(ranges, vec![(1, 2), (3, 4), (5, 5)]);
/// # Ok::<(), charscan_core::CharScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BatchPlan {
    next_start: Option<i64>,
    max: i64,
    width: i64,
}

impl BatchPlan {
    /// Plans batches of `width` keys over `[min, max]`.
    ///
    /// An inverted interval (`min > max`) yields no batches.
    ///
    /// # Errors
    /// Returns a configuration error if `width` is zero or exceeds `i64::MAX`.
    pub fn new(min: i64, max: i64, width: u64) -> Result<Self> {
        let width = i64::try_from(width)
            .ok()
            .filter(|w| *w > 0)
            .ok_or_else(|| {
                CharScanError::configuration(format!(
                    "batch width must be between 1 and {}, got {}",
                    i64::MAX,
                    width
                ))
            })?;

        Ok(Self {
            next_start: (min <= max).then_some(min),
            max,
            width,
        })
    }

    /// Number of batches the plan will still yield.
    pub fn remaining(&self) -> u64 {
        let Some(start) = self.next_start else {
            return 0;
        };
        let span = i128::from(self.max)
            .saturating_sub(i128::from(start))
            .saturating_add(1);
        let width = i128::from(self.width);
        let batches = span.saturating_add(width.saturating_sub(1)) / width;
        u64::try_from(batches).unwrap_or(u64::MAX)
    }
}

impl Iterator for BatchPlan {
    type Item = ScanRange;

    fn next(&mut self) -> Option<ScanRange> {
        let start = self.next_start?;
        let end = start
            .saturating_add(self.width.saturating_sub(1))
            .min(self.max);

        self.next_start = if end >= self.max {
            None
        } else {
            end.checked_add(1)
        };

        Some(ScanRange { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(min: i64, max: i64, width: u64) -> Vec<(i64, i64)> {
        BatchPlan::new(min, max, width)
            .unwrap()
            .map(|r| (r.start, r.end))
            .collect()
    }

    #[test]
    fn test_batches_partition_interval_exactly_once() {
        for (min, max, width) in [(1, 1, 1), (1, 10, 3), (0, 99, 10), (-7, 13, 4), (5, 5, 80_000)] {
            let plan = ranges(min, max, width);

            assert_eq!(plan.first().map(|r| r.0), Some(min));
            assert_eq!(plan.last().map(|r| r.1), Some(max));
            for window in plan.windows(2) {
                assert_eq!(window[0].1 + 1, window[1].0, "gap or overlap in {:?}", plan);
            }
            for (start, end) in &plan {
                assert!(start <= end);
                assert!(end - start < width as i64);
            }
        }
    }

    #[test]
    fn test_last_batch_is_clipped_to_max() {
        assert_eq!(ranges(1, 5, 2), vec![(1, 2), (3, 4), (5, 5)]);
        assert_eq!(ranges(1, 160_001, 80_000), vec![
            (1, 80_000),
            (80_001, 160_000),
            (160_001, 160_001)
        ]);
    }

    #[test]
    fn test_inverted_interval_is_empty() {
        assert!(ranges(10, 1, 5).is_empty());
        assert_eq!(BatchPlan::new(10, 1, 5).unwrap().remaining(), 0);
    }

    #[test]
    fn test_interval_ending_at_i64_max_terminates() {
        let plan = ranges(i64::MAX - 4, i64::MAX, 2);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.last(), Some(&(i64::MAX, i64::MAX)));
    }

    #[test]
    fn test_remaining_matches_yielded() {
        for (min, max, width) in [(1, 10, 3), (0, 0, 1), (-50, 50, 7), (1, 80_000, 80_000)] {
            let plan = BatchPlan::new(min, max, width).unwrap();
            let expected = plan.remaining();
            assert_eq!(plan.count() as u64, expected);
        }
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(BatchPlan::new(1, 10, 0).is_err());
        assert!(BatchPlan::new(1, 10, u64::MAX).is_err());
    }
}
