//! Block planning for a request window.
//!
//! Pure helpers: partition a window into provider-native blocks and
//! batch consecutive cache misses into fetch ranges.

use chrono::{DateTime, Duration, Utc};

use crate::providers::ProviderDescriptor;

/// One planned block within a request window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedBlock {
    pub start: DateTime<Utc>,
    pub size: Duration,
}

impl PlannedBlock {
    /// Exclusive end of the block.
    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.size
    }
}

/// Partition `[start, end)` into the provider's native blocks.
///
/// Block size follows the descriptor's lead-time policy, so the
/// resolution may change partway through the window. The window is
/// clamped to the provider's forecast horizon; lead times in the past
/// use the fine resolution. Successive blocks never overlap.
pub fn plan_blocks(
    descriptor: &ProviderDescriptor,
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<PlannedBlock> {
    let horizon_end = now + descriptor.max_horizon;
    let end = end.min(horizon_end);

    let mut blocks = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let hours_ahead = (cursor - now).num_hours().max(0);
        let size = descriptor.block_size_at(hours_ahead);
        blocks.push(PlannedBlock {
            start: cursor,
            size,
        });
        cursor += size;
    }

    blocks
}

/// Batch consecutive missing blocks into contiguous fetch ranges.
///
/// Expects blocks ordered by start (the planner's output order).
/// Each range is a half-open `[start, end)` span covering one run of
/// gap blocks, so one provider call can fill it.
pub fn batch_gaps(missing: &[PlannedBlock]) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut ranges: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();

    for block in missing {
        match ranges.last_mut() {
            Some((_, range_end)) if *range_end == block.start => {
                *range_end = block.end();
            }
            _ => ranges.push((block.start, block.end())),
        }
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::test_descriptor;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn hourly_plan_within_fine_horizon() {
        let now = ts("2026-06-01T06:00:00Z");
        let blocks = plan_blocks(
            &test_descriptor(),
            now,
            ts("2026-06-01T08:00:00Z"),
            ts("2026-06-01T18:00:00Z"),
        );

        assert_eq!(blocks.len(), 10);
        assert!(blocks.iter().all(|b| b.size == Duration::hours(1)));
        assert!(blocks.windows(2).all(|w| w[0].end() == w[1].start));
    }

    #[test]
    fn resolution_coarsens_past_the_fine_horizon() {
        let now = ts("2026-06-01T00:00:00Z");
        // Window straddles the 48h cutoff
        let blocks = plan_blocks(
            &test_descriptor(),
            now,
            ts("2026-06-02T22:00:00Z"), // 46h ahead
            ts("2026-06-03T12:00:00Z"), // 60h ahead
        );

        // 46h and 47h are fine; from 48h on the blocks are 6h
        assert_eq!(blocks[0].size, Duration::hours(1));
        assert_eq!(blocks[1].size, Duration::hours(1));
        assert_eq!(blocks[2].size, Duration::hours(6));
        assert_eq!(blocks[2].start, ts("2026-06-03T00:00:00Z"));
        assert_eq!(blocks.last().unwrap().size, Duration::hours(6));

        // No overlaps across the resolution change
        assert!(blocks.windows(2).all(|w| w[0].end() == w[1].start));
    }

    #[test]
    fn window_clamped_to_horizon() {
        let descriptor = ProviderDescriptor {
            max_horizon: Duration::hours(5),
            ..test_descriptor()
        };
        let now = ts("2026-06-01T00:00:00Z");
        let blocks = plan_blocks(
            &descriptor,
            now,
            ts("2026-06-01T00:00:00Z"),
            ts("2026-06-02T00:00:00Z"),
        );

        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks.last().unwrap().end(), ts("2026-06-01T05:00:00Z"));
    }

    #[test]
    fn window_entirely_past_horizon_plans_nothing() {
        let descriptor = ProviderDescriptor {
            max_horizon: Duration::hours(5),
            ..test_descriptor()
        };
        let now = ts("2026-06-01T00:00:00Z");
        let blocks = plan_blocks(
            &descriptor,
            now,
            ts("2026-06-02T00:00:00Z"),
            ts("2026-06-03T00:00:00Z"),
        );

        assert!(blocks.is_empty());
    }

    #[test]
    fn past_lead_times_use_fine_resolution() {
        let now = ts("2026-06-01T12:00:00Z");
        let blocks = plan_blocks(
            &test_descriptor(),
            now,
            ts("2026-06-01T10:00:00Z"),
            ts("2026-06-01T12:00:00Z"),
        );

        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.size == Duration::hours(1)));
    }

    #[test]
    fn batch_contiguous_gaps_into_one_range() {
        let blocks: Vec<PlannedBlock> = (0..3)
            .map(|i| PlannedBlock {
                start: ts("2026-06-01T08:00:00Z") + Duration::hours(i),
                size: Duration::hours(1),
            })
            .collect();

        let ranges = batch_gaps(&blocks);
        assert_eq!(
            ranges,
            vec![(ts("2026-06-01T08:00:00Z"), ts("2026-06-01T11:00:00Z"))]
        );
    }

    #[test]
    fn non_contiguous_gaps_split_ranges() {
        let blocks = vec![
            PlannedBlock {
                start: ts("2026-06-01T08:00:00Z"),
                size: Duration::hours(1),
            },
            PlannedBlock {
                start: ts("2026-06-01T09:00:00Z"),
                size: Duration::hours(1),
            },
            // hole at 10:00
            PlannedBlock {
                start: ts("2026-06-01T11:00:00Z"),
                size: Duration::hours(1),
            },
        ];

        let ranges = batch_gaps(&blocks);
        assert_eq!(ranges.len(), 2);
        assert_eq!(
            ranges[0],
            (ts("2026-06-01T08:00:00Z"), ts("2026-06-01T10:00:00Z"))
        );
        assert_eq!(
            ranges[1],
            (ts("2026-06-01T11:00:00Z"), ts("2026-06-01T12:00:00Z"))
        );
    }

    #[test]
    fn mixed_sizes_batch_across_the_resolution_change() {
        let blocks = vec![
            PlannedBlock {
                start: ts("2026-06-01T22:00:00Z"),
                size: Duration::hours(1),
            },
            PlannedBlock {
                start: ts("2026-06-01T23:00:00Z"),
                size: Duration::hours(1),
            },
            PlannedBlock {
                start: ts("2026-06-02T00:00:00Z"),
                size: Duration::hours(6),
            },
        ];

        let ranges = batch_gaps(&blocks);
        assert_eq!(
            ranges,
            vec![(ts("2026-06-01T22:00:00Z"), ts("2026-06-02T06:00:00Z"))]
        );
    }

    #[test]
    fn no_gaps_no_ranges() {
        assert!(batch_gaps(&[]).is_empty());
    }
}
