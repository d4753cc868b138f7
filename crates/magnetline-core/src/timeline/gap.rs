//! Gap and overlap detection over a day's blocks.
//!
//! Finds the uncovered intervals of `[0, 1440)` and the places where two
//! blocks claim the same minutes. Together they form the post-condition
//! check callers run after a reflow.

use serde::{Deserialize, Serialize};

use super::block::to_blocks;
use super::{TimelineBlock, TimelineItem, DAY_MINUTES, MIN_FLEXIBLE_MINUTES};

/// A maximal uncovered interval `[start, end)` of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start: i64,
    pub end: i64,
    pub duration: i64,
}

impl Gap {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            duration: end - start,
        }
    }
}

/// Two blocks claiming the same minutes `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    pub first_id: String,
    pub second_id: String,
    pub start: i64,
    pub end: i64,
    pub duration: i64,
}

fn sorted_by_start(blocks: &[TimelineBlock]) -> Vec<&TimelineBlock> {
    let mut sorted: Vec<_> = blocks.iter().collect();
    sorted.sort_by_key(|b| b.start_minutes);
    sorted
}

/// Find the uncovered intervals of the day, sorted by start.
///
/// An empty day yields no gaps; callers must treat "no blocks" as invalid
/// coverage on their own.
pub fn find_gaps(blocks: &[TimelineBlock]) -> Vec<Gap> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut gaps = Vec::new();
    let mut covered_to = 0;

    for block in sorted_by_start(blocks) {
        if block.start_minutes > covered_to {
            let gap_end = block.start_minutes.min(DAY_MINUTES);
            if gap_end > covered_to {
                gaps.push(Gap::new(covered_to, gap_end));
            }
        }
        // A block nested inside a longer one must not pull the cursor back.
        covered_to = covered_to.max(block.end_minutes);
    }

    if covered_to < DAY_MINUTES {
        gaps.push(Gap::new(covered_to, DAY_MINUTES));
    }

    gaps
}

/// Find blocks whose ranges intersect, in start order.
///
/// Each block is compared against the furthest-reaching block before it, so
/// a short block nested in a long one is reported once.
pub fn find_overlaps(blocks: &[TimelineBlock]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();
    let mut reach: Option<&TimelineBlock> = None;

    for block in sorted_by_start(blocks) {
        if let Some(prev) = reach {
            if prev.end_minutes > block.start_minutes {
                let end = prev.end_minutes.min(block.end_minutes);
                overlaps.push(Overlap {
                    first_id: prev.item.id.clone(),
                    second_id: block.item.id.clone(),
                    start: block.start_minutes,
                    end,
                    duration: end - block.start_minutes,
                });
            }
        }
        if reach.map_or(true, |prev| block.end_minutes > prev.end_minutes) {
            reach = Some(block);
        }
    }

    overlaps
}

/// Post-condition report for a day's items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineReport {
    pub item_count: usize,
    pub total_minutes: i64,
    pub gaps: Vec<Gap>,
    pub overlaps: Vec<Overlap>,
    /// Items reaching outside `[0, 1440]`
    pub out_of_bounds: Vec<String>,
    /// Flexible items compressed below the floor
    pub undersized: Vec<String>,
}

impl TimelineReport {
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// Contiguous, disjoint and exactly one day long.
    pub fn has_full_coverage(&self) -> bool {
        !self.is_empty()
            && self.total_minutes == DAY_MINUTES
            && self.gaps.is_empty()
            && self.overlaps.is_empty()
            && self.out_of_bounds.is_empty()
    }

    /// Full coverage and every compressed block still at or above the floor.
    pub fn is_valid(&self) -> bool {
        self.has_full_coverage() && self.undersized.is_empty()
    }
}

/// Check a day's items against the coverage invariants.
pub fn validate(items: &[TimelineItem]) -> TimelineReport {
    validate_with_floor(items, MIN_FLEXIBLE_MINUTES)
}

/// [`validate`] with an explicit compression floor.
pub fn validate_with_floor(items: &[TimelineItem], min_flexible_minutes: i64) -> TimelineReport {
    let blocks = to_blocks(items);

    let out_of_bounds = blocks
        .iter()
        .filter(|b| b.start_minutes < 0 || b.end_minutes > DAY_MINUTES)
        .map(|b| b.item.id.clone())
        .collect();
    let undersized = blocks
        .iter()
        .filter(|b| b.is_compressed() && b.duration() < min_flexible_minutes)
        .map(|b| b.item.id.clone())
        .collect();

    TimelineReport {
        item_count: blocks.len(),
        total_minutes: blocks.iter().map(TimelineBlock::duration).sum(),
        gaps: find_gaps(&blocks),
        overlaps: find_overlaps(&blocks),
        out_of_bounds,
        undersized,
    }
}

/// True iff the items are non-empty and cover the day exactly once.
///
/// Summing durations is not enough: a gap and an overlap of equal size also
/// sum to 1440, so gap and overlap detection both run.
pub fn has_full_coverage(items: &[TimelineItem]) -> bool {
    validate(items).has_full_coverage()
}
