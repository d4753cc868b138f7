//! Reflow engine.
//!
//! Restores gap-free, overlap-free coverage of the day after a mutation:
//! 0. blocks running past midnight are trimmed, or pulled back when they
//!    cannot shrink
//! 1. overlaps are resolved pairwise in start order (compress / push / trim)
//! 2. Phase A slides unlocked blocks left onto the coverage cursor
//! 3. Phase B apportions what is still uncovered over flexible blocks by
//!    largest remainder, one lock-delimited segment at a time
//!
//! Locked blocks never move or change size. A day that cannot be repaired
//! (no flexible block next to a gap, two colliding locked blocks) is left
//! as is; callers detect it with [`validate`](super::validate).

use tracing::{debug, trace, warn};

use super::apportion::apportion;
use super::block::{reference_day, to_blocks, to_items};
use super::gap::{find_gaps, find_overlaps};
use super::{TimelineBlock, TimelineItem, DAY_MINUTES};
use crate::config::{OverlapPriority, ReflowConfig};

/// Configurable entry point for reflow and the mutations built on it.
#[derive(Debug, Clone, Default)]
pub struct ReflowEngine {
    config: ReflowConfig,
}

impl ReflowEngine {
    /// Create an engine with default settings (15 minute floor, compress first)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: ReflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReflowConfig {
        &self.config
    }

    /// Restore gap-free, overlap-free coverage of the day.
    ///
    /// Returns the items sorted by start, with `start_time` renormalized to
    /// the day of the first input item. An empty input yields an empty day.
    pub fn reflow(&self, items: &[TimelineItem]) -> Vec<TimelineItem> {
        let Some(day) = reference_day(items) else {
            return Vec::new();
        };
        let mut blocks = to_blocks(items);
        self.reflow_blocks(&mut blocks);
        to_items(blocks, day)
    }

    /// Resolve overlaps only, leaving gaps alone.
    pub fn resolve_overlaps(&self, items: &[TimelineItem]) -> Vec<TimelineItem> {
        let Some(day) = reference_day(items) else {
            return Vec::new();
        };
        let mut blocks = to_blocks(items);
        blocks.sort_by_key(|b| b.start_minutes);
        self.resolve_block_overlaps(&mut blocks);
        to_items(blocks, day)
    }

    fn reflow_blocks(&self, blocks: &mut [TimelineBlock]) {
        blocks.sort_by_key(|b| b.start_minutes);

        let overflow = self.pull_back_overflow(blocks);
        if overflow > 0 {
            debug!(overflow, "minutes past midnight could not be pulled back");
        }

        let unresolved = self.resolve_block_overlaps(blocks);
        if unresolved > 0 {
            debug!(unresolved, "overlap minutes could not be absorbed");
        }

        let gaps = find_gaps(blocks);
        if !gaps.is_empty() {
            debug!(
                gaps = gaps.len(),
                minutes = gaps.iter().map(|g| g.duration).sum::<i64>(),
                "closing gaps"
            );
            close_gaps_by_shifting(blocks);
            self.fill_gaps_by_expanding(blocks);
        }

        let gaps = find_gaps(blocks);
        let overlaps = find_overlaps(blocks);
        if !gaps.is_empty() || !overlaps.is_empty() {
            warn!(
                gaps = gaps.len(),
                overlaps = overlaps.len(),
                "reflow left the day partially uncovered"
            );
        }
    }

    /// Walk adjacent pairs in start order and remove each overlap using the
    /// configured priority. Returns the overlap minutes left unresolved.
    fn resolve_block_overlaps(&self, blocks: &mut [TimelineBlock]) -> i64 {
        let mut unresolved = 0;

        for i in 1..blocks.len() {
            let (head, tail) = blocks.split_at_mut(i);
            let current = &mut head[i - 1];
            let next = &mut tail[0];

            let overlap = current.end_minutes - next.start_minutes;
            if overlap <= 0 {
                continue;
            }

            let mut remaining = match self.config.overlap_priority {
                OverlapPriority::CompressFirst => {
                    let left = self.compress_tail(current, overlap);
                    push_forward(next, left)
                }
                OverlapPriority::ShiftFirst => {
                    let left = push_forward(next, overlap);
                    self.compress_tail(current, left)
                }
            };
            remaining = self.compress_head(next, remaining);

            trace!(
                current = %current.item.id,
                next = %next.item.id,
                overlap,
                remaining,
                "resolved overlap"
            );
            unresolved += remaining;
        }

        blocks.sort_by_key(|b| b.start_minutes);
        unresolved
    }

    /// Bring blocks that end past midnight back inside the day: compress the
    /// tail first, then slide an unlocked block left so the overlap pass can
    /// take the rest out of its predecessors. Returns the minutes still
    /// past midnight.
    fn pull_back_overflow(&self, blocks: &mut [TimelineBlock]) -> i64 {
        let mut stuck = 0;
        for block in blocks.iter_mut() {
            let overflow = block.end_minutes - DAY_MINUTES;
            if overflow <= 0 {
                continue;
            }
            let mut remaining = self.compress_tail(block, overflow);
            if remaining > 0 && !block.is_locked() {
                let shift = remaining.min(block.start_minutes);
                block.move_to(block.start_minutes - shift);
                remaining -= shift;
            }
            trace!(id = %block.item.id, overflow, remaining, "pulled back overflow");
            stuck += remaining;
        }
        blocks.sort_by_key(|b| b.start_minutes);
        stuck
    }

    /// Absorb up to `minutes` by shortening the block's end, down to the floor.
    fn compress_tail(&self, block: &mut TimelineBlock, minutes: i64) -> i64 {
        let absorbed = self.absorbable(block, minutes);
        block.set_duration(block.duration() - absorbed);
        minutes - absorbed
    }

    /// Absorb up to `minutes` by moving the block's start later, down to the floor.
    fn compress_head(&self, block: &mut TimelineBlock, minutes: i64) -> i64 {
        let absorbed = self.absorbable(block, minutes);
        block.trim_head(absorbed);
        minutes - absorbed
    }

    fn absorbable(&self, block: &TimelineBlock, minutes: i64) -> i64 {
        if minutes <= 0 || !block.can_resize() {
            return 0;
        }
        let slack = (block.duration() - self.config.min_flexible_minutes).max(0);
        minutes.min(slack)
    }

    /// Phase B: give each lock-delimited segment's uncovered minutes to its
    /// flexible blocks and lay the segment out contiguously again.
    fn fill_gaps_by_expanding(&self, blocks: &mut [TimelineBlock]) {
        if find_gaps(blocks).is_empty() {
            return;
        }

        let mut segment_start = 0;
        let mut members = Vec::new();
        for i in 0..blocks.len() {
            if blocks[i].is_locked() {
                let (anchor_start, anchor_end) = (blocks[i].start_minutes, blocks[i].end_minutes);
                self.expand_segment(blocks, segment_start, anchor_start, &members);
                members.clear();
                segment_start = segment_start.max(anchor_end);
            } else {
                members.push(i);
            }
        }
        self.expand_segment(blocks, segment_start, DAY_MINUTES, &members);
    }

    fn expand_segment(
        &self,
        blocks: &mut [TimelineBlock],
        start: i64,
        end: i64,
        members: &[usize],
    ) {
        if end <= start {
            return;
        }
        if members.is_empty() {
            debug!(start, end, "segment has no movable blocks");
            return;
        }

        // Only a disjoint segment can be laid out again without losing minutes.
        let mut cursor = start;
        for &i in members {
            if blocks[i].start_minutes < cursor {
                debug!(start, end, "segment still overlaps, skipping expansion");
                return;
            }
            cursor = blocks[i].end_minutes;
        }
        if cursor > end {
            debug!(start, end, "segment overflows its bounds, skipping expansion");
            return;
        }

        let used: i64 = members.iter().map(|&i| blocks[i].duration()).sum();
        let free = (end - start) - used;
        if free <= 0 {
            return;
        }

        let recipients: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| blocks[i].can_resize())
            .collect();
        if recipients.is_empty() {
            debug!(start, end, free, "no flexible block to absorb gap");
            return;
        }

        let weights: Vec<i64> = recipients
            .iter()
            .map(|&i| blocks[i].item.expansion_weight())
            .collect();
        for share in apportion(free, &weights) {
            let block = &mut blocks[recipients[share.index]];
            block.set_duration(block.duration() + share.whole);
        }
        debug!(start, end, free, recipients = recipients.len(), "expanded segment");

        let mut cursor = start;
        for &i in members {
            blocks[i].move_to(cursor);
            cursor = blocks[i].end_minutes;
        }
    }
}

/// Push an unlocked block later by up to `minutes`, never past the end of
/// the day. Returns the minutes it could not move.
fn push_forward(block: &mut TimelineBlock, minutes: i64) -> i64 {
    if minutes <= 0 || block.is_locked() {
        return minutes;
    }
    let room = (DAY_MINUTES - block.end_minutes).max(0);
    let shift = minutes.min(room);
    block.move_to(block.start_minutes + shift);
    minutes - shift
}

/// Phase A: slide every unlocked block left onto the end of what is already
/// covered. Locked blocks stay put, so a gap in front of one survives.
fn close_gaps_by_shifting(blocks: &mut [TimelineBlock]) {
    let mut covered_to = 0;
    for block in blocks.iter_mut() {
        if !block.is_locked() && block.start_minutes > covered_to {
            block.move_to(covered_to);
        }
        covered_to = covered_to.max(block.end_minutes);
    }
}

/// [`ReflowEngine::reflow`] with the default configuration.
pub fn reflow(items: &[TimelineItem]) -> Vec<TimelineItem> {
    ReflowEngine::new().reflow(items)
}

/// [`ReflowEngine::resolve_overlaps`] with the default configuration.
pub fn resolve_overlaps(items: &[TimelineItem]) -> Vec<TimelineItem> {
    ReflowEngine::new().resolve_overlaps(items)
}
