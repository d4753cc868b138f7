//! Magnetic timeline scheduling.
//!
//! This module provides:
//! - The item/block model and minute-of-day conversions
//! - Gap and overlap detection over a day's blocks
//! - The reflow engine that restores gap-free coverage
//! - Mutations (insert, move, resize, split, remove, bootstrap) that funnel
//!   through reflow

mod apportion;
mod block;
mod gap;
mod item;
mod mutation;
mod reflow;

/// Minutes in one day; a fully covered timeline sums to exactly this.
pub const DAY_MINUTES: i64 = 1440;

/// Default compression floor for flexible blocks.
pub const MIN_FLEXIBLE_MINUTES: i64 = 15;

pub use apportion::{apportion, Share};
pub use block::{
    format_clock, minutes_since_midnight, parse_clock, reference_day, timestamp_from_minutes,
    to_blocks, to_items, TimelineBlock,
};
pub use gap::{
    find_gaps, find_overlaps, has_full_coverage, validate, validate_with_floor, Gap, Overlap,
    TimelineReport,
};
pub use item::TimelineItem;
pub use mutation::{
    create_default_24_hour_timeline, create_default_timeline, insert_item_at_position, move_item,
    remove_item, resize_item, split_item_at,
};
pub use reflow::{reflow, resolve_overlaps, ReflowEngine};
