//! # Magnetline Core Library
//!
//! This library provides the scheduling core behind Magnetline's "magnetic"
//! day view. A user's day is always represented as a contiguous,
//! non-overlapping sequence of blocks that covers exactly 1440 minutes, and
//! every edit flows back through a reflow that restores that coverage.
//!
//! ## Architecture
//!
//! - **Block Model**: converts persisted items (time-of-day + duration) into
//!   minute offsets and back
//! - **Gap/Overlap Analyzer**: finds uncovered intervals and collisions
//! - **Reflow Engine**: shifts, compresses and expands blocks until the day
//!   is covered again, never touching locked blocks
//! - **Mutation API**: insert / move / resize / split / remove / bootstrap
//!
//! All scheduling functions are pure: they take a day's items by reference
//! and return a fresh collection. Persistence is the caller's concern.
//!
//! ## Key Components
//!
//! - [`TimelineItem`]: the external-facing item
//! - [`ReflowEngine`]: configurable reflow and mutation entry point
//! - [`TimelineReport`]: post-condition check for degraded reflows
//! - [`Config`]: TOML configuration

pub mod config;
pub mod error;
pub mod timeline;

pub use config::{Config, OverlapPriority, ReflowConfig};
pub use error::{ConfigError, CoreError, ValidationError};
pub use timeline::{
    create_default_24_hour_timeline, create_default_timeline, find_gaps, find_overlaps,
    has_full_coverage, insert_item_at_position, move_item, reflow, remove_item, resize_item,
    resolve_overlaps, split_item_at, validate, Gap, Overlap, ReflowEngine, TimelineBlock,
    TimelineItem, TimelineReport, DAY_MINUTES, MIN_FLEXIBLE_MINUTES,
};
