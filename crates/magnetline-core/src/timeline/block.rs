//! Positional view of timeline items.
//!
//! Items carry a same-day timestamp plus a duration; blocks carry minute
//! offsets from midnight. The reflow engine works on blocks only and writes
//! the result back as items anchored on one reference day.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{TimelineItem, DAY_MINUTES};
use crate::error::ValidationError;

/// A timeline item positioned as `[start_minutes, end_minutes)` within the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBlock {
    pub item: TimelineItem,
    pub start_minutes: i64,
    pub end_minutes: i64,
}

impl TimelineBlock {
    pub fn from_item(item: TimelineItem) -> Self {
        let start_minutes = minutes_since_midnight(item.start_time);
        let end_minutes = start_minutes + item.duration_minutes;
        Self {
            item,
            start_minutes,
            end_minutes,
        }
    }

    pub fn duration(&self) -> i64 {
        self.end_minutes - self.start_minutes
    }

    pub fn is_locked(&self) -> bool {
        self.item.is_locked_time
    }

    /// Reflow may change this block's duration.
    pub fn can_resize(&self) -> bool {
        self.item.is_flexible && !self.item.is_locked_time
    }

    pub fn is_compressed(&self) -> bool {
        self.item.is_flexible
            && self
                .item
                .original_duration
                .is_some_and(|original| self.duration() < original)
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_minutes < other.end_minutes && self.end_minutes > other.start_minutes
    }

    /// Move to `start` keeping the duration.
    pub(crate) fn move_to(&mut self, start: i64) {
        let duration = self.duration();
        self.start_minutes = start;
        self.end_minutes = start + duration;
    }

    /// Change the duration keeping the start. The pre-change duration becomes
    /// the item's baseline the first time this happens.
    pub(crate) fn set_duration(&mut self, duration: i64) {
        if duration == self.duration() {
            return;
        }
        self.record_baseline();
        self.end_minutes = self.start_minutes + duration;
    }

    /// Shorten from the front, keeping the end.
    pub(crate) fn trim_head(&mut self, minutes: i64) {
        if minutes == 0 {
            return;
        }
        self.record_baseline();
        self.start_minutes += minutes;
    }

    fn record_baseline(&mut self) {
        if self.item.original_duration.is_none() {
            self.item.original_duration = Some(self.duration());
        }
    }

    /// Write the positional state back into an item anchored on `day`.
    pub fn into_item(self, day: NaiveDate) -> TimelineItem {
        let mut item = self.item;
        item.start_time = timestamp_from_minutes(self.start_minutes, day);
        item.duration_minutes = self.end_minutes - self.start_minutes;
        item
    }
}

/// Hour and minute of `timestamp` as minutes since midnight.
pub fn minutes_since_midnight(timestamp: DateTime<Utc>) -> i64 {
    i64::from(timestamp.hour()) * 60 + i64::from(timestamp.minute())
}

/// `minutes` after midnight of `reference_day`.
pub fn timestamp_from_minutes(minutes: i64, reference_day: NaiveDate) -> DateTime<Utc> {
    reference_day.and_time(NaiveTime::MIN).and_utc() + Duration::minutes(minutes)
}

/// The day a collection of items lives on: the date of the first item.
pub fn reference_day(items: &[TimelineItem]) -> Option<NaiveDate> {
    items.first().map(|item| item.start_time.date_naive())
}

pub fn to_blocks(items: &[TimelineItem]) -> Vec<TimelineBlock> {
    items.iter().cloned().map(TimelineBlock::from_item).collect()
}

pub fn to_items(blocks: Vec<TimelineBlock>, reference_day: NaiveDate) -> Vec<TimelineItem> {
    blocks
        .into_iter()
        .map(|block| block.into_item(reference_day))
        .collect()
}

/// Parse `HH:MM` into minutes since midnight. `24:00` is accepted as the end
/// of the day.
pub fn parse_clock(clock: &str) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::InvalidClock(clock.to_string());
    let (hours, minutes) = clock.trim().split_once(':').ok_or_else(invalid)?;
    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    if !(0..60).contains(&minutes) || !(0..=24).contains(&hours) {
        return Err(invalid());
    }
    let total = hours * 60 + minutes;
    if total > DAY_MINUTES {
        return Err(invalid());
    }
    Ok(total)
}

/// Format minutes since midnight as `HH:MM`.
pub fn format_clock(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes.div_euclid(60), minutes.rem_euclid(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn item_at(hour: u32, minute: u32, duration: i64) -> TimelineItem {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap();
        TimelineItem::new("a", "owner", "Block", start, duration)
    }

    #[test]
    fn minutes_since_midnight_ignores_seconds() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 4, 13, 45, 59).unwrap();
        assert_eq!(minutes_since_midnight(ts), 13 * 60 + 45);
    }

    #[test]
    fn timestamp_from_minutes_anchors_on_reference_day() {
        let ts = timestamp_from_minutes(570, day());
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap());
        assert_eq!(minutes_since_midnight(ts), 570);
    }

    #[test]
    fn block_positions_follow_item() {
        let block = TimelineBlock::from_item(item_at(9, 0, 60));
        assert_eq!(block.start_minutes, 540);
        assert_eq!(block.end_minutes, 600);
        assert_eq!(block.duration(), 60);
    }

    #[test]
    fn round_trip_renormalizes_start_to_reference_day() {
        let mut item = item_at(9, 0, 60);
        item.start_time = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 30).unwrap();

        let items = to_items(to_blocks(&[item.clone()]), day());
        assert_eq!(items[0].start_time, Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap());
        assert_eq!(items[0].duration_minutes, 60);
        assert_eq!(items[0].id, item.id);
        assert_eq!(items[0].title, item.title);
    }

    #[test]
    fn duration_change_records_baseline_once() {
        let mut block = TimelineBlock::from_item(item_at(9, 0, 60).flexible());
        block.set_duration(45);
        assert_eq!(block.item.original_duration, Some(60));
        assert!(block.is_compressed());

        block.set_duration(90);
        assert_eq!(block.item.original_duration, Some(60));
        assert!(!block.is_compressed());

        let mut other = TimelineBlock::from_item(item_at(10, 0, 60).flexible());
        other.trim_head(20);
        assert_eq!((other.start_minutes, other.end_minutes), (620, 660));
        assert_eq!(other.item.original_duration, Some(60));
    }

    #[test]
    fn locked_flexible_block_cannot_resize() {
        let block = TimelineBlock::from_item(item_at(9, 0, 60).flexible().locked());
        assert!(block.is_locked());
        assert!(!block.can_resize());
    }

    #[test]
    fn parse_clock_accepts_day_bounds() {
        assert_eq!(parse_clock("00:00").unwrap(), 0);
        assert_eq!(parse_clock("09:30").unwrap(), 570);
        assert_eq!(parse_clock("24:00").unwrap(), 1440);
        assert!(parse_clock("24:01").is_err());
        assert!(parse_clock("9").is_err());
        assert!(parse_clock("12:60").is_err());
        assert!(parse_clock("ab:cd").is_err());
    }

    #[test]
    fn format_clock_pads() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(570), "09:30");
        assert_eq!(format_clock(1440), "24:00");
    }
}
