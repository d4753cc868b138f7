//! Mutations over a day's items.
//!
//! Every mutation except split ends in a reflow, so callers always get back
//! a full, already-repaired day. Split deliberately leaves the day as it is:
//! both halves occupy exactly the original's minutes, and callers that want
//! the halves reflowed do so themselves.

use chrono::{NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use super::block::{minutes_since_midnight, reference_day, timestamp_from_minutes};
use super::{ReflowEngine, TimelineItem, DAY_MINUTES};
use crate::error::ValidationError;

fn check_minute(minutes: i64) -> Result<(), ValidationError> {
    if !(0..DAY_MINUTES).contains(&minutes) {
        return Err(ValidationError::MinuteOutOfRange {
            minutes,
            min: 0,
            max: DAY_MINUTES - 1,
        });
    }
    Ok(())
}

fn check_duration(id: &str, minutes: i64) -> Result<(), ValidationError> {
    if minutes < 1 {
        return Err(ValidationError::InvalidDuration {
            id: id.to_string(),
            minutes,
        });
    }
    Ok(())
}

impl ReflowEngine {
    /// Place `new_item` at `target_minutes` and reflow the whole day.
    ///
    /// There is no capacity check; reflow makes room by compressing and
    /// pushing neighbors.
    pub fn insert_item_at_position(
        &self,
        items: &[TimelineItem],
        mut new_item: TimelineItem,
        target_minutes: i64,
    ) -> Result<Vec<TimelineItem>, ValidationError> {
        check_minute(target_minutes)?;
        check_duration(&new_item.id, new_item.duration_minutes)?;

        let day = reference_day(items).unwrap_or_else(|| new_item.start_time.date_naive());
        new_item.start_time = timestamp_from_minutes(target_minutes, day);
        debug!(id = %new_item.id, target_minutes, "inserting item");

        let mut next = items.to_vec();
        next.push(new_item);
        Ok(self.reflow(&next))
    }

    /// Move an item to `new_start_minutes` and reflow.
    ///
    /// Locked items and unknown ids leave the day unchanged.
    pub fn move_item(
        &self,
        items: &[TimelineItem],
        id: &str,
        new_start_minutes: i64,
    ) -> Result<Vec<TimelineItem>, ValidationError> {
        let Some(index) = items.iter().position(|i| i.id == id) else {
            return Ok(items.to_vec());
        };
        if items[index].is_locked_time {
            debug!(id, "ignoring move of locked item");
            return Ok(items.to_vec());
        }
        check_minute(new_start_minutes)?;

        let mut next = items.to_vec();
        let day = reference_day(items).unwrap_or_else(|| Utc::now().date_naive());
        next[index].start_time = timestamp_from_minutes(new_start_minutes, day);
        Ok(self.reflow(&next))
    }

    /// Give an item a new duration and reflow.
    ///
    /// The first resize records the current duration as the item's baseline
    /// for later expansion weighting. Unknown ids leave the day unchanged.
    pub fn resize_item(
        &self,
        items: &[TimelineItem],
        id: &str,
        new_duration: i64,
    ) -> Result<Vec<TimelineItem>, ValidationError> {
        check_duration(id, new_duration)?;

        let Some(index) = items.iter().position(|i| i.id == id) else {
            return Ok(items.to_vec());
        };

        let mut next = items.to_vec();
        let item = &mut next[index];
        if item.original_duration.is_none() {
            item.original_duration = Some(item.duration_minutes);
        }
        item.duration_minutes = new_duration;
        Ok(self.reflow(&next))
    }

    /// Remove an item and reflow what is left.
    pub fn remove_item(&self, items: &[TimelineItem], id: &str) -> Vec<TimelineItem> {
        let Some(index) = items.iter().position(|i| i.id == id) else {
            return items.to_vec();
        };
        let mut next = items.to_vec();
        next.remove(index);
        self.reflow(&next)
    }
}

/// Split an item in two at `split_minutes`.
///
/// The halves get fresh ids, `(1/2)` / `(2/2)` title suffixes and the
/// original's flags, and take the original's place in the list. A split
/// point not strictly inside the item, or an unknown id, leaves the day
/// unchanged. The result is **not** reflowed.
pub fn split_item_at(items: &[TimelineItem], id: &str, split_minutes: i64) -> Vec<TimelineItem> {
    let Some(index) = items.iter().position(|i| i.id == id) else {
        return items.to_vec();
    };
    let original = &items[index];
    let start = minutes_since_midnight(original.start_time);
    let end = start + original.duration_minutes;
    if split_minutes <= start || split_minutes >= end {
        return items.to_vec();
    }

    let now = Utc::now();
    let half = |suffix: &str, offset: i64, duration: i64| TimelineItem {
        id: Uuid::new_v4().to_string(),
        title: format!("{} ({suffix})", original.title),
        start_time: timestamp_from_minutes(offset, original.start_time.date_naive()),
        duration_minutes: duration,
        original_duration: None,
        created_at: now,
        updated_at: now,
        ..original.clone()
    };
    let first = half("1/2", start, split_minutes - start);
    let second = half("2/2", split_minutes, end - split_minutes);
    debug!(id, split_minutes, "split item");

    let mut next = items.to_vec();
    next.splice(index..=index, [first, second]);
    next
}

/// Bootstrap a new user's day on `day`: Sleep (locked), Morning Routine,
/// Work and Evening (flexible), covering exactly 1440 minutes.
pub fn create_default_timeline(owner: &str, day: NaiveDate) -> Vec<TimelineItem> {
    let now = Utc::now();
    let block = |title: &str, start: i64, duration: i64, color: &str| TimelineItem {
        id: Uuid::new_v4().to_string(),
        owner: owner.to_string(),
        title: title.to_string(),
        start_time: timestamp_from_minutes(start, day),
        duration_minutes: duration,
        color: color.to_string(),
        is_locked_time: false,
        is_flexible: true,
        original_duration: None,
        template_id: None,
        created_at: now,
        updated_at: now,
    };

    let mut sleep = block("Sleep", 0, 480, "#6366f1");
    sleep.is_locked_time = true;
    sleep.is_flexible = false;

    vec![
        sleep,
        block("Morning Routine", 480, 60, "#f59e0b"),
        block("Work", 540, 480, "#3b82f6"),
        block("Evening", 1020, 420, "#10b981"),
    ]
}

/// [`create_default_timeline`] for today.
pub fn create_default_24_hour_timeline(owner: &str) -> Vec<TimelineItem> {
    create_default_timeline(owner, Utc::now().date_naive())
}

/// [`ReflowEngine::insert_item_at_position`] with the default configuration.
pub fn insert_item_at_position(
    items: &[TimelineItem],
    new_item: TimelineItem,
    target_minutes: i64,
) -> Result<Vec<TimelineItem>, ValidationError> {
    ReflowEngine::new().insert_item_at_position(items, new_item, target_minutes)
}

/// [`ReflowEngine::move_item`] with the default configuration.
pub fn move_item(
    items: &[TimelineItem],
    id: &str,
    new_start_minutes: i64,
) -> Result<Vec<TimelineItem>, ValidationError> {
    ReflowEngine::new().move_item(items, id, new_start_minutes)
}

/// [`ReflowEngine::resize_item`] with the default configuration.
pub fn resize_item(
    items: &[TimelineItem],
    id: &str,
    new_duration: i64,
) -> Result<Vec<TimelineItem>, ValidationError> {
    ReflowEngine::new().resize_item(items, id, new_duration)
}

/// [`ReflowEngine::remove_item`] with the default configuration.
pub fn remove_item(items: &[TimelineItem], id: &str) -> Vec<TimelineItem> {
    ReflowEngine::new().remove_item(items, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::validate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn span(item: &TimelineItem) -> (i64, i64) {
        let start = minutes_since_midnight(item.start_time);
        (start, start + item.duration_minutes)
    }

    fn find<'a>(items: &'a [TimelineItem], title: &str) -> &'a TimelineItem {
        items.iter().find(|i| i.title == title).unwrap()
    }

    #[test]
    fn default_timeline_covers_the_day() {
        let items = create_default_timeline("u1", day());
        assert_eq!(items.len(), 4);
        assert_eq!(items.iter().map(|i| i.duration_minutes).sum::<i64>(), 1440);
        assert!(validate(&items).is_valid());

        let sleep = find(&items, "Sleep");
        assert!(sleep.is_locked_time);
        assert_eq!(span(sleep), (0, 480));
        assert!(items.iter().filter(|i| i.title != "Sleep").all(|i| i.is_flexible));
        assert!(items.iter().all(|i| i.owner == "u1"));
    }

    #[test]
    fn split_inside_item_yields_two_halves_in_place() {
        let mut items = create_default_timeline("u1", day());
        items[2] = items[2].clone().with_template("deep-work");
        let work_id = find(&items, "Work").id.clone();

        let out = split_item_at(&items, &work_id, 780);
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|i| i.id != work_id));
        assert_eq!(out[2].title, "Work (1/2)");
        assert_eq!(out[3].title, "Work (2/2)");
        assert_eq!(span(&out[2]), (540, 780));
        assert_eq!(span(&out[3]), (780, 1020));
        assert!(out[2].is_flexible && out[3].is_flexible);
        assert_eq!(out[2].color, out[3].color);
        assert_eq!(out[3].template_id.as_deref(), Some("deep-work"));
        assert_ne!(out[2].id, out[3].id);
        assert!(validate(&out).is_valid());
    }

    #[test]
    fn split_on_boundary_or_unknown_id_is_noop() {
        let items = create_default_timeline("u1", day());
        let work_id = find(&items, "Work").id.clone();

        assert_eq!(split_item_at(&items, &work_id, 540), items);
        assert_eq!(split_item_at(&items, &work_id, 1020), items);
        assert_eq!(split_item_at(&items, &work_id, 1200), items);
        assert_eq!(split_item_at(&items, "missing", 600), items);
    }

    #[test]
    fn move_of_locked_or_unknown_item_is_noop() {
        let items = create_default_timeline("u1", day());
        let sleep_id = find(&items, "Sleep").id.clone();

        assert_eq!(move_item(&items, &sleep_id, 600).unwrap(), items);
        assert_eq!(move_item(&items, "missing", 600).unwrap(), items);
        assert_eq!(move_item(&items, &sleep_id, 1440).unwrap(), items);
        assert_eq!(move_item(&items, "missing", -5).unwrap(), items);
    }

    #[test]
    fn move_rejects_minutes_outside_day() {
        let items = create_default_timeline("u1", day());
        let work_id = find(&items, "Work").id.clone();

        assert!(matches!(
            move_item(&items, &work_id, 1440),
            Err(ValidationError::MinuteOutOfRange { .. })
        ));
        assert!(move_item(&items, &work_id, -1).is_err());
    }

    #[test]
    fn move_to_end_of_day_keeps_coverage() {
        let items = create_default_timeline("u1", day());
        let morning_id = find(&items, "Morning Routine").id.clone();

        let out = move_item(&items, &morning_id, 1380).unwrap();
        assert!(validate(&out).is_valid());
        assert_eq!(span(find(&out, "Sleep")), (0, 480));
        assert_eq!(span(find(&out, "Work")), (480, 990));
        assert_eq!(span(find(&out, "Evening")), (990, 1376));
        assert_eq!(span(find(&out, "Morning Routine")), (1376, 1440));
        assert_eq!(out.last().unwrap().title, "Morning Routine");
    }

    #[test]
    fn resize_records_baseline_and_reflows() {
        let items = create_default_timeline("u1", day());
        let work_id = find(&items, "Work").id.clone();

        let out = resize_item(&items, &work_id, 120).unwrap();
        assert!(validate(&out).is_valid());
        assert_eq!(find(&out, "Work").original_duration, Some(480));
        assert_eq!(span(find(&out, "Sleep")), (0, 480));
    }

    #[test]
    fn resize_of_last_block_stays_inside_the_day() {
        let items = create_default_timeline("u1", day());
        let evening_id = find(&items, "Evening").id.clone();

        let out = resize_item(&items, &evening_id, 600).unwrap();
        let report = validate(&out);
        assert!(report.is_valid(), "report: {report:?}");
        assert!(report.out_of_bounds.is_empty());
        assert_eq!(report.total_minutes, 1440);
        assert_eq!(span(find(&out, "Evening")).1, 1440);
    }

    #[test]
    fn resize_rejects_zero_and_ignores_unknown_id() {
        let items = create_default_timeline("u1", day());
        assert!(matches!(
            resize_item(&items, "missing", 0),
            Err(ValidationError::InvalidDuration { .. })
        ));
        assert_eq!(resize_item(&items, "missing", 30).unwrap(), items);
    }

    #[test]
    fn insert_makes_room_by_compressing_neighbor() {
        let items = create_default_timeline("u1", day());
        let gym = TimelineItem::new("gym", "u1", "Gym", Utc::now(), 60).flexible();

        let out = insert_item_at_position(&items, gym, 600).unwrap();
        assert_eq!(out.len(), 5);
        assert!(validate(&out).is_valid());
        assert_eq!(span(find(&out, "Sleep")), (0, 480));
        assert_eq!(find(&out, "Work").original_duration, Some(480));
        assert!(out.iter().all(|i| i.start_time.date_naive() == day()));
    }

    #[test]
    fn insert_into_empty_day_uses_item_day() {
        let start = timestamp_from_minutes(0, day());
        let nap = TimelineItem::new("nap", "u1", "Nap", start, 30).flexible();

        let out = insert_item_at_position(&[], nap, 120).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(span(&out[0]), (0, 1440));
        assert_eq!(out[0].start_time.date_naive(), day());
    }

    #[test]
    fn insert_rejects_bad_target() {
        let nap = TimelineItem::new("nap", "u1", "Nap", Utc::now(), 30);
        assert!(insert_item_at_position(&[], nap, 1440).is_err());
    }

    #[test]
    fn remove_reflows_remaining_items() {
        let items = create_default_timeline("u1", day());
        let morning_id = find(&items, "Morning Routine").id.clone();

        let out = remove_item(&items, &morning_id);
        assert_eq!(out.len(), 3);
        assert!(validate(&out).is_valid());
        assert_eq!(remove_item(&items, "missing"), items);
    }
}
