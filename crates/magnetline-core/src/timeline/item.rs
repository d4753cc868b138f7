//! Timeline item type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single persisted item on a user's day.
///
/// `start_time` is a same-day wall-clock timestamp; only its hour and minute
/// matter to scheduling. `color`, `template_id` and the audit timestamps are
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub is_locked_time: bool,
    #[serde(default)]
    pub is_flexible: bool,
    #[serde(default)]
    pub original_duration: Option<i64>,
    #[serde(default)]
    pub template_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimelineItem {
    /// Create a new timeline item
    ///
    /// # Panics
    /// Panics if `duration_minutes < 1`. Use [`try_new`](Self::try_new) for a
    /// non-panicking version.
    pub fn new(
        id: impl Into<String>,
        owner: impl Into<String>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Self {
        Self::try_new(id, owner, title, start_time, duration_minutes)
            .expect("TimelineItem::new: duration_minutes must be at least 1")
    }

    /// Create a new timeline item, returning a Result
    ///
    /// # Errors
    /// Returns an error if `duration_minutes < 1`
    pub fn try_new(
        id: impl Into<String>,
        owner: impl Into<String>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if duration_minutes < 1 {
            return Err(ValidationError::InvalidDuration {
                id,
                minutes: duration_minutes,
            });
        }
        let now = Utc::now();
        Ok(Self {
            id,
            owner: owner.into(),
            title: title.into(),
            start_time,
            duration_minutes,
            color: String::new(),
            is_locked_time: false,
            is_flexible: false,
            original_duration: None,
            template_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Pin start and duration; reflow will never touch this item.
    pub fn locked(mut self) -> Self {
        self.is_locked_time = true;
        self
    }

    /// Allow reflow to compress or expand this item.
    pub fn flexible(mut self) -> Self {
        self.is_flexible = true;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn with_original_duration(mut self, minutes: i64) -> Self {
        self.original_duration = Some(minutes);
        self
    }

    /// Flexible and currently shorter than its recorded baseline.
    pub fn is_compressed(&self) -> bool {
        self.is_flexible
            && self
                .original_duration
                .is_some_and(|original| self.duration_minutes < original)
    }

    /// Weight used when apportioning expansion minutes.
    pub fn expansion_weight(&self) -> i64 {
        self.original_duration.unwrap_or(self.duration_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn nine_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    #[test]
    fn try_new_rejects_non_positive_duration() {
        let err = TimelineItem::try_new("a", "owner", "Nap", nine_am(), 0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidDuration {
                id: "a".into(),
                minutes: 0
            }
        );
        assert!(TimelineItem::try_new("a", "owner", "Nap", nine_am(), 1).is_ok());
    }

    #[test]
    #[should_panic(expected = "duration_minutes must be at least 1")]
    fn new_panics_on_invalid_duration() {
        TimelineItem::new("a", "owner", "Nap", nine_am(), -5);
    }

    #[test]
    fn compressed_requires_flexible_and_baseline() {
        let item = TimelineItem::new("a", "owner", "Work", nine_am(), 30);
        assert!(!item.is_compressed());

        let item = item.flexible();
        assert!(!item.is_compressed());

        let item = item.with_original_duration(60);
        assert!(item.is_compressed());
        assert_eq!(item.expansion_weight(), 60);

        let mut rigid = item.clone();
        rigid.is_flexible = false;
        assert!(!rigid.is_compressed());
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let json = r#"{
            "id": "x",
            "owner": "u1",
            "title": "Read",
            "start_time": "2024-03-04T09:00:00Z",
            "duration_minutes": 45,
            "created_at": "2024-03-01T00:00:00Z",
            "updated_at": "2024-03-01T00:00:00Z"
        }"#;
        let item: TimelineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.duration_minutes, 45);
        assert!(!item.is_locked_time);
        assert!(!item.is_flexible);
        assert_eq!(item.original_duration, None);
        assert_eq!(item.expansion_weight(), 45);
    }
}
