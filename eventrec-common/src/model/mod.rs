//! Event record model
//!
//! [`Event`] is the persisted record. [`EventDraft`] is unvalidated form input;
//! validation happens here at the boundary so the repository only ever sees
//! records that passed [`EventDraft::validate`].

pub mod dates;

use serde::{Deserialize, Serialize};

use crate::media::MediaItem;
use crate::{Error, Result};

pub use dates::{display_date, event_day, parse_event_date, to_iso_timestamp, INVALID_DATE};

/// Numeric record identifier (positive, unique, immutable)
pub type EventId = u64;

/// One college event
///
/// Serialized with camelCase keys. All fields except `id` default when absent so
/// records written before a field existed still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    #[serde(default)]
    pub title: String,
    /// ISO-8601 start timestamp
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub coordinator: String,
    /// Sub-category within `category`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub resource_persons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_participants: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsored_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_assistance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_expenses: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Carousel order is insertion order
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

impl Event {
    /// Minimal record with the required fields set
    pub fn new(
        id: EventId,
        title: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            date: date.into(),
            end_date: None,
            category: category.into(),
            coordinator: String::new(),
            event_type: None,
            department: None,
            venue: None,
            team_members: Vec::new(),
            resource_persons: Vec::new(),
            participants_count: None,
            external_participants: None,
            sponsored_by: None,
            financial_assistance: None,
            total_expenses: None,
            description: None,
            media: Vec::new(),
        }
    }

    /// Start date for display, or the invalid-date sentinel
    pub fn display_start(&self) -> String {
        display_date(&self.date)
    }

    /// End date for display; falls back to the start date when absent
    pub fn display_end(&self) -> String {
        match &self.end_date {
            Some(end) => display_date(end),
            None => self.display_start(),
        }
    }
}

/// Unvalidated event form input
///
/// Every field is optional so the caller can report all problems via
/// [`Error::ValidationFailed`] instead of a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    pub title: Option<String>,
    pub date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub coordinator: Option<String>,
    pub event_type: Option<String>,
    pub department: Option<String>,
    pub venue: Option<String>,
    pub team_members: Vec<String>,
    pub resource_persons: Vec<String>,
    pub participants_count: Option<u32>,
    pub external_participants: Option<u32>,
    pub sponsored_by: Option<String>,
    pub financial_assistance: Option<f64>,
    pub total_expenses: Option<f64>,
    pub description: Option<String>,
    pub media: Option<Vec<MediaItem>>,
}

/// Event that passed validation but has no identifier yet
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEvent(Event);

impl ValidatedEvent {
    /// Attach an identifier (from the allocator for new records, or the
    /// existing record's id for replacements)
    pub fn with_id(self, id: EventId) -> Event {
        let mut event = self.0;
        event.id = id;
        event
    }

    pub fn fields(&self) -> &Event {
        &self.0
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

impl EventDraft {
    /// Check required fields and normalise
    ///
    /// `title`, `category` and `date` must be present and non-blank; `date` and
    /// `endDate` (when given) must parse. Dates are re-rendered as RFC 3339 UTC
    /// with millisecond precision; text fields are trimmed.
    pub fn validate(self) -> Result<ValidatedEvent> {
        let title = blank_to_none(self.title);
        let category = blank_to_none(self.category);
        let date = blank_to_none(self.date);

        let (Some(title), Some(category), Some(date)) =
            (title.clone(), category.clone(), date.clone())
        else {
            let missing: Vec<&str> = [("title", &title), ("category", &category), ("date", &date)]
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| name)
                .collect();
            return Err(Error::ValidationFailed(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        };

        let start = parse_event_date(&date)
            .ok_or_else(|| {
                Error::ValidationFailed(format!("date '{}' is not a valid date", date))
            })?;

        let end_date = match blank_to_none(self.end_date) {
            Some(raw) => {
                let end = parse_event_date(&raw).ok_or_else(|| {
                    Error::ValidationFailed(format!("endDate '{}' is not a valid date", raw))
                })?;
                Some(to_iso_timestamp(end))
            }
            None => None,
        };

        Ok(ValidatedEvent(Event {
            id: 0,
            title,
            date: to_iso_timestamp(start),
            end_date,
            category,
            coordinator: self.coordinator.map(|c| c.trim().to_string()).unwrap_or_default(),
            event_type: blank_to_none(self.event_type),
            department: blank_to_none(self.department),
            venue: blank_to_none(self.venue),
            team_members: clean_names(self.team_members),
            resource_persons: clean_names(self.resource_persons),
            participants_count: self.participants_count,
            external_participants: self.external_participants,
            sponsored_by: blank_to_none(self.sponsored_by),
            financial_assistance: self.financial_assistance,
            total_expenses: self.total_expenses,
            description: blank_to_none(self.description),
            media: self.media.unwrap_or_default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> EventDraft {
        EventDraft {
            title: Some("  Hack Night ".into()),
            date: Some("2024-02-05".into()),
            category: Some("Technical".into()),
            coordinator: Some(" Dr. Rao ".into()),
            venue: Some("   ".into()),
            team_members: vec!["Asha".into(), " ".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_normalizes() {
        let event = draft().validate().unwrap().with_id(7);
        assert_eq!(event.id, 7);
        assert_eq!(event.title, "Hack Night");
        assert_eq!(event.date, "2024-02-05T00:00:00.000Z");
        assert_eq!(event.coordinator, "Dr. Rao");
        assert_eq!(event.venue, None);
        assert_eq!(event.team_members, vec!["Asha".to_string()]);
        assert!(event.media.is_empty());
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let err = EventDraft::default().validate().unwrap_err();
        match err {
            Error::ValidationFailed(msg) => {
                assert!(msg.contains("title"));
                assert!(msg.contains("category"));
                assert!(msg.contains("date"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_dates() {
        let mut bad_start = draft();
        bad_start.date = Some("someday".into());
        assert!(matches!(bad_start.validate(), Err(Error::ValidationFailed(_))));

        let mut bad_end = draft();
        bad_end.end_date = Some("2024-02-31".into());
        assert!(matches!(bad_end.validate(), Err(Error::ValidationFailed(_))));
    }

    #[test]
    fn test_event_reads_legacy_record() {
        // Record persisted before department/media existed
        let value = json!({
            "id": 3,
            "title": "Annual Day",
            "date": "2023-12-01T00:00:00.000Z",
            "category": "Cultural",
            "coordinator": ""
        });
        let event: Event = serde_json::from_value(value).unwrap();
        assert_eq!(event.id, 3);
        assert_eq!(event.department, None);
        assert!(event.media.is_empty());
        assert!(event.team_members.is_empty());
    }

    #[test]
    fn test_event_camel_case_keys() {
        let mut event = Event::new(1, "Quiz", "2024-01-10T00:00:00.000Z", "Technical");
        event.end_date = Some("2024-01-11T00:00:00.000Z".into());
        event.participants_count = Some(40);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["endDate"], "2024-01-11T00:00:00.000Z");
        assert_eq!(value["participantsCount"], 40);
        assert!(value.get("venue").is_none());
    }

    #[test]
    fn test_display_dates() {
        let mut event = Event::new(1, "Quiz", "garbage", "Technical");
        assert_eq!(event.display_start(), INVALID_DATE);
        event.date = "2024-01-10T09:00:00Z".into();
        assert_eq!(event.display_end(), "2024-01-10");
    }
}
