//! Report filter predicate
//!
//! Criteria combine with logical AND:
//!
//! - Dates compare at day granularity against the event's effective start
//!   (`date`). Only `start_date` → start ≥ it; only `end_date` → start ≤ it;
//!   both → inclusive range; neither → always passes.
//! - `coordinator`, `venue`, `department` are trimmed, case-insensitive
//!   substring matches. A blank criterion always passes; an absent event field
//!   never matches a non-blank criterion.
//!
//! A record whose `date` does not parse fails any active date criterion and is
//! reported as a [`FilterDiagnostic`]; it never aborts filtering the rest.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{event_day, Event, EventId};

/// Optional report criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub coordinator: Option<String>,
    pub venue: Option<String>,
    pub department: Option<String>,
}

impl ReportCriteria {
    pub fn has_date_range(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Why a record was dropped for reasons other than not matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDiagnostic {
    pub event_id: EventId,
    pub title: String,
    pub message: String,
}

/// Matching records, in input order, plus diagnostics
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOutcome {
    pub events: Vec<Event>,
    pub diagnostics: Vec<FilterDiagnostic>,
}

/// Outcome of the date rule for one record
enum DateCheck {
    Pass,
    Fail,
    Malformed,
}

fn check_dates(event: &Event, criteria: &ReportCriteria) -> DateCheck {
    if !criteria.has_date_range() {
        return DateCheck::Pass;
    }
    let Some(start) = event_day(&event.date) else {
        return DateCheck::Malformed;
    };

    let after_start = criteria.start_date.map_or(true, |from| start >= from);
    let before_end = criteria.end_date.map_or(true, |to| start <= to);
    if after_start && before_end {
        DateCheck::Pass
    } else {
        DateCheck::Fail
    }
}

fn text_matches(field: Option<&str>, criterion: Option<&str>) -> bool {
    let needle = criterion.map(str::trim).unwrap_or_default();
    if needle.is_empty() {
        return true;
    }
    match field {
        Some(value) => value.to_lowercase().contains(&needle.to_lowercase()),
        None => false,
    }
}

fn text_criteria_match(event: &Event, criteria: &ReportCriteria) -> bool {
    text_matches(Some(event.coordinator.as_str()), criteria.coordinator.as_deref())
        && text_matches(event.venue.as_deref(), criteria.venue.as_deref())
        && text_matches(event.department.as_deref(), criteria.department.as_deref())
}

/// Does `event` satisfy every active criterion?
///
/// Malformed dates count as a non-match when a date criterion is active.
pub fn matches(event: &Event, criteria: &ReportCriteria) -> bool {
    matches!(check_dates(event, criteria), DateCheck::Pass) && text_criteria_match(event, criteria)
}

/// Apply `criteria` to a whole collection
pub fn filter_events(events: &[Event], criteria: &ReportCriteria) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for event in events {
        match check_dates(event, criteria) {
            DateCheck::Pass => {
                if text_criteria_match(event, criteria) {
                    outcome.events.push(event.clone());
                }
            }
            DateCheck::Fail => {}
            DateCheck::Malformed => {
                warn!(
                    "Date filtering skipped event {} '{}': unparseable date '{}'",
                    event.id, event.title, event.date
                );
                outcome.diagnostics.push(FilterDiagnostic {
                    event_id: event.id,
                    title: event.title.clone(),
                    message: format!("unparseable date '{}'", event.date),
                });
            }
        }
    }

    outcome
}
