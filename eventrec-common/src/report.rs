//! Report export boundary
//!
//! Turns event records into report documents on disk. Page layout is owned by a
//! [`ReportRenderer`]; the built-in [`TextReportRenderer`] produces plain text.
//! Batch exports render each record independently so one bad record is skipped
//! and reported instead of failing the whole document.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::model::{display_date, Event, EventId};
use crate::{Error, Result};

/// Placeholder for empty fields
pub const NOT_PROVIDED: &str = "Not provided";

/// Default document header
pub const DEFAULT_COLLEGE_NAME: &str = "SDM College of Engineering & Technology";

/// File name used for combined exports (before the extension)
pub const ALL_EVENTS_STEM: &str = "all-events-report";

/// One event's page: a heading and ordered label/value rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPage {
    pub event_id: EventId,
    pub heading: String,
    pub rows: Vec<(String, String)>,
}

fn text_or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_PROVIDED.to_string(),
    }
}

fn date_or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => display_date(v),
        _ => NOT_PROVIDED.to_string(),
    }
}

fn list_or_placeholder(values: &[String]) -> String {
    if values.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        values.join(", ")
    }
}

fn count_or_placeholder(value: Option<u32>) -> String {
    value.map_or_else(|| NOT_PROVIDED.to_string(), |v| v.to_string())
}

/// Rupee amount; zero and absent amounts are both "not provided"
fn money_or_placeholder(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => {
            if v.fract() == 0.0 {
                format!("₹{}", v as i64)
            } else {
                format!("₹{:.2}", v)
            }
        }
        _ => NOT_PROVIDED.to_string(),
    }
}

impl ReportPage {
    pub fn for_event(event: &Event, heading: impl Into<String>) -> Self {
        let rows = vec![
            ("Event Name", text_or_placeholder(Some(event.title.as_str()))),
            ("Category", text_or_placeholder(Some(event.category.as_str()))),
            ("Event Type", text_or_placeholder(event.event_type.as_deref())),
            ("Start Date", date_or_placeholder(Some(event.date.as_str()))),
            ("End Date", date_or_placeholder(event.end_date.as_deref())),
            ("Department", text_or_placeholder(event.department.as_deref())),
            ("Venue", text_or_placeholder(event.venue.as_deref())),
            ("Coordinator", text_or_placeholder(Some(event.coordinator.as_str()))),
            ("Team Members", list_or_placeholder(&event.team_members)),
            ("Resource Persons", list_or_placeholder(&event.resource_persons)),
            ("Participants Count", count_or_placeholder(event.participants_count)),
            ("External Participants", count_or_placeholder(event.external_participants)),
            ("Sponsored By", text_or_placeholder(event.sponsored_by.as_deref())),
            ("Financial Assistance", money_or_placeholder(event.financial_assistance)),
            ("Total Expenses", money_or_placeholder(event.total_expenses)),
        ];

        Self {
            event_id: event.id,
            heading: heading.into(),
            rows: rows.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

/// Lays out report pages as a document format
pub trait ReportRenderer: Send + Sync {
    /// File extension (without the dot)
    fn extension(&self) -> &'static str;

    /// Render one page
    fn render_page(&self, college_name: &str, page: &ReportPage) -> Result<String>;

    /// Join rendered pages into one document
    fn join_pages(&self, pages: &[String]) -> Vec<u8> {
        pages.join("\u{000C}\n").into_bytes()
    }
}

/// Plain-text renderer with a centred header and an aligned two-column table
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportRenderer;

const TEXT_WIDTH: usize = 72;

fn centered(line: &str) -> String {
    let len = line.chars().count();
    let pad = TEXT_WIDTH.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad), line)
}

impl ReportRenderer for TextReportRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render_page(&self, college_name: &str, page: &ReportPage) -> Result<String> {
        let label_width = page
            .rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        out.push_str(&centered(college_name));
        out.push('\n');
        out.push_str(&centered(&page.heading));
        out.push_str("\n\n");
        for (label, value) in &page.rows {
            out.push_str(&format!("{:<width$}  {}\n", label, value, width = label_width));
        }
        Ok(out)
    }
}

/// Replace every non-alphanumeric character with `_`
pub fn sanitize_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// A record left out of a batch export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFailure {
    pub event_id: EventId,
    pub title: String,
    pub reason: String,
}

/// Result of a batch export
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub exported: usize,
    pub failures: Vec<ExportFailure>,
}

/// Writes report documents into an output directory
pub struct ReportExporter {
    output_dir: PathBuf,
    college_name: String,
    renderer: Box<dyn ReportRenderer>,
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>, college_name: impl Into<String>) -> Self {
        Self::with_renderer(output_dir, college_name, Box::new(TextReportRenderer))
    }

    pub fn with_renderer(
        output_dir: impl Into<PathBuf>,
        college_name: impl Into<String>,
        renderer: Box<dyn ReportRenderer>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            college_name: college_name.into(),
            renderer,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Single-event report: `<sanitized title>-report.<ext>`
    pub fn export_event(&self, event: &Event) -> Result<PathBuf> {
        let page = ReportPage::for_event(event, "Event Report");
        let rendered = self
            .renderer
            .render_page(&self.college_name, &page)
            .map_err(|e| Error::ExportFailed(format!("event {}: {}", event.id, e)))?;

        let file_name = format!(
            "{}-report.{}",
            sanitize_file_stem(&event.title),
            self.renderer.extension()
        );
        let path = self.write(&file_name, self.renderer.join_pages(&[rendered]))?;
        info!("Exported report for event {} to {}", event.id, path.display());
        Ok(path)
    }

    /// Combined report, one page per event
    ///
    /// Records whose page fails to render are skipped and listed in the
    /// summary. Fails only when there is nothing to export or the file cannot
    /// be written.
    pub fn export_all(&self, events: &[Event]) -> Result<ExportSummary> {
        if events.is_empty() {
            return Err(Error::ExportFailed("No events to generate report from".to_string()));
        }

        let mut pages = Vec::with_capacity(events.len());
        let mut failures = Vec::new();
        for event in events {
            let page = ReportPage::for_event(event, format!("Event Report - {}", event.title));
            match self.renderer.render_page(&self.college_name, &page) {
                Ok(rendered) => pages.push(rendered),
                Err(e) => {
                    warn!("Skipping event {} in combined report: {}", event.id, e);
                    failures.push(ExportFailure {
                        event_id: event.id,
                        title: event.title.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if pages.is_empty() {
            return Err(Error::ExportFailed(format!(
                "none of the {} event(s) could be rendered",
                events.len()
            )));
        }

        let file_name = format!("{}.{}", ALL_EVENTS_STEM, self.renderer.extension());
        let path = self.write(&file_name, self.renderer.join_pages(&pages))?;
        info!(
            "Exported combined report of {} event(s) to {} ({} skipped)",
            pages.len(),
            path.display(),
            failures.len()
        );

        Ok(ExportSummary {
            path,
            exported: pages.len(),
            failures,
        })
    }

    fn write(&self, file_name: &str, bytes: Vec<u8>) -> Result<PathBuf> {
        let export_err = |e: std::io::Error| Error::ExportFailed(format!("{}: {}", file_name, e));
        std::fs::create_dir_all(&self.output_dir).map_err(export_err)?;
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, bytes).map_err(export_err)?;
        Ok(path)
    }
}
