//! Fetch every time entry of a project within a date window

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{
    wire::{DetailedFilter, DetailedReportRequest, ProjectFilter, RawTimeEntry},
    Client, ClockifyError, Transport,
};
use crate::lib::usage::TimeEntry;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// What to ask the detailed report for
#[derive(Debug, Clone)]
pub struct ReportQuery<'a> {
    pub workspace: &'a str,
    pub project: &'a str,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub page_size: usize,
}

impl ReportQuery<'_> {
    pub fn request(&self, page: usize) -> DetailedReportRequest {
        DetailedReportRequest {
            date_range_start: self.start.format(TIMESTAMP_FORMAT).to_string(),
            date_range_end: self.end.format(TIMESTAMP_FORMAT).to_string(),
            projects: ProjectFilter { ids: vec![self.project.to_string()] },
            detailed_filter: DetailedFilter { page, page_size: self.page_size },
        }
    }
}

/// All entries matching `query`, in report order
///
/// Pages are requested until one comes back shorter than the page size.
/// A full page identical to the previous one aborts the fetch.
pub fn fetch_entries<T: Transport>(
    client: &Client<T>,
    query: &ReportQuery,
) -> Result<Vec<TimeEntry>, ClockifyError> {
    let mut entries = Vec::new();
    let mut previous: Vec<RawTimeEntry> = Vec::new();
    for page in 1.. {
        let report = client.detailed_report(query.workspace, &query.request(page))?;
        let count = report.timeentries.len();
        debug!(page, count, "received report page");
        if count > 0 && report.timeentries == previous {
            return Err(ClockifyError::RepeatedPage { page });
        }
        for raw in &report.timeentries {
            entries.push(convert(raw)?);
        }
        if count < query.page_size {
            break;
        }
        previous = report.timeentries;
    }
    info!("fetched {} time entries", entries.len());
    Ok(entries)
}

fn convert(raw: &RawTimeEntry) -> Result<TimeEntry, ClockifyError> {
    let interval = &raw.time_interval;
    let start = DateTime::parse_from_rfc3339(&interval.start).map_err(|source| {
        ClockifyError::Timestamp { value: interval.start.clone(), source }
    })?;
    let duration = match interval.duration {
        Some(d) => {
            if d < 0.0 {
                warn!("entry starting at {} has a negative duration of {}s", start, d);
            }
            d
        }
        None => {
            warn!("entry starting at {} has no duration, counting it as 0", start);
            0.0
        }
    };
    Ok(TimeEntry { start, duration })
}
