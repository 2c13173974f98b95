//! JSON bodies exchanged with the Clockify APIs

use serde::{Deserialize, Serialize};

/// Workspaces and projects are both listed as `{id, name}` (among other fields)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedRecord {
    pub id: String,
    pub name: String,
}

/// Body of `POST /workspaces/{id}/reports/detailed`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedReportRequest {
    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub date_range_start: String,
    pub date_range_end: String,
    pub projects: ProjectFilter,
    pub detailed_filter: DetailedFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectFilter {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedFilter {
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetailedReport {
    pub timeentries: Vec<RawTimeEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTimeEntry {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub time_interval: TimeInterval,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeInterval {
    /// ISO-8601 with offset
    pub start: String,
    /// seconds, `null` while a timer is running
    pub duration: Option<f64>,
}
