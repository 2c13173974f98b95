use thiserror::Error;

/// Everything that can go wrong while talking to Clockify
#[derive(Debug, Error)]
pub enum ClockifyError {
    /// The server answered with a non-2xx status
    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    /// The request could not be completed
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The body is not the JSON we expect
    #[error("unexpected response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A report entry has an unreadable start time
    #[error("invalid start time '{value}' in report entry")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A full page came back identical to the one before it
    #[error("report page {page} repeats the page before it")]
    RepeatedPage { page: usize },

    #[error("no workspace named '{name}'")]
    WorkspaceNotFound { name: String },

    #[error("no project named '{name}' in workspace {workspace}")]
    ProjectNotFound { name: String, workspace: String },
}

impl ClockifyError {
    pub(crate) fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => Self::Status { url: url.to_string(), status },
            ureq::Error::Json(source) => Self::Decode { url: url.to_string(), source },
            other => Self::Http { url: url.to_string(), source: Box::new(other) },
        }
    }
}
