//! Blocking client for the parts of the Clockify API the report needs
//!
//! Requests go through a `Transport`, which only knows how to move JSON
//! around. `Client` builds the URLs and decodes the bodies.

pub mod error;
pub mod report;
pub mod resolve;
pub mod wire;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::{Credentials, Endpoints};

pub use error::ClockifyError;
use wire::{DetailedReport, DetailedReportRequest, NamedRecord};

const TIMEOUT: Duration = Duration::from_secs(30);
const PROJECTS_PAGE_SIZE: usize = 200;

/// Exchange JSON documents with a server
pub trait Transport {
    fn get(&self, url: &str) -> Result<Value, ClockifyError>;
    fn post(&self, url: &str, body: &Value) -> Result<Value, ClockifyError>;
}

/// `Transport` over HTTPS, authenticated by API key
pub struct HttpTransport {
    agent: ureq::Agent,
    credentials: Credentials,
}

impl HttpTransport {
    pub fn new(credentials: Credentials) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            credentials,
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Value, ClockifyError> {
        debug!("GET {}", url);
        let mut response = self
            .agent
            .get(url)
            .header("x-api-key", self.credentials.api_key())
            .call()
            .map_err(|e| ClockifyError::from_ureq(url, e))?;
        response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| ClockifyError::from_ureq(url, e))
    }

    fn post(&self, url: &str, body: &Value) -> Result<Value, ClockifyError> {
        debug!("POST {}", url);
        let mut response = self
            .agent
            .post(url)
            .header("x-api-key", self.credentials.api_key())
            .send_json(body)
            .map_err(|e| ClockifyError::from_ureq(url, e))?;
        response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| ClockifyError::from_ureq(url, e))
    }
}

pub struct Client<T> {
    transport: T,
    endpoints: Endpoints,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self { transport, endpoints }
    }

    /// `GET /workspaces`
    pub fn workspaces(&self) -> Result<Vec<NamedRecord>, ClockifyError> {
        let url = format!("{}/workspaces", self.endpoints.api);
        decode(&url, self.transport.get(&url)?)
    }

    /// `GET /workspaces/{id}/projects`, all pages
    pub fn projects(&self, workspace: &str) -> Result<Vec<NamedRecord>, ClockifyError> {
        let mut projects = Vec::new();
        for page in 1.. {
            let url = format!(
                "{}/workspaces/{}/projects?page={}&page-size={}",
                self.endpoints.api, workspace, page, PROJECTS_PAGE_SIZE
            );
            let batch: Vec<NamedRecord> = decode(&url, self.transport.get(&url)?)?;
            let count = batch.len();
            projects.extend(batch);
            if count < PROJECTS_PAGE_SIZE {
                break;
            }
        }
        Ok(projects)
    }

    /// `POST /workspaces/{id}/reports/detailed`, a single page
    pub fn detailed_report(
        &self,
        workspace: &str,
        request: &DetailedReportRequest,
    ) -> Result<DetailedReport, ClockifyError> {
        let url = format!("{}/workspaces/{}/reports/detailed", self.endpoints.reports, workspace);
        let body = serde_json::to_value(request)
            .map_err(|source| ClockifyError::Decode { url: url.clone(), source })?;
        decode(&url, self.transport.post(&url, &body)?)
    }
}

fn decode<D: DeserializeOwned>(url: &str, value: Value) -> Result<D, ClockifyError> {
    serde_json::from_value(value).map_err(|source| ClockifyError::Decode {
        url: url.to_string(),
        source,
    })
}


#[cfg(test)]
mod test {
    use super::fake::FakeTransport;
    use super::*;
    use serde_json::json;

    fn endpoints() -> Endpoints {
        Endpoints {
            api: "https://api.test/v1".into(),
            reports: "https://reports.test/v1".into(),
        }
    }

    #[test]
    fn lists_workspaces() {
        let transport = FakeTransport::default().with_get(
            "https://api.test/v1/workspaces",
            json!([{ "id": "w1", "name": "Hexiosec" }, { "id": "w2", "name": "Personal" }]),
        );
        let client = Client::new(transport, endpoints());
        let names = client
            .workspaces()
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Hexiosec", "Personal"]);
    }

    #[test]
    fn projects_span_pages() {
        let full_page = (0..PROJECTS_PAGE_SIZE)
            .map(|i| json!({ "id": format!("p{}", i), "name": format!("Project {}", i) }))
            .collect::<Vec<_>>();
        let transport = FakeTransport::default()
            .with_get(
                "https://api.test/v1/workspaces/w1/projects?page=1&page-size=200",
                Value::Array(full_page),
            )
            .with_get(
                "https://api.test/v1/workspaces/w1/projects?page=2&page-size=200",
                json!([{ "id": "last", "name": "DLP" }]),
            );
        let client = Client::new(transport, endpoints());
        let projects = client.projects("w1").unwrap();
        assert_eq!(projects.len(), PROJECTS_PAGE_SIZE + 1);
        assert_eq!(projects.last().unwrap().id, "last");
    }

    #[test]
    fn malformed_body() {
        let transport = FakeTransport::default()
            .with_get("https://api.test/v1/workspaces", json!({ "message": "Unauthorized" }));
        let client = Client::new(transport, endpoints());
        let err = client.workspaces().unwrap_err();
        assert!(matches!(err, ClockifyError::Decode { .. }), "{:?}", err);
    }

    #[test]
    fn server_error() {
        let client = Client::new(FakeTransport::default(), endpoints());
        let err = client.workspaces().unwrap_err();
        assert_eq!(err.to_string(), "https://api.test/v1/workspaces answered with HTTP status 404");
    }
}
