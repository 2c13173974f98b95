//! Turn display names into the identifiers the API expects

use tracing::{info, warn};

use super::{wire::NamedRecord, Client, ClockifyError, Transport};

/// Outcome of a search by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    /// Convert to a `Result`, building the error only when nothing was found
    pub fn ok_or_else<E, F>(self, err: F) -> Result<T, E>
    where
        F: FnOnce() -> E,
    {
        match self {
            Lookup::Found(t) => Ok(t),
            Lookup::NotFound => Err(err()),
        }
    }
}

/// Identifier of the record named exactly `name`
///
/// Should several records share the name, the first one wins.
pub fn find_by_name(records: &[NamedRecord], name: &str) -> Lookup<String> {
    let mut matches = records.iter().filter(|r| r.name == name);
    match matches.next() {
        None => Lookup::NotFound,
        Some(first) => {
            let others = matches.count();
            if others > 0 {
                warn!("{} other records are also named '{}', using {}", others, name, first.id);
            }
            Lookup::Found(first.id.clone())
        }
    }
}

pub fn workspace_id<T: Transport>(client: &Client<T>, name: &str) -> Result<String, ClockifyError> {
    let id = find_by_name(&client.workspaces()?, name)
        .ok_or_else(|| ClockifyError::WorkspaceNotFound { name: name.to_string() })?;
    info!("workspace '{}' is {}", name, id);
    Ok(id)
}

pub fn project_id<T: Transport>(
    client: &Client<T>,
    workspace: &str,
    name: &str,
) -> Result<String, ClockifyError> {
    let id = find_by_name(&client.projects(workspace)?, name).ok_or_else(|| {
        ClockifyError::ProjectNotFound {
            name: name.to_string(),
            workspace: workspace.to_string(),
        }
    })?;
    info!("project '{}' is {}", name, id);
    Ok(id)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clockify::fake::FakeTransport;
    use crate::config::Endpoints;
    use serde_json::json;

    fn record(id: &str, name: &str) -> NamedRecord {
        NamedRecord { id: id.into(), name: name.into() }
    }

    fn client() -> Client<FakeTransport> {
        let transport = FakeTransport::default()
            .with_get(
                "https://api.test/v1/workspaces",
                json!([{ "id": "w1", "name": "Personal" }, { "id": "w2", "name": "Hexiosec" }]),
            )
            .with_get(
                "https://api.test/v1/workspaces/w2/projects?page=1&page-size=200",
                json!([
                    { "id": "p1", "name": "Internal" },
                    { "id": "p2", "name": "DevOps Support 23/24 - RMSOW23058" }
                ]),
            );
        let endpoints = Endpoints {
            api: "https://api.test/v1".into(),
            reports: "https://reports.test/v1".into(),
        };
        Client::new(transport, endpoints)
    }

    #[test]
    fn exact_match_only() {
        let records = [record("a", "DLP"), record("b", "DLP 2")];
        assert_eq!(find_by_name(&records, "DLP"), Lookup::Found("a".to_string()));
        assert_eq!(find_by_name(&records, "dlp"), Lookup::NotFound);
        assert_eq!(find_by_name(&[], "DLP"), Lookup::NotFound);
    }

    #[test]
    fn first_duplicate_wins() {
        let records = [record("a", "Other"), record("b", "DLP"), record("c", "DLP")];
        assert_eq!(find_by_name(&records, "DLP"), Lookup::Found("b".to_string()));
    }

    #[test]
    fn resolves_workspace_then_project() {
        let client = client();
        let workspace = workspace_id(&client, "Hexiosec").unwrap();
        assert_eq!(workspace, "w2");
        let project = project_id(&client, &workspace, "DevOps Support 23/24 - RMSOW23058").unwrap();
        assert_eq!(project, "p2");
    }

    #[test]
    fn unknown_workspace_is_an_error() {
        let err = workspace_id(&client(), "Acme").unwrap_err();
        assert!(matches!(err, ClockifyError::WorkspaceNotFound { ref name } if name == "Acme"));
        assert_eq!(err.to_string(), "no workspace named 'Acme'");
    }

    #[test]
    fn unknown_project_is_an_error() {
        let err = project_id(&client(), "w2", "Nope").unwrap_err();
        assert_eq!(err.to_string(), "no project named 'Nope' in workspace w2");
    }
}
