//! Harbor Projects
//!
//! Lifecycle operations for Harbor projects. A project's identity is the
//! numeric ID Harbor assigns on creation, learned from the `Location`
//! header of the create response.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{id_from_location, HarborClient};
use super::error::{Error, Result};

/// Desired state of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub name: String,
    pub public: bool,
    pub auto_scan: bool,
}

/// A project as reported by Harbor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub name: String,
    pub public: bool,
    pub auto_scan: bool,
}

/// Harbor carries project metadata flags as stringified booleans.
#[derive(Debug, Serialize, Deserialize, Default)]
struct ProjectMetadata {
    #[serde(default)]
    auto_scan: String,
    #[serde(default)]
    public: String,
}

impl ProjectMetadata {
    fn from_flags(auto_scan: bool, public: bool) -> Self {
        Self {
            auto_scan: auto_scan.to_string(),
            public: public.to_string(),
        }
    }
}

/// Creation payload. Harbor names the field `project_name` here but `name`
/// everywhere else.
#[derive(Debug, Serialize)]
struct ProjectCreateBody {
    project_name: String,
    metadata: ProjectMetadata,
}

/// Read/update payload shape. `name` is required so that error bodies and
/// other non-project JSON fail decoding instead of collapsing to defaults.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectBody {
    name: String,
    #[serde(default)]
    metadata: ProjectMetadata,
}

impl From<ProjectBody> for Project {
    fn from(body: ProjectBody) -> Self {
        Self {
            name: body.name,
            public: body.metadata.public == "true",
            auto_scan: body.metadata.auto_scan == "true",
        }
    }
}

impl From<&ProjectConfig> for ProjectBody {
    fn from(config: &ProjectConfig) -> Self {
        Self {
            name: config.name.clone(),
            metadata: ProjectMetadata::from_flags(config.auto_scan, config.public),
        }
    }
}

/// Create a project and return its server-assigned ID together with the
/// state Harbor reports for it.
pub async fn create_project(
    client: &HarborClient,
    config: &ProjectConfig,
) -> Result<(String, Project)> {
    let body = ProjectCreateBody {
        project_name: config.name.clone(),
        metadata: ProjectMetadata::from_flags(config.auto_scan, config.public),
    };
    let payload = serde_json::to_value(&body).map_err(Error::EncodePayload)?;

    let resp = client
        .request_full(Method::POST, &client.projects_path(), Some(&payload), None)
        .await?;

    let id = resp
        .location()
        .and_then(id_from_location)
        .ok_or(Error::MissingLocation { what: "project" })?
        .to_string();

    tracing::info!("created project {} ({})", config.name, id);

    let project = get_project(client, &id).await?;
    Ok((id, project))
}

/// Fetch a project by ID.
pub async fn get_project(client: &HarborClient, project_id: &str) -> Result<Project> {
    let body = client
        .request(Method::GET, &client.project_path(project_id), None, None)
        .await?;

    let parsed: ProjectBody = serde_json::from_str(&body).map_err(|source| Error::Decode {
        what: "project",
        source,
    })?;

    Ok(parsed.into())
}

/// Replace a project's configuration and return the state Harbor reports
/// after the update.
pub async fn update_project(
    client: &HarborClient,
    project_id: &str,
    config: &ProjectConfig,
) -> Result<Project> {
    let body = ProjectBody::from(config);
    let payload = serde_json::to_value(&body).map_err(Error::EncodePayload)?;

    client
        .request(
            Method::PUT,
            &client.project_path(project_id),
            Some(&payload),
            None,
        )
        .await?;

    get_project(client, project_id).await
}

/// Delete a project by ID.
pub async fn delete_project(client: &HarborClient, project_id: &str) -> Result<()> {
    client
        .request(Method::DELETE, &client.project_path(project_id), None, None)
        .await?;
    Ok(())
}
