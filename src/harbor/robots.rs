//! Harbor Robot Accounts
//!
//! Lifecycle operations for project-scoped robot accounts. Robots are
//! immutable after creation: the API token is issued exactly once in the
//! create response, and every other field is fixed, so there is no update
//! operation — replace a robot by deleting and recreating it.

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::client::{id_from_location, HarborClient};
use super::error::{Error, Result};

/// Expiry value meaning "never expires".
pub const NEVER_EXPIRES: i64 = -1;

/// Desired state of a robot account.
#[derive(Debug, Clone, Default)]
pub struct RobotSpec {
    /// ID of the project the robot belongs to.
    pub project_id: String,
    pub name: String,
    pub description: String,
    /// Grants `push` on the project's repositories.
    pub allow_push: bool,
    /// Grants `read` on the project's helm charts.
    pub allow_helm_pull: bool,
    /// Grants `create` on the project's helm chart versions.
    pub allow_helm_push: bool,
    /// Overrides `expires_at` with [`NEVER_EXPIRES`].
    pub never_expires: bool,
    /// Expiry as a Unix timestamp in seconds.
    pub expires_at: i64,
}

/// One (action, resource-path) permission of a robot account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub action: String,
    pub resource: String,
}

/// Creation payload.
#[derive(Debug, Serialize)]
struct RobotCreateBody {
    name: String,
    description: String,
    access: Vec<AccessGrant>,
    expires_at: i64,
}

/// A robot account as reported by Harbor. The token is only ever present
/// in the create response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, rename = "id", skip_serializing_if = "Option::is_none")]
    pub robot_id: Option<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub expires_at: i64,
}

/// Result of creating a robot account.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRobot {
    /// Server-assigned ID, from the `Location` header.
    pub id: String,
    /// The one-time API token. Harbor never returns it again.
    pub token: String,
    /// Expiry as reported by Harbor after creation.
    pub expires_at: i64,
}

/// Derive the access grant list from the permission flags, each
/// resource path scoped under `/project/{project_id}`.
pub fn access_grants(spec: &RobotSpec) -> Vec<AccessGrant> {
    let base = format!("/project/{}", spec.project_id);
    let mut grants = Vec::new();

    if spec.allow_push {
        grants.push(AccessGrant {
            action: "push".to_string(),
            resource: format!("{base}/repository"),
        });
    }

    if spec.allow_helm_pull {
        grants.push(AccessGrant {
            action: "read".to_string(),
            resource: format!("{base}/helm-chart"),
        });
    }

    if spec.allow_helm_push {
        grants.push(AccessGrant {
            action: "create".to_string(),
            resource: format!("{base}/helm-chart-version"),
        });
    }

    grants
}

/// The expiry that is actually sent: `never_expires` wins over any
/// configured timestamp.
pub fn effective_expiry(spec: &RobotSpec) -> i64 {
    if spec.never_expires {
        NEVER_EXPIRES
    } else {
        spec.expires_at
    }
}

/// Create a robot account. Harbor must answer 201; on any other status no
/// ID is produced. Returns the server-assigned ID, the one-time token, and
/// the expiry Harbor reports.
pub async fn create_robot(client: &HarborClient, spec: &RobotSpec) -> Result<CreatedRobot> {
    let body = RobotCreateBody {
        name: spec.name.clone(),
        description: spec.description.clone(),
        access: access_grants(spec),
        expires_at: effective_expiry(spec),
    };
    let payload = serde_json::to_value(&body).map_err(Error::EncodePayload)?;

    let resp = client
        .request_full(
            Method::POST,
            &client.robots_path(&spec.project_id),
            Some(&payload),
            Some(StatusCode::CREATED),
        )
        .await?;

    let account: RobotAccount =
        serde_json::from_str(&resp.body).map_err(|source| Error::Decode {
            what: "robot account",
            source,
        })?;

    let id = resp
        .location()
        .and_then(id_from_location)
        .ok_or(Error::MissingLocation {
            what: "robot account",
        })?
        .to_string();

    tracing::info!("created robot account {} ({})", spec.name, id);

    // The token is not refreshable; only the expiry comes from the re-read.
    let current = get_robot(client, &spec.project_id, &id).await?;

    Ok(CreatedRobot {
        id,
        token: account.token.unwrap_or_default(),
        expires_at: current.expires_at,
    })
}

/// Fetch a robot account by project and robot ID.
pub async fn get_robot(
    client: &HarborClient,
    project_id: &str,
    robot_id: &str,
) -> Result<RobotAccount> {
    let body = client
        .request(
            Method::GET,
            &client.robot_path(project_id, robot_id),
            None,
            Some(StatusCode::OK),
        )
        .await?;

    serde_json::from_str(&body).map_err(|source| Error::Decode {
        what: "robot account",
        source,
    })
}

/// Delete a robot account by project and robot ID.
pub async fn delete_robot(client: &HarborClient, project_id: &str, robot_id: &str) -> Result<()> {
    client
        .request(
            Method::DELETE,
            &client.robot_path(project_id, robot_id),
            None,
            None,
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> RobotSpec {
        RobotSpec {
            project_id: "7".to_string(),
            name: "drone".to_string(),
            ..RobotSpec::default()
        }
    }

    #[test]
    fn push_only_yields_exactly_one_grant() {
        let grants = access_grants(&RobotSpec {
            allow_push: true,
            ..spec()
        });
        assert_eq!(
            grants,
            vec![AccessGrant {
                action: "push".to_string(),
                resource: "/project/7/repository".to_string(),
            }]
        );
    }

    #[test]
    fn helm_flags_map_to_chart_paths() {
        let grants = access_grants(&RobotSpec {
            allow_helm_pull: true,
            allow_helm_push: true,
            ..spec()
        });
        assert_eq!(grants.len(), 2);
        assert_eq!(grants[0].action, "read");
        assert_eq!(grants[0].resource, "/project/7/helm-chart");
        assert_eq!(grants[1].action, "create");
        assert_eq!(grants[1].resource, "/project/7/helm-chart-version");
    }

    #[test]
    fn no_flags_yields_no_grants() {
        assert!(access_grants(&spec()).is_empty());
    }

    #[test]
    fn never_expires_overrides_configured_expiry() {
        let expiry = effective_expiry(&RobotSpec {
            never_expires: true,
            expires_at: 1893456000,
            ..spec()
        });
        assert_eq!(expiry, NEVER_EXPIRES);
    }

    #[test]
    fn expiry_passes_through_without_never_expires() {
        let expiry = effective_expiry(&RobotSpec {
            expires_at: 1893456000,
            ..spec()
        });
        assert_eq!(expiry, 1893456000);
    }

    #[test]
    fn create_body_matches_wire_shape() {
        let spec = RobotSpec {
            allow_push: true,
            never_expires: true,
            description: "ci pusher".to_string(),
            ..spec()
        };
        let body = RobotCreateBody {
            name: spec.name.clone(),
            description: spec.description.clone(),
            access: access_grants(&spec),
            expires_at: effective_expiry(&spec),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "drone",
                "description": "ci pusher",
                "access": [{"action": "push", "resource": "/project/7/repository"}],
                "expires_at": -1
            })
        );
    }

    #[test]
    fn robot_account_parses_create_response() {
        let account: RobotAccount = serde_json::from_str(
            r#"{"id":101,"name":"robot$drone","token":"tok-abc","expires_at":-1}"#,
        )
        .unwrap();
        assert_eq!(account.robot_id, Some(101));
        assert_eq!(account.token.as_deref(), Some("tok-abc"));
        assert_eq!(account.expires_at, -1);
    }

    #[test]
    fn robot_account_read_has_no_token() {
        let account: RobotAccount =
            serde_json::from_str(r#"{"id":101,"name":"robot$drone","expires_at":1700000000}"#)
                .unwrap();
        assert!(account.token.is_none());
        assert_eq!(account.expires_at, 1700000000);
    }
}
