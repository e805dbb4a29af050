//! Harbor Client
//!
//! Main client for interacting with the Harbor API, combining credentials,
//! the HTTP wrapper, and URL construction.

use reqwest::{Method, StatusCode};
use serde_json::Value;

use super::error::{Error, Result};
use super::http::{ClientResponse, HarborHttpClient};

/// Fixed path prefix of the Harbor v2 API.
const API_BASE: &str = "/api/v2.0";

/// Main Harbor client
///
/// Holds the base URL, basic-auth credentials, and the underlying HTTP
/// client. Immutable after construction; created once and shared by all
/// resource operations.
#[derive(Clone)]
pub struct HarborClient {
    base_url: String,
    username: String,
    password: String,
    http: HarborHttpClient,
}

impl HarborClient {
    /// Create a new Harbor client.
    pub fn new(base_url: &str, username: &str, password: &str, insecure: bool) -> Result<Self> {
        let http = HarborHttpClient::new(insecure)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            http,
        })
    }

    /// The configured base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and return the full response.
    ///
    /// The request URL is the base URL concatenated with `path`. When
    /// `expected` is set, any other status code is an error.
    pub async fn request_full(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
        expected: Option<StatusCode>,
    ) -> Result<ClientResponse> {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .send(method, &url, &self.username, &self.password, payload, expected)
            .await
    }

    /// Send a request and return only the response body text.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
        expected: Option<StatusCode>,
    ) -> Result<String> {
        let resp = self.request_full(method, path, payload, expected).await?;
        Ok(resp.body)
    }

    // =========================================================================
    // API path helpers
    // =========================================================================

    /// Path of the projects collection
    pub fn projects_path(&self) -> String {
        format!("{API_BASE}/projects")
    }

    /// Path of a single project
    pub fn project_path(&self, project_id: &str) -> String {
        format!("{API_BASE}/projects/{project_id}")
    }

    /// Path of a project's robot account collection
    pub fn robots_path(&self, project_id: &str) -> String {
        format!("{API_BASE}/projects/{project_id}/robots")
    }

    /// Path of a single robot account
    pub fn robot_path(&self, project_id: &str, robot_id: &str) -> String {
        format!("{API_BASE}/projects/{project_id}/robots/{robot_id}")
    }
}

/// Extract a server-assigned ID from a `Location` header value by taking
/// the final non-empty path segment.
/// e.g., "/api/v2.0/projects/42" -> "42"
pub fn id_from_location(location: &str) -> Option<&str> {
    location.rsplit('/').find(|segment| !segment.is_empty())
}

/// Format a Harbor API error for display
pub fn format_harbor_error(error: &Error) -> String {
    match error {
        Error::UnexpectedStatus { actual, body, .. } => match *actual {
            401 => "Authentication failed. Check your Harbor username and password.".to_string(),
            403 => "Permission denied. Check your Harbor account privileges.".to_string(),
            404 => "Resource not found.".to_string(),
            409 => "Resource conflict. It may already exist.".to_string(),
            500 | 503 => "Harbor is temporarily unavailable. Please try again.".to_string(),
            other => format!("Harbor returned HTTP {other}: {}", body.trim()),
        },
        Error::Transport { url, .. } => {
            format!("Could not reach Harbor at {url}. Check the URL and your network connection.")
        }
        Error::Decode { what, .. } => {
            format!("Harbor returned an unexpected {what} response. Is the URL pointing at a Harbor v2 API?")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_location_takes_last_segment() {
        assert_eq!(id_from_location("/api/v2.0/projects/42"), Some("42"));
        assert_eq!(
            id_from_location("https://registry.example.com/api/v2.0/projects/7/robots/101"),
            Some("101")
        );
    }

    #[test]
    fn id_from_location_skips_trailing_slash() {
        assert_eq!(id_from_location("/api/v2.0/projects/42/"), Some("42"));
    }

    #[test]
    fn id_from_location_empty_is_none() {
        assert_eq!(id_from_location(""), None);
        assert_eq!(id_from_location("///"), None);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = HarborClient::new("https://registry.example.com/", "admin", "pw", false)
            .expect("client should build");
        assert_eq!(client.base_url(), "https://registry.example.com");
    }

    #[test]
    fn path_helpers_use_v2_prefix() {
        let client =
            HarborClient::new("https://registry.example.com", "admin", "pw", false).unwrap();
        assert_eq!(client.projects_path(), "/api/v2.0/projects");
        assert_eq!(client.project_path("42"), "/api/v2.0/projects/42");
        assert_eq!(client.robots_path("7"), "/api/v2.0/projects/7/robots");
        assert_eq!(client.robot_path("7", "101"), "/api/v2.0/projects/7/robots/101");
    }

    #[test]
    fn format_error_maps_auth_failures() {
        let err = Error::UnexpectedStatus {
            expected: 200,
            actual: 401,
            body: "unauthorized".to_string(),
        };
        assert!(format_harbor_error(&err).contains("Authentication failed"));
    }

    #[test]
    fn format_error_keeps_unknown_status_body() {
        let err = Error::UnexpectedStatus {
            expected: 201,
            actual: 412,
            body: "precondition failed".to_string(),
        };
        let msg = format_harbor_error(&err);
        assert!(msg.contains("412"));
        assert!(msg.contains("precondition failed"));
    }
}
