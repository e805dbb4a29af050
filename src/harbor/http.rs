//! HTTP utilities for Harbor REST API calls

use reqwest::header::{self, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use super::error::{Error, Result};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// One fully read HTTP response: status, headers, and raw body text.
///
/// Created per request and consumed by the calling resource function.
#[derive(Debug)]
pub struct ClientResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ClientResponse {
    /// The `Location` header value, if present and valid UTF-8.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION)?.to_str().ok()
    }
}

/// HTTP client wrapper for Harbor API calls
///
/// Immutable after construction and cheap to clone.
#[derive(Clone)]
pub struct HarborHttpClient {
    client: Client,
}

impl HarborHttpClient {
    /// Create a new HTTP client.
    ///
    /// When `insecure` is set the transport skips TLS certificate
    /// verification; otherwise the default transport is used.
    pub fn new(insecure: bool) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("harborctl/", env!("CARGO_PKG_VERSION")));

        if insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(Error::BuildClient)?;

        Ok(Self { client })
    }

    /// Perform one synchronous JSON round trip.
    ///
    /// Attaches basic auth and `Content-Type: application/json`, sends the
    /// request, and reads the whole body into memory. If `expected` is set
    /// and the actual status differs, fails with both codes and the raw
    /// body. No retry on any failure.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        username: &str,
        password: &str,
        payload: Option<&Value>,
        expected: Option<StatusCode>,
    ) -> Result<ClientResponse> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .basic_auth(username, Some(password))
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(payload) = payload {
            let body = serde_json::to_vec(payload).map_err(Error::EncodePayload)?;
            request = request.body(body);
        }

        let response = request.send().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        if let Some(expected) = expected {
            if status != expected {
                tracing::error!(
                    "unexpected status from {}: {} - {}",
                    url,
                    status,
                    sanitize_for_log(&body)
                );
                return Err(Error::UnexpectedStatus {
                    expected: expected.as_u16(),
                    actual: status.as_u16(),
                    body,
                });
            }
        }

        Ok(ClientResponse {
            status,
            headers,
            body,
        })
    }
}
