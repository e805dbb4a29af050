//! Error types for the Harbor API layer.

/// Result type alias for Harbor API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Harbor API.
///
/// Every variant is terminal for the operation that produced it: nothing is
/// retried, and there is no transient/permanent distinction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    BuildClient(#[source] reqwest::Error),

    /// The request payload could not be encoded as JSON. Nothing was sent.
    #[error("failed to encode request payload: {0}")]
    EncodePayload(#[source] serde_json::Error),

    /// Network-level failure (DNS, connection refused, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a status other than the expected one.
    /// The raw body is kept for diagnosis.
    #[error("unexpected status code got: {actual} expected: {expected}\n{body}")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        body: String,
    },

    /// The response body did not decode into the expected shape.
    #[error("failed to decode {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A create response carried no usable `Location` header, so the
    /// server-assigned ID of the new resource is unknown.
    #[error("no Location header in {what} create response, cannot determine its id")]
    MissingLocation { what: &'static str },
}
