/// Client-side errors for the A2A SDK.
///
/// Transport failures (`Network`, `Http`) are kept apart from protocol
/// failures (`Decode`) so callers can tell an unreachable agent from one
/// that answered with something unreadable. JSON-RPC error envelopes are not
/// errors at this level; they come back as `JsonRpcResult::Error`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error calling {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    #[error("invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn network(url: &str, source: reqwest::Error) -> Self {
        ClientError::Network {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn decode(url: &str, message: impl std::fmt::Display) -> Self {
        ClientError::Decode {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// URL of the request that failed, when there was one
    pub fn url(&self) -> Option<&str> {
        match self {
            ClientError::Network { url, .. }
            | ClientError::Http { url, .. }
            | ClientError::Decode { url, .. } => Some(url),
            ClientError::Config(_) => None,
        }
    }
}

/// Longest response body excerpt carried in an `Http` error
const MAX_ERROR_BODY: usize = 512;

/// Turns a non-2xx response into `ClientError::Http`, passing others through.
pub(crate) async fn check_status(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    if message.is_empty() {
        message = status.canonical_reason().unwrap_or("request failed").to_string();
    }

    Err(ClientError::Http {
        url: url.to_string(),
        status: status.as_u16(),
        message,
    })
}
