//! Readable errors for failed HTTP responses.

use reqwest::StatusCode;

/// A download request that the server answered with a failure status.
#[derive(Debug, PartialEq)]
pub enum HttpError {
    /// HTTP 404: usually a URL template or version that has no release artifact
    NotFound(String),
    /// HTTP 401 or 403
    Forbidden(String),
    /// Other 4xx
    ClientError(String, u16),
    /// 5xx
    ServerError(String, u16),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::NotFound(url) => {
                write!(
                    f,
                    "Not found: {}. Check the url template and version in package.json.",
                    url
                )
            }
            HttpError::Forbidden(url) => {
                write!(f, "Access forbidden: {}", url)
            }
            HttpError::ClientError(url, status) => {
                write!(f, "Request error: HTTP {} for {}", status, url)
            }
            HttpError::ServerError(url, status) => {
                write!(f, "Server error: HTTP {} for {}", status, url)
            }
        }
    }
}

impl std::error::Error for HttpError {}

/// Map a response status to an [`HttpError`]. Successful statuses yield `None`.
pub fn classify_status(url: &str, status: StatusCode) -> Option<HttpError> {
    let url = url.to_string();
    match status {
        s if s.is_success() => None,
        StatusCode::NOT_FOUND => Some(HttpError::NotFound(url)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(HttpError::Forbidden(url)),
        s if s.is_server_error() => Some(HttpError::ServerError(url, s.as_u16())),
        s => Some(HttpError::ClientError(url, s.as_u16())),
    }
}
