//! Transport contract and the reqwest-backed HTTP transport.
//!
//! The interceptor never reads bodies. Turning an error response into a
//! [`TransportError`] with the server's message is the transport's job.

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("API error ({status}): {message}")]
    Status { status: StatusCode, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server rejected the session's credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Message suitable for showing to the user.
    pub fn message(&self) -> &str {
        match self {
            TransportError::Status { message, .. } => message,
            TransportError::Network(message) | TransportError::InvalidRequest(message) => message,
        }
    }

    /// Build a status error from a response body.
    ///
    /// Prefers the JSON `message` field, then `error`, then the status reason.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                ["message", "error"]
                    .iter()
                    .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(str::to_string))
            })
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        TransportError::Status { status, message }
    }
}

#[cfg(feature = "http")]
pub use http_transport::HttpTransport;

#[cfg(feature = "http")]
mod http_transport {
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tower::Service;

    use super::TransportError;

    /// Tower service sending `http` requests through a `reqwest::Client`.
    ///
    /// Relative URIs are resolved against the configured base URL.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: reqwest::Client,
        base_url: String,
    }

    impl HttpTransport {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self::with_client(reqwest::Client::new(), base_url)
        }

        pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
            Self {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        fn resolve<B>(&self, req: http::Request<B>) -> Result<reqwest::Request, TransportError>
        where
            B: Into<reqwest::Body>,
        {
            let (mut parts, body) = req.into_parts();
            if parts.uri.scheme().is_none() {
                let path = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                parts.uri = format!("{}{}", self.base_url, path)
                    .parse()
                    .map_err(|e: http::uri::InvalidUri| TransportError::InvalidRequest(e.to_string()))?;
            }
            reqwest::Request::try_from(http::Request::from_parts(parts, body))
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))
        }
    }

    impl<B> Service<http::Request<B>> for HttpTransport
    where
        B: Into<reqwest::Body>,
    {
        type Response = http::Response<Vec<u8>>;
        type Error = TransportError;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let client = self.client.clone();
            let resolved = self.resolve(req);

            Box::pin(async move {
                let req = resolved?;
                let resp = client
                    .execute(req)
                    .await
                    .map_err(|e| TransportError::Network(e.to_string()))?;

                let status = resp.status();
                let headers = resp.headers().clone();
                let body = resp
                    .bytes()
                    .await
                    .map_err(|e| TransportError::Network(e.to_string()))?;

                if !status.is_success() {
                    return Err(TransportError::from_response(status, &body));
                }

                let mut out = http::Response::new(body.to_vec());
                *out.status_mut() = status;
                *out.headers_mut() = headers;
                Ok(out)
            })
        }
    }
}
