use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const SESSION_HEADER: &str = "X-Session-ID";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Blocking JSON client for the practice backend. Callers run it off the UI
/// thread.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    session_id: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, session_id: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: session_id.filter(|id| !id.is_empty()),
            client,
        })
    }

    pub fn has_session(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }

    pub fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let response = self.send(self.client.get(self.url(endpoint)))?;
        Ok(response.json()?)
    }

    /// POSTs `body`. A `204 No Content` answer yields `Ok(None)`.
    pub fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.post(self.url(endpoint)).json(body))?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json()?))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match &self.session_id {
            Some(id) => request.header(SESSION_HEADER, id),
            None => request,
        };
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response
            .json::<serde_json::Value>()
            .ok()
            .and_then(|body| body.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or_else(|| format!("HTTP error! Status: {}", status.as_u16()));
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}
