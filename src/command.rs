//! Command execution boundary.
//!
//! The query layer compiles payloads and hands them to a [`CommandExecutor`];
//! transport, retries and auth live behind this trait. A reqwest-backed
//! executor is provided for the common JSON-over-HTTP case.

use crate::error::{Error, Result};
use crate::protocol::ApiResponse;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Executes one compiled command payload against a collection endpoint and
/// returns the deserialized response envelope. Server-reported failures
/// surface as [`Error::Server`]; transport failures as [`Error::Connection`].
/// No retries at this layer.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, collection: &str, payload: Value) -> Result<ApiResponse>;

    /// Dedicated synchronous mode for blocking callers.
    fn execute_blocking(&self, collection: &str, payload: Value) -> Result<ApiResponse>;
}

fn check_errors(response: ApiResponse) -> Result<ApiResponse> {
    if let Some(err) = response.errors.first() {
        let message = match &err.error_code {
            Some(code) => format!("{} ({})", err.message, code),
            None => err.message.clone(),
        };
        return Err(Error::Server(message));
    }
    Ok(response)
}

/// HTTP executor for the Data API: POSTs the payload to
/// `{base_url}/{keyspace}/{collection}` with a token header.
pub struct HttpCommandExecutor {
    base_url: String,
    keyspace: String,
    token: String,
    client: reqwest::Client,
    blocking: reqwest::blocking::Client,
}

const TOKEN_HEADER: &str = "Token";

impl HttpCommandExecutor {
    pub fn new(
        base_url: impl Into<String>,
        keyspace: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            keyspace: keyspace.into(),
            token: token.into(),
            client: reqwest::Client::new(),
            blocking: reqwest::blocking::Client::new(),
        }
    }

    fn endpoint(&self, collection: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.keyspace, collection)
    }
}

#[async_trait]
impl CommandExecutor for HttpCommandExecutor {
    async fn execute(&self, collection: &str, payload: Value) -> Result<ApiResponse> {
        let url = self.endpoint(collection);
        debug!(%url, "dispatching command");
        let response = self
            .client
            .post(&url)
            .header(TOKEN_HEADER, &self.token)
            .json(&payload)
            .send()
            .await?
            .json::<ApiResponse>()
            .await?;
        check_errors(response)
    }

    fn execute_blocking(&self, collection: &str, payload: Value) -> Result<ApiResponse> {
        let url = self.endpoint(collection);
        debug!(%url, "dispatching command (blocking)");
        let response = self
            .blocking
            .post(&url)
            .header(TOKEN_HEADER, &self.token)
            .json(&payload)
            .send()?
            .json::<ApiResponse>()?;
        check_errors(response)
    }
}
