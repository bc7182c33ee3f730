// src/api_handler.rs
use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::data_types::Record;
use crate::error::AppError;
use crate::normalizer::normalize;

/// The anonymization service origin. Fixed: the service carries no auth,
/// no versioning and no configuration surface.
const SERVICE_ORIGIN: &str = "http://localhost:5000";

const TEXT_TRANSPORT_ERROR: &str = "Network response was not ok";
const FILE_TRANSPORT_ERROR: &str = "Error communicating with server";

#[derive(Debug, Serialize)]
struct AnonymizeRequest {
    data: Value,
}

/// Client for the two service endpoints. Cheap to clone; one network call
/// per submit, no retries, transport-default timeout.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new() -> Self {
        Self::with_base_url(SERVICE_ORIGIN)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        ApiClient {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Pre-flight parse of the text input. Failing here is the short-circuit
    /// that keeps malformed input off the network entirely.
    pub fn parse_input(content: &str) -> Result<Value, AppError> {
        serde_json::from_str(content).map_err(|err| {
            tracing::debug!(%err, "rejecting text input before dispatch");
            AppError::InvalidInputFormat
        })
    }

    /// POST already-parsed JSON to `/anonymize` and normalize the reply.
    pub async fn submit_text(&self, data: Value) -> Result<Vec<Record>, AppError> {
        let response = self
            .client
            .post(format!("{}/anonymize", self.base_url))
            .json(&AnonymizeRequest { data })
            .send()
            .await
            .map_err(|err| {
                tracing::error!(%err, "anonymize request failed");
                AppError::Transport(TEXT_TRANSPORT_ERROR.to_string())
            })?;

        self.read_body(response, TEXT_TRANSPORT_ERROR).await
    }

    /// POST file contents to `/upload` as multipart form data, field `file`,
    /// and normalize the reply. The service parses the spreadsheet itself;
    /// the bytes go over the wire untouched.
    pub async fn submit_file(&self, path: &Path) -> Result<Vec<Record>, AppError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            tracing::error!(%err, path = %path.display(), "failed to read upload");
            AppError::Transport(FILE_TRANSPORT_ERROR.to_string())
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(%err, "upload request failed");
                AppError::Transport(FILE_TRANSPORT_ERROR.to_string())
            })?;

        self.read_body(response, FILE_TRANSPORT_ERROR).await
    }

    async fn read_body(
        &self,
        response: reqwest::Response,
        transport_message: &str,
    ) -> Result<Vec<Record>, AppError> {
        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "service answered with non-success status");
            return Err(AppError::Transport(transport_message.to_string()));
        }

        let body = response.text().await.map_err(|err| {
            tracing::error!(%err, "failed to read response body");
            AppError::Transport(transport_message.to_string())
        })?;
        tracing::debug!(raw = %body, "raw service response");

        normalize(&body)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
