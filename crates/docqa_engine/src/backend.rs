use std::error::Error as _;
use std::time::Duration;

use docqa_core::{BackendFailure, BackendRequest, RequestBody, UploadedFile};
use docqa_logging::{qa_debug, qa_warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use url::Url;

use crate::{SettingsError, DEFAULT_BASE_URL};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    /// `None` waits indefinitely, matching a browser fetch.
    pub connect_timeout: Option<Duration>,
    /// `None` waits indefinitely; a hung call keeps the workflow busy.
    pub request_timeout: Option<Duration>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: None,
            request_timeout: None,
        }
    }
}

impl BackendSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Checks that the base url is an absolute http(s) url.
    pub fn validate(&self) -> Result<Url, SettingsError> {
        let invalid = |reason: String| SettingsError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };
        let parsed = Url::parse(self.base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }

    /// Appends `path` to the base url, keeping any path prefix the base has.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, SettingsError> {
        self.validate()?;
        let base = self.base_url.trim().trim_end_matches('/');
        Url::parse(&format!("{base}{path}")).map_err(|err| SettingsError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: err.to_string(),
        })
    }
}

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Issues one POST described by `request`. A 2xx reply yields its JSON
    /// body, or `Value::Null` when the body is not JSON.
    async fn send(&self, request: &BackendRequest) -> Result<Value, BackendFailure>;

    /// Calls the backend's root endpoint and returns its reported status.
    async fn health(&self) -> Result<String, BackendFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, SettingsError> {
        settings.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| SettingsError::Client(err.to_string()))?;

        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn url_for(&self, path: &str) -> Result<Url, BackendFailure> {
        self.settings
            .endpoint_url(path)
            .map_err(|err| BackendFailure::Transport(err.to_string()))
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn send(&self, request: &BackendRequest) -> Result<Value, BackendFailure> {
        let url = self.url_for(request.endpoint.path())?;
        qa_debug!("POST {}", url);

        let mut builder = self.client.post(url);
        if let Some(content_type) = request.content_type() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder = match &request.body {
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Multipart { field, file } => builder.multipart(build_form(*field, file)?),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        read_reply(response).await
    }

    async fn health(&self) -> Result<String, BackendFailure> {
        let url = self.url_for("/")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = read_reply(response).await?;
        Ok(body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("ok")
            .to_string())
    }
}

fn build_form(field: &'static str, file: &UploadedFile) -> Result<Form, BackendFailure> {
    let mime = mime_guess::from_path(&file.filename).first_or_octet_stream();
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.filename.clone())
        .mime_str(mime.essence_str())
        .map_err(map_reqwest_error)?;
    Ok(Form::new().part(field, part))
}

async fn read_reply(response: reqwest::Response) -> Result<Value, BackendFailure> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    let parsed = serde_json::from_slice::<Value>(&body).ok();

    if status.is_success() {
        if parsed.is_none() && !body.is_empty() {
            qa_debug!("{} reply body is not JSON ({} bytes)", status, body.len());
        }
        return Ok(parsed.unwrap_or(Value::Null));
    }

    let detail = parsed.as_ref().and_then(extract_detail);
    qa_warn!("backend replied {} detail={:?}", status, detail);
    Err(BackendFailure::Rejected {
        status: status.as_u16(),
        detail,
    })
}

/// Reads `detail` from an error body. Non-string details, such as
/// validation error lists, are kept as compact JSON.
fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendFailure {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    if err.is_timeout() {
        return BackendFailure::Transport(format!("request timed out ({description})"));
    }
    BackendFailure::Transport(description)
}
