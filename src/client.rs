use crate::client::QnapError::*;
use crate::endpoint::Endpoint;
use crate::entities::{AuthResponse, FileStationStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Part;
use reqwest::{Client, Response, Url, multipart};
use serde_json::Value;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

const LOGIN_PATH: &str = "/cgi-bin/authLogin.cgi";
const LOGOUT_PATH: &str = "/cgi-bin/authLogout.cgi";
const API_PATH: &str = "/cgi-bin/filemanager/utilRequest.cgi";

const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Custom error types for the [`Qnap`] client
#[derive(Error, Debug)]
pub enum QnapError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("QNAP API error: code={code}, message={message}")]
    Api { code: i64, message: String },

    #[error("Network request error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(String),

    #[error("Environment variable error: {0}")]
    Environment(#[from] env::VarError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input parameter: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl QnapError {
    /// File Station status behind an [`QnapError::Api`] error
    #[must_use]
    pub fn status(&self) -> Option<FileStationStatus> {
        match self {
            Api { code, .. } => Some(FileStationStatus::from_code(*code)),
            _ => None,
        }
    }
}

/// File attached to an upload request
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub data: Vec<u8>,
    pub mime: String,
}

/// HTTP session capability used by [`crate::filestation::FileStation`]
///
/// [`Qnap`] is the network implementation; tests substitute a recording stub.
#[async_trait]
pub trait Session: Send + Sync {
    /// Builds the request descriptor for an API function
    fn endpoint(&self, func: &str, params: Vec<(&str, String)>) -> Endpoint {
        params
            .into_iter()
            .fold(Endpoint::new(func), |endpoint, (key, value)| {
                endpoint.param(key, value)
            })
    }

    /// Performs a GET call and returns the parsed JSON reply
    async fn req(&self, endpoint: Endpoint) -> Result<Value>;

    /// Performs a GET call and returns the raw body
    async fn req_binary(&self, endpoint: Endpoint) -> Result<Vec<u8>>;

    /// Performs a multipart POST carrying one file
    async fn req_post(&self, endpoint: Endpoint, file: UploadFile) -> Result<Value>;
}

/// Fails with [`QnapError::Api`] when a reply carries a `status` other than success
///
/// # Errors
///
/// Returns an error if the `status` field is present and is not `1`.
pub fn check_status(value: &Value) -> Result<(), QnapError> {
    let code = match value.get("status") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match code.map(FileStationStatus::from_code) {
        None | Some(FileStationStatus::Success) => Ok(()),
        Some(status) => Err(Api {
            code: code.unwrap_or_default(),
            message: status.message().into(),
        }),
    }
}

/// QNAP NAS session client
pub struct Qnap {
    host: String,
    username: String,
    password: String,
    client: Client,
    sid: RwLock<String>,
}

impl Qnap {
    /// Creates a new `Qnap` client with the given host, credentials and timeout
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username, password, or host URL is empty
    /// - Host URL doesn't start with "http://" or "https://"
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(host: String, username: String, password: String, timeout_ms: u64) -> Result<Self> {
        if username.is_empty() {
            return Err(Configuration("Username cannot be empty".into()).into());
        }

        if password.is_empty() {
            return Err(Configuration("Password cannot be empty".into()).into());
        }

        if host.is_empty() {
            return Err(Configuration("Host URL cannot be empty".into()).into());
        }

        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(Configuration(format!(
                "Host URL must start with http:// or https://, got: {host}"
            ))
            .into());
        }

        let host = host.trim_end_matches('/').to_string();
        Url::parse(&host).map_err(|e| UrlParse(format!("{host}: {e}")))?;

        let client = Self::create_client(timeout_ms);

        Ok(Self {
            host,
            username,
            password,
            client,
            sid: RwLock::new(String::new()),
        })
    }

    fn create_client(timeout: u64) -> Client {
        Client::builder()
            .timeout(Duration::from_millis(timeout))
            .build()
            .unwrap_or_default()
    }

    /// Creates a new `Qnap` client with a builder pattern
    #[must_use]
    pub fn builder() -> QnapBuilder {
        QnapBuilder::default()
    }

    /// Host URL without trailing slash
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether a session ID is held
    pub async fn is_authorized(&self) -> bool {
        !self.sid.read().await.is_empty()
    }

    /// Logs in and stores the session ID
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Network request fails
    /// - The NAS rejects the credentials
    /// - Response cannot be parsed
    pub async fn authorize(&self) -> Result<()> {
        let pwd = STANDARD.encode(self.password.as_bytes());
        let params = [
            ("user", self.username.as_str()),
            ("pwd", pwd.as_str()),
            ("serviceKey", "1"),
        ];

        let url = format!("{}{}", self.host, LOGIN_PATH);
        debug!("Logging in to {url} as {}", self.username);

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .context("Failed to authorize")?;
        let body = Self::ensure_success(response)?
            .text()
            .await
            .context("Failed to read login response")?;

        let auth: AuthResponse = quick_xml::de::from_str(&body)
            .map_err(|e| InvalidResponse(format!("Malformed login response: {e}")))?;

        match auth.sid() {
            Some(sid) if auth.passed() => {
                *self.sid.write().await = sid.to_string();
                debug!("Logged in, session established");
                Ok(())
            }
            _ => Err(Auth(format!(
                "Failed to authenticate (errorValue={})",
                auth.error_value.as_deref().unwrap_or("none")
            ))
            .into()),
        }
    }

    /// Ends the session on the NAS and forgets the session ID
    ///
    /// # Errors
    ///
    /// Returns an error if the network request fails or the NAS answers with a non-2xx status.
    pub async fn logout(&self) -> Result<()> {
        let sid = std::mem::take(&mut *self.sid.write().await);
        if sid.is_empty() {
            return Ok(());
        }

        let url = format!("{}{}", self.host, LOGOUT_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("logout", "1"), ("sid", sid.as_str())])
            .send()
            .await
            .context("Failed to log out")?;
        Self::ensure_success(response)?;
        Ok(())
    }

    async fn session_id(&self) -> Result<String> {
        let sid = self.sid.read().await;
        if sid.is_empty() {
            return Err(
                Auth("No session ID available. Make sure to call authorize() first".into()).into(),
            );
        }
        Ok(sid.clone())
    }

    fn api_url(&self) -> String {
        format!("{}{}", self.host, API_PATH)
    }

    /// Sends a GET for `endpoint` with the session ID attached
    async fn send_get(&self, endpoint: &Endpoint) -> Result<Response> {
        let sid = self.session_id().await?;
        let url = self.api_url();
        debug!(
            "Making API request to: {} func={} with {} parameters",
            url,
            endpoint.func,
            endpoint.params.len()
        );

        let response = self
            .client
            .get(&url)
            .query(&endpoint.query())
            .query(&[("sid", sid.as_str())])
            .send()
            .await
            .context("Failed to make API request")?;

        debug!("API request status: {}", response.status());
        Self::ensure_success(response)
    }

    fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(Api {
                code: i64::from(status.as_u16()),
                message: format!(
                    "HTTP request failed with status: {} ({})",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            }
            .into());
        }
        Ok(response)
    }
}

#[async_trait]
impl Session for Qnap {
    async fn req(&self, endpoint: Endpoint) -> Result<Value> {
        let value = self
            .send_get(&endpoint)
            .await?
            .json::<Value>()
            .await
            .context("Failed to parse API response")?;
        check_status(&value)?;
        Ok(value)
    }

    async fn req_binary(&self, endpoint: Endpoint) -> Result<Vec<u8>> {
        let response = self.send_get(&endpoint).await?;
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        let body = response
            .bytes()
            .await
            .context("Failed to read binary response")?;

        if is_json {
            if let Ok(value) = serde_json::from_slice::<Value>(&body) {
                check_status(&value)?;
            }
        }

        debug!("Received {} bytes for func={}", body.len(), endpoint.func);
        Ok(body.to_vec())
    }

    async fn req_post(&self, endpoint: Endpoint, file: UploadFile) -> Result<Value> {
        let sid = self.session_id().await?;

        debug!(
            "Uploading file. Name: {}, Size: {} bytes, func: {}",
            file.file_name,
            file.data.len(),
            endpoint.func
        );

        let file_part = Part::bytes(file.data)
            .file_name(file.file_name)
            .mime_str(&file.mime)
            .context("Failed to create file part")?;
        let form = multipart::Form::new().part("file", file_part);

        let response = self
            .client
            .post(self.api_url())
            .query(&endpoint.query())
            .query(&[("sid", sid.as_str())])
            .multipart(form)
            .send()
            .await
            .context("Failed to send file upload request")?;

        let value = Self::ensure_success(response)?
            .json::<Value>()
            .await
            .context("Failed to parse upload response")?;
        check_status(&value)?;
        Ok(value)
    }
}

/// Builder for [`Qnap`] client
#[derive(Default)]
pub struct QnapBuilder {
    host: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<u64>,
}

impl QnapBuilder {
    /// Reads `QNAP_HOST`, `QNAP_USERNAME`, `QNAP_PASSWORD` and the optional `QNAP_TIMEOUT_MS`
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the timeout is not a number.
    pub fn from_env() -> Result<Self> {
        let host = env::var("QNAP_HOST").map_err(Environment)?;
        let username = env::var("QNAP_USERNAME").map_err(Environment)?;
        let password = env::var("QNAP_PASSWORD").map_err(Environment)?;

        let mut builder = Self::default()
            .host(host)
            .username(username)
            .password(password);

        if let Ok(timeout) = env::var("QNAP_TIMEOUT_MS") {
            let timeout = timeout.parse::<u64>().map_err(|_| {
                Configuration(format!("QNAP_TIMEOUT_MS must be a number, got: {timeout}"))
            })?;
            builder = builder.timeout(timeout);
        }

        Ok(builder)
    }

    /// Sets the host URL
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the username
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the request timeout in milliseconds
    #[must_use]
    pub fn timeout(mut self, timeout_millis: u64) -> Self {
        self.timeout = Some(timeout_millis);
        self
    }

    /// Builds the [`Qnap`] client
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields (host, username, password) are not provided
    /// - Host URL doesn't start with "http://" or "https://"
    pub fn build(self) -> Result<Qnap> {
        let host = self
            .host
            .ok_or_else(|| Configuration("Host URL is required".into()))?;
        let username = self
            .username
            .ok_or_else(|| Configuration("Username is required".into()))?;
        let password = self
            .password
            .ok_or_else(|| Configuration("Password is required".into()))?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS);

        Qnap::new(host, username, password, timeout)
    }
}
