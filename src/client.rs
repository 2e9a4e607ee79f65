use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::directory::{self, DecodeError, User};

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub api_url: String,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no user API URL configured")]
    MissingUrl,

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// HTTP source for the flat user list.
#[derive(Clone, Debug)]
pub struct DirectoryClient {
    url: reqwest::Url,
    http: reqwest::Client,
}

impl DirectoryClient {
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let raw = options.api_url.trim();
        if raw.is_empty() {
            return Err(ClientError::MissingUrl);
        }
        let url = reqwest::Url::parse(raw).map_err(|_| ClientError::InvalidUrl {
            url: raw.to_string(),
        })?;
        let http = build_http_client(options.proxy.as_deref(), options.timeout_seconds)?;
        Ok(Self { url, http })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// One GET of the configured URL, decoded and normalized.
    pub async fn fetch_users(&self) -> Result<Vec<User>, ClientError> {
        let url = self.url.to_string();
        debug!(%url, "fetching users");
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| ClientError::Request {
                url: url.clone(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(|e| ClientError::Request {
            url: url.clone(),
            source: e,
        })?;
        let users = directory::decode_users(&body)?;
        debug!(%url, count = users.len(), "fetched users");
        Ok(users)
    }
}

fn build_http_client(
    proxy: Option<&str>,
    timeout_seconds: u64,
) -> Result<reqwest::Client, ClientError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(concat!("userdir/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_seconds.max(1)));

    // only an explicitly configured proxy is used
    match proxy.filter(|p| !p.trim().is_empty()) {
        Some(proxy) => {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| ClientError::ProxySetup {
                proxy: proxy.to_string(),
                source: e,
            })?;
            builder = builder.proxy(proxy);
        }
        None => builder = builder.no_proxy(),
    }

    builder
        .build()
        .map_err(|e| ClientError::HttpClientBuild { source: e })
}
