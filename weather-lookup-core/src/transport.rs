//! How the forecast request reaches the provider.
//!
//! [`DirectTransport`] calls the provider itself. [`RelayTransport`] asks a
//! CORS relay to fetch the target URL and unwraps the JSON envelope it returns.
//! Both hand the decoded provider payload to the same normalizer.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Debug;
use tracing::debug;
use url::Url;

use crate::{
    Config,
    error::{ConfigurationError, FetchError, NetworkError, ValidationError, truncate_body},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportMode {
    #[default]
    Direct,
    Relay,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Direct => "direct",
            TransportMode::Relay => "relay",
        }
    }

    pub const fn all() -> &'static [TransportMode] {
        &[TransportMode::Direct, TransportMode::Relay]
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransportMode {
    type Error = ConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "direct" => Ok(TransportMode::Direct),
            "relay" => Ok(TransportMode::Relay),
            _ => Err(ConfigurationError::UnknownTransport(value.to_string())),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Issue one GET for `target` and return the provider's decoded JSON body.
    async fn get_json(&self, http: &Client, target: &Url) -> Result<Value, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct DirectTransport;

#[async_trait]
impl Transport for DirectTransport {
    async fn get_json(&self, http: &Client, target: &Url) -> Result<Value, FetchError> {
        let body = get_text(http, target.clone()).await?;
        serde_json::from_str(&body).map_err(|e| ValidationError::NotJson(e).into())
    }
}

#[derive(Debug, Clone)]
pub struct RelayTransport {
    relay_url: Url,
}

#[derive(Debug, Deserialize)]
struct RelayEnvelope {
    contents: Option<String>,
    status: Option<RelayStatus>,
}

#[derive(Debug, Deserialize)]
struct RelayStatus {
    http_code: Option<u16>,
}

impl RelayTransport {
    pub fn new(relay_url: Url) -> Self {
        Self { relay_url }
    }

    fn wrap(&self, target: &Url) -> Url {
        let mut url = self.relay_url.clone();
        url.query_pairs_mut().append_pair("url", target.as_str());
        url
    }
}

#[async_trait]
impl Transport for RelayTransport {
    async fn get_json(&self, http: &Client, target: &Url) -> Result<Value, FetchError> {
        let body = get_text(http, self.wrap(target)).await?;

        let envelope: RelayEnvelope =
            serde_json::from_str(&body).map_err(ValidationError::NotJson)?;

        if let Some(code) = envelope.status.and_then(|s| s.http_code) {
            if !(200..=299).contains(&code) {
                return Err(NetworkError::Status { status: code, body: "(via relay)".into() }.into());
            }
        }

        let contents = envelope.contents.ok_or(ValidationError::MissingRelayContents)?;
        serde_json::from_str(&contents).map_err(|e| ValidationError::NotJson(e).into())
    }
}

async fn get_text(http: &Client, url: Url) -> Result<String, FetchError> {
    let res = http.get(url).send().await?;

    let status = res.status();
    let body = res.text().await?;
    debug!(status = status.as_u16(), bytes = body.len(), "received response");

    if !status.is_success() {
        return Err(NetworkError::Status { status: status.as_u16(), body: truncate_body(&body) }
            .into());
    }

    Ok(body)
}

/// Construct the transport selected in `config`.
pub fn transport_from_config(config: &Config) -> Result<Box<dyn Transport>, ConfigurationError> {
    let boxed: Box<dyn Transport> = match config.transport_mode()? {
        TransportMode::Direct => Box::new(DirectTransport),
        TransportMode::Relay => {
            let relay_url = Url::parse(&config.relay_url).map_err(|source| {
                ConfigurationError::InvalidUrl {
                    name: "relay_url",
                    value: config.relay_url.clone(),
                    source,
                }
            })?;
            Box::new(RelayTransport::new(relay_url))
        }
    };

    Ok(boxed)
}
