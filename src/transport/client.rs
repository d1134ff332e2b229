//! reqwest-backed blocking web client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::{Transport, TransportError};

/// Outbound HTTP settings, read from the `[http]` config table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Whole-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Verify TLS certificates of upstream endpoints
    pub verify_tls: bool,

    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 180_000,
            verify_tls: false,
            user_agent: crate::USER_AGENT.to_string(),
        }
    }
}

/// Blocking client bound to a single base endpoint.
#[derive(Debug, Clone)]
pub struct WebClient {
    client: Client,
    url: String,
}

impl WebClient {
    pub fn new(url: &str, settings: &HttpSettings) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_millis(settings.timeout_ms))
            .danger_accept_invalid_certs(!settings.verify_tls)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Base endpoint of this client
    pub fn url(&self) -> &str {
        &self.url
    }

    fn try_get(&self, query: &str) -> Result<String, TransportError> {
        if query.is_empty() {
            return Err(TransportError::EmptyRequest);
        }

        let response = self.client.get(format!("{}?{}", self.url, query)).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }

    fn try_post(&self, body: &str) -> Result<String, TransportError> {
        if body.is_empty() {
            return Err(TransportError::EmptyRequest);
        }

        let response = self.client.post(&self.url).body(body.to_string()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }
}

impl Transport for WebClient {
    fn get(&self, query: &str) -> String {
        info!("Starting HTTP GET request to {}", self.url);
        debug!("GET request: {}", query);

        match self.try_get(query) {
            Ok(body) => {
                info!("HTTP GET request to {} finished", self.url);
                debug!("GET response: {}", body);
                body
            }
            Err(e) => {
                error!("HTTP GET request to {} failed: {} (request = {})", self.url, e, query);
                String::new()
            }
        }
    }

    fn post(&self, body: &str) -> String {
        info!("Starting HTTP POST request to {}", self.url);
        debug!("POST data: {}", body);

        match self.try_post(body) {
            Ok(response) => {
                info!("HTTP POST request to {} finished", self.url);
                debug!("POST response: {}", response);
                response
            }
            Err(e) => {
                error!("HTTP POST request to {} failed: {} (data = {})", self.url, e, body);
                String::new()
            }
        }
    }
}
