//! Client Helper
//!
//! Thin consumer of the resolution server. Built around an explicit base
//! endpoint rather than shared global state, so tests can point separate
//! clients at separate servers. One round trip per `locate` call; no
//! caching across calls.

use crate::api::rest::{ApiErrorResponse, LocationResponse};
use crate::error::{Error, Result};
use reqwest::StatusCode;

/// Default endpoint of a locally running locator
pub const DEFAULT_LOCATOR_URL: &str = "http://127.0.0.1:4000";

/// Client for issuing resolution queries against a locator endpoint
#[derive(Debug, Clone)]
pub struct LocatorClient {
    http: reqwest::Client,
    base_url: String,
}

impl LocatorClient {
    /// Create a client against the given base URL (e.g. `http://127.0.0.1:4000`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client against the default local endpoint
    pub fn local() -> Self {
        Self::new(DEFAULT_LOCATOR_URL)
    }

    /// Resolve a service name to its `(host, port)` location.
    ///
    /// A missing service surfaces as [`Error::ServiceNotFound`]; any other
    /// non-success status as [`Error::UnexpectedStatus`]; failure to reach
    /// the locator at all as [`Error::Transport`].
    pub async fn locate(&self, service_name: &str) -> Result<(String, u16)> {
        let url = format!(
            "{}/service/{}",
            self.base_url,
            urlencoding::encode(service_name)
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        match status {
            StatusCode::OK => {
                let location: LocationResponse = response.json().await?;
                Ok((location.host, location.port))
            }
            StatusCode::NOT_FOUND => Err(Error::ServiceNotFound {
                service: service_name.to_string(),
            }),
            _ => {
                let message = match response.json::<ApiErrorResponse>().await {
                    Ok(body) => body.message,
                    Err(_) => status.to_string(),
                };
                Err(Error::UnexpectedStatus {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
