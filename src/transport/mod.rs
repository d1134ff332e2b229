//! Blocking HTTP transport used by the Overpass and Nominatim clients.
//!
//! Every call returns the response body, or an empty string on any failure
//! (network error, timeout, non-2xx status). Callers treat "" as "no result".

mod client;

pub use client::{HttpSettings, WebClient};

use std::sync::Arc;

/// Errors raised inside the transport before being collapsed to an empty body.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("empty request passed")]
    EmptyRequest,

    #[error("HTTP error code: {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Request/response access to one upstream endpoint.
pub trait Transport: Send + Sync {
    /// GET `<endpoint>?<query>`
    fn get(&self, query: &str) -> String;

    /// POST `body` to the endpoint
    fn post(&self, body: &str) -> String;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, query: &str) -> String {
        (**self).get(query)
    }

    fn post(&self, body: &str) -> String {
        (**self).post(body)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, query: &str) -> String {
        (**self).get(query)
    }

    fn post(&self, body: &str) -> String {
        (**self).post(body)
    }
}
