//! Relay service API: wire types, the `Backend` seam and its HTTP client.

pub mod client;
pub mod types;

use std::future::Future;

pub use client::ApiClient;
use types::{ReportResponse, StartRequest, StartResponse, StatusResponse, SummaryResponse};

use crate::session::{Mode, SummaryKind};

/// Transport-level failures talking to the relay service.
///
/// A response that decodes but carries a non-success `status` is not an
/// error at this layer; callers inspect the `status` field themselves.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid backend URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid JSON from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The relay service as seen by the controller.
///
/// `ApiClient` is the HTTP implementation; tests substitute in-memory fakes.
pub trait Backend: Send + Sync + 'static {
    fn start_session(
        &self,
        mode: Mode,
        request: &StartRequest,
    ) -> impl Future<Output = Result<StartResponse, ApiError>> + Send;

    fn session_status(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<StatusResponse, ApiError>> + Send;

    fn summary(
        &self,
        kind: SummaryKind,
        session_id: &str,
    ) -> impl Future<Output = Result<SummaryResponse, ApiError>> + Send;

    fn report(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<ReportResponse, ApiError>> + Send;
}
