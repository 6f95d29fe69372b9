use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use super::types::{ReportResponse, StartRequest, StartResponse, StatusResponse, SummaryResponse};
use super::{ApiError, Backend};
use crate::config::Config;
use crate::session::{Mode, SummaryKind};

/// HTTP client for the relay service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for `base_url` with an optional per-request timeout.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        // A trailing slash makes `path_segments_mut` append below any base path.
        let base_url = Url::parse(&format!("{trimmed}/")).map_err(|source| ApiError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| ApiError::Transport {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self { base_url, http })
    }

    /// Creates a client from the backend settings in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.effective_backend_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `<base>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let request = self.http.get(url.clone());
        Self::send(url, request).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &StartRequest,
    ) -> Result<T, ApiError> {
        let request = self.http.post(url.clone()).json(body);
        Self::send(url, request).await
    }

    /// Sends a request and decodes the body as JSON whatever the HTTP status:
    /// the service reports rejections through its `status` field.
    async fn send<T: DeserializeOwned>(
        url: Url,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        let http_status = response.status();
        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !http_status.is_success() {
            tracing::debug!(%url, %http_status, "relay service returned non-2xx status");
        }
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl Backend for ApiClient {
    async fn start_session(
        &self,
        mode: Mode,
        request: &StartRequest,
    ) -> Result<StartResponse, ApiError> {
        let endpoint = match mode {
            Mode::ExpertPanel => "start-expert-panel",
            Mode::ConferenceChain => "start-conference-chain",
        };
        let url = self.endpoint(&["api", "revolutionary", endpoint]);
        self.post_json(url, request).await
    }

    async fn session_status(&self, session_id: &str) -> Result<StatusResponse, ApiError> {
        let url = self.endpoint(&["api", "revolutionary", "session-status", session_id]);
        self.get_json(url).await
    }

    async fn summary(
        &self,
        kind: SummaryKind,
        session_id: &str,
    ) -> Result<SummaryResponse, ApiError> {
        let url = self.endpoint(&["api", "summary", kind.as_str(), session_id]);
        self.get_json(url).await
    }

    async fn report(&self, session_id: &str) -> Result<ReportResponse, ApiError> {
        let url = self.endpoint(&["api", "revolutionary", "generate-report", session_id]);
        self.get_json(url).await
    }
}
