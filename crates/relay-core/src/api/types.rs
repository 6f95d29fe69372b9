//! Wire types for the relay service REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::STATUS_COMPLETED;

/// `status` value of a successful start response.
pub const STATUS_STARTED: &str = "started";
/// `status` value of every other successful response.
pub const STATUS_SUCCESS: &str = "success";

/// Body of `start-expert-panel` / `start-conference-chain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_agents: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StartResponse {
    pub status: String,
    pub session_id: Option<String>,
}

impl StartResponse {
    /// Returns the session id when the backend accepted the start.
    pub fn started_session(&self) -> Option<&str> {
        if self.status == STATUS_STARTED {
            self.session_id.as_deref().filter(|id| !id.is_empty())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub status: String,
    pub session_data: Option<SessionData>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// True for a successful response whose session has finished.
    pub fn reports_completion(&self) -> bool {
        self.is_success()
            && self
                .session_data
                .as_ref()
                .is_some_and(|data| data.status == STATUS_COMPLETED)
    }

    /// Session data of a successful response.
    pub fn into_session_data(self) -> Option<SessionData> {
        if self.status == STATUS_SUCCESS {
            self.session_data
        } else {
            None
        }
    }
}

/// `session_data` object; field names vary by mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionData {
    pub mode: String,
    pub status: String,
    pub current_pair: Option<u32>,
    pub total_pairs: Option<u32>,
    pub current_agents: Option<Vec<String>>,
    pub current_agent: Option<u32>,
    pub total_agents: Option<u32>,
    pub current_agent_name: Option<String>,
    pub results: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SummaryResponse {
    pub status: String,
    pub summary: Option<Value>,
    pub synthesis: Option<Value>,
    pub comprehensive_report: Option<Value>,
}

impl SummaryResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// First present content field, in `summary`, `synthesis`,
    /// `comprehensive_report` order.
    pub fn content(&self) -> Value {
        [&self.summary, &self.synthesis, &self.comprehensive_report]
            .into_iter()
            .flatten()
            .find(|v| is_truthy(v))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportResponse {
    pub status: String,
    pub html_report: Option<String>,
}

impl ReportResponse {
    /// HTML document of a successful response.
    pub fn into_html(self) -> Option<String> {
        if self.status == STATUS_SUCCESS {
            self.html_report
        } else {
            None
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_start_request_omits_max_agents_for_expert_panel() {
        let body = serde_json::to_value(StartRequest {
            prompt: "design a bridge".to_string(),
            max_agents: None,
        })
        .unwrap();
        assert_eq!(body, json!({"prompt": "design a bridge"}));

        let body = serde_json::to_value(StartRequest {
            prompt: "design a bridge".to_string(),
            max_agents: Some(20),
        })
        .unwrap();
        assert_eq!(body, json!({"prompt": "design a bridge", "max_agents": 20}));
    }

    #[test]
    fn test_started_session_requires_started_status() {
        let ok: StartResponse =
            serde_json::from_value(json!({"status": "started", "session_id": "abc"})).unwrap();
        assert_eq!(ok.started_session(), Some("abc"));

        let rejected: StartResponse =
            serde_json::from_value(json!({"status": "error", "session_id": "abc"})).unwrap();
        assert_eq!(rejected.started_session(), None);

        let missing: StartResponse = serde_json::from_value(json!({"status": "started"})).unwrap();
        assert_eq!(missing.started_session(), None);
    }

    #[test]
    fn test_summary_content_prefers_first_present_field() {
        let response: SummaryResponse = serde_json::from_value(json!({
            "status": "success",
            "synthesis": {"points": ["a"]},
            "comprehensive_report": "ignored"
        }))
        .unwrap();
        assert_eq!(response.content(), json!({"points": ["a"]}));

        let empty_first: SummaryResponse = serde_json::from_value(json!({
            "status": "success",
            "summary": "",
            "comprehensive_report": "full"
        }))
        .unwrap();
        assert_eq!(empty_first.content(), json!("full"));

        let none: SummaryResponse = serde_json::from_value(json!({"status": "success"})).unwrap();
        assert_eq!(none.content(), Value::Null);
    }

    #[test]
    fn test_status_response_ignores_non_success() {
        let response: StatusResponse = serde_json::from_value(json!({
            "status": "error",
            "session_data": {"mode": "expert_panel", "status": "running"}
        }))
        .unwrap();
        assert!(!response.reports_completion());
        assert!(response.into_session_data().is_none());
    }

    #[test]
    fn test_status_response_reports_completion() {
        let response: StatusResponse = serde_json::from_value(json!({
            "status": "success",
            "session_data": {"mode": "conference_chain", "status": "completed"}
        }))
        .unwrap();
        assert!(response.reports_completion());
    }
}
