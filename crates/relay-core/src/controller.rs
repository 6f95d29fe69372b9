//! Session controller.
//!
//! A pure reducer: `update` mutates the controller's own state and page
//! model, then returns `Effect`s for the driver to execute. Results of those
//! effects come back as `Action`s. Nothing here performs I/O.

use std::time::{Duration, Instant};

use crate::api::ApiError;
use crate::api::types::{
    ReportResponse, StartRequest, StartResponse, StatusResponse, SummaryResponse,
};
use crate::page::{AgentSlot, Badge, Button, HostLayout, Page, SummaryModal, estimate_remaining};
use crate::session::{Mode, SessionPhase, SessionSnapshot, Stage, SummaryKind};

/// User-facing notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Success,
}

/// A blocking, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.level {
            NoticeLevel::Error => write!(f, "Error: {}", self.message),
            NoticeLevel::Success => write!(f, "Success: {}", self.message),
        }
    }
}

/// Inputs to the controller: user intents and effect results.
#[derive(Debug)]
pub enum Action {
    /// A page button was activated.
    Press(Button),
    /// Close the topmost summary modal.
    CloseModal,
    /// Copy the topmost summary modal to the clipboard.
    CopyModal,
    /// The clipboard copy requested by `CopyModal` finished.
    Copied { ok: bool },
    SessionStarted {
        attempt: u64,
        mode: Mode,
        result: Result<StartResponse, ApiError>,
    },
    StatusPolled {
        session_id: String,
        received_at: Instant,
        result: Result<StatusResponse, ApiError>,
    },
    /// The poll task gave up after too many consecutive failures.
    PollingAbandoned { session_id: String, failures: u32 },
    SummaryFetched {
        kind: SummaryKind,
        result: Result<SummaryResponse, ApiError>,
    },
    ReportFetched { result: Result<ReportResponse, ApiError> },
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartSession {
        attempt: u64,
        mode: Mode,
        request: StartRequest,
    },
    /// Start the status timer, replacing any running one.
    StartPolling { session_id: String },
    /// Cancel the status timer (no-op when none is running).
    StopPolling,
    FetchSummary {
        kind: SummaryKind,
        session_id: String,
    },
    FetchReport { session_id: String },
    /// Open a trusted HTML document in a new top-level viewer.
    OpenReport { html: String },
    CopyToClipboard { text: String },
    Notify(Notice),
}

/// Owns the session lifecycle and the augmented page.
#[derive(Debug)]
pub struct Controller {
    page: Page,
    phase: SessionPhase,
    session_id: Option<String>,
    mode: Option<Mode>,
    conference_max_agents: u32,
    /// Incremented per start so late responses of superseded starts are dropped.
    start_attempt: u64,
    started_at: Option<Instant>,
    last_snapshot: Option<SessionSnapshot>,
}

impl Controller {
    /// Creates a controller and augments a fresh page for `layout`.
    pub fn new(layout: HostLayout) -> Self {
        Self::with_page(Page::new(layout))
    }

    /// Creates a controller around a host-provided page and augments it.
    pub fn with_page(mut page: Page) -> Self {
        let skipped = page.augment();
        for step in &skipped {
            tracing::debug!(step, "host anchor missing, augmentation skipped");
        }
        tracing::info!("relay controller initialized");

        Self {
            page,
            phase: SessionPhase::Idle,
            session_id: None,
            mode: None,
            conference_max_agents: Mode::ConferenceChain.default_total(),
            start_attempt: 0,
            started_at: None,
            last_snapshot: None,
        }
    }

    #[must_use]
    pub fn with_conference_max_agents(mut self, max_agents: u32) -> Self {
        self.conference_max_agents = max_agents;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn last_snapshot(&self) -> Option<&SessionSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Applies one action and returns the effects to execute, in order.
    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Press(button) => self.press(button),
            Action::CloseModal => {
                self.page.close_modal();
                Vec::new()
            }
            Action::CopyModal => self
                .page
                .top_modal()
                .map(|modal| {
                    vec![Effect::CopyToClipboard {
                        text: modal.body.clone(),
                    }]
                })
                .unwrap_or_default(),
            Action::Copied { ok } => {
                if ok {
                    vec![Effect::Notify(Notice::success("Summary copied to clipboard!"))]
                } else {
                    vec![Effect::Notify(Notice::error("Could not copy summary to clipboard"))]
                }
            }
            Action::SessionStarted {
                attempt,
                mode,
                result,
            } => self.on_session_started(attempt, mode, result),
            Action::StatusPolled {
                session_id,
                received_at,
                result,
            } => self.on_status_polled(&session_id, received_at, result),
            Action::PollingAbandoned {
                session_id,
                failures,
            } => self.on_polling_abandoned(&session_id, failures),
            Action::SummaryFetched { kind, result } => {
                Self::on_summary_fetched(&mut self.page, kind, result)
            }
            Action::ReportFetched { result } => Self::on_report_fetched(result),
        }
    }

    fn press(&mut self, button: Button) -> Vec<Effect> {
        match button {
            Button::StartMode(mode) => self.start(mode),
            Button::Pause => Self::pause(),
            Button::Stop => self.stop(),
            Button::Summary(kind) => self.generate_summary(kind),
            Button::HtmlReport => self.generate_report(),
        }
    }

    // ============================================================================
    // Start
    // ============================================================================

    fn start(&mut self, mode: Mode) -> Vec<Effect> {
        let prompt = self.page.prompt_text();
        if prompt.is_empty() {
            return vec![Effect::Notify(Notice::error("Please enter a prompt first"))];
        }

        tracing::info!(mode = mode.wire_name(), "starting relay session");

        // The previous session's timer must not outlive this start.
        let mut effects = vec![Effect::StopPolling];

        self.start_attempt += 1;
        self.phase = SessionPhase::Starting;
        self.session_id = None;
        self.mode = Some(mode);
        self.started_at = None;
        self.last_snapshot = None;

        let title = format!("{} Mode", mode.label());
        self.page.show_progress(title.clone(), mode.default_total(), mode.unit());
        self.page.set_slot(
            AgentSlot::A,
            Badge::Initializing,
            "Initializing...",
            title.clone(),
        );
        self.page
            .set_slot(AgentSlot::B, Badge::Initializing, "Waiting...", title);

        let max_agents = match mode {
            Mode::ExpertPanel => None,
            Mode::ConferenceChain => Some(self.conference_max_agents),
        };
        effects.push(Effect::StartSession {
            attempt: self.start_attempt,
            mode,
            request: StartRequest { prompt, max_agents },
        });
        effects
    }

    fn on_session_started(
        &mut self,
        attempt: u64,
        mode: Mode,
        result: Result<StartResponse, ApiError>,
    ) -> Vec<Effect> {
        if attempt != self.start_attempt || self.phase != SessionPhase::Starting {
            tracing::debug!(attempt, "dropping response of superseded start");
            return Vec::new();
        }

        match result {
            Ok(response) => {
                if let Some(session_id) = response.started_session() {
                    tracing::info!(session_id, mode = mode.wire_name(), "relay session started");
                    self.phase = SessionPhase::Polling;
                    self.session_id = Some(session_id.to_string());
                    self.started_at = Some(Instant::now());
                    vec![Effect::StartPolling {
                        session_id: session_id.to_string(),
                    }]
                } else {
                    tracing::warn!(status = %response.status, "relay service rejected start");
                    self.fail_start();
                    vec![Effect::Notify(Notice::error(format!(
                        "Failed to start {} Mode",
                        mode.label()
                    )))]
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "error starting {} Mode", mode.label());
                self.fail_start();
                vec![Effect::Notify(Notice::error(format!(
                    "Network error starting {} Mode",
                    mode.label()
                )))]
            }
        }
    }

    fn fail_start(&mut self) {
        self.phase = SessionPhase::Idle;
        self.session_id = None;
    }

    // ============================================================================
    // Polling
    // ============================================================================

    fn on_status_polled(
        &mut self,
        session_id: &str,
        received_at: Instant,
        result: Result<StatusResponse, ApiError>,
    ) -> Vec<Effect> {
        if self.phase != SessionPhase::Polling || self.session_id.as_deref() != Some(session_id) {
            tracing::debug!(session_id, "dropping status of inactive session");
            return Vec::new();
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, session_id, "error polling session status");
                return Vec::new();
            }
        };
        let Some(data) = response.into_session_data() else {
            tracing::debug!(session_id, "status poll not successful, ignoring");
            return Vec::new();
        };

        let snapshot = SessionSnapshot::from(data);
        tracing::debug!(session_id, status = %snapshot.status, "session status");
        self.render_snapshot(&snapshot, received_at);

        let effects = if snapshot.is_completed() {
            self.complete(&snapshot)
        } else {
            Vec::new()
        };
        self.last_snapshot = Some(snapshot);
        effects
    }

    fn render_snapshot(&mut self, snapshot: &SessionSnapshot, received_at: Instant) {
        let Some((current, total)) = snapshot.stage.counts() else {
            return;
        };
        self.page.set_progress(current, total);

        match &snapshot.stage {
            Stage::ExpertPanel { agents, .. } => {
                self.page.set_slot(
                    AgentSlot::A,
                    Badge::Processing,
                    agents[0].clone(),
                    "Expert Panel - Agent A",
                );
                self.page.set_slot(
                    AgentSlot::B,
                    Badge::Processing,
                    agents[1].clone(),
                    "Expert Panel - Agent B",
                );
            }
            Stage::ConferenceChain { agent_name, .. } => {
                self.page.set_slot(
                    AgentSlot::A,
                    Badge::Processing,
                    agent_name.clone(),
                    "Conference Chain - Current",
                );
                self.page.set_slot(
                    AgentSlot::B,
                    Badge::Processing,
                    "Building Context...",
                    "Conference Chain - Next",
                );
            }
            Stage::Unknown => {}
        }

        if let Some(label) = snapshot.stage.label() {
            self.page.set_processing_label(label);
        }

        let elapsed = self
            .started_at
            .map_or(Duration::ZERO, |start| received_at.saturating_duration_since(start));
        self.page
            .set_estimate(estimate_remaining(elapsed, current, total));
    }

    fn complete(&mut self, snapshot: &SessionSnapshot) -> Vec<Effect> {
        tracing::info!(
            session_id = self.session_id.as_deref().unwrap_or_default(),
            results = snapshot.result_count,
            "relay session completed"
        );
        self.phase = SessionPhase::Completed;

        for slot in AgentSlot::all() {
            self.page
                .set_slot(*slot, Badge::Completed, "Completed", "Session Finished");
        }
        self.page.set_all_badges(Badge::Completed);
        self.page.set_estimate(Some(Duration::ZERO));
        self.page.show_summary_controls();

        vec![
            Effect::StopPolling,
            Effect::Notify(Notice::success(format!(
                "{} completed! {} responses generated.",
                snapshot.display_mode(),
                snapshot.result_count
            ))),
        ]
    }

    fn on_polling_abandoned(&mut self, session_id: &str, failures: u32) -> Vec<Effect> {
        if self.phase != SessionPhase::Polling || self.session_id.as_deref() != Some(session_id) {
            return Vec::new();
        }
        tracing::warn!(session_id, failures, "polling abandoned");
        self.phase = SessionPhase::Idle;
        self.session_id = None;
        self.mode = None;
        vec![
            Effect::StopPolling,
            Effect::Notify(Notice::error("Lost contact with the relay service")),
        ]
    }

    // ============================================================================
    // Summaries and report
    // ============================================================================

    fn generate_summary(&self, kind: SummaryKind) -> Vec<Effect> {
        let Some(session_id) = self.session_id.clone() else {
            return vec![Effect::Notify(Notice::error("No completed session to summarize"))];
        };
        tracing::info!(kind = kind.as_str(), session_id = %session_id, "generating summary");
        vec![Effect::FetchSummary { kind, session_id }]
    }

    fn on_summary_fetched(
        page: &mut Page,
        kind: SummaryKind,
        result: Result<SummaryResponse, ApiError>,
    ) -> Vec<Effect> {
        match result {
            Ok(response) if response.is_success() => {
                let body = serde_json::to_string_pretty(&response.content())
                    .unwrap_or_else(|_| "null".to_string());
                page.push_modal(SummaryModal {
                    title: kind.title().to_string(),
                    body,
                });
                Vec::new()
            }
            Ok(response) => {
                tracing::warn!(kind = kind.as_str(), status = %response.status, "summary rejected");
                vec![Effect::Notify(Notice::error(format!(
                    "Failed to generate {}",
                    kind.title()
                )))]
            }
            Err(err) => {
                tracing::error!(error = %err, "error generating {}", kind.title());
                vec![Effect::Notify(Notice::error(format!(
                    "Network error generating {}",
                    kind.title()
                )))]
            }
        }
    }

    fn generate_report(&self) -> Vec<Effect> {
        let Some(session_id) = self.session_id.clone() else {
            return vec![Effect::Notify(Notice::error(
                "No completed session to generate report",
            ))];
        };
        tracing::info!(session_id = %session_id, "generating HTML report");
        vec![Effect::FetchReport { session_id }]
    }

    fn on_report_fetched(result: Result<ReportResponse, ApiError>) -> Vec<Effect> {
        match result {
            Ok(response) => match response.into_html() {
                Some(html) => vec![Effect::OpenReport { html }],
                None => vec![Effect::Notify(Notice::error("Failed to generate HTML report"))],
            },
            Err(err) => {
                tracing::error!(error = %err, "error generating HTML report");
                vec![Effect::Notify(Notice::error(
                    "Network error generating HTML report",
                ))]
            }
        }
    }

    // ============================================================================
    // Stop / pause
    // ============================================================================

    fn stop(&mut self) -> Vec<Effect> {
        self.phase = SessionPhase::Idle;
        self.session_id = None;
        self.mode = None;
        self.started_at = None;

        for slot in AgentSlot::all() {
            self.page.set_slot(*slot, Badge::Stopped, "Stopped", "Ready");
        }
        tracing::info!("processing stopped");

        vec![
            Effect::StopPolling,
            Effect::Notify(Notice::success("Processing stopped")),
        ]
    }

    fn pause() -> Vec<Effect> {
        tracing::debug!("pause requested but not supported");
        vec![Effect::Notify(Notice::error("Pause functionality coming soon"))]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn controller_with_prompt(prompt: &str) -> Controller {
        let mut controller = Controller::new(HostLayout::complete());
        controller.page_mut().set_prompt(prompt);
        controller
    }

    fn started(session_id: &str) -> Result<StartResponse, ApiError> {
        Ok(serde_json::from_value(json!({"status": "started", "session_id": session_id})).unwrap())
    }

    fn status(body: serde_json::Value) -> Result<StatusResponse, ApiError> {
        Ok(serde_json::from_value(body).unwrap())
    }

    fn decode_error() -> ApiError {
        ApiError::Decode {
            url: "http://relay.test".to_string(),
            source: serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
        }
    }

    /// Starts `mode` and feeds a successful start response.
    fn start_session(controller: &mut Controller, mode: Mode, session_id: &str) -> Vec<Effect> {
        let effects = controller.update(Action::Press(Button::StartMode(mode)));
        let attempt = effects
            .iter()
            .find_map(|e| match e {
                Effect::StartSession { attempt, .. } => Some(*attempt),
                _ => None,
            })
            .expect("start effect");
        controller.update(Action::SessionStarted {
            attempt,
            mode,
            result: started(session_id),
        })
    }

    fn has_network_effect(effects: &[Effect]) -> bool {
        effects.iter().any(|e| {
            matches!(
                e,
                Effect::StartSession { .. }
                    | Effect::StartPolling { .. }
                    | Effect::FetchSummary { .. }
                    | Effect::FetchReport { .. }
            )
        })
    }

    #[test]
    fn test_empty_prompt_issues_no_request() {
        let mut controller = controller_with_prompt("   ");
        let effects = controller.update(Action::Press(Button::StartMode(Mode::ExpertPanel)));

        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::error("Please enter a prompt first"))]
        );
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(!controller.page().progress_visible());
    }

    #[test]
    fn test_missing_prompt_input_counts_as_empty() {
        let mut controller = Controller::new(HostLayout {
            prompt_input: false,
            ..HostLayout::complete()
        });
        let effects = controller.update(Action::Press(Button::StartMode(Mode::ConferenceChain)));
        assert!(!has_network_effect(&effects));
    }

    #[test]
    fn test_start_prepares_page_and_requests_session() {
        let mut controller = controller_with_prompt("  design a bridge ");
        let effects = controller.update(Action::Press(Button::StartMode(Mode::ConferenceChain)));

        assert_eq!(
            effects,
            vec![
                Effect::StopPolling,
                Effect::StartSession {
                    attempt: 1,
                    mode: Mode::ConferenceChain,
                    request: StartRequest {
                        prompt: "design a bridge".to_string(),
                        max_agents: Some(20),
                    },
                },
            ]
        );
        assert_eq!(controller.phase(), SessionPhase::Starting);

        let progress = controller.page().progress().unwrap();
        assert!(progress.visible);
        assert_eq!(progress.counter(), "0 / 20 agents");

        let slot_a = controller.page().slot(AgentSlot::A).unwrap();
        let slot_b = controller.page().slot(AgentSlot::B).unwrap();
        assert_eq!(slot_a.badge, Badge::Initializing);
        assert_eq!(slot_b.badge, Badge::Initializing);
        assert_eq!(slot_a.agent, "Initializing...");
        assert_eq!(slot_b.agent, "Waiting...");
    }

    #[test]
    fn test_started_response_begins_polling() {
        let mut controller = controller_with_prompt("prompt");
        let effects = start_session(&mut controller, Mode::ExpertPanel, "sess-1");

        assert_eq!(
            effects,
            vec![Effect::StartPolling {
                session_id: "sess-1".to_string()
            }]
        );
        assert_eq!(controller.phase(), SessionPhase::Polling);
        assert_eq!(controller.session_id(), Some("sess-1"));
    }

    #[test]
    fn test_rejected_start_returns_to_idle() {
        let mut controller = controller_with_prompt("prompt");
        controller.update(Action::Press(Button::StartMode(Mode::ExpertPanel)));
        let effects = controller.update(Action::SessionStarted {
            attempt: 1,
            mode: Mode::ExpertPanel,
            result: Ok(serde_json::from_value(json!({"status": "error"})).unwrap()),
        });

        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::error("Failed to start Expert Panel Mode"))]
        );
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert_eq!(controller.session_id(), None);
    }

    #[test]
    fn test_network_error_on_start_returns_to_idle() {
        let mut controller = controller_with_prompt("prompt");
        controller.update(Action::Press(Button::StartMode(Mode::ConferenceChain)));
        let effects = controller.update(Action::SessionStarted {
            attempt: 1,
            mode: Mode::ConferenceChain,
            result: Err(decode_error()),
        });

        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::error(
                "Network error starting Conference Chain Mode"
            ))]
        );
        assert_eq!(controller.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_second_start_stops_previous_timer_first() {
        let mut controller = controller_with_prompt("prompt");
        start_session(&mut controller, Mode::ExpertPanel, "sess-1");

        let effects = controller.update(Action::Press(Button::StartMode(Mode::ConferenceChain)));
        assert_eq!(effects.first(), Some(&Effect::StopPolling));
        assert_eq!(controller.session_id(), None);

        // Late polls for the old session no longer render.
        let late = controller.update(Action::StatusPolled {
            session_id: "sess-1".to_string(),
            received_at: Instant::now(),
            result: status(json!({
                "status": "success",
                "session_data": {"mode": "expert_panel", "status": "completed"}
            })),
        });
        assert!(late.is_empty());
        assert_eq!(controller.phase(), SessionPhase::Starting);
    }

    #[test]
    fn test_superseded_start_response_is_dropped() {
        let mut controller = controller_with_prompt("prompt");
        controller.update(Action::Press(Button::StartMode(Mode::ExpertPanel)));
        controller.update(Action::Press(Button::StartMode(Mode::ExpertPanel)));

        let effects = controller.update(Action::SessionStarted {
            attempt: 1,
            mode: Mode::ExpertPanel,
            result: started("old"),
        });
        assert!(effects.is_empty());
        assert_eq!(controller.session_id(), None);
    }

    #[test]
    fn test_expert_panel_status_renders_progress() {
        let mut controller = controller_with_prompt("prompt");
        start_session(&mut controller, Mode::ExpertPanel, "sess-1");

        let effects = controller.update(Action::StatusPolled {
            session_id: "sess-1".to_string(),
            received_at: Instant::now(),
            result: status(json!({
                "status": "success",
                "session_data": {
                    "mode": "expert_panel",
                    "status": "running",
                    "current_pair": 4,
                    "total_pairs": 10,
                    "current_agents": ["Historian", "Biologist"]
                }
            })),
        });
        assert!(effects.is_empty());

        let progress = controller.page().progress().unwrap();
        assert!((progress.percent - 40.0).abs() < f64::EPSILON);
        assert_eq!(progress.processing, "Pair 4/10: Historian + Biologist");

        let slot_a = controller.page().slot(AgentSlot::A).unwrap();
        assert_eq!(slot_a.agent, "Historian");
        assert_eq!(slot_a.specialty, "Expert Panel - Agent A");
        assert_eq!(slot_a.badge, Badge::Processing);
        let slot_b = controller.page().slot(AgentSlot::B).unwrap();
        assert_eq!(slot_b.agent, "Biologist");
    }

    #[test]
    fn test_conference_chain_status_renders_progress() {
        let mut controller = controller_with_prompt("prompt");
        start_session(&mut controller, Mode::ConferenceChain, "sess-2");

        controller.update(Action::StatusPolled {
            session_id: "sess-2".to_string(),
            received_at: Instant::now(),
            result: status(json!({
                "status": "success",
                "session_data": {
                    "mode": "conference_chain",
                    "status": "running",
                    "current_agent": 5,
                    "total_agents": 20,
                    "current_agent_name": "Strategist"
                }
            })),
        });

        let progress = controller.page().progress().unwrap();
        assert!((progress.percent - 25.0).abs() < f64::EPSILON);
        assert_eq!(progress.processing, "Agent 5/20: Strategist");
        assert_eq!(
            controller.page().slot(AgentSlot::B).unwrap().agent,
            "Building Context..."
        );
    }

    #[test]
    fn test_poll_failures_are_ignored() {
        let mut controller = controller_with_prompt("prompt");
        start_session(&mut controller, Mode::ExpertPanel, "sess-1");

        let effects = controller.update(Action::StatusPolled {
            session_id: "sess-1".to_string(),
            received_at: Instant::now(),
            result: Err(decode_error()),
        });
        assert!(effects.is_empty());

        let effects = controller.update(Action::StatusPolled {
            session_id: "sess-1".to_string(),
            received_at: Instant::now(),
            result: status(json!({"status": "error"})),
        });
        assert!(effects.is_empty());
        assert_eq!(controller.phase(), SessionPhase::Polling);
    }

    #[test]
    fn test_completed_status_stops_polling_and_reveals_summaries() {
        let mut controller = controller_with_prompt("prompt");
        start_session(&mut controller, Mode::ExpertPanel, "sess-1");

        let effects = controller.update(Action::StatusPolled {
            session_id: "sess-1".to_string(),
            received_at: Instant::now(),
            result: status(json!({
                "status": "success",
                "session_data": {
                    "mode": "expert_panel",
                    "status": "completed",
                    "current_pair": 10,
                    "total_pairs": 10,
                    "current_agents": ["X", "Y"],
                    "results": [{}, {}, {}]
                }
            })),
        });

        assert_eq!(
            effects,
            vec![
                Effect::StopPolling,
                Effect::Notify(Notice::success(
                    "expert panel completed! 3 responses generated."
                )),
            ]
        );
        assert_eq!(controller.phase(), SessionPhase::Completed);
        assert!(controller.page().summary_visible());
        assert!(controller.page().buttons().contains(&Button::HtmlReport));
        for slot in AgentSlot::all() {
            let status = controller.page().slot(*slot).unwrap();
            assert_eq!(status.badge, Badge::Completed);
            assert_eq!(status.agent, "Completed");
        }

        // The session id stays available for summaries.
        assert_eq!(controller.session_id(), Some("sess-1"));
    }

    #[test]
    fn test_stop_without_session_is_noop_reset() {
        let mut controller = controller_with_prompt("");
        let effects = controller.update(Action::Press(Button::Stop));
        let again = controller.update(Action::Press(Button::Stop));

        assert_eq!(effects, again);
        assert_eq!(effects[0], Effect::StopPolling);
        assert_eq!(controller.phase(), SessionPhase::Idle);
        for slot in AgentSlot::all() {
            let status = controller.page().slot(*slot).unwrap();
            assert_eq!(status.agent, "Stopped");
            assert_eq!(status.specialty, "Ready");
        }
    }

    #[test]
    fn test_stop_clears_active_session() {
        let mut controller = controller_with_prompt("prompt");
        start_session(&mut controller, Mode::ConferenceChain, "sess-3");

        controller.update(Action::Press(Button::Stop));
        assert_eq!(controller.session_id(), None);
        assert_eq!(controller.mode(), None);
        assert_eq!(controller.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_summary_without_session_issues_no_request() {
        let mut controller = controller_with_prompt("prompt");
        for kind in SummaryKind::all() {
            let effects = controller.update(Action::Press(Button::Summary(*kind)));
            assert_eq!(
                effects,
                vec![Effect::Notify(Notice::error("No completed session to summarize"))]
            );
        }

        let effects = controller.update(Action::Press(Button::HtmlReport));
        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::error(
                "No completed session to generate report"
            ))]
        );
    }

    #[test]
    fn test_summary_success_opens_modal() {
        let mut controller = controller_with_prompt("prompt");
        start_session(&mut controller, Mode::ExpertPanel, "sess-1");

        let effects = controller.update(Action::Press(Button::Summary(SummaryKind::Creative)));
        assert_eq!(
            effects,
            vec![Effect::FetchSummary {
                kind: SummaryKind::Creative,
                session_id: "sess-1".to_string()
            }]
        );

        let effects = controller.update(Action::SummaryFetched {
            kind: SummaryKind::Creative,
            result: Ok(serde_json::from_value(
                json!({"status": "success", "synthesis": {"idea": "kites"}}),
            )
            .unwrap()),
        });
        assert!(effects.is_empty());

        let modal = controller.page().top_modal().unwrap();
        assert_eq!(modal.title, "Creative Synthesis");
        assert_eq!(modal.body, "{\n  \"idea\": \"kites\"\n}");

        assert_eq!(
            controller.update(Action::CopyModal),
            vec![Effect::CopyToClipboard {
                text: "{\n  \"idea\": \"kites\"\n}".to_string()
            }]
        );
        controller.update(Action::CloseModal);
        assert!(controller.page().top_modal().is_none());
    }

    #[test]
    fn test_summary_failures_name_the_summary() {
        let mut controller = controller_with_prompt("prompt");
        let rejected = controller.update(Action::SummaryFetched {
            kind: SummaryKind::Business,
            result: Ok(serde_json::from_value(json!({"status": "error"})).unwrap()),
        });
        assert_eq!(
            rejected,
            vec![Effect::Notify(Notice::error("Failed to generate Business Analysis"))]
        );

        let network = controller.update(Action::SummaryFetched {
            kind: SummaryKind::Business,
            result: Err(decode_error()),
        });
        assert_eq!(
            network,
            vec![Effect::Notify(Notice::error(
                "Network error generating Business Analysis"
            ))]
        );
    }

    #[test]
    fn test_report_success_opens_html() {
        let mut controller = controller_with_prompt("prompt");
        let effects = controller.update(Action::ReportFetched {
            result: Ok(serde_json::from_value(
                json!({"status": "success", "html_report": "<h1>Report</h1>"}),
            )
            .unwrap()),
        });
        assert_eq!(
            effects,
            vec![Effect::OpenReport {
                html: "<h1>Report</h1>".to_string()
            }]
        );

        let effects = controller.update(Action::ReportFetched {
            result: Ok(serde_json::from_value(json!({"status": "error"})).unwrap()),
        });
        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::error("Failed to generate HTML report"))]
        );
    }

    #[test]
    fn test_pause_is_not_supported() {
        let mut controller = controller_with_prompt("prompt");
        assert_eq!(
            controller.update(Action::Press(Button::Pause)),
            vec![Effect::Notify(Notice::error("Pause functionality coming soon"))]
        );
    }

    #[test]
    fn test_polling_abandoned_surfaces_error() {
        let mut controller = controller_with_prompt("prompt");
        start_session(&mut controller, Mode::ExpertPanel, "sess-1");

        let effects = controller.update(Action::PollingAbandoned {
            session_id: "sess-1".to_string(),
            failures: 3,
        });
        assert_eq!(effects[0], Effect::StopPolling);
        assert!(matches!(
            &effects[1],
            Effect::Notify(Notice { level: NoticeLevel::Error, .. })
        ));
        assert_eq!(controller.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_notice_display() {
        assert_eq!(Notice::error("boom").to_string(), "Error: boom");
        assert_eq!(Notice::success("done").to_string(), "Success: done");
    }
}
