//! Session domain types: modes, summary kinds, lifecycle phases and the
//! status snapshot decoded from poll responses.

use std::fmt;
use std::str::FromStr;

use crate::api::types::SessionData;

/// Relay mode selected at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Ten independent expert pairs.
    ExpertPanel,
    /// Twenty agents sharing a sticky context.
    ConferenceChain,
}

impl Mode {
    pub fn all() -> &'static [Mode] {
        &[Mode::ExpertPanel, Mode::ConferenceChain]
    }

    /// Identifier used on the wire (`session_data.mode`).
    pub fn wire_name(self) -> &'static str {
        match self {
            Mode::ExpertPanel => "expert_panel",
            Mode::ConferenceChain => "conference_chain",
        }
    }

    /// Identifier used on the command line.
    pub fn cli_name(self) -> &'static str {
        match self {
            Mode::ExpertPanel => "expert-panel",
            Mode::ConferenceChain => "conference-chain",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::ExpertPanel => "Expert Panel",
            Mode::ConferenceChain => "Conference Chain",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::ExpertPanel => "10 Independent Expert Pairs",
            Mode::ConferenceChain => "20 Agents with Sticky Context",
        }
    }

    /// Number of work units the backend runs for this mode.
    pub fn default_total(self) -> u32 {
        match self {
            Mode::ExpertPanel => 10,
            Mode::ConferenceChain => 20,
        }
    }

    /// Progress unit shown next to the counter.
    pub fn unit(self) -> &'static str {
        match self {
            Mode::ExpertPanel => "pairs",
            Mode::ConferenceChain => "agents",
        }
    }

    pub fn from_wire(name: &str) -> Option<Mode> {
        Mode::all().iter().copied().find(|m| m.wire_name() == name)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Mode::all()
            .iter()
            .copied()
            .find(|m| m.cli_name() == normalized)
            .ok_or_else(|| {
                format!("unknown mode '{s}' (expected expert-panel or conference-chain)")
            })
    }
}

/// Post-completion summary types offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKind {
    Executive,
    Technical,
    Creative,
    Business,
    Comprehensive,
}

impl SummaryKind {
    pub fn all() -> &'static [SummaryKind] {
        &[
            SummaryKind::Executive,
            SummaryKind::Technical,
            SummaryKind::Creative,
            SummaryKind::Business,
            SummaryKind::Comprehensive,
        ]
    }

    /// Path segment used by `/api/summary/{type}/{session_id}`.
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryKind::Executive => "executive",
            SummaryKind::Technical => "technical",
            SummaryKind::Creative => "creative",
            SummaryKind::Business => "business",
            SummaryKind::Comprehensive => "comprehensive",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SummaryKind::Executive => "Executive Summary",
            SummaryKind::Technical => "Technical Synthesis",
            SummaryKind::Creative => "Creative Synthesis",
            SummaryKind::Business => "Business Analysis",
            SummaryKind::Comprehensive => "Comprehensive Report",
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        SummaryKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown summary type '{s}' (expected executive, technical, creative, business or comprehensive)"
                )
            })
    }
}

/// Controller lifecycle.
///
/// `Idle -> Starting -> Polling -> Completed`. Stop returns to `Idle` from
/// anywhere; a failed start returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Starting,
    Polling,
    Completed,
}

impl SessionPhase {
    pub fn label(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Starting => "starting",
            SessionPhase::Polling => "polling",
            SessionPhase::Completed => "completed",
        }
    }
}

/// Backend status string marking a finished session.
pub const STATUS_COMPLETED: &str = "completed";

const DEFAULT_AGENT_A: &str = "Initializing...";
const DEFAULT_AGENT_B: &str = "Waiting...";

/// Mode-specific progress carried by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    ExpertPanel {
        current_pair: u32,
        total_pairs: u32,
        agents: [String; 2],
    },
    ConferenceChain {
        current_agent: u32,
        total_agents: u32,
        agent_name: String,
    },
    /// A mode this client does not know how to render.
    Unknown,
}

impl Stage {
    /// Returns `(current, total)` for the progress bar.
    pub fn counts(&self) -> Option<(u32, u32)> {
        match self {
            Stage::ExpertPanel {
                current_pair,
                total_pairs,
                ..
            } => Some((*current_pair, *total_pairs)),
            Stage::ConferenceChain {
                current_agent,
                total_agents,
                ..
            } => Some((*current_agent, *total_agents)),
            Stage::Unknown => None,
        }
    }

    /// The "current processing" label.
    pub fn label(&self) -> Option<String> {
        match self {
            Stage::ExpertPanel {
                current_pair,
                total_pairs,
                agents,
            } => Some(format!(
                "Pair {current_pair}/{total_pairs}: {} + {}",
                agents[0], agents[1]
            )),
            Stage::ConferenceChain {
                current_agent,
                total_agents,
                agent_name,
            } => Some(format!("Agent {current_agent}/{total_agents}: {agent_name}")),
            Stage::Unknown => None,
        }
    }
}

/// Point-in-time session status decoded from one poll response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Raw mode name as reported by the backend.
    pub mode_name: String,
    /// Overall session status (e.g. "running", "completed").
    pub status: String,
    pub stage: Stage,
    pub result_count: usize,
}

impl SessionSnapshot {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }

    /// Mode name with its first underscore replaced, e.g. "expert panel".
    pub fn display_mode(&self) -> String {
        self.mode_name.replacen('_', " ", 1)
    }
}

fn nonzero_or(value: Option<u32>, default: u32) -> u32 {
    value.filter(|v| *v > 0).unwrap_or(default)
}

fn name_or(value: Option<&String>, default: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

impl From<SessionData> for SessionSnapshot {
    fn from(data: SessionData) -> Self {
        let stage = match Mode::from_wire(&data.mode) {
            Some(Mode::ExpertPanel) => {
                let agents = data.current_agents.unwrap_or_default();
                Stage::ExpertPanel {
                    current_pair: data.current_pair.unwrap_or(0),
                    total_pairs: nonzero_or(data.total_pairs, Mode::ExpertPanel.default_total()),
                    agents: [
                        name_or(agents.first(), DEFAULT_AGENT_A),
                        name_or(agents.get(1), DEFAULT_AGENT_B),
                    ],
                }
            }
            Some(Mode::ConferenceChain) => Stage::ConferenceChain {
                current_agent: data.current_agent.unwrap_or(0),
                total_agents: nonzero_or(data.total_agents, Mode::ConferenceChain.default_total()),
                agent_name: name_or(data.current_agent_name.as_ref(), DEFAULT_AGENT_A),
            },
            None => Stage::Unknown,
        };

        Self {
            mode_name: data.mode,
            status: data.status,
            stage,
            result_count: data.results.map_or(0, |r| r.len()),
        }
    }
}
