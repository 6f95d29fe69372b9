//! Host page view model.
//!
//! The controller never touches a concrete UI. It augments and updates this
//! model, and hosts (terminal dashboard, headless console) render it.
//!
//! The host declares which of its own elements exist through `HostLayout`.
//! Widgets the controller inserts hang off those anchors and are `None` when
//! the anchor is missing, in which case every update to them is a no-op.

use std::time::Duration;

use crate::session::{Mode, SummaryKind};

/// Pre-existing host elements the controller can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLayout {
    /// Container receiving the mode selection buttons.
    pub mode_container: bool,
    /// The two agent display slots ("A" and "B").
    pub agent_slots: bool,
    /// Conversation area; the progress panel is inserted before it.
    pub conversation_area: bool,
    /// Prompt text input.
    pub prompt_input: bool,
}

impl HostLayout {
    /// A host providing every anchor.
    pub fn complete() -> Self {
        Self {
            mode_container: true,
            agent_slots: true,
            conversation_area: true,
            prompt_input: true,
        }
    }
}

impl Default for HostLayout {
    fn default() -> Self {
        Self::complete()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentSlot {
    A,
    B,
}

impl AgentSlot {
    pub fn all() -> &'static [AgentSlot] {
        &[AgentSlot::A, AgentSlot::B]
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentSlot::A => "A",
            AgentSlot::B => "B",
        }
    }

    fn index(self) -> usize {
        match self {
            AgentSlot::A => 0,
            AgentSlot::B => 1,
        }
    }
}

/// Status badge shown on an agent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Badge {
    #[default]
    Ready,
    Initializing,
    Processing,
    Completed,
    Stopped,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::Ready => "Ready",
            Badge::Initializing => "Initializing...",
            Badge::Processing => "Processing",
            Badge::Completed => "Completed",
            Badge::Stopped => "Stopped",
        }
    }
}

/// Status widget inserted at the top of an agent slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStatus {
    pub badge: Badge,
    pub agent: String,
    pub specialty: String,
}

impl Default for SlotStatus {
    fn default() -> Self {
        Self {
            badge: Badge::Ready,
            agent: "Select Mode".to_string(),
            specialty: "Choose a relay mode".to_string(),
        }
    }
}

/// Progress panel inserted before the conversation area.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressPanel {
    pub visible: bool,
    pub title: String,
    pub unit: String,
    pub current: u32,
    pub total: u32,
    /// Fill width of the bar, 0..=100.
    pub percent: f64,
    /// "Current:" line.
    pub processing: String,
    /// "Est. Time:" line, `mm:ss` or `--:--`.
    pub estimated: String,
}

impl ProgressPanel {
    fn hidden() -> Self {
        Self {
            visible: false,
            title: "Processing Status".to_string(),
            unit: "Agents".to_string(),
            current: 0,
            total: 0,
            percent: 0.0,
            processing: "Ready to start".to_string(),
            estimated: UNKNOWN_ETA.to_string(),
        }
    }

    /// "c / t unit" counter text.
    pub fn counter(&self) -> String {
        format!("{} / {} {}", self.current, self.total, self.unit)
    }
}

/// Summary/report action panel, revealed on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryPanel {
    pub visible: bool,
}

/// Modal overlay displaying a generated summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryModal {
    pub title: String,
    /// Pretty-printed JSON content.
    pub body: String,
}

/// Clickable controls the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    StartMode(Mode),
    Pause,
    Stop,
    Summary(SummaryKind),
    HtmlReport,
}

impl Button {
    pub fn label(self) -> String {
        match self {
            Button::StartMode(mode) => format!("{} Mode", mode.label()),
            Button::Pause => "Pause".to_string(),
            Button::Stop => "Stop".to_string(),
            Button::Summary(kind) => kind.title().to_string(),
            Button::HtmlReport => "HTML Report".to_string(),
        }
    }
}

pub const UNKNOWN_ETA: &str = "--:--";

/// Formats a remaining duration as `mm:ss` (minutes uncapped).
pub fn format_eta(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Extrapolates the time left from the elapsed time and completed units.
pub fn estimate_remaining(elapsed: Duration, current: u32, total: u32) -> Option<Duration> {
    if current == 0 || total == 0 || current > total {
        return None;
    }
    let per_unit = elapsed.as_secs_f64() / f64::from(current);
    let remaining = per_unit * f64::from(total - current);
    remaining.is_finite().then(|| Duration::from_secs_f64(remaining))
}

/// The augmented host page.
#[derive(Debug, Clone)]
pub struct Page {
    layout: HostLayout,
    /// Prompt input contents; `None` when the host has no prompt input.
    prompt: Option<String>,
    mode_controls: bool,
    slots: Option<[SlotStatus; 2]>,
    progress: Option<ProgressPanel>,
    summary: Option<SummaryPanel>,
    modals: Vec<SummaryModal>,
}

impl Page {
    /// Creates an un-augmented page for a host with the given layout.
    pub fn new(layout: HostLayout) -> Self {
        Self {
            layout,
            prompt: layout.prompt_input.then(String::new),
            mode_controls: false,
            slots: None,
            progress: None,
            summary: None,
            modals: Vec::new(),
        }
    }

    pub fn layout(&self) -> HostLayout {
        self.layout
    }

    /// Inserts the controller's widgets wherever their anchors exist.
    ///
    /// Returns the names of skipped augmentation steps.
    pub fn augment(&mut self) -> Vec<&'static str> {
        let mut skipped = Vec::new();

        if self.layout.mode_container {
            self.mode_controls = true;
        } else {
            skipped.push("mode controls");
        }

        if self.layout.agent_slots {
            self.slots = Some([SlotStatus::default(), SlotStatus::default()]);
            if self.layout.conversation_area {
                self.progress = Some(ProgressPanel::hidden());
            } else {
                skipped.push("progress panel");
            }
        } else {
            skipped.push("agent slot status");
            skipped.push("progress panel");
        }

        if self.progress.is_some() {
            self.summary = Some(SummaryPanel::default());
        } else {
            skipped.push("summary controls");
        }

        skipped
    }

    // ============================================================================
    // Prompt input
    // ============================================================================

    /// Trimmed prompt text; empty when the host has no prompt input.
    pub fn prompt_text(&self) -> String {
        self.prompt.as_deref().map(str::trim).unwrap_or_default().to_string()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Mutable prompt contents for hosts that edit the input.
    pub fn prompt_mut(&mut self) -> Option<&mut String> {
        self.prompt.as_mut()
    }

    pub fn set_prompt(&mut self, text: impl Into<String>) {
        if let Some(prompt) = self.prompt.as_mut() {
            *prompt = text.into();
        }
    }

    // ============================================================================
    // Widgets
    // ============================================================================

    pub fn has_mode_controls(&self) -> bool {
        self.mode_controls
    }

    pub fn slot(&self, slot: AgentSlot) -> Option<&SlotStatus> {
        self.slots.as_ref().map(|s| &s[slot.index()])
    }

    pub fn progress(&self) -> Option<&ProgressPanel> {
        self.progress.as_ref()
    }

    pub fn summary_panel(&self) -> Option<&SummaryPanel> {
        self.summary.as_ref()
    }

    pub fn summary_visible(&self) -> bool {
        self.summary.is_some_and(|s| s.visible)
    }

    pub fn progress_visible(&self) -> bool {
        self.progress.as_ref().is_some_and(|p| p.visible)
    }

    pub fn set_slot(
        &mut self,
        slot: AgentSlot,
        badge: Badge,
        agent: impl Into<String>,
        specialty: impl Into<String>,
    ) {
        if let Some(slots) = self.slots.as_mut() {
            slots[slot.index()] = SlotStatus {
                badge,
                agent: agent.into(),
                specialty: specialty.into(),
            };
        }
    }

    /// Sets the badge of every slot, leaving names untouched.
    pub fn set_all_badges(&mut self, badge: Badge) {
        if let Some(slots) = self.slots.as_mut() {
            for slot in slots.iter_mut() {
                slot.badge = badge;
            }
        }
    }

    /// Reveals the progress panel sized for `total` units and resets it.
    pub fn show_progress(&mut self, title: impl Into<String>, total: u32, unit: &str) {
        if let Some(progress) = self.progress.as_mut() {
            progress.visible = true;
            progress.title = title.into();
            progress.unit = unit.to_string();
            progress.current = 0;
            progress.total = total;
            progress.percent = 0.0;
            progress.processing = "Starting...".to_string();
            progress.estimated = UNKNOWN_ETA.to_string();
        }
    }

    /// Updates the bar to `current / total`.
    pub fn set_progress(&mut self, current: u32, total: u32) {
        if let Some(progress) = self.progress.as_mut() {
            progress.current = current;
            progress.total = total;
            progress.percent = if total == 0 {
                0.0
            } else {
                (f64::from(current) / f64::from(total) * 100.0).clamp(0.0, 100.0)
            };
        }
    }

    pub fn set_processing_label(&mut self, label: impl Into<String>) {
        if let Some(progress) = self.progress.as_mut() {
            progress.processing = label.into();
        }
    }

    pub fn set_estimate(&mut self, remaining: Option<Duration>) {
        if let Some(progress) = self.progress.as_mut() {
            progress.estimated = remaining.map_or_else(|| UNKNOWN_ETA.to_string(), format_eta);
        }
    }

    pub fn show_summary_controls(&mut self) {
        if let Some(summary) = self.summary.as_mut() {
            summary.visible = true;
        }
    }

    // ============================================================================
    // Modals
    // ============================================================================

    pub fn push_modal(&mut self, modal: SummaryModal) {
        self.modals.push(modal);
    }

    pub fn top_modal(&self) -> Option<&SummaryModal> {
        self.modals.last()
    }

    pub fn close_modal(&mut self) -> Option<SummaryModal> {
        self.modals.pop()
    }

    pub fn modal_count(&self) -> usize {
        self.modals.len()
    }

    /// Visible buttons in document order.
    pub fn buttons(&self) -> Vec<Button> {
        let mut buttons = Vec::new();
        if self.mode_controls {
            buttons.extend(Mode::all().iter().map(|m| Button::StartMode(*m)));
        }
        if self.progress_visible() {
            buttons.push(Button::Pause);
            buttons.push(Button::Stop);
        }
        if self.summary_visible() {
            buttons.extend(SummaryKind::all().iter().map(|k| Button::Summary(*k)));
            buttons.push(Button::HtmlReport);
        }
        buttons
    }
}
