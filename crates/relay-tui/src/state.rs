//! Dashboard state.
//!
//! Wraps the relay controller with the terminal-only concerns: keyboard
//! focus, the notice queue, modal scrolling and the quit flag.

use std::collections::VecDeque;

use relay_core::controller::{Controller, Notice};
use relay_core::driver::Surface;
use relay_core::page::{Button, HostLayout};
use relay_core::report;

use crate::clipboard;

#[derive(Debug)]
pub struct DashboardState {
    pub controller: Controller,
    /// Focused button; `None` focuses the prompt input.
    pub focus: Option<Button>,
    /// Pending notices, oldest first. The front one is shown and blocks input.
    pub notices: VecDeque<Notice>,
    pub modal_scroll: u16,
    pub backend_url: String,
    pub should_quit: bool,
}

impl DashboardState {
    pub fn new(controller: Controller, backend_url: impl Into<String>) -> Self {
        Self {
            controller,
            focus: None,
            notices: VecDeque::new(),
            modal_scroll: 0,
            backend_url: backend_url.into(),
            should_quit: false,
        }
    }

    /// A dashboard over a fully-anchored page.
    pub fn with_defaults(conference_max_agents: u32, backend_url: impl Into<String>) -> Self {
        let controller = Controller::new(HostLayout::complete())
            .with_conference_max_agents(conference_max_agents);
        Self::new(controller, backend_url)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    pub fn prompt_focused(&self) -> bool {
        self.focus.is_none()
    }

    /// Focus targets in tab order: the prompt, then every visible button.
    fn focus_targets(&self) -> Vec<Option<Button>> {
        std::iter::once(None)
            .chain(self.controller.page().buttons().into_iter().map(Some))
            .collect()
    }

    /// Moves focus to the next (or previous) target, wrapping around.
    pub fn cycle_focus(&mut self, forward: bool) {
        let targets = self.focus_targets();
        let current = targets.iter().position(|t| *t == self.focus).unwrap_or(0);
        let len = targets.len();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.focus = targets[next];
    }

    /// Drops focus from a button that is no longer visible.
    pub fn revalidate_focus(&mut self) {
        if let Some(button) = self.focus
            && !self.controller.page().buttons().contains(&button)
        {
            self.focus = None;
        }
    }
}

impl Surface for DashboardState {
    fn notify(&mut self, notice: &Notice) {
        tracing::debug!(notice = %notice, "dashboard notice");
        self.notices.push_back(notice.clone());
    }

    fn open_report(&mut self, html: &str) -> anyhow::Result<()> {
        report::open_report(html)?;
        Ok(())
    }

    fn copy_to_clipboard(&mut self, text: &str) -> anyhow::Result<()> {
        clipboard::copy(text)?;
        Ok(())
    }
}
