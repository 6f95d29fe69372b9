//! Dashboard runtime: owns the terminal, runs the event loop, executes effects.
//!
//! Effect results arrive on an inbox channel that is drained every frame;
//! terminal input is polled synchronously between drains.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event;
use relay_core::api::ApiClient;
use relay_core::controller::Action;
use relay_core::driver::{Driver, PollSettings};
use tokio::sync::mpsc;

use crate::events::UiEvent;
use crate::state::DashboardState;
use crate::terminal::{self, DashboardTerminal};
use crate::{render, update};

/// Poll duration while nothing is pending.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

pub struct DashboardRuntime {
    terminal: DashboardTerminal,
    pub state: DashboardState,
    driver: Driver<ApiClient>,
    inbox_rx: mpsc::UnboundedReceiver<Action>,
}

impl DashboardRuntime {
    /// Enters the alternate screen. Must be called inside a tokio runtime.
    pub fn new(state: DashboardState, client: ApiClient, settings: PollSettings) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let driver = Driver::new(Arc::new(client), inbox_tx, settings);

        Ok(Self {
            terminal,
            state,
            driver,
            inbox_rx,
        })
    }

    /// Runs until the user quits, then restores the terminal.
    pub fn run(&mut self) -> Result<()> {
        let result = self.event_loop();
        self.driver.stop_polling();
        let restored = terminal::restore_terminal();
        result.and(restored)
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }

            let events = self.collect_events()?;
            for event in events {
                dirty = true;
                let effects = update::update(&mut self.state, event);
                self.driver.execute(effects, &mut self.state);
            }
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();
        while let Ok(action) = self.inbox_rx.try_recv() {
            events.push(UiEvent::Relay(action));
        }

        // Don't delay pending results behind a blocking terminal poll.
        let poll_duration = if events.is_empty() {
            IDLE_POLL_DURATION
        } else {
            Duration::ZERO
        };
        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        Ok(events)
    }
}
