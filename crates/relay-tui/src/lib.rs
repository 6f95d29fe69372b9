//! Full-screen terminal dashboard for Relay.

pub mod clipboard;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr, stdout};

use anyhow::{Context, Result};
use relay_core::api::ApiClient;
use relay_core::config::Config;
use relay_core::driver::PollSettings;
pub use runtime::DashboardRuntime;

use crate::state::DashboardState;

/// Runs the interactive dashboard until the user quits.
///
/// Must be called from within a multi-threaded tokio runtime: requests and
/// the poll timer run as tasks while this thread drives the terminal.
pub fn run_dashboard(config: &Config) -> Result<()> {
    if !stdout().is_terminal() || !stderr().is_terminal() {
        anyhow::bail!(
            "The dashboard requires a terminal.\n\
             Use `relay run --mode <mode> --prompt '...'` for non-interactive runs."
        );
    }

    let backend_url = config.effective_backend_url();
    let client = ApiClient::from_config(config).context("create relay service client")?;
    tracing::info!(backend_url, "starting dashboard");

    let state = DashboardState::with_defaults(config.conference_max_agents, backend_url);
    let mut runtime = DashboardRuntime::new(state, client, PollSettings::from_config(config))?;
    runtime.run()?;

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
