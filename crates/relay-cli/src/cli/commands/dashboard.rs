//! Dashboard command handler.

use anyhow::Result;
use relay_core::config::Config;

#[cfg(feature = "tui")]
pub fn run(config: &Config) -> Result<()> {
    // The dashboard owns the terminal, so logs go to a file.
    let _guard = relay_core::logging::init_file(config)?;
    relay_tui::run_dashboard(config)
}

#[cfg(not(feature = "tui"))]
pub fn run(_config: &Config) -> Result<()> {
    anyhow::bail!(
        "This build has no dashboard.\n\
         Use `relay run --mode <mode> --prompt '...'` instead."
    )
}
