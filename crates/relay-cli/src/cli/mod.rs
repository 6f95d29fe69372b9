//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use relay_core::config::{self, BACKEND_URL_ENV};
use relay_core::logging;
use relay_core::session::{Mode, SummaryKind};

pub mod commands;

#[derive(Parser)]
#[command(name = "relay")]
#[command(version)]
#[command(about = "Relay multi-agent session client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the relay service (overrides the config file)
    #[arg(long, global = true, env = BACKEND_URL_ENV, value_name = "URL")]
    backend_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the interactive dashboard (default)
    Dashboard,

    /// Run a session without the dashboard and print its progress
    Run {
        /// Relay mode (expert-panel or conference-chain)
        #[arg(short, long)]
        mode: Mode,

        /// The problem statement for the agents
        #[arg(short, long)]
        prompt: String,

        /// Summary to print after completion (repeatable)
        #[arg(short, long = "summary", value_name = "KIND")]
        summaries: Vec<SummaryKind>,

        /// Write the HTML report to this path after completion
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Show the status of a session
    Status {
        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },

    /// Print a summary of a completed session
    Summary {
        /// executive, technical, creative, business or comprehensive
        #[arg(value_name = "KIND")]
        kind: SummaryKind,

        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },

    /// Generate the HTML report of a completed session
    Report {
        #[arg(value_name = "SESSION_ID")]
        session_id: String,

        /// Write the report here instead of opening it in the browser
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from defaults
    Generate,
    /// Set the relay service URL in the config file
    SetBackend {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        backend_url,
    } = cli;

    // Config commands work on the file itself; don't fail them on a bad file.
    if let Some(Commands::Config { command }) = command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
            ConfigCommands::SetBackend { url } => commands::config::set_backend(&url),
        };
    }

    let mut config = config::Config::load()
        .context("load config")?
        .with_env_overrides();
    // The flag wins over the environment.
    if let Some(url) = backend_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        config.backend_url = url.to_string();
    }

    let Some(command) = command else {
        return commands::dashboard::run(&config);
    };

    if !matches!(command, Commands::Dashboard) {
        logging::init_stderr(&config);
    }

    match command {
        Commands::Dashboard => commands::dashboard::run(&config),
        Commands::Run {
            mode,
            prompt,
            summaries,
            report,
        } => {
            commands::run::run(commands::run::RunOptions {
                config: &config,
                mode,
                prompt: &prompt,
                summaries: &summaries,
                report: report.as_deref(),
            })
            .await
        }
        Commands::Status { session_id } => commands::session::status(&config, &session_id).await,
        Commands::Summary { kind, session_id } => {
            commands::session::summary(&config, kind, &session_id).await
        }
        Commands::Report { session_id, output } => {
            commands::session::report(&config, &session_id, output.as_deref()).await
        }
        Commands::Config { .. } => Ok(()),
    }
}
