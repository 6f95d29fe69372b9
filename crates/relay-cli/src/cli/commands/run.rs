//! Headless session runner.
//!
//! Drives the same controller as the dashboard, with a console surface:
//! progress lines and errors go to stderr, successes and summaries to stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use relay_core::api::ApiClient;
use relay_core::config::Config;
use relay_core::controller::{Action, Controller, Notice, NoticeLevel};
use relay_core::driver::{Driver, PollSettings, Surface};
use relay_core::page::{Button, HostLayout};
use relay_core::report;
use relay_core::session::{Mode, SessionPhase, SummaryKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Returned when the run was stopped with Ctrl+C.
#[derive(Debug, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

pub struct RunOptions<'a> {
    pub config: &'a Config,
    pub mode: Mode,
    pub prompt: &'a str,
    pub summaries: &'a [SummaryKind],
    pub report: Option<&'a Path>,
}

/// Console surface: prints notices and saves the report to a file.
struct Console {
    report_path: Option<PathBuf>,
    errors: usize,
}

impl Surface for Console {
    fn notify(&mut self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Error => {
                self.errors += 1;
                eprintln!("{notice}");
            }
            NoticeLevel::Success => println!("{notice}"),
        }
    }

    fn open_report(&mut self, html: &str) -> Result<()> {
        match &self.report_path {
            Some(path) => {
                report::save_report(path, html)?;
                println!("Report written to {}", path.display());
            }
            None => {
                let path = report::open_report(html)?;
                println!("Report opened from {}", path.display());
            }
        }
        Ok(())
    }

    fn copy_to_clipboard(&mut self, _text: &str) -> Result<()> {
        anyhow::bail!("no clipboard in headless mode")
    }
}

struct HeadlessRun {
    controller: Controller,
    driver: Driver<ApiClient>,
    inbox: mpsc::UnboundedReceiver<Action>,
    console: Console,
    interrupt: CancellationToken,
    announced: Option<String>,
    last_progress: Option<String>,
}

pub async fn run(options: RunOptions<'_>) -> Result<()> {
    let config = options.config;
    let client = ApiClient::from_config(config).context("create relay service client")?;
    let (inbox_tx, inbox) = mpsc::unbounded_channel();
    let driver = Driver::new(Arc::new(client), inbox_tx, PollSettings::from_config(config));

    let mut controller = Controller::new(HostLayout::complete())
        .with_conference_max_agents(config.conference_max_agents);
    controller.page_mut().set_prompt(options.prompt);

    let interrupt = CancellationToken::new();
    let signal = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    let mut run = HeadlessRun {
        controller,
        driver,
        inbox,
        console: Console {
            report_path: options.report.map(Path::to_path_buf),
            errors: 0,
        },
        interrupt,
        announced: None,
        last_progress: None,
    };

    eprintln!(
        "Starting {} Mode against {}",
        options.mode.label(),
        config.effective_backend_url()
    );
    tracing::debug!(mode = options.mode.label(), poll_ms = config.poll_interval_ms, "headless run");
    run.apply(Action::Press(Button::StartMode(options.mode)));

    if !run.wait_for_session().await? {
        anyhow::bail!("{} Mode session did not complete", options.mode.label());
    }

    for kind in options.summaries {
        run.apply(Action::Press(Button::Summary(*kind)));
        run.wait_for(|a| matches!(a, Action::SummaryFetched { .. }))
            .await?;
        run.print_modals();
    }

    if options.report.is_some() {
        run.apply(Action::Press(Button::HtmlReport));
        run.wait_for(|a| matches!(a, Action::ReportFetched { .. }))
            .await?;
    }

    if run.console.errors > 0 {
        anyhow::bail!("{} request(s) failed after completion", run.console.errors);
    }
    Ok(())
}

impl HeadlessRun {
    fn apply(&mut self, action: Action) {
        let effects = self.controller.update(action);
        self.driver.execute(effects, &mut self.console);
        self.print_progress();
    }

    async fn next_action(&mut self) -> Result<Action> {
        tokio::select! {
            () = self.interrupt.cancelled() => {
                tracing::info!("interrupted, stopping session");
                self.apply(Action::Press(Button::Stop));
                Err(Interrupted.into())
            }
            action = self.inbox.recv() => action.context("relay driver stopped unexpectedly"),
        }
    }

    /// Runs until the session completes (`true`) or ends without completing.
    async fn wait_for_session(&mut self) -> Result<bool> {
        loop {
            match self.controller.phase() {
                SessionPhase::Completed => return Ok(true),
                SessionPhase::Idle => return Ok(false),
                SessionPhase::Starting | SessionPhase::Polling => {}
            }
            let action = self.next_action().await?;
            self.apply(action);
        }
    }

    /// Applies actions until one matching `done` has been applied.
    async fn wait_for(&mut self, done: impl Fn(&Action) -> bool) -> Result<()> {
        loop {
            let action = self.next_action().await?;
            let finished = done(&action);
            self.apply(action);
            if finished {
                return Ok(());
            }
        }
    }

    fn print_progress(&mut self) {
        if self.controller.phase() != SessionPhase::Polling {
            return;
        }
        if let Some(id) = self.controller.session_id()
            && self.announced.as_deref() != Some(id)
        {
            eprintln!("Session {id} started");
            self.announced = Some(id.to_string());
        }
        let Some(progress) = self.controller.page().progress() else {
            return;
        };
        let line = format!(
            "[{}] {} (ETA {})",
            progress.counter(),
            progress.processing,
            progress.estimated
        );
        let label_changed = self
            .last_progress
            .as_deref()
            .is_none_or(|last| last != progress.processing);
        if label_changed {
            eprintln!("{line}");
            self.last_progress = Some(progress.processing.clone());
        }
    }

    fn print_modals(&mut self) {
        while let Some(modal) = self.controller.page().top_modal() {
            println!("== {} ==", modal.title);
            println!("{}", modal.body);
            self.controller.update(Action::CloseModal);
        }
    }
}
