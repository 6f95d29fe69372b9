//! Effect executor.
//!
//! Runs controller effects on the tokio runtime and sends their results back
//! to the host's inbox as `Action`s. Host-facing effects (notices, opening
//! the report, clipboard) go through the `Surface` the host provides.
//!
//! The driver owns at most one poll task. Starting a new one cancels the old
//! one first, so there is never more than one status timer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::Backend;
use crate::config::Config;
use crate::controller::{Action, Effect, Notice};

/// Host side of the effects the driver cannot perform itself.
pub trait Surface {
    /// Shows a blocking notice to the user.
    fn notify(&mut self, notice: &Notice);

    /// Displays a trusted HTML document in a new top-level viewer.
    fn open_report(&mut self, html: &str) -> anyhow::Result<()>;

    fn copy_to_clipboard(&mut self, text: &str) -> anyhow::Result<()>;
}

/// Poll settings taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Consecutive failed polls before giving up; `None` polls forever.
    pub max_consecutive_failures: Option<u32>,
}

impl PollSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.poll_interval(),
            max_consecutive_failures: config.poll.max_consecutive_failures(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_consecutive_failures: None,
        }
    }
}

struct PollHandle {
    session_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn stop(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

pub struct Driver<B: Backend> {
    backend: Arc<B>,
    inbox: mpsc::UnboundedSender<Action>,
    settings: PollSettings,
    poll: Option<PollHandle>,
}

impl<B: Backend> Driver<B> {
    pub fn new(
        backend: Arc<B>,
        inbox: mpsc::UnboundedSender<Action>,
        settings: PollSettings,
    ) -> Self {
        Self {
            backend,
            inbox,
            settings,
            poll: None,
        }
    }

    /// True while a poll task is running.
    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|handle| !handle.task.is_finished())
    }

    /// Session of the running poll task, if any.
    pub fn polled_session(&self) -> Option<&str> {
        self.poll
            .as_ref()
            .filter(|handle| !handle.task.is_finished())
            .map(|handle| handle.session_id.as_str())
    }

    /// Executes effects in order.
    pub fn execute(&mut self, effects: Vec<Effect>, surface: &mut dyn Surface) {
        for effect in effects {
            self.execute_one(effect, surface);
        }
    }

    fn execute_one(&mut self, effect: Effect, surface: &mut dyn Surface) {
        match effect {
            Effect::StartSession {
                attempt,
                mode,
                request,
            } => {
                self.spawn_effect(move |backend| async move {
                    let result = backend.start_session(mode, &request).await;
                    Action::SessionStarted {
                        attempt,
                        mode,
                        result,
                    }
                });
            }
            Effect::StartPolling { session_id } => self.start_polling(session_id),
            Effect::StopPolling => self.stop_polling(),
            Effect::FetchSummary { kind, session_id } => {
                self.spawn_effect(move |backend| async move {
                    let result = backend.summary(kind, &session_id).await;
                    Action::SummaryFetched { kind, result }
                });
            }
            Effect::FetchReport { session_id } => {
                self.spawn_effect(move |backend| async move {
                    let result = backend.report(&session_id).await;
                    Action::ReportFetched { result }
                });
            }
            Effect::OpenReport { html } => {
                if let Err(e) = surface.open_report(&html) {
                    tracing::error!("failed to open HTML report: {e:#}");
                    surface.notify(&Notice::error("Failed to open HTML report"));
                }
            }
            Effect::CopyToClipboard { text } => {
                let ok = match surface.copy_to_clipboard(&text) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("clipboard copy failed: {e:#}");
                        false
                    }
                };
                let _ = self.inbox.send(Action::Copied { ok });
            }
            Effect::Notify(notice) => surface.notify(&notice),
        }
    }

    /// Spawns a one-shot request whose result is delivered to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce(Arc<B>) -> Fut + Send + 'static,
        Fut: Future<Output = Action> + Send + 'static,
    {
        let tx = self.inbox.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let _ = tx.send(f(backend).await);
        });
    }

    /// Starts the status timer for `session_id`, replacing any running one.
    pub fn start_polling(&mut self, session_id: String) {
        self.stop_polling();
        tracing::debug!(
            session_id = %session_id,
            interval = ?self.settings.interval,
            "starting status polling"
        );

        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_session(
            Arc::clone(&self.backend),
            session_id.clone(),
            self.settings,
            cancel.clone(),
            self.inbox.clone(),
        ));
        self.poll = Some(PollHandle {
            session_id,
            cancel,
            task,
        });
    }

    /// Cancels the status timer. No-op when none is running.
    pub fn stop_polling(&mut self) {
        if let Some(handle) = self.poll.take() {
            tracing::debug!(session_id = %handle.session_id, "stopping status polling");
            handle.stop();
        }
    }
}

impl<B: Backend> Drop for Driver<B> {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

/// Polls one session until it completes, is cancelled, or fails too often.
///
/// Ticks are sequential: the next request is not issued before the previous
/// one has been delivered. The first request goes out one interval after start.
async fn poll_session<B: Backend>(
    backend: Arc<B>,
    session_id: String,
    settings: PollSettings,
    cancel: CancellationToken,
    inbox: mpsc::UnboundedSender<Action>,
) {
    let mut ticker =
        tokio::time::interval_at(Instant::now() + settings.interval, settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures = 0u32;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = backend.session_status(&session_id) => result,
        };

        let completed = result.as_ref().is_ok_and(|r| r.reports_completion());
        if result.as_ref().is_ok_and(|r| r.is_success()) {
            failures = 0;
        } else {
            failures = failures.saturating_add(1);
        }

        let delivered = inbox
            .send(Action::StatusPolled {
                session_id: session_id.clone(),
                received_at: std::time::Instant::now(),
                result,
            })
            .is_ok();
        if !delivered || completed {
            break;
        }

        if settings
            .max_consecutive_failures
            .is_some_and(|max| failures >= max)
        {
            tracing::warn!(session_id = %session_id, failures, "giving up on status polling");
            let _ = inbox.send(Action::PollingAbandoned {
                session_id: session_id.clone(),
                failures,
            });
            break;
        }
    }
}
