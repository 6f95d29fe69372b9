//! One-shot session commands: status, summary, report.

use std::path::Path;

use anyhow::{Context, Result};
use relay_core::api::{ApiClient, Backend};
use relay_core::config::Config;
use relay_core::report;
use relay_core::session::{SessionSnapshot, SummaryKind};

fn client(config: &Config) -> Result<ApiClient> {
    ApiClient::from_config(config).context("create relay service client")
}

pub async fn status(config: &Config, session_id: &str) -> Result<()> {
    let response = client(config)?
        .session_status(session_id)
        .await
        .with_context(|| format!("fetch status of session {session_id}"))?;
    if !response.is_success() {
        anyhow::bail!(
            "Relay service returned status '{}' for session {session_id}",
            response.status
        );
    }
    let data = response
        .into_session_data()
        .with_context(|| format!("no session data for session {session_id}"))?;
    let snapshot = SessionSnapshot::from(data);

    println!("Session: {session_id}");
    println!("Mode: {}", snapshot.display_mode());
    println!("Status: {}", snapshot.status);
    if let Some((current, total)) = snapshot.stage.counts() {
        println!("Progress: {current}/{total}");
    }
    if let Some(label) = snapshot.stage.label() {
        println!("Current: {label}");
    }
    println!("Results: {}", snapshot.result_count);
    Ok(())
}

pub async fn summary(config: &Config, kind: SummaryKind, session_id: &str) -> Result<()> {
    let response = client(config)?
        .summary(kind, session_id)
        .await
        .with_context(|| format!("Network error generating {}", kind.title()))?;
    if !response.is_success() {
        anyhow::bail!("Failed to generate {}", kind.title());
    }
    let body = serde_json::to_string_pretty(&response.content())
        .context("format summary")?;
    println!("{body}");
    Ok(())
}

pub async fn report(config: &Config, session_id: &str, output: Option<&Path>) -> Result<()> {
    let response = client(config)?
        .report(session_id)
        .await
        .context("Network error generating HTML report")?;
    let html = response
        .into_html()
        .context("Failed to generate HTML report")?;

    match output {
        Some(path) => {
            report::save_report(path, &html)?;
            println!("Report written to {}", path.display());
        }
        None => {
            let path = report::open_report(&html)?;
            println!("Report opened from {}", path.display());
        }
    }
    Ok(())
}
