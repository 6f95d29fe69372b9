use std::fs;
use std::net::TcpListener;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn relay_home() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_config(dir.path());
    dir
}

fn write_config(home: &Path) {
    fs::write(
        home.join("config.toml"),
        "poll_interval_ms = 20\nrequest_timeout_secs = 5\n",
    )
    .unwrap();
}

fn expert_panel_running() -> serde_json::Value {
    json!({
        "status": "success",
        "session_data": {
            "mode": "expert_panel",
            "status": "running",
            "current_pair": 4,
            "total_pairs": 10,
            "current_agents": ["Historian", "Biologist"]
        }
    })
}

fn expert_panel_completed() -> serde_json::Value {
    json!({
        "status": "success",
        "session_data": {
            "mode": "expert_panel",
            "status": "completed",
            "current_pair": 10,
            "total_pairs": 10,
            "results": [{"pair": 1}, {"pair": 2}]
        }
    })
}

/// Mounts a start endpoint and a status endpoint that reports running once,
/// then completed.
async fn mount_expert_panel_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/revolutionary/start-expert-panel"))
        .and(body_json(json!({"prompt": "design a city"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "started", "session_id": "sess-1"})),
        )
        .expect(1)
        .mount(server)
        .await;

    let polls = AtomicUsize::new(0);
    Mock::given(method("GET"))
        .and(path("/api/revolutionary/session-status/sess-1"))
        .respond_with(move |_: &Request| {
            if polls.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(200).set_body_json(expert_panel_running())
            } else {
                ResponseTemplate::new(200).set_body_json(expert_panel_completed())
            }
        })
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_run_polls_until_completed() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    mount_expert_panel_session(&server).await;
    let home = relay_home();

    cargo_bin_cmd!("relay")
        .env("RELAY_HOME", home.path())
        .env("RELAY_BACKEND_URL", server.uri())
        .args(["run", "--mode", "expert-panel", "--prompt", "design a city"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Success: expert panel completed! 2 responses generated.",
        ))
        .stderr(predicate::str::contains("Starting Expert Panel Mode"))
        .stderr(predicate::str::contains("Session sess-1 started"))
        .stderr(predicate::str::contains("Pair 4/10: Historian + Biologist"));
}

#[tokio::test]
async fn test_run_prints_requested_summary() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    mount_expert_panel_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/summary/executive/sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "summary": {"headline": "Build upward"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let home = relay_home();

    cargo_bin_cmd!("relay")
        .env("RELAY_HOME", home.path())
        .env("RELAY_BACKEND_URL", server.uri())
        .args([
            "run",
            "--mode",
            "expert-panel",
            "--prompt",
            "design a city",
            "--summary",
            "executive",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("== Executive Summary =="))
        .stdout(predicate::str::contains("Build upward"));
}

#[tokio::test]
async fn test_run_writes_report() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    mount_expert_panel_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/revolutionary/generate-report/sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "html_report": "<html><body>City plan</body></html>"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let home = relay_home();
    let report_path = home.path().join("out").join("report.html");

    cargo_bin_cmd!("relay")
        .env("RELAY_HOME", home.path())
        .env("RELAY_BACKEND_URL", server.uri())
        .args(["run", "--mode", "expert-panel", "--prompt", "design a city"])
        .arg("--report")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let html = fs::read_to_string(&report_path).unwrap();
    assert_eq!(html, "<html><body>City plan</body></html>");
}

#[tokio::test]
async fn test_run_sends_conference_max_agents() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revolutionary/start-conference-chain"))
        .and(body_json(json!({"prompt": "plan a festival", "max_agents": 20})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "started", "session_id": "conf-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/revolutionary/session-status/conf-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "session_data": {
                "mode": "conference_chain",
                "status": "completed",
                "current_agent": 20,
                "total_agents": 20,
                "results": [{}, {}, {}]
            }
        })))
        .mount(&server)
        .await;
    let home = relay_home();

    cargo_bin_cmd!("relay")
        .env("RELAY_HOME", home.path())
        .env("RELAY_BACKEND_URL", server.uri())
        .args([
            "run",
            "--mode",
            "conference-chain",
            "--prompt",
            "plan a festival",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "conference chain completed! 3 responses generated.",
        ));
}

#[tokio::test]
async fn test_run_rejects_empty_prompt() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revolutionary/start-expert-panel"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let home = relay_home();

    cargo_bin_cmd!("relay")
        .env("RELAY_HOME", home.path())
        .env("RELAY_BACKEND_URL", server.uri())
        .args(["run", "--mode", "expert-panel", "--prompt", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a prompt first"));
}

#[tokio::test]
async fn test_run_reports_rejected_start() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revolutionary/start-expert-panel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "error"})))
        .expect(1)
        .mount(&server)
        .await;
    let home = relay_home();

    cargo_bin_cmd!("relay")
        .env("RELAY_HOME", home.path())
        .env("RELAY_BACKEND_URL", server.uri())
        .args(["run", "--mode", "expert-panel", "--prompt", "design a city"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to start Expert Panel Mode"))
        .stderr(predicate::str::contains("did not complete"));
}

#[tokio::test]
async fn test_run_gives_up_after_failure_ceiling() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revolutionary/start-expert-panel"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "started", "session_id": "sess-1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/revolutionary/session-status/sess-1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("config.toml"),
        "poll_interval_ms = 20\n\n[poll]\nmax_consecutive_failures = 3\n",
    )
    .unwrap();

    cargo_bin_cmd!("relay")
        .env("RELAY_HOME", home.path())
        .env("RELAY_BACKEND_URL", server.uri())
        .args(["run", "--mode", "expert-panel", "--prompt", "design a city"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Lost contact with the relay service"));
}
