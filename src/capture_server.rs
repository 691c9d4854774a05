// capture_server.rs - User-Agent Capture Listener
// Purpose: Log the User-Agent of every visiting client to a file and
//          relay it to a remote webhook

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::routing::get;
use colored::*;
use reqwest::Client;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct CaptureConfig {
    pub log_path: PathBuf,
    pub webhook_url: Option<String>,
    pub client: Client,
}

/// Serve the capture handler on `0.0.0.0:port` until the process exits
pub async fn run_capture_server(port: u16, config: CaptureConfig) -> Result<()> {
    // Any path is answered; visitors probe more than `/`
    let app = Router::new()
        .route("/", get(capture_user_agent))
        .fallback(capture_user_agent)
        .with_state(config);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind capture listener on {}", addr))?;

    println!(
        "{}",
        format!("[*] User-Agent capture listener on {} (check localhost:{})", addr, port).cyan()
    );

    axum::serve(listener, app)
        .await
        .context("Capture server failed")?;
    Ok(())
}

async fn capture_user_agent(
    State(config): State<CaptureConfig>,
    headers: HeaderMap,
) -> &'static str {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("<missing>")
        .to_string();

    println!("{}", format!("[+] User-Agent: {}", user_agent).green());

    if let Err(e) = append_user_agent(&config.log_path, &user_agent) {
        eprintln!("{}", format!("[!] Failed to log User-Agent: {:#}", e).yellow());
    }

    if let Some(webhook) = &config.webhook_url {
        if let Err(e) = relay_user_agent(&config.client, webhook, &user_agent).await {
            eprintln!("{}", format!("[!] Webhook relay failed: {:#}", e).yellow());
        }
    }

    "User-Agent captured. Check the capture log file."
}

fn append_user_agent(path: &Path, user_agent: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context(format!("Failed to open capture log {:?}", path))?;
    writeln!(file, "{}", user_agent).context("Failed to append to capture log")?;
    Ok(())
}

/// Forward the captured User-Agent as the User-Agent of a GET against the
/// webhook; the webhook side sees it in its own request log
async fn relay_user_agent(client: &Client, webhook: &str, user_agent: &str) -> Result<()> {
    client
        .get(webhook)
        .header(reqwest::header::USER_AGENT, user_agent)
        .timeout(RELAY_TIMEOUT)
        .send()
        .await
        .context("Webhook request failed")?;
    Ok(())
}
