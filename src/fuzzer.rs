// fuzzer.rs - Directory Fuzzing Module
// Purpose: Probe candidate paths from a wordlist against a base URL with
//          bounded concurrency and collect the responses that match a
//          status-code whitelist
// Features:
//  - Fixed-size worker pool (buffer_unordered fan-out/fan-in)
//  - Redirects treated as hits, never followed
//  - Per-probe timeout and failure isolation (one dead path never
//    aborts the batch)
//  - Cooperative cancellation of in-flight probes

use anyhow::{Context, Result};
use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// Terminal classification of one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Response status is in the whitelist
    Matched,
    /// Got a response, but the status is not interesting
    Filtered,
    /// Timeout, refused connection, DNS failure, truncated response
    TransportError,
}

/// Outcome of probing one candidate path. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub url: String,
    pub status: Option<u16>,
    pub length: Option<u64>,
    pub outcome: ProbeOutcome,
}

/// One matched probe, as persisted in the report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuzzHit {
    pub url: String,
    pub status: u16,
    pub length: u64,
}

/// Fuzzing policy. The whitelist and timeout are deliberately
/// configurable: whether a 301/302 counts as a hit depends on the target.
#[derive(Debug, Clone)]
pub struct FuzzOptions {
    pub concurrency: usize,
    pub timeout: Duration,
    pub status_whitelist: Vec<u16>,
}

impl Default for FuzzOptions {
    fn default() -> Self {
        Self {
            concurrency: 20,
            timeout: Duration::from_secs(8),
            status_whitelist: vec![200, 301, 302, 403],
        }
    }
}

/// Prefix `http://` when the base has no scheme, and drop trailing slashes
/// so candidate joining produces single-slash URLs.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    match Url::parse(trimmed) {
        Ok(url) if !url.cannot_be_a_base() => trimmed.to_string(),
        _ => format!("http://{}", trimmed),
    }
}

fn join_candidate(base_url: &str, candidate: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        candidate.trim_start_matches('/')
    )
}

/// Issue one GET against one candidate path and classify the response.
///
/// Transport failures are swallowed into `ProbeOutcome::TransportError`;
/// this function never returns an error and never retries. The caller is
/// expected to hand in a client built with redirects disabled.
pub async fn probe(
    client: &Client,
    base_url: &str,
    candidate: &str,
    options: &FuzzOptions,
) -> ProbeResult {
    let url = join_candidate(base_url, candidate);

    match client.get(&url).timeout(options.timeout).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            if options.status_whitelist.contains(&status) {
                match response.bytes().await {
                    Ok(body) => ProbeResult {
                        url,
                        status: Some(status),
                        length: Some(body.len() as u64),
                        outcome: ProbeOutcome::Matched,
                    },
                    // Response died while reading the body
                    Err(_) => ProbeResult {
                        url,
                        status: None,
                        length: None,
                        outcome: ProbeOutcome::TransportError,
                    },
                }
            } else {
                ProbeResult {
                    url,
                    status: Some(status),
                    length: None,
                    outcome: ProbeOutcome::Filtered,
                }
            }
        }
        Err(_) => ProbeResult {
            url,
            status: None,
            length: None,
            outcome: ProbeOutcome::TransportError,
        },
    }
}

/// Read a wordlist: one candidate per non-empty trimmed line, `#` comments skipped
fn read_wordlist(path: &str) -> Result<Vec<String>> {
    let file = File::open(path).context(format!("Failed to open wordlist: {}", path))?;
    let reader = BufReader::new(file);

    let list: Vec<String> = reader
        .lines()
        .map_while(Result::ok)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    Ok(list)
}

/// Fuzz every candidate in the wordlist against `base_url` and return the
/// matched hits.
///
/// The whole wordlist is read before fan-out begins. At most
/// `options.concurrency` probes are in flight at any moment, and the call
/// returns only once every candidate has a terminal outcome — matched
/// results are collected through the stream fan-in, so no shared
/// accumulator or lock is involved. Result order is not meaningful.
///
/// Flipping `cancel` to `true` aborts in-flight probes and skips the
/// remaining candidates; hits collected so far are still returned.
pub async fn fuzz_directories(
    client: &Client,
    base_url: &str,
    wordlist_path: &str,
    options: &FuzzOptions,
    cancel: watch::Receiver<bool>,
) -> Result<Vec<FuzzHit>> {
    let words = read_wordlist(wordlist_path)?;
    if words.is_empty() {
        println!("{}", "[!] Wordlist is empty, nothing to fuzz".yellow());
        return Ok(Vec::new());
    }

    let base = normalize_base_url(base_url);
    println!(
        "{}",
        format!(
            "[*] Fuzzing {} with {} candidates ({} workers)...",
            base,
            words.len(),
            options.concurrency
        )
        .cyan()
    );

    let progress = ProgressBar::new(words.len() as u64);

    let mut results = stream::iter(words)
        .map(|word| {
            let client = client.clone();
            let base = base.clone();
            let options = options.clone();
            let mut cancel = cancel.clone();
            async move {
                if *cancel.borrow() {
                    return None;
                }
                tokio::select! {
                    result = probe(&client, &base, &word, &options) => Some(result),
                    _ = cancel.changed() => None,
                }
            }
        })
        .buffer_unordered(options.concurrency.max(1));

    let mut hits = Vec::new();
    while let Some(result) = results.next().await {
        progress.inc(1);
        let Some(result) = result else { continue };
        if let (ProbeOutcome::Matched, Some(status), Some(length)) =
            (result.outcome, result.status, result.length)
        {
            progress.println(format!(
                "{}",
                format!("  [+] {} [{}] ({} bytes)", result.url, status, length).green()
            ));
            hits.push(FuzzHit {
                url: result.url,
                status,
                length,
            });
        }
    }
    progress.finish_and_clear();

    if *cancel.borrow() {
        println!(
            "{}",
            format!("[!] Fuzzing cancelled, keeping {} hits", hits.len()).yellow()
        );
    } else {
        println!("{}", format!("[+] Fuzzing complete: {} hits", hits.len()).green());
    }

    Ok(hits)
}
