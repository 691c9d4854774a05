// main.rs - ReconRust - Passive and Active Domain Reconnaissance
// Purpose: WHOIS, certificate transparency, web archive and code-search
//          collection, DNS enumeration, host resolution and concurrent
//          directory fuzzing, aggregated into one JSON report per run

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::*;
use reqwest::Client;
use reqwest::redirect::Policy;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use url::Url;

mod capture_server;
mod cert_search;
mod dns_enum;
mod fuzzer;
mod github_search;
mod report;
mod wayback;
mod whois;

use capture_server::{CaptureConfig, run_capture_server};
use fuzzer::FuzzOptions;
use report::{Collected, Report};

/// ReconRust - Domain reconnaissance with JSON output
#[derive(Parser, Debug)]
#[command(
    name = "ReconRust",
    version,
    about = "Passive and active domain reconnaissance (JSON output)",
    long_about = r#"
ReconRust gathers intelligence about a target domain:

  PASSIVE
     • WHOIS registration data (raw + parsed)
     • Certificate transparency logs (crt.sh)
     • Wayback Machine snapshot matrix
     • GitHub code search (with --github-token)

  ACTIVE
     • DNS record enumeration (A, AAAA, NS, MX, TXT, CNAME)
     • Host resolution
     • Concurrent directory fuzzing (with --fuzz)

Every collector is isolated: a failed lookup becomes an error payload in
its report field and the run still completes. The report is one JSON
object written to --output (or printed to stdout if the write fails).

EXAMPLES:

  Basic recon:
    reconrust example.com

  Recon with directory fuzzing:
    reconrust example.com --fuzz wordlist.txt --threads 40

  Treat only 200s as fuzz hits:
    reconrust example.com --fuzz wordlist.txt --fuzz-status 200

  User-Agent capture listener:
    reconrust --capture --capture-port 8080 --capture-webhook https://webhook.example/x
"#
)]
struct Args {
    /// Target domain or URL (e.g. example.com)
    #[arg(value_name = "DOMAIN", required_unless_present = "capture")]
    domain: Option<String>,

    /// Wordlist for directory fuzzing (one path per line)
    #[arg(long, value_name = "FILE", help_heading = "Directory Fuzzing")]
    fuzz: Option<String>,

    /// Concurrent probes during fuzzing
    #[arg(long, default_value_t = 20, value_name = "N", help_heading = "Directory Fuzzing")]
    threads: usize,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = 8, value_name = "SECONDS", help_heading = "Directory Fuzzing")]
    fuzz_timeout: u64,

    /// Status codes counted as fuzz hits (whether a redirect is a hit is
    /// target-dependent, so the whitelist is policy, not a constant)
    #[arg(
        long,
        default_value = "200,301,302,403",
        value_name = "CODES",
        help_heading = "Directory Fuzzing"
    )]
    fuzz_status: String,

    /// Token for the GitHub code-search collector (skipped without one)
    #[arg(long, value_name = "TOKEN", help_heading = "Collectors")]
    github_token: Option<String>,

    /// Report destination
    #[arg(
        short,
        long,
        default_value = "recon_results.json",
        value_name = "FILE",
        help_heading = "Output"
    )]
    output: PathBuf,

    /// Indent the JSON output
    #[arg(long, help_heading = "Output")]
    pretty: bool,

    /// Run the User-Agent capture listener instead of a recon pass
    #[arg(long, help_heading = "Capture Server")]
    capture: bool,

    /// Capture listener port
    #[arg(long, default_value_t = 8080, value_name = "PORT", help_heading = "Capture Server")]
    capture_port: u16,

    /// Webhook that captured User-Agents are relayed to
    #[arg(long, value_name = "URL", help_heading = "Capture Server")]
    capture_webhook: Option<String>,

    /// File captured User-Agents are appended to
    #[arg(
        long,
        default_value = "user_agents.txt",
        value_name = "FILE",
        help_heading = "Capture Server"
    )]
    capture_log: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.capture {
        let config = CaptureConfig {
            log_path: args.capture_log.clone(),
            webhook_url: args.capture_webhook.clone(),
            client: Client::builder()
                .build()
                .context("Failed to build HTTP client")?,
        };
        return run_capture_server(args.capture_port, config).await;
    }

    // clap enforces this; the bail covers programmatic misuse
    let Some(target) = args.domain.clone() else {
        bail!("a target domain is required unless --capture is given");
    };

    run_recon(&target, &args).await
}

/// Collect everything into one report. Collector failures land in their
/// report field; only argument and report-rendering problems are fatal.
async fn run_recon(target: &str, args: &Args) -> Result<()> {
    let status_whitelist = parse_status_whitelist(&args.fuzz_status)?;
    let started = Instant::now();
    let domain = bare_domain(target);

    println!(
        "{}",
        format!("[*] Starting recon for {}", domain).cyan().bold()
    );

    let client = Client::builder()
        .user_agent(format!("ReconRust/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let mut report = Report::new(&domain);

    println!("{}", "[*] WHOIS lookup...".cyan());
    report.whois = Some(Collected::from_result(whois::whois_lookup(&domain).await));

    println!("{}", "[*] Certificate transparency search (crt.sh)...".cyan());
    report.crtsh = Some(Collected::from_result(
        cert_search::certificate_search(&client, &domain).await,
    ));

    println!("{}", "[*] Wayback Machine snapshots...".cyan());
    report.wayback = Some(Collected::from_result(
        wayback::wayback_snapshots(&client, &domain).await,
    ));

    if let Some(token) = &args.github_token {
        println!("{}", "[*] GitHub code search...".cyan());
        report.github_search = Some(Collected::from_result(
            github_search::code_search(&client, &domain, Some(token)).await,
        ));
    }

    println!("{}", "[*] DNS record enumeration...".cyan());
    report.dns_records = Some(Collected::from_result(
        dns_enum::enumerate_records(&resolver, &domain).await,
    ));

    println!("{}", "[*] Host resolution...".cyan());
    report.resolve_host = Some(Collected::from_result(
        dns_enum::resolve_host(&resolver, &domain).await,
    ));

    if let Some(wordlist) = &args.fuzz {
        let options = FuzzOptions {
            concurrency: args.threads,
            timeout: Duration::from_secs(args.fuzz_timeout),
            status_whitelist,
        };
        // Redirect responses are hits, so the probe client never follows them
        let probe_client = Client::builder()
            .redirect(Policy::none())
            .user_agent(format!("ReconRust-Fuzzer/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build fuzzing client")?;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{}", "\n[!] Ctrl-C: aborting fuzz pass...".yellow().bold());
                let _ = cancel_tx.send(true);
            }
            // Keep the sender alive so in-flight probes see the flag
            // instead of a closed channel
            std::future::pending::<()>().await;
        });

        report.fuzz_hits = Some(Collected::from_result(
            fuzzer::fuzz_directories(
                &probe_client,
                &fuzz_base_url(target),
                wordlist,
                &options,
                cancel_rx,
            )
            .await,
        ));
    }

    report.finish(started);

    let json = report.to_json(args.pretty)?;
    match fs::write(&args.output, &json) {
        Ok(()) => println!(
            "{}",
            format!(
                "[+] Results saved to {} (pretty={})",
                args.output.display(),
                args.pretty
            )
            .green()
            .bold()
        ),
        Err(e) => {
            // Never lose a completed report over a filesystem problem
            eprintln!(
                "{}",
                format!(
                    "[!] Failed to save report to {}: {}",
                    args.output.display(),
                    e
                )
                .red()
            );
            println!("{}", json);
        }
    }

    Ok(())
}

fn parse_status_whitelist(codes: &str) -> Result<Vec<u16>> {
    codes.split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u16>()
                .context(format!("Invalid status code in --fuzz-status: '{}'", part))
        })
        .collect()
}

/// Reduce a domain-or-URL target to the bare hostname the collectors need
fn bare_domain(target: &str) -> String {
    let trimmed = target.trim();
    if trimmed.contains("://") {
        if let Ok(url) = Url::parse(trimmed) {
            if let Some(host) = url.host_str() {
                return host.to_string();
            }
        }
    }
    trimmed
        .split('/')
        .next()
        .unwrap_or(trimmed)
        .split(':')
        .next()
        .unwrap_or(trimmed)
        .to_string()
}

/// The fuzz target keeps the URL shape: literal URLs pass through,
/// bare domains get https
fn fuzz_base_url(target: &str) -> String {
    let trimmed = target.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_whitelist() {
        assert_eq!(
            parse_status_whitelist("200,301,302,403").unwrap(),
            vec![200, 301, 302, 403]
        );
        assert_eq!(parse_status_whitelist("200, 418").unwrap(), vec![200, 418]);
        assert!(parse_status_whitelist("200,abc").is_err());
    }

    #[test]
    fn test_bare_domain() {
        assert_eq!(bare_domain("example.com"), "example.com");
        assert_eq!(bare_domain("https://example.com/login"), "example.com");
        assert_eq!(bare_domain("example.com/login"), "example.com");
        assert_eq!(bare_domain("example.com:8443"), "example.com");
    }

    #[test]
    fn test_fuzz_base_url() {
        assert_eq!(fuzz_base_url("example.com"), "https://example.com");
        assert_eq!(fuzz_base_url("http://example.com/"), "http://example.com");
        assert_eq!(
            fuzz_base_url("https://example.com:8443"),
            "https://example.com:8443"
        );
    }
}
