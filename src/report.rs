// report.rs - Recon Report Assembly
// Purpose: Aggregate every collector's output into one JSON record with
//          fixed top-level keys, carrying a typed error payload for any
//          collector that failed instead of aborting the run

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cert_search::CertEntry;
use crate::dns_enum::{DnsRecordMap, HostRecord};
use crate::fuzzer::FuzzHit;
use crate::github_search::CodeSearchResults;
use crate::whois::WhoisRecord;

/// Either a collector's native value or its failure, serialized untagged
/// so a failed collector shows up as `{"error": "<message>"}` in the
/// report field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Collected<T> {
    Error { error: String },
    Value(T),
}

impl<T> Collected<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Collected::Value(value),
            Err(e) => Collected::Error {
                error: format!("{:#}", e),
            },
        }
    }
}

/// One reconnaissance run. Built field by field by the aggregator,
/// written once, never mutated after persistence. Collectors that were
/// not run serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub domain: String,
    pub timestamp_utc: String,
    pub whois: Option<Collected<WhoisRecord>>,
    pub crtsh: Option<Collected<Vec<CertEntry>>>,
    pub wayback: Option<Collected<Vec<Vec<String>>>>,
    pub github_search: Option<Collected<CodeSearchResults>>,
    pub dns_records: Option<Collected<DnsRecordMap>>,
    pub resolve_host: Option<Collected<HostRecord>>,
    pub fuzz_hits: Option<Collected<Vec<FuzzHit>>>,
    pub runtime_seconds: Option<f64>,
}

impl Report {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            timestamp_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            whois: None,
            crtsh: None,
            wayback: None,
            github_search: None,
            dns_records: None,
            resolve_host: None,
            fuzz_hits: None,
            runtime_seconds: None,
        }
    }

    /// Record the elapsed wall-clock time, rounded to 2 decimals
    pub fn finish(&mut self, started: Instant) {
        let elapsed = started.elapsed().as_secs_f64();
        self.runtime_seconds = Some((elapsed * 100.0).round() / 100.0);
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.context("Failed to serialize report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::BTreeMap;

    #[test]
    fn test_failed_collector_serializes_as_error_payload() {
        let collected: Collected<Vec<CertEntry>> =
            Collected::from_result(Err(anyhow!("crt.sh returned 503")));
        let json = serde_json::to_value(&collected).unwrap();
        assert_eq!(json, serde_json::json!({"error": "crt.sh returned 503"}));
    }

    #[test]
    fn test_skipped_collectors_serialize_as_null() {
        let report = Report::new("example.com");
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["github_search"].is_null());
        assert!(value["fuzz_hits"].is_null());
        // Fixed keys are always present, even when null
        for key in [
            "domain",
            "timestamp_utc",
            "whois",
            "crtsh",
            "wayback",
            "github_search",
            "dns_records",
            "resolve_host",
            "fuzz_hits",
            "runtime_seconds",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn test_timestamp_is_utc_with_trailing_z() {
        let report = Report::new("example.com");
        assert!(report.timestamp_utc.ends_with('Z'));
        assert!(report.timestamp_utc.contains('T'));
    }

    #[test]
    fn test_report_json_round_trip() {
        let mut report = Report::new("example.com");
        report.whois = Some(Collected::Error {
            error: "connection refused".to_string(),
        });
        report.wayback = Some(Collected::Value(vec![
            vec!["urlkey".to_string(), "timestamp".to_string()],
            vec!["com,example)/".to_string(), "20200101000000".to_string()],
        ]));
        let mut dns = BTreeMap::new();
        dns.insert(
            "A".to_string(),
            Collected::Value(vec!["93.184.216.34".to_string()]),
        );
        dns.insert(
            "MX".to_string(),
            Collected::Error {
                error: "no records found".to_string(),
            },
        );
        report.dns_records = Some(Collected::Value(dns));
        report.resolve_host = Some(Collected::Value(HostRecord {
            hostname: "example.com".to_string(),
            aliases: vec![],
            ips: vec!["93.184.216.34".to_string()],
        }));
        report.fuzz_hits = Some(Collected::Value(vec![FuzzHit {
            url: "https://example.com/admin".to_string(),
            status: 200,
            length: 1234,
        }]));
        report.runtime_seconds = Some(3.25);

        for pretty in [false, true] {
            let json = report.to_json(pretty).unwrap();
            let parsed: Report = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, report);
        }
    }

    #[test]
    fn test_runtime_rounding() {
        let mut report = Report::new("example.com");
        report.finish(Instant::now());
        let runtime = report.runtime_seconds.unwrap();
        // Rounded to 2 decimals
        assert_eq!((runtime * 100.0).round() / 100.0, runtime);
    }
}
