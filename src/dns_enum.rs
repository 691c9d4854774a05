// dns_enum.rs - Active DNS Module
// Purpose: Enumerate common record types and resolve the target host
// Features:
//  - A, AAAA, NS, MX, TXT, CNAME lookups with a per-type deadline
//  - Per-type failures recorded in the map, never fatal

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::proto::rr::RecordType;
use tokio::time::timeout;

use crate::report::Collected;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

const RECORD_TYPES: &[RecordType] = &[
    RecordType::A,
    RecordType::AAAA,
    RecordType::NS,
    RecordType::MX,
    RecordType::TXT,
    RecordType::CNAME,
];

/// Record type name -> records, or the error that type produced
pub type DnsRecordMap = BTreeMap<String, Collected<Vec<String>>>;

/// Basic host resolution record (hostname, CNAME aliases, addresses)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostRecord {
    pub hostname: String,
    pub aliases: Vec<String>,
    pub ips: Vec<String>,
}

/// Query every record type in `RECORD_TYPES` for `domain`.
///
/// The map always materializes all six types; a type with no answer or a
/// timed-out lookup gets an error entry while the others stay usable.
pub async fn enumerate_records(resolver: &TokioAsyncResolver, domain: &str) -> Result<DnsRecordMap> {
    let mut records = BTreeMap::new();

    for record_type in RECORD_TYPES {
        let entry = match timeout(LOOKUP_TIMEOUT, resolver.lookup(domain, *record_type)).await {
            Ok(Ok(lookup)) => {
                Collected::Value(lookup.iter().map(|rdata| rdata.to_string()).collect())
            }
            Ok(Err(e)) => Collected::Error {
                error: e.to_string(),
            },
            Err(_) => Collected::Error {
                error: format!("{} lookup timed out", record_type),
            },
        };
        records.insert(record_type.to_string(), entry);
    }

    Ok(records)
}

/// Resolve `domain` to its addresses, with CNAME targets as aliases
pub async fn resolve_host(resolver: &TokioAsyncResolver, domain: &str) -> Result<HostRecord> {
    let lookup = timeout(LOOKUP_TIMEOUT, resolver.lookup_ip(domain))
        .await
        .context(format!("Resolving {} timed out", domain))?
        .context(format!("Failed to resolve {}", domain))?;

    let ips: Vec<String> = lookup.iter().map(|ip| ip.to_string()).collect();

    let aliases = match timeout(LOOKUP_TIMEOUT, resolver.lookup(domain, RecordType::CNAME)).await {
        Ok(Ok(cnames)) => cnames.iter().map(|rdata| rdata.to_string()).collect(),
        _ => Vec::new(),
    };

    Ok(HostRecord {
        hostname: domain.to_string(),
        aliases,
        ips,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_names_match_report_keys() {
        let names: Vec<String> = RECORD_TYPES.iter().map(|t| t.to_string()).collect();
        assert_eq!(names, vec!["A", "AAAA", "NS", "MX", "TXT", "CNAME"]);
    }

    #[test]
    fn test_per_type_error_serializes_inside_the_map() {
        let mut map = DnsRecordMap::new();
        map.insert(
            "A".to_string(),
            Collected::Value(vec!["93.184.216.34".to_string()]),
        );
        map.insert(
            "MX".to_string(),
            Collected::Error {
                error: "no records found".to_string(),
            },
        );

        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(value["A"][0], "93.184.216.34");
        assert_eq!(value["MX"]["error"], "no records found");
    }
}
