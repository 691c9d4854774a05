// cert_search.rs - Certificate Transparency Module
// Purpose: Pull certificates matching the target domain from crt.sh

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CRTSH_TIMEOUT: Duration = Duration::from_secs(20);

/// One crt.sh log entry; unknown upstream fields are dropped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CertEntry {
    #[serde(default)]
    pub issuer_name: String,
    #[serde(default)]
    pub common_name: String,
    #[serde(default)]
    pub name_value: String,
    #[serde(default)]
    pub not_before: String,
    #[serde(default)]
    pub not_after: String,
    #[serde(default)]
    pub serial_number: String,
}

/// Search crt.sh for certificates whose identity matches `%domain%`
pub async fn certificate_search(client: &Client, domain: &str) -> Result<Vec<CertEntry>> {
    let url = format!("https://crt.sh/?q=%25{}%25&output=json", domain);
    let response = client
        .get(&url)
        .timeout(CRTSH_TIMEOUT)
        .send()
        .await
        .context("crt.sh request failed")?;

    let status = response.status();
    if !status.is_success() {
        bail!("crt.sh returned {}", status.as_u16());
    }

    let body = response
        .text()
        .await
        .context("Failed to read crt.sh response")?;
    parse_entries(&body)
}

// crt.sh intermittently serves empty or truncated bodies; surface that as
// a collector error rather than a panic or an empty success
fn parse_entries(body: &str) -> Result<Vec<CertEntry>> {
    serde_json::from_str(body).context("crt.sh returned non-json content")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crtsh_entries() {
        let body = r#"[
            {
                "issuer_ca_id": 185756,
                "issuer_name": "C=US, O=DigiCert Inc, CN=DigiCert TLS RSA SHA256 2020 CA1",
                "common_name": "www.example.org",
                "name_value": "example.com\nwww.example.com",
                "id": 123456,
                "entry_timestamp": "2024-01-30T00:00:00",
                "not_before": "2024-01-30T00:00:00",
                "not_after": "2025-03-01T23:59:59",
                "serial_number": "0abc"
            }
        ]"#;

        let entries = parse_entries(body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].common_name, "www.example.org");
        assert!(entries[0].name_value.contains("www.example.com"));
    }

    #[test]
    fn test_parse_malformed_body_is_an_error() {
        let err = parse_entries("<html>rate limited</html>").unwrap_err();
        assert!(format!("{:#}", err).contains("non-json"));
    }

    #[test]
    fn test_parse_empty_result_set() {
        assert!(parse_entries("[]").unwrap().is_empty());
    }
}
