// wayback.rs - Wayback Machine Module
// Purpose: Fetch the snapshot matrix for *.domain/* from the CDX API

use anyhow::{Context, Result, bail};
use reqwest::Client;
use std::time::Duration;

const CDX_API: &str = "http://web.archive.org/cdx/search/cdx";
const CDX_TIMEOUT: Duration = Duration::from_secs(20);
const SNAPSHOT_LIMIT: u32 = 50;

/// Query the CDX API for archived snapshots under the target domain.
///
/// The result is the raw snapshot matrix as the API returns it: the first
/// row names the fields, every following row is one snapshot.
pub async fn wayback_snapshots(client: &Client, domain: &str) -> Result<Vec<Vec<String>>> {
    let response = client
        .get(CDX_API)
        .query(&[
            ("url", format!("*.{}/*", domain)),
            ("output", "json".to_string()),
            ("limit", SNAPSHOT_LIMIT.to_string()),
        ])
        .timeout(CDX_TIMEOUT)
        .send()
        .await
        .context("Wayback request failed")?;

    let status = response.status();
    if !status.is_success() {
        bail!("Wayback returned {}", status.as_u16());
    }

    let body = response
        .text()
        .await
        .context("Failed to read Wayback response")?;
    parse_snapshots(&body)
}

fn parse_snapshots(body: &str) -> Result<Vec<Vec<String>>> {
    // An empty body means no captures, not a failure
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body).context("Wayback returned non-json content")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_matrix() {
        let body = r#"[
            ["urlkey","timestamp","original","mimetype","statuscode","digest","length"],
            ["com,example)/","20200101000000","http://example.com/","text/html","200","ABCD","1234"]
        ]"#;

        let matrix = parse_snapshots(body).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0][0], "urlkey");
        assert_eq!(matrix[1][4], "200");
    }

    #[test]
    fn test_parse_empty_body_means_no_captures() {
        assert!(parse_snapshots("").unwrap().is_empty());
        assert!(parse_snapshots("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_body_is_an_error() {
        let err = parse_snapshots("<html>blocked</html>").unwrap_err();
        assert!(format!("{:#}", err).contains("non-json"));
    }
}
