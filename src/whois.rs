// whois.rs - WHOIS Lookup Module
// Purpose: Raw WHOIS query over TCP port 43 with registrar/date/NS parsing
// Features:
//  - Built-in server map for common TLDs
//  - IANA referral fallback for everything else

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const IANA_WHOIS: &str = "whois.iana.org";
const WHOIS_PORT: u16 = 43;
const WHOIS_TIMEOUT: Duration = Duration::from_secs(10);

/// Registries for common TLDs; anything else goes through an IANA referral
const WHOIS_SERVERS: &[(&str, &str)] = &[
    ("com", "whois.verisign-grs.com"),
    ("net", "whois.verisign-grs.com"),
    ("org", "whois.pir.org"),
    ("info", "whois.nic.info"),
    ("io", "whois.nic.io"),
    ("co", "whois.nic.co"),
    ("me", "whois.nic.me"),
    ("dev", "whois.nic.google"),
    ("app", "whois.nic.google"),
    ("us", "whois.nic.us"),
    ("uk", "whois.nic.uk"),
    ("de", "whois.denic.de"),
    ("fr", "whois.nic.fr"),
    ("nl", "whois.domain-registry.nl"),
    ("br", "whois.registro.br"),
    ("jp", "whois.jprs.jp"),
];

/// Parsed WHOIS answer; `raw` always carries the full registry response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhoisRecord {
    pub server: String,
    pub registrar: Option<String>,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub name_servers: Vec<String>,
    pub raw: String,
}

/// Query WHOIS for `domain` and parse the interesting fields out of the
/// raw registry response.
pub async fn whois_lookup(domain: &str) -> Result<WhoisRecord> {
    let tld = domain
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if tld.is_empty() {
        bail!("'{}' has no TLD to route the WHOIS query by", domain);
    }

    let server = match server_for_tld(&tld) {
        Some(server) => server.to_string(),
        None => referral_server(&tld).await?,
    };

    let raw = query_whois(&server, domain).await?;
    Ok(parse_whois(&server, raw))
}

fn server_for_tld(tld: &str) -> Option<&'static str> {
    WHOIS_SERVERS
        .iter()
        .find(|(known, _)| *known == tld)
        .map(|(_, server)| *server)
}

/// Ask IANA which registry serves this TLD (`refer:` line)
async fn referral_server(tld: &str) -> Result<String> {
    let response = query_whois(IANA_WHOIS, tld).await?;
    for line in response.lines() {
        let line = line.trim();
        if let Some(server) = line.strip_prefix("refer:") {
            return Ok(server.trim().to_string());
        }
    }
    bail!("IANA has no WHOIS referral for .{}", tld)
}

async fn query_whois(server: &str, query: &str) -> Result<String> {
    let mut stream = timeout(WHOIS_TIMEOUT, TcpStream::connect((server, WHOIS_PORT)))
        .await
        .context(format!("Connection to {} timed out", server))?
        .context(format!("Failed to connect to {}", server))?;

    stream
        .write_all(format!("{}\r\n", query).as_bytes())
        .await
        .context("Failed to send WHOIS query")?;

    let mut response = Vec::new();
    timeout(WHOIS_TIMEOUT, stream.read_to_end(&mut response))
        .await
        .context(format!("{} stopped responding", server))?
        .context("Failed to read WHOIS response")?;

    Ok(String::from_utf8_lossy(&response).into_owned())
}

fn parse_whois(server: &str, raw: String) -> WhoisRecord {
    let mut registrar = None;
    let mut creation_date = None;
    let mut expiration_date = None;
    let mut name_servers = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key.as_str() {
            "registrar" if registrar.is_none() => {
                registrar = Some(value.to_string());
            }
            "creation date" | "created" | "registered on" if creation_date.is_none() => {
                creation_date = Some(value.to_string());
            }
            "registry expiry date" | "expiration date" | "expiry date" | "expires"
                if expiration_date.is_none() =>
            {
                expiration_date = Some(value.to_string());
            }
            "name server" | "nserver" => {
                name_servers.push(value.to_lowercase());
            }
            _ => {}
        }
    }

    WhoisRecord {
        server: server.to_string(),
        registrar,
        creation_date,
        expiration_date,
        name_servers,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_for_common_tlds() {
        assert_eq!(server_for_tld("com"), Some("whois.verisign-grs.com"));
        assert_eq!(server_for_tld("de"), Some("whois.denic.de"));
        assert_eq!(server_for_tld("xyz"), None);
    }

    #[test]
    fn test_parse_verisign_style_response() {
        let raw = "\
   Domain Name: EXAMPLE.COM\r
   Registrar: RESERVED-Internet Assigned Numbers Authority\r
   Creation Date: 1995-08-14T04:00:00Z\r
   Registry Expiry Date: 2026-08-13T04:00:00Z\r
   Name Server: A.IANA-SERVERS.NET\r
   Name Server: B.IANA-SERVERS.NET\r
"
        .to_string();

        let record = parse_whois("whois.verisign-grs.com", raw);
        assert_eq!(
            record.registrar.as_deref(),
            Some("RESERVED-Internet Assigned Numbers Authority")
        );
        assert_eq!(record.creation_date.as_deref(), Some("1995-08-14T04:00:00Z"));
        assert_eq!(
            record.expiration_date.as_deref(),
            Some("2026-08-13T04:00:00Z")
        );
        assert_eq!(
            record.name_servers,
            vec!["a.iana-servers.net", "b.iana-servers.net"]
        );
        assert!(record.raw.contains("EXAMPLE.COM"));
    }

    #[test]
    fn test_parse_keeps_first_registrar_only() {
        let raw = "Registrar: First Corp\nRegistrar: Second Corp\n".to_string();
        let record = parse_whois("whois.test", raw);
        assert_eq!(record.registrar.as_deref(), Some("First Corp"));
    }

    #[test]
    fn test_parse_unstructured_response() {
        let record = parse_whois("whois.test", "No match for domain.\n".to_string());
        assert!(record.registrar.is_none());
        assert!(record.name_servers.is_empty());
    }
}
