// github_search.rs - GitHub Code Search Module
// Purpose: Find code mentioning the target domain through the GitHub
//          search API (a token is effectively required for usable limits)

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SEARCH_API: &str = "https://api.github.com/search/code";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const PER_PAGE: u32 = 10;

/// Trimmed code-search answer as persisted in the report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeSearchResults {
    pub total_count: u64,
    pub items: Vec<CodeSearchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeSearchItem {
    pub name: String,
    pub path: String,
    pub repository: String,
    pub html_url: String,
}

// Shape of the upstream response; only what the report keeps
#[derive(Deserialize)]
struct ApiResponse {
    total_count: u64,
    #[serde(default)]
    items: Vec<ApiItem>,
}

#[derive(Deserialize)]
struct ApiItem {
    name: String,
    path: String,
    html_url: String,
    repository: ApiRepository,
}

#[derive(Deserialize)]
struct ApiRepository {
    full_name: String,
}

/// Search GitHub code for `query` (e.g. the bare domain)
pub async fn code_search(
    client: &Client,
    query: &str,
    token: Option<&str>,
) -> Result<CodeSearchResults> {
    let per_page = PER_PAGE.to_string();
    let mut request = client
        .get(SEARCH_API)
        .header("Accept", "application/vnd.github+json")
        .query(&[("q", query), ("per_page", per_page.as_str())])
        .timeout(SEARCH_TIMEOUT);

    if let Some(token) = token {
        request = request.header("Authorization", format!("token {}", token));
    }

    let response = request.send().await.context("GitHub API request failed")?;
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read GitHub API response")?;

    if !status.is_success() {
        bail!("GitHub API {}: {}", status.as_u16(), body);
    }

    parse_results(&body)
}

fn parse_results(body: &str) -> Result<CodeSearchResults> {
    let api: ApiResponse =
        serde_json::from_str(body).context("GitHub API returned non-json content")?;

    Ok(CodeSearchResults {
        total_count: api.total_count,
        items: api
            .items
            .into_iter()
            .map(|item| CodeSearchItem {
                name: item.name,
                path: item.path,
                repository: item.repository.full_name,
                html_url: item.html_url,
            })
            .collect(),
    })
}
