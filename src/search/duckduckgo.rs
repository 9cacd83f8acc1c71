//! DuckDuckGo HTML search. Needs no API key.

use super::SearchProvider;
use crate::config::SearchSettings;
use crate::error::{PlanetaryError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// One parsed search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Search provider backed by the DuckDuckGo HTML endpoint.
pub struct DuckDuckGoSearch {
    http: reqwest::Client,
    endpoint: Url,
    max_results: usize,
    extractor: ResultExtractor,
}

impl DuckDuckGoSearch {
    /// Create a provider from settings.
    pub fn from_settings(settings: &SearchSettings) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint).map_err(|e| {
            PlanetaryError::Config(format!("Invalid search.endpoint '{}': {}", settings.endpoint, e))
        })?;

        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            max_results: settings.max_results,
            extractor: ResultExtractor::new(),
        })
    }

    fn search_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query);
        url
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<String> {
        let url = self.search_url(query);
        debug!(%url, "running web search");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlanetaryError::tool(
                "webSearchTool",
                format!("search provider returned HTTP {}", status),
            ));
        }

        let html = response.text().await?;
        let hits = self.extractor.extract(&html, self.max_results);
        debug!(hits = hits.len(), "search finished");

        Ok(format_hits(query, &hits))
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

/// Pulls result titles, snippets and links out of the HTML results page.
struct ResultExtractor {
    title: Regex,
    snippet: Regex,
    url: Regex,
    tag: Regex,
    whitespace: Regex,
}

impl ResultExtractor {
    fn new() -> Self {
        Self {
            title: Regex::new(r#"(?s)class="result__a"[^>]*>(.*?)</a>"#).expect("Invalid regex"),
            snippet: Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#)
                .expect("Invalid regex"),
            url: Regex::new(r#"(?s)class="result__url"[^>]*>(.*?)</a>"#).expect("Invalid regex"),
            tag: Regex::new(r"<[^>]+>").expect("Invalid regex"),
            whitespace: Regex::new(r"\s+").expect("Invalid regex"),
        }
    }

    fn extract(&self, html: &str, limit: usize) -> Vec<SearchHit> {
        html.split("result__body")
            .skip(1)
            .filter_map(|chunk| {
                let title = self.capture_text(&self.title, chunk)?;
                if title.is_empty() {
                    return None;
                }
                Some(SearchHit {
                    title,
                    snippet: self.capture_text(&self.snippet, chunk).unwrap_or_default(),
                    url: self.capture_text(&self.url, chunk).unwrap_or_default(),
                })
            })
            .take(limit)
            .collect()
    }

    fn capture_text(&self, re: &Regex, chunk: &str) -> Option<String> {
        let raw = re.captures(chunk)?.get(1)?.as_str();
        let stripped = self.tag.replace_all(raw, "");
        let collapsed = self.whitespace.replace_all(&stripped, " ");
        Some(html_decode(collapsed.trim()))
    }
}

fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for: {}", query);
    }

    hits.iter()
        .map(|h| {
            if h.url.is_empty() {
                format!("{}\n{}", h.title, h.snippet)
            } else {
                format!("{}\n{}\nURL: {}", h.title, h.snippet, h.url)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Basic HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
