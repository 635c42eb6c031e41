//! DuckDuckGo instant-answer search.

use serde::Deserialize;
use tracing::debug;

use super::SearchProvider;
use super::error::ProviderError;
use crate::config::SearchConfig;
use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    related_topics: Vec<Topic>,
}

/// Either a single result or a named group of results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Topic {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    topics: Vec<Topic>,
}

impl Topic {
    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(text) = self.text.as_deref() {
            out.push(text);
        }
        for topic in &self.topics {
            topic.collect_texts(out);
        }
    }
}

impl InstantAnswer {
    fn snippets(&self, limit: usize) -> Vec<String> {
        let mut texts = Vec::new();
        if !self.abstract_text.trim().is_empty() {
            texts.push(self.abstract_text.as_str());
        }
        for topic in &self.related_topics {
            topic.collect_texts(&mut texts);
        }

        texts
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .take(limit)
            .map(str::to_string)
            .collect()
    }
}

/// Search over the DuckDuckGo instant-answer JSON API.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    http: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    /// Creates a search client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mailmate/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl SearchProvider for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<String>, ProviderError> {
        let answer: InstantAnswer = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let snippets = answer.snippets(limit);
        debug!("Search for {query:?} returned {} snippets", snippets.len());
        Ok(snippets)
    }
}
