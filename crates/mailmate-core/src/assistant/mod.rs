//! Writing assistant over a language model and a web search backend.
//!
//! Both backends sit behind traits so the assistant can be driven by the
//! bundled HTTP clients or by canned providers in tests.

mod duckduckgo;
mod error;
mod openrouter;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tracing::debug;

pub use duckduckgo::DuckDuckGoSearch;
pub use error::ProviderError;
pub use openrouter::OpenRouterClient;

use crate::draft::Draft;
use crate::error::{Error, Result};

/// Category used when a message cannot be classified.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Tone used when the caller does not specify one.
pub const DEFAULT_TONE: &str = "formal and polite";

/// A text completion backend.
pub trait CompletionProvider: Send + Sync {
    /// Returns the model's answer to a single user prompt.
    fn complete(
        &self,
        prompt: &str,
    ) -> impl Future<Output = std::result::Result<String, ProviderError>> + Send;
}

/// A web search backend.
pub trait SearchProvider: Send + Sync {
    /// Returns up to `limit` text snippets relevant to `query`.
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = std::result::Result<Vec<String>, ProviderError>> + Send;
}

/// Language a draft is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    /// Chinese.
    #[default]
    Chinese,
    /// English.
    English,
    /// Japanese.
    Japanese,
}

impl Language {
    /// Instruction prefix asking the model to write in this language.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Chinese => "請用中文撰寫。",
            Self::English => "Write the email in English.",
            Self::Japanese => "日本語で書いてください。",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Chinese => "zh",
            Self::English => "en",
            Self::Japanese => "ja",
        })
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "zh" | "chinese" | "中文" => Ok(Self::Chinese),
            "en" | "english" | "英文" => Ok(Self::English),
            "ja" | "japanese" | "日文" | "日本語" => Ok(Self::Japanese),
            other => Err(Error::Config(format!("unsupported language: {other}"))),
        }
    }
}

/// Strips labels and brackets models like to wrap a subject line in.
fn clean_subject(answer: &str) -> String {
    const PREFIXES: [&str; 4] = ["Subject:", "subject:", "主旨：", "件名："];
    const BRACKETS: [char; 5] = ['「', '」', '"', '“', '”'];

    let mut subject = answer.trim();
    for prefix in PREFIXES {
        if let Some(rest) = subject.strip_prefix(prefix) {
            subject = rest.trim_start();
        }
    }
    subject.replace(BRACKETS, "").trim().to_string()
}

/// Drafting, classification, research and planning helpers.
#[derive(Debug, Clone)]
pub struct Assistant<C, S> {
    completion: C,
    search: S,
    search_limit: usize,
}

impl<C: CompletionProvider, S: SearchProvider> Assistant<C, S> {
    /// Creates an assistant. `search_limit` caps snippets per research query.
    pub const fn new(completion: C, search: S, search_limit: usize) -> Self {
        Self {
            completion,
            search,
            search_limit,
        }
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        Ok(self.completion.complete(prompt).await?)
    }

    /// Proposes a subject line for a message described by `description`.
    ///
    /// Falls back to the description itself if the model answers with
    /// nothing usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if the completion request fails.
    pub async fn suggest_subject(&self, description: &str) -> Result<String> {
        let answer = self
            .ask(&format!(
                "Suggest a concise email subject line for the following description. \
                 Reply with the subject only.\n{description}"
            ))
            .await?;

        let subject = clean_subject(&answer);
        Ok(if subject.is_empty() {
            description.trim().to_string()
        } else {
            subject
        })
    }

    /// Writes a draft: a suggested subject plus a body in `language` and
    /// `tone`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if either completion request fails.
    pub async fn compose(&self, description: &str, language: Language, tone: &str) -> Result<Draft> {
        let subject = self.suggest_subject(description).await?;
        let tone = if tone.trim().is_empty() { DEFAULT_TONE } else { tone.trim() };

        let body = self
            .ask(&format!(
                "Write an email in a {tone} tone with the subject \"{subject}\". \
                 Start directly with the greeting and do not repeat the subject.\n\
                 Context: {description}\n{}",
                language.instruction()
            ))
            .await?;

        debug!("Composed {language} draft \"{subject}\"");
        Ok(Draft::new(subject, body.trim()))
    }

    /// Labels a message as Work, School, Personal or Other.
    ///
    /// The trimmed answer is returned as given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if the completion request fails.
    pub async fn classify(&self, subject: &str, body: &str) -> Result<String> {
        let answer = self
            .ask(&format!(
                "Classify this email into exactly one of: Work, School, Personal, Other. \
                 Reply with the category only.\nSubject: {subject}\nBody: {body}\nCategory:"
            ))
            .await?;
        Ok(answer.trim().to_string())
    }

    /// Searches for `topic` and summarizes the findings.
    ///
    /// Returns `None` when the search finds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if the search or summary request fails.
    pub async fn research(&self, topic: &str) -> Result<Option<String>> {
        let snippets = self.search.search(topic, self.search_limit).await?;
        if snippets.is_empty() {
            debug!("No search results for {topic:?}");
            return Ok(None);
        }

        let report = self
            .ask(&format!(
                "Write a summary report about \"{topic}\" based on the following material:\n{}",
                snippets.join("\n\n")
            ))
            .await?;
        Ok(Some(report))
    }

    /// Breaks a goal into actionable sub-tasks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if the completion request fails.
    pub async fn break_down(&self, goal: &str) -> Result<String> {
        self.ask(&format!(
            "I want to achieve this goal: {goal}\nBreak it down into actionable sub-tasks:"
        ))
        .await
    }

    /// Orders to-do items by importance and urgency.
    ///
    /// Blank items are dropped; returns `None` without calling the model if
    /// nothing is left.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if the completion request fails.
    pub async fn prioritize<T: AsRef<str>>(&self, tasks: &[T]) -> Result<Option<String>> {
        let items: Vec<String> = tasks
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(|t| format!("- {t}"))
            .collect();
        if items.is_empty() {
            return Ok(None);
        }

        let answer = self
            .ask(&format!(
                "Sort the following to-do items by importance and urgency:\n{}",
                items.join("\n")
            ))
            .await?;
        Ok(Some(answer))
    }
}
