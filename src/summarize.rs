//! File summaries from the completion service, behind the shared rate limiter.

use crate::contract::CompletionClient;
use crate::rate_limit::RateLimiter;
use std::sync::Arc;
use tracing::{error, info};

/// Prefix of the text recorded when a summary could not be obtained.
pub const FALLBACK_PREFIX: &str = "Summary unavailable: ";

/// What the summarizer produced for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Generated(String),
    /// Service or transport failure; carries the fallback text.
    Fallback(String),
}

impl Summary {
    pub fn text(&self) -> &str {
        match self {
            Summary::Generated(t) | Summary::Fallback(t) => t,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Summary::Fallback(_))
    }
}

pub struct Summarizer {
    client: Arc<dyn CompletionClient>,
    limiter: Arc<RateLimiter>,
    max_prompt_chars: usize,
}

impl Summarizer {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        limiter: Arc<RateLimiter>,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            client,
            limiter,
            max_prompt_chars,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Prompt sent for `path`, with the content cut to the configured budget.
    pub fn prompt(&self, path: &str, content: &str) -> String {
        let (body, truncated) = truncate_chars(content, self.max_prompt_chars);
        let note = if truncated { "\n[... content truncated ...]" } else { "" };
        format!(
            "Describe the purpose of the file `{path}` in two or three sentences. \
             Focus on what it does, not on how it is formatted.\n\n```\n{body}{note}\n```"
        )
    }

    /// Summarize one file. Never fails: a single attempt is made, and any
    /// error becomes [`Summary::Fallback`].
    pub async fn summarize(&self, path: &str, content: &str) -> Summary {
        let prompt = self.prompt(path, content);
        self.limiter.acquire().await;
        match self.client.complete(&prompt).await {
            Ok(text) => {
                info!(path, chars = text.len(), "Summary generated");
                Summary::Generated(text.trim().to_string())
            }
            Err(e) => {
                error!(path, error = %e, "Summary request failed");
                Summary::Fallback(format!("{FALLBACK_PREFIX}{e}"))
            }
        }
    }
}

/// Cut `text` to at most `max` chars, on a char boundary.
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}
