//! Client side of the translation proxy

use std::fmt;

use reqwest::Client;

use super::{Result, TranslateRequest, TranslateResponse};

/// Shown when the proxy answered without a translation
pub const NO_RESULT_MESSAGE: &str = "No result";

/// Shown when the proxy could not be reached or answered garbage
pub const LOOKUP_FAILED_MESSAGE: &str = "Error fetching translation.";

/// Outcome of a lookup, displayed next to the term as a hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    Found(String),
    NoResult,
    Failed,
}

impl Suggestion {
    /// The translated text, if there was one
    pub fn translation(&self) -> Option<&str> {
        match self {
            Suggestion::Found(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Found(text) => f.write_str(text),
            Suggestion::NoResult => f.write_str(NO_RESULT_MESSAGE),
            Suggestion::Failed => f.write_str(LOOKUP_FAILED_MESSAGE),
        }
    }
}

pub struct TranslationClient {
    client: Client,
    endpoint: String,
}

impl TranslationClient {
    /// Client for the proxy at `proxy_url` (e.g. `http://localhost:3001`)
    pub fn new(proxy_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/translate", proxy_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one request and decode the reply, whatever its status
    pub async fn request(&self, request: &TranslateRequest) -> Result<TranslateResponse> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body: TranslateResponse = response.json().await?;

        if !status.is_success() {
            log::warn!(
                "Translation proxy returned {}: {}",
                status,
                body.details.as_deref().or(body.error.as_deref()).unwrap_or("no details")
            );
        }
        Ok(body)
    }

    /// Suggest a definition for `term` from the collection's language.
    /// Never retried; every failure becomes [`Suggestion::Failed`].
    pub async fn suggest(&self, term: &str, collection: &str) -> Suggestion {
        let request = TranslateRequest::for_collection(term, collection);
        match self.request(&request).await {
            Ok(TranslateResponse {
                translation: Some(text),
                ..
            }) if !text.is_empty() => Suggestion::Found(text),
            Ok(_) => Suggestion::NoResult,
            Err(e) => {
                log::error!("Translation lookup for '{}' failed: {}", term, e);
                Suggestion::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let client = TranslationClient::new("http://localhost:3001/").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3001/translate");
    }

    #[test]
    fn test_suggestion_display() {
        assert_eq!(Suggestion::Found("house".to_string()).to_string(), "house");
        assert_eq!(Suggestion::NoResult.to_string(), "No result");
        assert_eq!(Suggestion::Failed.to_string(), "Error fetching translation.");
        assert_eq!(Suggestion::NoResult.translation(), None);
    }

    #[tokio::test]
    async fn test_unreachable_proxy_fails() {
        // Port 9 (discard) is not expected to run an HTTP server
        let client = TranslationClient::new("http://127.0.0.1:9").unwrap();
        assert_eq!(client.suggest("Haus", "german").await, Suggestion::Failed);
    }
}
