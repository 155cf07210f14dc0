//! Single-word translation lookup
//!
//! - [`lang`] maps collection names to language codes
//! - [`client`] asks the proxy for a suggested definition
//! - [`deepl`] talks to the DeepL API on the proxy side
//! - [`server`] is the proxy's HTTP surface

pub mod client;
pub mod deepl;
pub mod lang;
pub mod server;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::{Suggestion, TranslationClient};
pub use deepl::DeepLTranslator;
pub use lang::{language_code, FALLBACK_LANGUAGE};
pub use server::{start_server, ProxyServer};

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error: {status} - {message}")]
    Provider { status: u16, message: String },

    #[error("Provider returned no translation")]
    Empty,
}

pub type Result<T> = std::result::Result<T, TranslateError>;

/// Body of `POST /translate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
}

impl TranslateRequest {
    /// Lookup of `term` from the collection's language into the fallback language
    pub fn for_collection(term: &str, collection: &str) -> Self {
        Self {
            text: term.to_string(),
            source_lang: language_code(collection).to_string(),
            target_lang: FALLBACK_LANGUAGE.to_string(),
        }
    }

    /// All three fields present and non-empty
    pub fn is_complete(&self) -> bool {
        !self.text.is_empty() && !self.source_lang.is_empty() && !self.target_lang.is_empty()
    }
}

/// Reply of `POST /translate`, success or failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Translation provider behind the proxy
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_for_german_collection() {
        let request = TranslateRequest::for_collection("Haus", "german");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"text": "Haus", "sourceLang": "de", "targetLang": "en-US"})
        );
    }

    #[test]
    fn test_request_completeness() {
        let partial: TranslateRequest =
            serde_json::from_value(json!({"text": "Haus", "sourceLang": "de"})).unwrap();
        assert!(!partial.is_complete());
        assert!(TranslateRequest::for_collection("Haus", "german").is_complete());
        assert!(!TranslateRequest::for_collection("", "german").is_complete());
    }

    #[test]
    fn test_response_shapes() {
        let ok = TranslateResponse {
            translation: Some("house".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"translation": "house"}));

        let err: TranslateResponse =
            serde_json::from_value(json!({"error": "Translation failed", "details": "quota"}))
                .unwrap();
        assert!(err.translation.is_none());
        assert_eq!(err.details.as_deref(), Some("quota"));
    }
}
