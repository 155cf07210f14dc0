//! DeepL API translator

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Result, TranslateError, Translator};

const FREE_API_URL: &str = "https://api-free.deepl.com";
const PRO_API_URL: &str = "https://api.deepl.com";

#[derive(Serialize)]
struct DeepLRequest<'a> {
    text: [&'a str; 1],
    source_lang: String,
    target_lang: String,
}

#[derive(Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize)]
struct DeepLTranslation {
    text: String,
}

#[derive(Deserialize)]
struct DeepLErrorBody {
    message: Option<String>,
}

pub struct DeepLTranslator {
    client: Client,
    auth_key: String,
    api_url: String,
}

impl DeepLTranslator {
    /// Translator for `auth_key`. Free-tier keys (suffix `:fx`) go to the
    /// free endpoint unless `api_url` overrides it.
    pub fn new(auth_key: String, api_url: Option<String>) -> Result<Self> {
        let api_url = api_url.unwrap_or_else(|| {
            if auth_key.ends_with(":fx") {
                FREE_API_URL.to_string()
            } else {
                PRO_API_URL.to_string()
            }
        });

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            auth_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// DeepL accepts only base languages as source ("EN", not "EN-US")
fn source_code(lang: &str) -> String {
    lang.split('-').next().unwrap_or(lang).to_uppercase()
}

fn target_code(lang: &str) -> String {
    lang.to_uppercase()
}

#[async_trait]
impl Translator for DeepLTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let body = DeepLRequest {
            text: [text],
            source_lang: source_code(source_lang),
            target_lang: target_code(target_lang),
        };

        let response = self
            .client
            .post(format!("{}/v2/translate", self.api_url))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.auth_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<DeepLErrorBody>(&raw)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(raw);
            return Err(TranslateError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: DeepLResponse = response.json().await?;
        parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or(TranslateError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_selection() {
        let free = DeepLTranslator::new("abc:fx".to_string(), None).unwrap();
        assert_eq!(free.api_url(), FREE_API_URL);

        let pro = DeepLTranslator::new("abc".to_string(), None).unwrap();
        assert_eq!(pro.api_url(), PRO_API_URL);

        let custom =
            DeepLTranslator::new("abc".to_string(), Some("http://127.0.0.1:8080/".to_string()))
                .unwrap();
        assert_eq!(custom.api_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(source_code("de"), "DE");
        assert_eq!(source_code("en-US"), "EN");
        assert_eq!(target_code("en-US"), "EN-US");
    }

    #[test]
    fn test_request_body() {
        let body = DeepLRequest {
            text: ["Haus"],
            source_lang: source_code("de"),
            target_lang: target_code("en-US"),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"text": ["Haus"], "source_lang": "DE", "target_lang": "EN-US"})
        );
    }
}
