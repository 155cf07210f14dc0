//! Translation proxy: `POST /translate` in front of DeepL

use std::sync::Arc;

use anyhow::Context;

use flashcards_lib::translate::{start_server, DeepLTranslator};
use flashcards_lib::ProxyConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ProxyConfig::from_env().context("Invalid proxy configuration")?;
    let translator = DeepLTranslator::new(config.auth_key.clone(), config.deepl_api_url.clone())
        .context("Failed to create DeepL client")?;
    log::info!("Forwarding translations to {}", translator.api_url());

    let mut server = start_server(config.addr, Arc::new(translator))
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    server.stop();
    server.wait().await;
    Ok(())
}
