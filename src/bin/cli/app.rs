use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::runtime::Runtime;

use flashcards_lib::flashcards::{CardStore, CollectionRegistry};
use flashcards_lib::store::DocumentStore;
use flashcards_lib::translate::TranslationClient;
use flashcards_lib::{AppConfig, StudySession};

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,
    runtime: Runtime,
}

impl App {
    /// Load the config and open the configured store
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = AppConfig::load(config_path).context("Failed to load configuration")?;
        let store = config
            .store
            .build()
            .context("Failed to open document store")?;
        let runtime = Runtime::new().context("Failed to start async runtime")?;

        Ok(Self {
            config,
            store,
            runtime,
        })
    }

    /// Run one async operation to completion
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Client for the configured proxy, `None` if the URL is unusable
    pub fn translator(&self) -> Option<TranslationClient> {
        match TranslationClient::new(&self.config.proxy_url) {
            Ok(client) => Some(client),
            Err(e) => {
                log::warn!("Translation proxy unavailable: {}", e);
                None
            }
        }
    }

    /// A fresh session over this app's store; call `start` before use
    pub fn session(&self) -> StudySession {
        StudySession::new(
            self.store.clone(),
            self.translator(),
            self.config.suggestion_policy,
        )
    }

    /// Load the collection registry, seeding defaults on first use
    pub fn registry(&self) -> Result<CollectionRegistry> {
        let mut registry = CollectionRegistry::new();
        self.block_on(registry.initialize(self.store.as_ref()))
            .context("Failed to load collections")?;
        Ok(registry)
    }

    /// Resolve a collection argument; `None` picks the first collection
    pub fn resolve_collection(&self, registry: &CollectionRegistry, name: Option<&str>) -> Result<String> {
        let Some(name) = name else {
            return registry
                .active()
                .map(str::to_string)
                .context("No collections registered");
        };

        let name = flashcards_lib::flashcards::normalize_collection_name(name);
        if registry.contains(&name) {
            return Ok(name);
        }
        bail!(
            "No collection named '{}'. Available collections:\n{}",
            name,
            registry
                .names()
                .iter()
                .map(|n| format!("  - {}", n))
                .collect::<Vec<_>>()
                .join("\n")
        )
    }

    /// Cards of a collection
    pub fn load_cards(&self, collection: &str) -> Result<CardStore> {
        let mut cards = CardStore::new();
        self.block_on(cards.load_for(self.store.as_ref(), collection))
            .with_context(|| format!("Failed to load cards for '{}'", collection))?;
        Ok(cards)
    }
}
