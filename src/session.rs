//! Study session: the state a front-end owns
//!
//! Ties the collection registry, the card store, the learning cycler and the
//! card form together. Front-ends mutate it only through the operations
//! below. Store and network failures are logged and surfaced as a
//! [`Notice`]; they never propagate out of the session.

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::SuggestionPolicy;
use crate::flashcards::{
    Card, CardFields, CardStore, CollectionRegistry, LearningCycler, RegistryError,
};
use crate::store::DocumentStore;
use crate::translate::{Suggestion, TranslationClient};

/// Message for the front-end's status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Contents of the add/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardForm {
    pub term: String,
    pub definition: String,
    /// Name typed into the "new collection" field
    pub new_collection: String,
    pub suggestion: Option<Suggestion>,
    /// Id of the card being edited, `None` when adding
    pub editing: Option<String>,
}

impl CardForm {
    fn clear_card(&mut self) {
        self.term.clear();
        self.definition.clear();
        self.suggestion = None;
        self.editing = None;
    }
}

/// What submitting the form does right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Lookup,
    Save,
}

pub struct StudySession {
    store: Arc<dyn DocumentStore>,
    translator: Option<TranslationClient>,
    policy: SuggestionPolicy,
    registry: CollectionRegistry,
    cards: CardStore,
    learning: LearningCycler,
    form: CardForm,
    notice: Option<Notice>,
}

impl StudySession {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        translator: Option<TranslationClient>,
        policy: SuggestionPolicy,
    ) -> Self {
        Self {
            store,
            translator,
            policy,
            registry: CollectionRegistry::new(),
            cards: CardStore::new(),
            learning: LearningCycler::new(),
            form: CardForm::default(),
            notice: None,
        }
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    pub fn collections(&self) -> &[String] {
        self.registry.names()
    }

    pub fn active_collection(&self) -> Option<&str> {
        self.registry.active()
    }

    pub fn cards(&self) -> &[Card] {
        self.cards.cards()
    }

    pub fn learning(&self) -> &LearningCycler {
        &self.learning
    }

    pub fn form(&self) -> &CardForm {
        &self.form
    }

    pub fn policy(&self) -> SuggestionPolicy {
        self.policy
    }

    /// Take the pending status message, if any
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn info(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Info(message.into()));
    }

    fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.notice = Some(Notice::Error(message));
    }

    // ===== Collections =====

    /// Load the registry and the cards of the first collection
    pub async fn start(&mut self) {
        if let Err(e) = self.registry.initialize(self.store.as_ref()).await {
            self.fail(format!("Failed to load collections: {}", e));
            return;
        }
        self.reload_cards().await;
    }

    /// Refetch the cards of the active collection and rewind the cycler
    async fn reload_cards(&mut self) {
        self.learning.reset();
        let Some(collection) = self.registry.active().map(str::to_string) else {
            return;
        };
        if let Err(e) = self.cards.load_for(self.store.as_ref(), &collection).await {
            self.fail(format!("Failed to load cards for '{}': {}", collection, e));
        }
    }

    /// Switch to another registered collection. Returns whether it switched.
    pub async fn select_collection(&mut self, name: &str) -> bool {
        if self.registry.active() == Some(name) || !self.registry.select(name) {
            return false;
        }
        self.form.clear_card();
        self.reload_cards().await;
        true
    }

    pub fn set_new_collection(&mut self, name: impl Into<String>) {
        self.form.new_collection = name.into();
    }

    /// Register the name typed into the new-collection field and switch to it
    pub async fn add_collection(&mut self) -> bool {
        let candidate = self.form.new_collection.clone();
        match self
            .registry
            .add_collection(self.store.as_ref(), &candidate)
            .await
        {
            Ok(Some(name)) => {
                self.form.new_collection.clear();
                self.form.clear_card();
                self.reload_cards().await;
                self.info(format!("Added collection '{}'", name));
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.fail(format!("Failed to add collection '{}': {}", candidate.trim(), e));
                false
            }
        }
    }

    /// Delete the cards of a collection, then unregister it.
    ///
    /// The registry is left untouched when the cards cannot be deleted, so a
    /// collection is never unregistered while its cards remain stored.
    pub async fn remove_collection(&mut self, name: &str) -> bool {
        if !self.registry.contains(name) {
            return false;
        }
        if self.registry.names().len() == 1 {
            self.fail(format!(
                "Failed to remove collection '{}': {}",
                name,
                RegistryError::LastCollection
            ));
            return false;
        }

        let was_active = self.registry.active() == Some(name);
        if let Err(e) = CardStore::purge(self.store.as_ref(), name).await {
            // Some cards may be gone already
            if was_active {
                self.reload_cards().await;
            }
            self.fail(format!(
                "Failed to remove collection '{}', its cards could not be deleted: {}",
                name, e
            ));
            return false;
        }

        match self
            .registry
            .remove_collection(self.store.as_ref(), name)
            .await
        {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                self.fail(format!("Failed to remove collection '{}': {}", name, e));
                return false;
            }
        }

        if was_active {
            self.form.clear_card();
            self.reload_cards().await;
        }
        self.info(format!("Removed collection '{}'", name));
        true
    }

    // ===== Form =====

    /// Edit the term. Any previous suggestion no longer applies.
    pub fn set_term(&mut self, term: impl Into<String>) {
        self.form.term = term.into();
        self.form.suggestion = None;
    }

    pub fn set_definition(&mut self, definition: impl Into<String>) {
        self.form.definition = definition.into();
    }

    /// Lookup while only the term is filled in, save otherwise
    pub fn primary_action(&self) -> PrimaryAction {
        let lookup_allowed = self.policy != SuggestionPolicy::Disabled;
        if lookup_allowed
            && !self.form.term.trim().is_empty()
            && self.form.definition.trim().is_empty()
        {
            PrimaryAction::Lookup
        } else {
            PrimaryAction::Save
        }
    }

    pub async fn submit(&mut self) -> bool {
        match self.primary_action() {
            PrimaryAction::Lookup => self.lookup().await,
            PrimaryAction::Save => self.save_card().await,
        }
    }

    /// Store the form as a new card, or as the card being edited.
    ///
    /// Blank fields leave the form untouched. Otherwise the form is cleared
    /// once the store answered, whether or not the write succeeded.
    pub async fn save_card(&mut self) -> bool {
        if CardFields::validated(&self.form.term, &self.form.definition).is_none() {
            return false;
        }
        let Some(collection) = self.cards.collection().map(str::to_string) else {
            return false;
        };

        let store = self.store.as_ref();
        let result = match self.form.editing.clone() {
            Some(id) => {
                self.cards
                    .update_card(store, &id, &self.form.term, &self.form.definition)
                    .await
            }
            None => {
                self.cards
                    .add_card(store, &self.form.term, &self.form.definition)
                    .await
            }
        };
        self.form.clear_card();

        match result {
            Ok(Some(card)) => {
                log::info!("Saved card {} in '{}'", card.id, collection);
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.fail(format!("Failed to save card in '{}': {}", collection, e));
                false
            }
        }
    }

    /// Load a card into the form for editing
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(card) = self.cards.get(id) else {
            return false;
        };
        self.form.term = card.term.clone();
        self.form.definition = card.definition.clone();
        self.form.suggestion = None;
        self.form.editing = Some(card.id.clone());
        true
    }

    pub fn cancel_edit(&mut self) {
        self.form.clear_card();
    }

    pub async fn delete_card(&mut self, id: &str) -> bool {
        match self.cards.delete_card(self.store.as_ref(), id).await {
            Ok(removed) => {
                if self.form.editing.as_deref() == Some(id) {
                    self.form.clear_card();
                }
                if self.learning.index() >= self.cards.len() {
                    self.learning.reset();
                }
                removed
            }
            Err(e) => {
                self.fail(format!("Failed to delete card {}: {}", id, e));
                false
            }
        }
    }

    /// Ask the translation proxy for a definition of the current term
    pub async fn lookup(&mut self) -> bool {
        if self.policy == SuggestionPolicy::Disabled {
            return false;
        }
        let term = self.form.term.trim().to_string();
        if term.is_empty() {
            return false;
        }
        let Some(collection) = self.registry.active().map(str::to_string) else {
            return false;
        };

        let suggestion = match &self.translator {
            Some(client) => client.suggest(&term, &collection).await,
            None => {
                log::warn!("No translation proxy configured");
                Suggestion::Failed
            }
        };

        if self.policy == SuggestionPolicy::FillDefinition
            && self.form.definition.trim().is_empty()
        {
            if let Some(text) = suggestion.translation() {
                self.form.definition = text.to_string();
            }
        }
        let found = suggestion.translation().is_some();
        self.form.suggestion = Some(suggestion);
        found
    }

    // ===== Learning mode =====

    pub fn start_learning(&mut self) -> bool {
        if self.learning.enter(self.cards.len()) {
            return true;
        }
        self.info("No cards to learn in this collection");
        false
    }

    pub fn stop_learning(&mut self) {
        self.learning.exit();
    }

    pub fn next_card(&mut self) {
        if let Some(count) = NonZeroUsize::new(self.cards.len()) {
            self.learning.next(count);
        }
    }

    pub fn previous_card(&mut self) {
        if let Some(count) = NonZeroUsize::new(self.cards.len()) {
            self.learning.previous(count);
        }
    }

    pub fn toggle_answer(&mut self) {
        if self.learning.is_active() {
            self.learning.toggle_answer();
        }
    }

    /// Card shown in learning mode; `None` renders a placeholder
    pub fn presented_card(&self) -> Option<&Card> {
        if !self.learning.is_active() {
            return None;
        }
        self.learning.current(self.cards.cards())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::{REGISTRY_COLLECTION, REGISTRY_DOCUMENT};
    use crate::translate::{start_server, ProxyServer, TranslateError, Translator};
    use crate::store::{
        MemoryStore, Precondition, Result as StoreResult, Revision, StoreError, StoredDocument,
    };
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Dictionary;

    #[async_trait]
    impl Translator for Dictionary {
        async fn translate(
            &self,
            text: &str,
            source_lang: &str,
            _target_lang: &str,
        ) -> crate::translate::Result<String> {
            match (text, source_lang) {
                ("Haus", "de") => Ok("house".to_string()),
                _ => Err(TranslateError::Empty),
            }
        }
    }

    async fn proxy() -> (ProxyServer, TranslationClient) {
        let server = start_server("127.0.0.1:0".parse().unwrap(), Arc::new(Dictionary))
            .await
            .unwrap();
        let client = TranslationClient::new(&server.base_url()).unwrap();
        (server, client)
    }

    async fn started(store: Arc<MemoryStore>) -> StudySession {
        let mut session = StudySession::new(store, None, SuggestionPolicy::Display);
        session.start().await;
        session
    }

    async fn add(session: &mut StudySession, term: &str, definition: &str) {
        session.set_term(term);
        session.set_definition(definition);
        assert!(session.save_card().await);
    }

    #[tokio::test]
    async fn test_start_seeds_defaults() {
        let store = Arc::new(MemoryStore::new());
        let session = started(store.clone()).await;

        assert_eq!(session.collections(), ["english", "german", "latin", "italian"]);
        assert_eq!(session.active_collection(), Some("english"));
        assert!(session.cards().is_empty());
        assert_eq!(store.document_count(REGISTRY_COLLECTION), 1);
    }

    #[tokio::test]
    async fn test_start_with_unavailable_store() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let mut session = started(store).await;

        assert!(session.collections().is_empty());
        assert!(matches!(session.take_notice(), Some(Notice::Error(_))));
        assert_eq!(session.take_notice(), None);
    }

    #[tokio::test]
    async fn test_add_and_delete_card() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store.clone()).await;

        add(&mut session, "  dog ", "chien").await;
        assert_eq!(session.cards().len(), 1);
        assert_eq!(session.cards()[0].term, "dog");
        assert_eq!(session.form(), &CardForm::default());

        let id = session.cards()[0].id.clone();
        assert!(session.delete_card(&id).await);
        assert!(session.cards().is_empty());
        assert_eq!(store.document_count("english"), 0);
    }

    #[tokio::test]
    async fn test_blank_fields_leave_form() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store.clone()).await;

        session.set_term("dog");
        session.set_definition("   ");
        assert!(!session.save_card().await);
        assert_eq!(session.form().term, "dog");
        assert_eq!(store.document_count("english"), 0);
    }

    #[tokio::test]
    async fn test_failed_save_clears_form() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store.clone()).await;

        store.set_unavailable(true);
        session.set_term("dog");
        session.set_definition("chien");
        assert!(!session.save_card().await);

        assert!(session.form().term.is_empty());
        assert!(session.cards().is_empty());
        assert!(matches!(session.take_notice(), Some(Notice::Error(_))));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_card() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store.clone()).await;
        add(&mut session, "dog", "chien").await;

        store.set_unavailable(true);
        let id = session.cards()[0].id.clone();
        assert!(!session.delete_card(&id).await);
        assert_eq!(session.cards().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_card() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store.clone()).await;
        add(&mut session, "dog", "chein").await;
        let id = session.cards()[0].id.clone();

        assert!(session.begin_edit(&id));
        assert_eq!(session.form().definition, "chein");
        session.set_definition("chien");
        assert!(session.save_card().await);

        assert_eq!(session.cards().len(), 1);
        assert_eq!(session.cards()[0].definition, "chien");
        assert_eq!(session.form().editing, None);

        let stored = store.get("english", &id).await.unwrap().unwrap();
        assert_eq!(stored.data, json!({"term": "dog", "definition": "chien"}));
    }

    #[tokio::test]
    async fn test_select_collection_reloads_and_resets() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store.clone()).await;
        add(&mut session, "dog", "chien").await;
        add(&mut session, "cat", "chat").await;

        assert!(session.start_learning());
        session.next_card();
        session.toggle_answer();

        assert!(session.select_collection("german").await);
        assert!(session.cards().is_empty());
        assert_eq!(session.learning().index(), 0);
        assert!(!session.learning().answer_visible());

        assert!(!session.select_collection("klingon").await);
        assert!(session.select_collection("english").await);
        assert_eq!(session.cards().len(), 2);
    }

    #[tokio::test]
    async fn test_add_and_remove_collection() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store.clone()).await;

        session.set_new_collection("  Spanish ");
        assert!(session.add_collection().await);
        assert_eq!(session.active_collection(), Some("spanish"));
        assert!(session.form().new_collection.is_empty());

        session.set_new_collection("datas");
        assert!(!session.add_collection().await);
        assert_eq!(session.form().new_collection, "datas");

        add(&mut session, "perro", "dog").await;
        assert!(session.remove_collection("spanish").await);
        assert_eq!(session.active_collection(), Some("english"));
        assert_eq!(store.document_count("spanish"), 0);

        let registry = store
            .get(REGISTRY_COLLECTION, REGISTRY_DOCUMENT)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            registry.data,
            json!({"list": ["english", "german", "latin", "italian"]})
        );
    }

    /// Store whose deletes always fail
    struct UndeletableStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for UndeletableStore {
        async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
            self.0.get(collection, id).await
        }

        async fn list(&self, collection: &str) -> StoreResult<Vec<StoredDocument>> {
            self.0.list(collection).await
        }

        async fn create(&self, collection: &str, data: Value) -> StoreResult<String> {
            self.0.create(collection, data).await
        }

        async fn set(&self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
            self.0.set(collection, id, data).await
        }

        async fn set_if(
            &self,
            collection: &str,
            id: &str,
            data: Value,
            precondition: Precondition,
        ) -> StoreResult<Revision> {
            self.0.set_if(collection, id, data, precondition).await
        }

        async fn delete(&self, _collection: &str, _id: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("delete refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_remove_collection_keeps_registry_when_cards_remain() {
        let store = Arc::new(UndeletableStore(MemoryStore::new()));
        let mut session = StudySession::new(store.clone(), None, SuggestionPolicy::Display);
        session.start().await;

        session.set_new_collection("spanish");
        assert!(session.add_collection().await);
        add(&mut session, "perro", "dog").await;

        assert!(!session.remove_collection("spanish").await);
        assert!(matches!(session.take_notice(), Some(Notice::Error(_))));
        assert!(session.collections().iter().any(|n| n == "spanish"));
        assert_eq!(session.active_collection(), Some("spanish"));
        assert_eq!(session.cards().len(), 1);

        let registry = store
            .get(REGISTRY_COLLECTION, REGISTRY_DOCUMENT)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            registry.data,
            json!({"list": ["english", "german", "latin", "italian", "spanish"]})
        );
    }

    #[tokio::test]
    async fn test_remove_last_collection_keeps_cards() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(REGISTRY_COLLECTION, REGISTRY_DOCUMENT, json!({"list": ["german"]}))
            .await
            .unwrap();
        let mut session = started(store.clone()).await;
        add(&mut session, "Haus", "house").await;

        assert!(!session.remove_collection("german").await);
        assert!(matches!(session.take_notice(), Some(Notice::Error(_))));
        assert_eq!(store.document_count("german"), 1);
    }

    #[tokio::test]
    async fn test_learning_cycle() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store).await;

        assert!(!session.start_learning());
        assert_eq!(session.presented_card(), None);

        for (term, definition) in [("a", "1"), ("b", "2"), ("c", "3")] {
            add(&mut session, term, definition).await;
        }
        assert!(session.start_learning());
        let first = session.presented_card().unwrap().clone();

        session.previous_card();
        assert_eq!(session.learning().index(), 2);
        session.next_card();
        assert_eq!(session.presented_card(), Some(&first));

        session.toggle_answer();
        assert!(session.learning().answer_visible());
        session.next_card();
        assert!(!session.learning().answer_visible());

        session.stop_learning();
        assert_eq!(session.presented_card(), None);
    }

    #[tokio::test]
    async fn test_delete_last_presented_card() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store).await;
        add(&mut session, "a", "1").await;
        add(&mut session, "b", "2").await;

        assert!(session.start_learning());
        session.previous_card();
        let id = session.presented_card().unwrap().id.clone();
        assert!(session.delete_card(&id).await);

        assert_eq!(session.learning().index(), 0);
        assert!(session.presented_card().is_some());
    }

    #[tokio::test]
    async fn test_primary_action() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store.clone()).await;

        assert_eq!(session.primary_action(), PrimaryAction::Save);
        session.set_term("Haus");
        assert_eq!(session.primary_action(), PrimaryAction::Lookup);
        session.set_definition("house");
        assert_eq!(session.primary_action(), PrimaryAction::Save);

        let mut disabled = StudySession::new(store, None, SuggestionPolicy::Disabled);
        disabled.start().await;
        disabled.set_term("Haus");
        assert_eq!(disabled.primary_action(), PrimaryAction::Save);
        assert!(!disabled.lookup().await);
    }

    #[tokio::test]
    async fn test_lookup_displays_suggestion() {
        let (mut server, client) = proxy().await;
        let store = Arc::new(MemoryStore::new());
        let mut session = StudySession::new(store, Some(client), SuggestionPolicy::Display);
        session.start().await;
        assert!(session.select_collection("german").await);

        session.set_term("Haus");
        assert!(session.submit().await);
        assert_eq!(
            session.form().suggestion,
            Some(Suggestion::Found("house".to_string()))
        );
        assert!(session.form().definition.is_empty());

        session.set_term("Baum");
        assert_eq!(session.form().suggestion, None);
        assert!(!session.lookup().await);
        assert_eq!(session.form().suggestion, Some(Suggestion::NoResult));

        server.stop();
    }

    #[tokio::test]
    async fn test_lookup_fills_definition() {
        let (mut server, client) = proxy().await;
        let store = Arc::new(MemoryStore::new());
        let mut session =
            StudySession::new(store, Some(client), SuggestionPolicy::FillDefinition);
        session.start().await;
        session.select_collection("german").await;

        session.set_term("Haus");
        assert!(session.lookup().await);
        assert_eq!(session.form().definition, "house");
        assert_eq!(session.primary_action(), PrimaryAction::Save);

        server.stop();
    }

    #[tokio::test]
    async fn test_lookup_without_proxy() {
        let store = Arc::new(MemoryStore::new());
        let mut session = started(store).await;
        session.set_term("dog");
        assert!(!session.lookup().await);
        assert_eq!(session.form().suggestion, Some(Suggestion::Failed));
    }
}
