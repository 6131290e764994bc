use std::sync::Arc;

use crate::{
    accounts::Accounts,
    auth::TokenIssuer,
    config::AppConfig,
    documents::DocumentRepository,
    ingest::ExternalIngest,
    store::{DocumentStore, MemoryStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub accounts: Accounts,
    pub documents: DocumentRepository,
    pub ingest: ExternalIngest,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        documents: Arc<dyn DocumentStore>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        let documents = DocumentRepository::new(documents);
        Self {
            config: Arc::new(config),
            accounts: Accounts::new(users.clone(), tokens.clone()),
            ingest: ExternalIngest::new(users, documents.clone()),
            documents,
            tokens,
        }
    }

    pub fn in_memory(config: AppConfig, tokens: Arc<dyn TokenIssuer>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store, tokens)
    }
}
