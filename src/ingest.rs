use std::sync::Arc;

use tracing::{info, warn};

use crate::documents::DocumentRepository;
use crate::error::{ArchiveError, ArchiveResult};
use crate::models::Document;
use crate::store::UserStore;
use crate::validation::ExternalUploadInput;

/// Inserts documents on behalf of a user named by email, for trusted
/// third-party services. Unlike end-user paths this one reports unknown
/// users explicitly.
#[derive(Clone)]
pub struct ExternalIngest {
    users: Arc<dyn UserStore>,
    documents: DocumentRepository,
}

impl ExternalIngest {
    pub fn new(users: Arc<dyn UserStore>, documents: DocumentRepository) -> Self {
        Self { users, documents }
    }

    pub fn external_upload(&self, input: ExternalUploadInput) -> ArchiveResult<Document> {
        let document = input.to_new_document()?;

        let Some(user) = self.users.find_by_email(&input.user_email)? else {
            warn!(service_name = %input.service_name, "external upload for unknown user");
            return Err(ArchiveError::UserNotFound);
        };

        let stored = self.documents.create(document, user.id)?;
        info!(
            user_id = user.id,
            document_id = stored.id,
            service_name = %input.service_name,
            external_service_id = %input.external_service_id,
            "ingested external document"
        );
        Ok(stored)
    }
}
