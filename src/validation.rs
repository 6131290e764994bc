//! Request shapes and the constraint checks that run before anything reaches
//! the repository.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ArchiveError, ArchiveResult};
use crate::models::{DocumentPatch, FileType, NewDocument, UploadSource};
use crate::utils::json::{classify_nullable, classify_nullable_object, NullableValue};

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i64,
    offset: i64,
}

impl Pagination {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> ArchiveResult<Self> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = offset.unwrap_or(0);
        if limit <= 0 || limit > MAX_PAGE_LIMIT {
            return Err(ArchiveError::validation(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        if offset < 0 {
            return Err(ArchiveError::validation("offset must not be negative"));
        }
        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Canonical form used for storing and looking up emails.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(is_valid_domain_label)
}

fn is_valid_domain_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|ch| ch.is_alphanumeric() || ch == '-')
}

fn validate_email(email: &str) -> ArchiveResult<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ArchiveError::validation("email must be a valid address"))
    }
}

fn validate_file_size(file_size: i64) -> ArchiveResult<()> {
    if file_size > 0 {
        Ok(())
    } else {
        Err(ArchiveError::validation("file_size must be positive"))
    }
}

fn validate_metadata(metadata: Option<Value>) -> ArchiveResult<Option<Value>> {
    match metadata {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(Value::Object(map))),
        Some(_) => Err(ArchiveError::validation(
            "metadata must be an object or null",
        )),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterInput {
    pub fn validate(&self) -> ArchiveResult<()> {
        validate_email(self.email.trim())?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ArchiveError::validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if self.name.is_empty() {
            return Err(ArchiveError::validation("name must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(&self) -> ArchiveResult<()> {
        validate_email(self.email.trim())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadDocumentInput {
    pub filename: String,
    pub original_filename: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub file_path: String,
    #[serde(default)]
    pub content_text: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    pub upload_source: UploadSource,
    #[serde(default)]
    pub external_service_id: Option<String>,
}

impl UploadDocumentInput {
    pub fn into_new_document(self) -> ArchiveResult<NewDocument> {
        validate_file_size(self.file_size)?;
        if self.upload_source == UploadSource::WebInterface && self.external_service_id.is_some()
        {
            return Err(ArchiveError::validation(
                "external_service_id is only allowed for EXTERNAL_SERVICE uploads",
            ));
        }

        Ok(NewDocument {
            filename: self.filename,
            original_filename: self.original_filename,
            file_type: self.file_type,
            file_size: self.file_size,
            file_path: self.file_path,
            content_text: self.content_text,
            metadata: validate_metadata(self.metadata)?,
            upload_source: self.upload_source,
            external_service_id: self.external_service_id,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUploadInput {
    pub user_email: String,
    pub filename: String,
    pub original_filename: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub file_path: String,
    #[serde(default)]
    pub content_text: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    pub external_service_id: String,
    pub service_name: String,
}

impl ExternalUploadInput {
    pub fn to_new_document(&self) -> ArchiveResult<NewDocument> {
        validate_email(&self.user_email)?;
        validate_file_size(self.file_size)?;
        let metadata = validate_metadata(self.metadata.clone())?;
        Ok(NewDocument {
            filename: self.filename.clone(),
            original_filename: self.original_filename.clone(),
            file_type: self.file_type,
            file_size: self.file_size,
            file_path: self.file_path.clone(),
            content_text: self.content_text.clone(),
            metadata,
            upload_source: UploadSource::ExternalService,
            external_service_id: Some(self.external_service_id.clone()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDocumentsInput {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub file_type: Option<FileType>,
}

impl ListDocumentsInput {
    pub fn pagination(&self) -> ArchiveResult<Pagination> {
        Pagination::new(self.limit, self.offset)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchDocumentsInput {
    pub query: String,
    pub file_type: Option<FileType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchDocumentsInput {
    pub fn validate(&self) -> ArchiveResult<Pagination> {
        if self.query.is_empty() {
            return Err(ArchiveError::validation("query must not be empty"));
        }
        Pagination::new(self.limit, self.offset)
    }
}

/// Builds a patch from a raw JSON body so that an absent key and an explicit
/// `null` stay distinguishable.
pub fn document_patch_from_json(body: &Value) -> ArchiveResult<DocumentPatch> {
    let Some(fields) = body.as_object() else {
        return Err(ArchiveError::validation("request body must be an object"));
    };

    let filename = classify_nullable(fields.get("filename")).map_err(field_error("filename"))?;
    let filename = match filename {
        NullableValue::Omitted => None,
        NullableValue::Null => return Err(ArchiveError::validation("filename cannot be null")),
        NullableValue::Present(value) => Some(value),
    };
    let content_text = classify_nullable(fields.get("content_text"))
        .map_err(field_error("content_text"))?
        .into_patch();
    let metadata = classify_nullable_object(fields.get("metadata"))
        .map_err(field_error("metadata"))?
        .into_patch()
        .map(|value: Option<Map<String, Value>>| value.map(Value::Object));

    Ok(DocumentPatch {
        filename,
        content_text,
        metadata,
    })
}

fn field_error(field: &'static str) -> impl Fn(String) -> ArchiveError {
    move |message| ArchiveError::validation(format!("{field}: {message}"))
}
