use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, Output, ToSql},
    sql_types::Text,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::schema::*;

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    Jpeg,
    Pdf,
    Json,
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Jpeg, FileType::Pdf, FileType::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Jpeg => "JPEG",
            FileType::Pdf => "PDF",
            FileType::Json => "JSON",
        }
    }
}

impl FromStr for FileType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FileType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| UnknownVariant {
                kind: "file type",
                value: value.to_owned(),
            })
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadSource {
    WebInterface,
    ExternalService,
}

impl UploadSource {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadSource::WebInterface => "WEB_INTERFACE",
            UploadSource::ExternalService => "EXTERNAL_SERVICE",
        }
    }
}

impl FromStr for UploadSource {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "WEB_INTERFACE" => Ok(UploadSource::WebInterface),
            "EXTERNAL_SERVICE" => Ok(UploadSource::ExternalService),
            other => Err(UnknownVariant {
                kind: "upload source",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! text_enum_sql {
    ($ty:ty) => {
        impl ToSql<Text, Pg> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                <str as ToSql<Text, Pg>>::to_sql(self.as_str(), out)
            }
        }

        impl FromSql<Text, Pg> for $ty {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                Ok(raw.parse()?)
            }
        }
    };
}

text_enum_sql!(FileType);
text_enum_sql!(UploadSource);

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Identifiable,
    Associations,
)]
#[diesel(table_name = documents)]
#[diesel(belongs_to(User))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub file_path: String,
    pub content_text: Option<String>,
    pub metadata: Option<Value>,
    pub upload_source: UploadSource,
    pub external_service_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A validated document awaiting insertion; the owner is supplied separately
/// by the repository so it can never come from request input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub filename: String,
    pub original_filename: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub file_path: String,
    pub content_text: Option<String>,
    pub metadata: Option<Value>,
    pub upload_source: UploadSource,
    pub external_service_id: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub struct OwnedNewDocument<'a> {
    pub user_id: i64,
    pub filename: &'a str,
    pub original_filename: &'a str,
    pub file_type: FileType,
    pub file_size: i64,
    pub file_path: &'a str,
    pub content_text: Option<&'a str>,
    pub metadata: Option<&'a Value>,
    pub upload_source: UploadSource,
    pub external_service_id: Option<&'a str>,
}

impl NewDocument {
    pub fn owned_by(&self, user_id: i64) -> OwnedNewDocument<'_> {
        OwnedNewDocument {
            user_id,
            filename: &self.filename,
            original_filename: &self.original_filename,
            file_type: self.file_type,
            file_size: self.file_size,
            file_path: &self.file_path,
            content_text: self.content_text.as_deref(),
            metadata: self.metadata.as_ref(),
            upload_source: self.upload_source,
            external_service_id: self.external_service_id.as_deref(),
        }
    }
}

/// Partial update of a document. `None` leaves a field untouched; for the
/// nullable fields `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub filename: Option<String>,
    pub content_text: Option<Option<String>>,
    pub metadata: Option<Option<Value>>,
}

impl DocumentPatch {
    pub fn apply_to(&self, document: &mut Document) {
        if let Some(filename) = &self.filename {
            document.filename = filename.clone();
        }
        if let Some(content_text) = &self.content_text {
            document.content_text = content_text.clone();
        }
        if let Some(metadata) = &self.metadata {
            document.metadata = metadata.clone();
        }
    }

    pub fn changeset(&self, updated_at: NaiveDateTime) -> DocumentChangeset<'_> {
        DocumentChangeset {
            filename: self.filename.as_deref(),
            content_text: self.content_text.as_ref().map(|value| value.as_deref()),
            metadata: self.metadata.as_ref().map(|value| value.as_ref()),
            updated_at,
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = documents)]
pub struct DocumentChangeset<'a> {
    pub filename: Option<&'a str>,
    pub content_text: Option<Option<&'a str>>,
    pub metadata: Option<Option<&'a Value>>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub documents: Vec<Document>,
    pub total: i64,
    pub has_more: bool,
}
