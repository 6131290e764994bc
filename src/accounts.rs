//! Registration, login and the rest of the credential lifecycle.

use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{password, TokenIssuer};
use crate::error::{ArchiveError, ArchiveResult};
use crate::models::{NewUser, UserProfile};
use crate::store::UserStore;
use crate::validation::{normalize_email, LoginInput, RegisterInput};

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct Accounts {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenIssuer>,
}

impl Accounts {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { users, tokens }
    }

    pub fn register(&self, input: RegisterInput) -> ArchiveResult<AuthSession> {
        input.validate()?;
        let email = normalize_email(&input.email);

        if self.users.find_by_email(&email)?.is_some() {
            return Err(ArchiveError::DuplicateEmail);
        }

        let password_hash =
            password::hash_password(&input.password).map_err(ArchiveError::storage)?;
        let user = self.users.insert_user(NewUser {
            email,
            password_hash,
            name: input.name,
        })?;

        info!(user_id = user.id, "registered user");
        self.session_for(user.into())
    }

    /// Unknown email and wrong password fail identically.
    pub fn login(&self, input: LoginInput) -> ArchiveResult<AuthSession> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let Some(user) = self.users.find_by_email(&email)? else {
            // Burn the same hashing work as a real check.
            let _ = password::verify_password(&input.password, placeholder_hash());
            return Err(ArchiveError::InvalidCredentials);
        };

        let valid = match password::verify_password(&input.password, &user.password_hash) {
            Ok(valid) => valid,
            Err(err) => {
                warn!(user_id = user.id, error = %err, "stored password hash is unreadable");
                false
            }
        };
        if !valid {
            return Err(ArchiveError::InvalidCredentials);
        }

        info!(user_id = user.id, "user logged in");
        self.session_for(user.into())
    }

    pub fn profile(&self, user_id: i64) -> ArchiveResult<UserProfile> {
        self.users
            .find_by_id(user_id)?
            .map(UserProfile::from)
            .ok_or(ArchiveError::UserNotFound)
    }

    /// Removes the user and, in the same unit of work, all of their documents.
    pub fn delete_user(&self, user_id: i64) -> ArchiveResult<bool> {
        let deleted = self.users.delete_user(user_id)?;
        if deleted {
            info!(user_id, "deleted user and owned documents");
        }
        Ok(deleted)
    }

    fn session_for(&self, user: UserProfile) -> ArchiveResult<AuthSession> {
        let issued = self.tokens.issue(user.id).map_err(ArchiveError::storage)?;
        Ok(AuthSession {
            user,
            token: issued.token,
            token_type: "Bearer",
            expires_in: issued.expires_in,
        })
    }
}

fn placeholder_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| password::hash_password("placeholder-password").unwrap_or_default())
}
