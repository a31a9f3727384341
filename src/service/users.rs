//! User account lifecycle: registration, login, profile management.
//!
//! The service is stateless; it holds the repository, the token maker and
//! the configured token validity window, and surfaces every collaborator
//! failure unchanged. Unknown email and wrong password collapse into the
//! same `InvalidCredentials` outcome so a caller cannot probe which
//! accounts exist.

use std::sync::Arc;

use thiserror::Error;

use crate::api::auth::{hash_password, verify_password};
use crate::db::{User, UserRepository};
use crate::token::{TokenError, TokenMaker};

const DEFAULT_ROLE: &str = "user";
const DEFAULT_STATUS: &str = "active";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    #[error("failed to hash password")]
    Hash,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    token_maker: Arc<TokenMaker>,
    token_duration: chrono::Duration,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        token_maker: Arc<TokenMaker>,
        token_duration: chrono::Duration,
    ) -> Self {
        Self {
            repo,
            token_maker,
            token_duration,
        }
    }

    /// Register a new account. The plaintext password is hashed and
    /// discarded; role and status default when the caller left them empty.
    pub async fn register(&self, mut user: User, password: &str) -> Result<User, UserError> {
        user.password_hash = hash_password(password).map_err(|_| UserError::Hash)?;
        if user.role.is_empty() {
            user.role = DEFAULT_ROLE.to_string();
        }
        if user.status.is_empty() {
            user.status = DEFAULT_STATUS.to_string();
        }

        self.repo.create(&mut user).await?;
        Ok(user)
    }

    /// Authenticate by email and password, minting a session token on
    /// success. The token's subject is the account id.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), UserError> {
        let user = self
            .repo
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(UserError::InvalidCredentials);
        }

        let (access_token, _) = self.token_maker.create_token(&user.id, self.token_duration)?;
        Ok((access_token, user))
    }

    pub async fn get_profile(&self, id: &str) -> Result<User, UserError> {
        self.repo.get_by_id(id).await?.ok_or(UserError::NotFound)
    }

    pub async fn update_profile(&self, user: &mut User) -> Result<(), UserError> {
        self.repo.update(user).await?;
        Ok(())
    }

    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, UserError> {
        Ok(self.repo.list(limit, offset).await?)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        self.repo.delete(id).await?;
        Ok(())
    }
}
