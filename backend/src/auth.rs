//! Bearer-token authentication seam.
//!
//! Handlers only see an [`Authenticator`]: something that turns a bearer
//! credential into an [`AuthenticatedUser`]. Issuing credentials is somebody
//! else's job. The shipped [`StaticTokenAuthenticator`] knows a fixed set of
//! tokens by their SHA-256 digest, so plaintext tokens never sit in the
//! configuration file.
//!
//! ```toml
//! [[auth.tokens]]
//! token_sha256 = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
//! user_id = 1
//! username = "meera"
//! role = "user"
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::UserId;

/// Role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// The caller behind a valid bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

/// Resolves bearer credentials to users.
pub trait Authenticator: Send + Sync {
    /// `None` when the credential is unknown or no longer valid.
    fn resolve(&self, token: &str) -> Option<AuthenticatedUser>;
}

/// One configured token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// Lowercase hex SHA-256 digest of the bearer token.
    pub token_sha256: String,
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthConfigError {
    #[error("Token entry {index} ({username}): token_sha256 must be 64 hex characters")]
    MalformedDigest { index: usize, username: String },
    #[error("Token entry {index} ({username}): duplicate token digest")]
    DuplicateDigest { index: usize, username: String },
}

/// Authenticator over a fixed table of token digests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    users_by_digest: HashMap<String, AuthenticatedUser>,
}

impl StaticTokenAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configured entries. Digests are matched case-insensitively.
    pub fn from_entries(entries: &[TokenEntry]) -> Result<Self, AuthConfigError> {
        let mut users_by_digest = HashMap::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let digest = entry.token_sha256.trim().to_ascii_lowercase();
            if digest.len() != 64 || hex::decode(&digest).is_err() {
                return Err(AuthConfigError::MalformedDigest {
                    index,
                    username: entry.username.clone(),
                });
            }

            let user = AuthenticatedUser {
                id: UserId::new(entry.user_id),
                username: entry.username.clone(),
                role: entry.role,
            };
            if users_by_digest.insert(digest, user).is_some() {
                return Err(AuthConfigError::DuplicateDigest {
                    index,
                    username: entry.username.clone(),
                });
            }
        }

        Ok(Self { users_by_digest })
    }

    /// Register a plaintext token. Mostly useful in tests.
    pub fn with_token(mut self, token: &str, user: AuthenticatedUser) -> Self {
        self.users_by_digest.insert(hash_token(token), user);
        self
    }

    pub fn len(&self) -> usize {
        self.users_by_digest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users_by_digest.is_empty()
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn resolve(&self, token: &str) -> Option<AuthenticatedUser> {
        if token.is_empty() {
            return None;
        }
        let user = self.users_by_digest.get(&hash_token(token)).cloned();
        if user.is_none() {
            log::debug!("Rejected unknown bearer token");
        }
        user
    }
}

/// Lowercase hex SHA-256 digest of `token`.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract the credential from an `Authorization: Bearer <token>` value.
///
/// The scheme is matched case-insensitively. Returns `None` for other
/// schemes and for an empty credential.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
