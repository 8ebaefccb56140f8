use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ScientistProfile, UserId};

/// Repository trait for scientist profiles, one per user.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, user: UserId) -> RepositoryResult<Option<ScientistProfile>>;

    /// Insert or replace the profile for `profile.user_id`.
    async fn upsert_profile(&self, profile: ScientistProfile) -> RepositoryResult<ScientistProfile>;
}
