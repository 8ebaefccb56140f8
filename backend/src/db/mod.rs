//! Persistence layer.
//!
//! # Layout
//! - [`repository`]: backend-agnostic traits ([`ReadingRepository`],
//!   [`AnalyticsRepository`], [`ProfileRepository`], combined as
//!   [`FullRepository`]) and [`RepositoryError`]
//! - [`repositories`]: the in-memory [`LocalRepository`] and, with the
//!   `postgres-repo` feature, `PostgresRepository`
//! - [`factory`]: backend selection from configuration
//! - [`services`]: the operations handlers call
//!
//! # Construction
//! The server builds its repository once through [`init_repository`] and
//! hands it to the HTTP state. Tests build their own through
//! [`RepositoryFactory`] or [`LocalRepository::new`].

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;

pub use config::PostgresConfig;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;

pub use services::{
    collection_analytics, daily_counts_for_user, delete_reading, get_reading, health_check,
    list_readings, profile_for_user, readings_for_user, readings_near, submit_batch,
    submit_reading, update_profile, update_reading, BatchOutcome,
};

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
pub use repository::{
    AnalyticsRepository, ErrorContext, FullRepository, ProfileRepository, ReadingRepository,
    RepositoryError, RepositoryResult,
};

use anyhow::{Context, Result};
use std::sync::Arc;

/// Build the repository selected by `config`.
pub async fn init_repository(config: &RepositoryConfig) -> Result<Arc<dyn FullRepository>> {
    let repo = RepositoryFactory::from_repository_config(config)
        .await
        .context("Failed to initialize repository")?;
    log::info!(
        "Repository initialized (type={})",
        config.repository.repo_type
    );
    Ok(repo)
}
