//! Backend selection.
//!
//! Turns a [`RepositoryConfig`] into the `Arc<dyn FullRepository>` the
//! server shares between handlers.

use std::str::FromStr;
use std::sync::Arc;

use super::config::PostgresConfig;
use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Which store holds the readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Diesel over Postgres (`postgres-repo` feature).
    Postgres,
    /// In-process maps; contents are lost on restart.
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Case-insensitive: `postgres`, `pg` or `local`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            other => Err(format!(
                "unknown repository type '{}' (expected local or postgres)",
                other
            )),
        }
    }
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Build a repository of `repo_type`. Postgres needs `postgres_config`.
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            #[cfg(feature = "postgres-repo")]
            RepositoryType::Postgres => {
                let config = postgres_config.ok_or_else(|| {
                    RepositoryError::configuration("no Postgres settings supplied")
                })?;
                let pg: Arc<dyn FullRepository> = Self::create_postgres(config).await?;
                Ok(pg)
            }
            #[cfg(not(feature = "postgres-repo"))]
            RepositoryType::Postgres => {
                let _ = postgres_config;
                Err(RepositoryError::configuration(
                    "built without the postgres-repo feature",
                ))
            }
        }
    }

    /// Connect and migrate on a blocking thread.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Postgres setup task failed: {}", e)))??;
        Ok(Arc::new(repo))
    }

    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config
            .repository_type()
            .map_err(RepositoryError::configuration)?;
        let postgres = config.to_postgres_config()?;
        Self::create(repo_type, postgres.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_type_parsing() {
        for (raw, expected) in [
            ("local", RepositoryType::Local),
            (" LOCAL ", RepositoryType::Local),
            ("postgres", RepositoryType::Postgres),
            ("Pg", RepositoryType::Postgres),
        ] {
            assert_eq!(raw.parse::<RepositoryType>().unwrap(), expected);
        }
        let err = "sqlite".parse::<RepositoryType>().unwrap_err();
        assert!(err.contains("sqlite"));
    }

    #[tokio::test]
    async fn test_default_config_builds_healthy_local_store() {
        let repo = RepositoryFactory::from_repository_config(&RepositoryConfig::default())
            .await
            .unwrap();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_type_fails_to_build() {
        let mut config = RepositoryConfig::default();
        config.repository.repo_type = "mongo".to_string();
        let err = RepositoryFactory::from_repository_config(&config)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }

    #[cfg(not(feature = "postgres-repo"))]
    #[tokio::test]
    async fn test_postgres_without_feature_is_configuration_error() {
        let config = PostgresConfig::with_url("postgres://localhost/jalsutra");
        let err = RepositoryFactory::create(RepositoryType::Postgres, Some(&config))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }
}
