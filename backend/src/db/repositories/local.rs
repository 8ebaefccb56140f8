//! In-memory repository for unit testing and local development.
//!
//! All state lives behind a single `parking_lot::RwLock`; clones share it.
//! A health toggle lets tests simulate an unreachable store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::db::repository::{
    AnalyticsRepository, ErrorContext, ProfileRepository, ReadingRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{DailyCount, NewReading, Reading, ReadingId, ScientistProfile, UserId};
use crate::services::{summarize_readings, BoundingBox, MetalSummary};

#[derive(Debug, Default)]
struct LocalData {
    readings: BTreeMap<i64, Reading>,
    profiles: HashMap<UserId, ScientistProfile>,
    next_reading_id: i64,
}

impl LocalData {
    fn allocate_id(&mut self) -> ReadingId {
        self.next_reading_id += 1;
        ReadingId(self.next_reading_id)
    }

    /// Newest first: latest `created_at`, ties broken by the higher id.
    fn newest_first(&self, mut keep: impl FnMut(&Reading) -> bool) -> Vec<Reading> {
        let mut out: Vec<Reading> = self
            .readings
            .values()
            .filter(|r| keep(r))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.0.cmp(&a.id.0)));
        out
    }
}

/// In-memory implementation of every repository trait.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    healthy: Arc<AtomicBool>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Toggle the simulated store health. While unhealthy every operation
    /// fails with a retryable connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn reading_count(&self) -> usize {
        self.data.read().readings.len()
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "local repository is marked unhealthy",
                ErrorContext::new(operation),
            ))
        }
    }

    fn not_found(operation: &str, id: ReadingId) -> RepositoryError {
        RepositoryError::not_found_with_context(
            format!("Reading {} not found", id),
            ErrorContext::new(operation)
                .with_entity("reading")
                .with_entity_id(id),
        )
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadingRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.healthy.load(Ordering::SeqCst))
    }

    async fn insert_reading(&self, reading: NewReading) -> RepositoryResult<Reading> {
        self.ensure_healthy("insert_reading")?;
        let mut data = self.data.write();
        let id = data.allocate_id();
        let stored = reading.into_reading(id, Utc::now());
        data.readings.insert(id.0, stored.clone());
        Ok(stored)
    }

    async fn insert_readings(&self, readings: Vec<NewReading>) -> RepositoryResult<Vec<Reading>> {
        self.ensure_healthy("insert_readings")?;
        let mut data = self.data.write();
        let now = Utc::now();
        let mut stored = Vec::with_capacity(readings.len());
        for reading in readings {
            let id = data.allocate_id();
            let row = reading.into_reading(id, now);
            data.readings.insert(id.0, row.clone());
            stored.push(row);
        }
        Ok(stored)
    }

    async fn list_readings(&self) -> RepositoryResult<Vec<Reading>> {
        self.ensure_healthy("list_readings")?;
        Ok(self.data.read().newest_first(|_| true))
    }

    async fn get_reading(&self, id: ReadingId) -> RepositoryResult<Reading> {
        self.ensure_healthy("get_reading")?;
        self.data
            .read()
            .readings
            .get(&id.0)
            .cloned()
            .ok_or_else(|| Self::not_found("get_reading", id))
    }

    async fn update_reading(
        &self,
        id: ReadingId,
        reading: NewReading,
    ) -> RepositoryResult<Reading> {
        self.ensure_healthy("update_reading")?;
        let mut data = self.data.write();
        let existing = data
            .readings
            .get_mut(&id.0)
            .ok_or_else(|| Self::not_found("update_reading", id))?;

        existing.sample_id = reading.sample_id;
        existing.date = reading.date;
        existing.depth = reading.depth;
        existing.location = reading.location;
        existing.latitude = reading.latitude;
        existing.longitude = reading.longitude;
        existing.metals = reading.metals;
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }

    async fn delete_reading(&self, id: ReadingId) -> RepositoryResult<Reading> {
        self.ensure_healthy("delete_reading")?;
        self.data
            .write()
            .readings
            .remove(&id.0)
            .ok_or_else(|| Self::not_found("delete_reading", id))
    }

    async fn list_readings_for_user(&self, user: UserId) -> RepositoryResult<Vec<Reading>> {
        self.ensure_healthy("list_readings_for_user")?;
        Ok(self
            .data
            .read()
            .newest_first(move |r| r.user_id == Some(user)))
    }

    async fn daily_counts_for_user(&self, user: UserId) -> RepositoryResult<Vec<DailyCount>> {
        self.ensure_healthy("daily_counts_for_user")?;
        let data = self.data.read();
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for reading in data.readings.values().filter(|r| r.user_id == Some(user)) {
            *counts.entry(reading.date.clone()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect())
    }

    async fn fetch_readings_in_bounds(
        &self,
        bounds: &BoundingBox,
    ) -> RepositoryResult<Vec<Reading>> {
        self.ensure_healthy("fetch_readings_in_bounds")?;
        let bounds = *bounds;
        Ok(self
            .data
            .read()
            .newest_first(move |r| bounds.contains(r.latitude, r.longitude)))
    }
}

#[async_trait]
impl AnalyticsRepository for LocalRepository {
    async fn fetch_metal_summary(&self) -> RepositoryResult<MetalSummary> {
        self.ensure_healthy("fetch_metal_summary")?;
        let readings: Vec<Reading> = self.data.read().readings.values().cloned().collect();
        Ok(summarize_readings(&readings))
    }
}

#[async_trait]
impl ProfileRepository for LocalRepository {
    async fn get_profile(&self, user: UserId) -> RepositoryResult<Option<ScientistProfile>> {
        self.ensure_healthy("get_profile")?;
        Ok(self.data.read().profiles.get(&user).cloned())
    }

    async fn upsert_profile(&self, profile: ScientistProfile) -> RepositoryResult<ScientistProfile> {
        self.ensure_healthy("upsert_profile")?;
        self.data
            .write()
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Concentrations;

    fn new_reading(sample: &str, date: &str, lat: f64, user: Option<i64>) -> NewReading {
        NewReading {
            sample_id: sample.to_string(),
            date: date.to_string(),
            depth: 1.0,
            location: "Site".to_string(),
            latitude: lat,
            longitude: 77.0,
            metals: Concentrations::zero(),
            user_id: user.map(UserId),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = LocalRepository::new();
        let stored = repo
            .insert_reading(new_reading("A", "2024-01-01", 10.0, None))
            .await
            .unwrap();
        assert_eq!(stored.id, ReadingId(1));
        assert_eq!(repo.get_reading(stored.id).await.unwrap(), stored);
        assert_eq!(repo.reading_count(), 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repo = LocalRepository::new();
        repo.insert_readings(vec![
            new_reading("A", "2024-01-01", 10.0, None),
            new_reading("B", "2024-01-02", 10.0, None),
        ])
        .await
        .unwrap();
        repo.insert_reading(new_reading("C", "2024-01-03", 10.0, None))
            .await
            .unwrap();

        let samples: Vec<String> = repo
            .list_readings()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.sample_id)
            .collect();
        assert_eq!(samples, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_missing_reading_is_not_found() {
        let repo = LocalRepository::new();
        let err = repo.get_reading(ReadingId(99)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert!(matches!(
            repo.delete_reading(ReadingId(99)).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_created_at() {
        let repo = LocalRepository::new();
        let stored = repo
            .insert_reading(new_reading("A", "2024-01-01", 10.0, Some(5)))
            .await
            .unwrap();

        let updated = repo
            .update_reading(stored.id, new_reading("A2", "2024-02-01", 11.0, None))
            .await
            .unwrap();
        assert_eq!(updated.sample_id, "A2");
        assert_eq!(updated.user_id, Some(UserId(5)));
        assert_eq!(updated.created_at, stored.created_at);
        assert!(updated.updated_at >= stored.updated_at);
    }

    #[tokio::test]
    async fn test_daily_counts_are_ascending() {
        let repo = LocalRepository::new();
        for (date, user) in [
            ("2024-03-02", Some(1)),
            ("2024-03-01", Some(1)),
            ("2024-03-02", Some(1)),
            ("2024-03-02", Some(2)),
            ("2024-03-05", None),
        ] {
            repo.insert_reading(new_reading("S", date, 0.0, user))
                .await
                .unwrap();
        }

        let counts = repo.daily_counts_for_user(UserId(1)).await.unwrap();
        assert_eq!(
            counts,
            vec![
                DailyCount {
                    date: "2024-03-01".to_string(),
                    count: 1
                },
                DailyCount {
                    date: "2024-03-02".to_string(),
                    count: 2
                },
            ]
        );
        assert_eq!(repo.list_readings_for_user(UserId(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bounds_filter() {
        let repo = LocalRepository::new();
        repo.insert_reading(new_reading("in", "d", 10.0, None))
            .await
            .unwrap();
        repo.insert_reading(new_reading("out", "d", 40.0, None))
            .await
            .unwrap();

        let bounds = BoundingBox {
            min_lat: 9.0,
            max_lat: 11.0,
            min_lng: 76.0,
            max_lng: 78.0,
        };
        let found = repo.fetch_readings_in_bounds(&bounds).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].sample_id, "in");
    }

    #[tokio::test]
    async fn test_unhealthy_repository_fails_retryably() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.list_readings().await.unwrap_err();
        assert!(err.is_retryable());

        repo.set_healthy(true);
        assert!(repo.list_readings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profiles_roundtrip() {
        let repo = LocalRepository::new();
        assert!(repo.get_profile(UserId(3)).await.unwrap().is_none());

        let profile = ScientistProfile::default_for(UserId(3), "asha");
        repo.upsert_profile(profile.clone()).await.unwrap();
        assert_eq!(repo.get_profile(UserId(3)).await.unwrap(), Some(profile));
    }
}
