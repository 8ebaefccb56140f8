//! Reading repository trait: storage and retrieval of water-quality readings.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{DailyCount, NewReading, Reading, ReadingId, UserId};
use crate::services::BoundingBox;

/// Repository trait for reading operations.
///
/// Listing operations return readings newest first. Callers must not rely
/// on that order for anything but presentation.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Store a validated reading.
    ///
    /// # Returns
    /// * `Ok(Reading)` - The stored reading with its id and timestamps
    /// * `Err(RepositoryError)` - If the insert fails
    async fn insert_reading(&self, reading: NewReading) -> RepositoryResult<Reading>;

    /// Store several validated readings atomically.
    ///
    /// Either every row is stored or none is.
    async fn insert_readings(&self, readings: Vec<NewReading>) -> RepositoryResult<Vec<Reading>>;

    /// All readings, newest first.
    async fn list_readings(&self) -> RepositoryResult<Vec<Reading>>;

    /// Fetch one reading.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no reading has this id
    async fn get_reading(&self, id: ReadingId) -> RepositoryResult<Reading>;

    /// Replace the stored fields of a reading with `reading`.
    ///
    /// The owner is never changed by an update; `reading.user_id` is ignored.
    /// Refreshes `updated_at`.
    async fn update_reading(&self, id: ReadingId, reading: NewReading)
        -> RepositoryResult<Reading>;

    /// Delete a reading, returning what was stored.
    async fn delete_reading(&self, id: ReadingId) -> RepositoryResult<Reading>;

    /// Readings submitted by `user`, newest first.
    async fn list_readings_for_user(&self, user: UserId) -> RepositoryResult<Vec<Reading>>;

    /// Number of readings `user` submitted per date string, ascending by date.
    async fn daily_counts_for_user(&self, user: UserId) -> RepositoryResult<Vec<DailyCount>>;

    /// Readings whose coordinates fall inside `bounds`.
    ///
    /// This is a coarse prefilter; the exact distance check happens in
    /// [`crate::services::aggregate_area`].
    async fn fetch_readings_in_bounds(&self, bounds: &BoundingBox)
        -> RepositoryResult<Vec<Reading>>;
}
