//! Service layer: repository-agnostic operations used by the HTTP handlers.
//!
//! Each function validates its input, talks to any [`FullRepository`] and
//! runs the pure computations from [`crate::services`]. Validation failures
//! surface as [`RepositoryError::ValidationError`].

use log::{debug, info, warn};

use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    DailyCount, ProfileUpdate, Reading, ReadingId, ReadingInput, ScientistProfile, Standards,
    UserId,
};
use crate::services::{
    aggregate_area, build_analytics_report, validate_batch, validate_new_reading, AnalyticsReport,
    AreaQuery, AreaReport, BatchRowIssue,
};

/// Outcome of a batch submission.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Every row was valid and stored.
    Stored(Vec<Reading>),
    /// At least one row was invalid; nothing was stored.
    Rejected(Vec<BatchRowIssue>),
}

/// Check that the backing store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Validate and store one reading, tagged with `owner` if present.
pub async fn submit_reading<R: FullRepository + ?Sized>(
    repo: &R,
    input: &ReadingInput,
    owner: Option<UserId>,
) -> RepositoryResult<Reading> {
    let reading = validate_new_reading(input, owner)?;
    let stored = repo.insert_reading(reading).await?;
    info!(
        "Stored reading {} (sample {}, owner {:?})",
        stored.id, stored.sample_id, stored.user_id
    );
    Ok(stored)
}

/// Validate every row and store them all, or none.
///
/// # Errors
/// `ValidationError` if `inputs` is empty.
pub async fn submit_batch<R: FullRepository + ?Sized>(
    repo: &R,
    inputs: &[ReadingInput],
) -> RepositoryResult<BatchOutcome> {
    if inputs.is_empty() {
        return Err(RepositoryError::validation(
            "Batch must contain at least one reading",
        ));
    }

    match validate_batch(inputs) {
        Ok(rows) => {
            let stored = repo.insert_readings(rows).await?;
            info!("Stored batch of {} readings", stored.len());
            Ok(BatchOutcome::Stored(stored))
        }
        Err(rejected) => {
            warn!(
                "Rejected batch of {} readings: {} invalid rows",
                inputs.len(),
                rejected.len()
            );
            Ok(BatchOutcome::Rejected(rejected))
        }
    }
}

pub async fn list_readings<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Reading>> {
    repo.list_readings().await
}

pub async fn get_reading<R: FullRepository + ?Sized>(
    repo: &R,
    id: ReadingId,
) -> RepositoryResult<Reading> {
    repo.get_reading(id).await
}

/// Partial update: fields present in `changes` replace the stored values,
/// the rest are kept. The merged reading is validated as a whole.
pub async fn update_reading<R: FullRepository + ?Sized>(
    repo: &R,
    id: ReadingId,
    changes: &ReadingInput,
) -> RepositoryResult<Reading> {
    let current = repo.get_reading(id).await?;
    let merged = changes.overlay(&current);
    let validated = validate_new_reading(&merged, current.user_id)?;
    let updated = repo.update_reading(id, validated).await?;
    info!("Updated reading {}", id);
    Ok(updated)
}

pub async fn delete_reading<R: FullRepository + ?Sized>(
    repo: &R,
    id: ReadingId,
) -> RepositoryResult<Reading> {
    let deleted = repo.delete_reading(id).await?;
    info!("Deleted reading {}", id);
    Ok(deleted)
}

pub async fn readings_for_user<R: FullRepository + ?Sized>(
    repo: &R,
    user: UserId,
) -> RepositoryResult<Vec<Reading>> {
    repo.list_readings_for_user(user).await
}

pub async fn daily_counts_for_user<R: FullRepository + ?Sized>(
    repo: &R,
    user: UserId,
) -> RepositoryResult<Vec<DailyCount>> {
    repo.daily_counts_for_user(user).await
}

/// Readings within `query.radius` of `query.center`, enriched, with area
/// statistics.
///
/// The store is asked for a bounding box around the circle; the exact
/// distance filter runs in [`aggregate_area`].
pub async fn readings_near<R: FullRepository + ?Sized>(
    repo: &R,
    query: &AreaQuery,
) -> RepositoryResult<AreaReport> {
    let bounds = query.bounding_box();
    let candidates = repo.fetch_readings_in_bounds(&bounds).await?;
    let candidate_count = candidates.len();

    let report = aggregate_area(query, candidates, &Standards::DEFAULT)?;
    info!(
        "Area query ({:.5}, {:.5}) r={} km: {} of {} candidates matched",
        query.center.latitude,
        query.center.longitude,
        query.radius.km(),
        report.statistics.total_samples,
        candidate_count
    );
    Ok(report)
}

/// Collection-wide metal statistics and the indices of the mean vector.
pub async fn collection_analytics<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<AnalyticsReport> {
    let summary = repo.fetch_metal_summary().await?;
    Ok(build_analytics_report(&summary, &Standards::DEFAULT)?)
}

/// The user's profile, created with defaults on first access.
pub async fn profile_for_user<R: FullRepository + ?Sized>(
    repo: &R,
    user: UserId,
    username: &str,
) -> RepositoryResult<ScientistProfile> {
    if let Some(profile) = repo.get_profile(user).await? {
        return Ok(profile);
    }
    debug!("Creating default profile for user {}", user);
    repo.upsert_profile(ScientistProfile::default_for(user, username))
        .await
}

/// Apply `update` on top of the current (or default) profile and store it.
pub async fn update_profile<R: FullRepository + ?Sized>(
    repo: &R,
    user: UserId,
    username: &str,
    update: ProfileUpdate,
) -> RepositoryResult<ScientistProfile> {
    let current = match repo.get_profile(user).await? {
        Some(profile) => profile,
        None => ScientistProfile::default_for(user, username),
    };
    let saved = repo.upsert_profile(update.apply(current)).await?;
    info!("Updated profile for user {}", user);
    Ok(saved)
}
