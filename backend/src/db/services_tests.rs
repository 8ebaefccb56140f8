use super::repositories::LocalRepository;
use super::repository::RepositoryError;
use super::services::*;
use crate::models::{MetalInputs, ProfileUpdate, ReadingId, ReadingInput, UserId};
use crate::services::AreaQuery;

fn input(sample: &str, lat: f64, lng: f64) -> ReadingInput {
    ReadingInput {
        sample_id: Some(sample.to_string()),
        date: Some("2024-04-10".to_string()),
        depth: Some(5.0),
        location: Some("Borewell".to_string()),
        latitude: Some(lat),
        longitude: Some(lng),
        metals: Some(MetalInputs {
            lead: Some(0.01),
            cadmium: Some(0.003),
            chromium: Some(0.05),
            arsenic: Some(0.01),
            mercury: Some(0.006),
        }),
    }
}

#[tokio::test]
async fn test_submit_reading_tags_owner() {
    let repo = LocalRepository::new();
    let stored = submit_reading(&repo, &input("S1", 20.0, 78.0), Some(UserId(4)))
        .await
        .unwrap();
    assert_eq!(stored.user_id, Some(UserId(4)));
    assert_eq!(readings_for_user(&repo, UserId(4)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_submit_invalid_reading_is_validation_error() {
    let repo = LocalRepository::new();
    let bad = ReadingInput {
        longitude: None,
        ..input("S1", 20.0, 78.0)
    };
    let err = submit_reading(&repo, &bad, None).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert!(err.to_string().contains("longitude"));
    assert_eq!(repo.reading_count(), 0);
}

#[tokio::test]
async fn test_batch_is_all_or_nothing() {
    let repo = LocalRepository::new();
    let bad = ReadingInput {
        sample_id: None,
        ..input("x", 20.0, 78.0)
    };

    let outcome = submit_batch(&repo, &[input("A", 20.0, 78.0), bad])
        .await
        .unwrap();
    match outcome {
        BatchOutcome::Rejected(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].index, 1);
            assert_eq!(rows[0].missing, vec!["sampleId"]);
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(repo.reading_count(), 0);

    let outcome = submit_batch(&repo, &[input("A", 20.0, 78.0), input("B", 20.0, 78.0)])
        .await
        .unwrap();
    assert!(matches!(outcome, BatchOutcome::Stored(ref rows) if rows.len() == 2));
    assert_eq!(repo.reading_count(), 2);
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let repo = LocalRepository::new();
    let err = submit_batch(&repo, &[]).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let repo = LocalRepository::new();
    let stored = submit_reading(&repo, &input("S1", 20.0, 78.0), Some(UserId(2)))
        .await
        .unwrap();

    let changes = ReadingInput {
        location: Some("Hand pump".to_string()),
        metals: Some(MetalInputs {
            arsenic: Some(0.5),
            ..Default::default()
        }),
        ..Default::default()
    };
    let updated = update_reading(&repo, stored.id, &changes).await.unwrap();

    assert_eq!(updated.location, "Hand pump");
    assert_eq!(updated.sample_id, "S1");
    assert_eq!(updated.metals.arsenic, 0.5);
    assert_eq!(updated.metals.lead, 0.01);
    assert_eq!(updated.user_id, Some(UserId(2)));
}

#[tokio::test]
async fn test_update_rejects_invalid_merge() {
    let repo = LocalRepository::new();
    let stored = submit_reading(&repo, &input("S1", 20.0, 78.0), None)
        .await
        .unwrap();
    let changes = ReadingInput {
        latitude: Some(123.0),
        ..Default::default()
    };
    let err = update_reading(&repo, stored.id, &changes).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(get_reading(&repo, stored.id).await.unwrap().latitude, 20.0);
}

#[tokio::test]
async fn test_update_and_delete_missing_reading() {
    let repo = LocalRepository::new();
    let err = update_reading(&repo, ReadingId(5), &ReadingInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    let err = delete_reading(&repo, ReadingId(5)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_readings_near_filters_by_distance() {
    let repo = LocalRepository::new();
    submit_reading(&repo, &input("near", 20.0, 78.0), None)
        .await
        .unwrap();
    // ~10 km north
    submit_reading(&repo, &input("far", 20.09, 78.0), None)
        .await
        .unwrap();

    let report = readings_near(&repo, &AreaQuery::new(20.0, 78.0, None).unwrap())
        .await
        .unwrap();
    assert_eq!(report.statistics.total_samples, 1);
    assert_eq!(report.readings[0].reading.sample_id, "near");

    let report = readings_near(&repo, &AreaQuery::new(20.0, 78.0, Some(15.0)).unwrap())
        .await
        .unwrap();
    assert_eq!(report.statistics.total_samples, 2);
    assert!((report.statistics.avg_pollution_index - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_collection_analytics() {
    let repo = LocalRepository::new();
    let empty = collection_analytics(&repo).await.unwrap();
    assert_eq!(empty.total_samples, 0);
    assert_eq!(empty.avg_lead, 0.0);

    submit_reading(&repo, &input("a", 1.0, 1.0), None)
        .await
        .unwrap();
    let report = collection_analytics(&repo).await.unwrap();
    assert_eq!(report.total_samples, 1);
    assert!((report.calculated_indices.hpi - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_profile_created_on_first_access_then_updated() {
    let repo = LocalRepository::new();
    let profile = profile_for_user(&repo, UserId(8), "meera").await.unwrap();
    assert_eq!(profile.name, "meera");
    assert_eq!(profile.title, "Environmental Scientist");

    let updated = update_profile(
        &repo,
        UserId(8),
        "meera",
        ProfileUpdate {
            bio: Some("Groundwater arsenic".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.bio, "Groundwater arsenic");
    assert_eq!(updated.title, "Environmental Scientist");

    let again = profile_for_user(&repo, UserId(8), "ignored").await.unwrap();
    assert_eq!(again.name, "meera");
    assert_eq!(again.bio, "Groundwater arsenic");
}

#[tokio::test]
async fn test_services_propagate_store_failures() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);
    assert!(!health_check(&repo).await.unwrap());
    let err = list_readings(&repo).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));
}
