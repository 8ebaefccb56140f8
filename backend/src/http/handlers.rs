//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to
//! [`crate::db::services`] for persistence and to [`crate::services`] for
//! the water-quality computations.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::auth::{MaybeUser, RequireUser};
use super::dto::{
    parse_number, ApiResponse, BatchPayload, HealthResponse, IndicesResponse, LocationEcho,
    LocationQuery, LocationResponse, MeResponse, MetalPayload, ReadingPayload,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::db::BatchOutcome;
use crate::models::{
    DailyCount, MetalInputs, ProfileUpdate, Reading, ReadingId, ReadingInput, ScientistProfile,
    Standards,
};
use crate::services::{
    compute_hardness, compute_indices, validate_concentrations, AnalyticsReport, AreaQuery,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

// =============================================================================
// Health Check
// =============================================================================

async fn health_response(state: &AppState, message: Option<&str>) -> HealthResponse {
    let database = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e.message()),
    };

    HealthResponse {
        status: "OK".to_string(),
        message: message.map(str::to_string),
        timestamp: Utc::now().to_rfc3339(),
        database,
    }
}

/// GET /api
pub async fn api_root(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health_response(&state, Some("JAL Sutra Backend API")).await)
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health_response(&state, None).await)
}

/// GET /api/me
pub async fn me(RequireUser(user): RequireUser) -> Json<MeResponse> {
    Json(MeResponse {
        message: "User info".to_string(),
        user,
    })
}

// =============================================================================
// Readings
// =============================================================================

/// POST /api/add-data (also mounted at /add-data)
///
/// A valid bearer token tags the reading with its user; a missing or
/// unknown token stores it unowned.
pub async fn add_data(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<ReadingPayload>,
) -> Created<Reading> {
    let input = ReadingInput::from(payload);
    let reading =
        db_services::submit_reading(state.repository.as_ref(), &input, user.map(|u| u.id))
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Sample data submitted successfully", reading)),
    ))
}

/// GET /api/readings
pub async fn list_readings(State(state): State<AppState>) -> HandlerResult<ApiResponse<Vec<Reading>>> {
    let readings = db_services::list_readings(state.repository.as_ref()).await?;
    Ok(Json(ApiResponse::new(
        "Readings retrieved successfully",
        readings,
    )))
}

/// POST /api/readings/batch
///
/// All rows are stored or none; a rejection lists every invalid row.
pub async fn create_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchPayload>,
) -> Created<Vec<Reading>> {
    if payload.readings.is_empty() {
        return Err(AppError::BadRequest(
            "readings must be a non-empty array".to_string(),
        ));
    }

    let inputs: Vec<ReadingInput> = payload.readings.into_iter().map(Into::into).collect();
    match db_services::submit_batch(state.repository.as_ref(), &inputs).await? {
        BatchOutcome::Stored(readings) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::new(
                format!("Inserted {} readings", readings.len()),
                readings,
            )),
        )),
        BatchOutcome::Rejected(invalid) => Err(AppError::BatchRejected(invalid)),
    }
}

/// GET /api/readings/my
pub async fn my_readings(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> HandlerResult<ApiResponse<Vec<Reading>>> {
    let readings = db_services::readings_for_user(state.repository.as_ref(), user.id).await?;
    Ok(Json(ApiResponse::new(
        "My readings retrieved successfully",
        readings,
    )))
}

/// GET /api/readings/my/daily
pub async fn my_daily_counts(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> HandlerResult<ApiResponse<Vec<DailyCount>>> {
    let counts = db_services::daily_counts_for_user(state.repository.as_ref(), user.id).await?;
    Ok(Json(ApiResponse::new(
        "My daily counts retrieved successfully",
        counts,
    )))
}

/// GET /api/readings/{id}
pub async fn get_reading(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<ApiResponse<Reading>> {
    let reading = db_services::get_reading(state.repository.as_ref(), ReadingId::new(id)).await?;
    Ok(Json(ApiResponse::new(
        "Reading retrieved successfully",
        reading,
    )))
}

/// PUT /api/readings/{id}
///
/// Partial update. Any authenticated user may edit any reading.
pub async fn update_reading(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReadingPayload>,
) -> HandlerResult<ApiResponse<Reading>> {
    let changes = ReadingInput::from(payload);
    let reading =
        db_services::update_reading(state.repository.as_ref(), ReadingId::new(id), &changes)
            .await?;
    tracing::debug!("Reading {} updated by {}", id, user.username);

    Ok(Json(ApiResponse::new("Reading updated successfully", reading)))
}

/// DELETE /api/readings/{id}
pub async fn delete_reading(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> HandlerResult<ApiResponse<()>> {
    db_services::delete_reading(state.repository.as_ref(), ReadingId::new(id)).await?;
    tracing::debug!("Reading {} deleted by {}", id, user.username);

    Ok(Json(ApiResponse::message_only("Reading deleted successfully")))
}

/// GET /api/readings/location?lat=&lng=&radius=
///
/// `radius` is in kilometres and defaults to 1.
pub async fn readings_by_location(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> HandlerResult<LocationResponse> {
    let lat = query.lat.as_deref().and_then(parse_number);
    let lng = query.lng.as_deref().and_then(parse_number);
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(AppError::BadRequest(
            "Latitude and longitude are required".to_string(),
        ));
    };
    let radius = query.radius.as_deref().and_then(parse_number);

    let area = AreaQuery::new(lat, lng, radius)?;
    let report = db_services::readings_near(state.repository.as_ref(), &area).await?;

    Ok(Json(LocationResponse {
        message: format!(
            "Found {} readings within {}km radius",
            report.readings.len(),
            area.radius.km()
        ),
        location: LocationEcho {
            latitude: area.center.latitude,
            longitude: area.center.longitude,
            radius: area.radius.km(),
        },
        area_statistics: report.statistics,
        readings: report.readings,
    }))
}

// =============================================================================
// Analytics
// =============================================================================

/// GET /api/analytics
pub async fn analytics(State(state): State<AppState>) -> HandlerResult<ApiResponse<AnalyticsReport>> {
    let report = db_services::collection_analytics(state.repository.as_ref()).await?;
    Ok(Json(ApiResponse::new(
        "Analytics retrieved successfully",
        report,
    )))
}

/// POST /api/indices
///
/// Indices, interpretation bands and hardness for one concentration vector.
/// Nothing is stored.
pub async fn calculate_indices(
    Json(payload): Json<MetalPayload>,
) -> HandlerResult<ApiResponse<IndicesResponse>> {
    let concentrations = validate_concentrations(&MetalInputs::from(payload))?;
    let indices = compute_indices(&concentrations, &Standards::DEFAULT)?;

    Ok(Json(ApiResponse::new(
        "Indices calculated successfully",
        IndicesResponse {
            indices,
            interpretation: indices.interpret(),
            water_hardness: compute_hardness(&concentrations),
        },
    )))
}

// =============================================================================
// Scientist profile
// =============================================================================

/// GET /api/scientist/profile
pub async fn get_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> HandlerResult<ApiResponse<ScientistProfile>> {
    let profile =
        db_services::profile_for_user(state.repository.as_ref(), user.id, &user.username).await?;
    Ok(Json(ApiResponse::new(
        "Profile retrieved successfully",
        profile,
    )))
}

/// PUT /api/scientist/profile
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(update): Json<ProfileUpdate>,
) -> HandlerResult<ApiResponse<ScientistProfile>> {
    let profile =
        db_services::update_profile(state.repository.as_ref(), user.id, &user.username, update)
            .await?;
    Ok(Json(ApiResponse::new("Profile updated successfully", profile)))
}
