//! Request and response bodies for the REST API.
//!
//! Request bodies are forgiving about shape: field names are accepted in
//! both `snake_case` and the `camelCase` used by the web client, and numbers
//! may arrive as JSON numbers or numeric strings. Anything that still fails
//! to parse becomes `NaN` and is rejected by validation with the field name.

use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::AuthenticatedUser;
use crate::models::{MetalInputs, ReadingInput};
use crate::services::{
    AreaStatistics, BatchRowIssue, EnrichedReading, IndexInterpretation, WaterHardness,
    WaterQualityIndices,
};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

/// Optional number that may be sent as a string. Blank strings count as
/// absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        None => None,
        Some(RawNumber::Number(v)) => Some(v),
        Some(RawNumber::Text(text)) => parse_number(&text),
    })
}

/// Parse a query-string or body number: blank → `None`, garbage → `NaN`.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.parse().unwrap_or(f64::NAN))
    }
}

/// Generic envelope used by most endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// Metal concentrations in mg/L as sent by a client.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MetalPayload {
    #[serde(default, deserialize_with = "lenient_number")]
    pub lead: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cadmium: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub chromium: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub arsenic: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub mercury: Option<f64>,
}

impl From<MetalPayload> for MetalInputs {
    fn from(p: MetalPayload) -> Self {
        MetalInputs {
            lead: p.lead,
            cadmium: p.cadmium,
            chromium: p.chromium,
            arsenic: p.arsenic,
            mercury: p.mercury,
        }
    }
}

/// Body of `POST /api/add-data` and `PUT /api/readings/{id}`, and one row of
/// a batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingPayload {
    #[serde(default, alias = "sampleId")]
    pub sample_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub depth: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "lat", deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng", deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub metals: Option<MetalPayload>,
}

impl From<ReadingPayload> for ReadingInput {
    fn from(p: ReadingPayload) -> Self {
        ReadingInput {
            sample_id: p.sample_id,
            date: p.date,
            depth: p.depth,
            location: p.location,
            latitude: p.latitude,
            longitude: p.longitude,
            metals: p.metals.map(Into::into),
        }
    }
}

/// Body of `POST /api/readings/batch`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchPayload {
    #[serde(default)]
    pub readings: Vec<ReadingPayload>,
}

/// Body of a rejected batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRejection {
    pub message: String,
    pub invalid: Vec<BatchRowIssue>,
}

/// Query of `GET /api/readings/location`. Kept as text so a bad number is a
/// 400 with a useful message instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationEcho {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationResponse {
    pub message: String,
    pub location: LocationEcho,
    pub area_statistics: AreaStatistics,
    pub readings: Vec<EnrichedReading>,
}

/// `GET /api` and `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String,
    pub database: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub message: String,
    pub user: AuthenticatedUser,
}

/// Result of `POST /api/indices`.
#[derive(Debug, Clone, Serialize)]
pub struct IndicesResponse {
    pub indices: WaterQualityIndices,
    pub interpretation: IndexInterpretation,
    pub water_hardness: WaterHardness,
}
