//! Water-quality readings as stored by the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metal::Concentrations;

crate::define_id_type!(i64, ReadingId);
crate::define_id_type!(i64, UserId);

/// A stored water-quality measurement at one point and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: ReadingId,
    pub sample_id: String,
    /// Calendar date as submitted. Not parsed.
    pub date: String,
    /// Sampling depth in metres.
    pub depth: f64,
    /// Free-form location label.
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub metals: Concentrations,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated reading ready to be persisted.
///
/// Produced by [`crate::services::validation`]; repositories trust it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReading {
    pub sample_id: String,
    pub date: String,
    pub depth: f64,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub metals: Concentrations,
    pub user_id: Option<UserId>,
}

impl NewReading {
    /// Materialize a stored reading with the given identity and timestamps.
    pub fn into_reading(self, id: ReadingId, now: DateTime<Utc>) -> Reading {
        Reading {
            id,
            sample_id: self.sample_id,
            date: self.date,
            depth: self.depth,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            metals: self.metals,
            user_id: self.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-metal values as received from a client, each optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetalInputs {
    pub lead: Option<f64>,
    pub cadmium: Option<f64>,
    pub chromium: Option<f64>,
    pub arsenic: Option<f64>,
    pub mercury: Option<f64>,
}

/// Unvalidated reading fields.
///
/// Used both for submissions (missing required fields are errors) and for
/// partial updates (missing fields keep their stored value, see
/// [`ReadingInput::overlay`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReadingInput {
    pub sample_id: Option<String>,
    pub date: Option<String>,
    pub depth: Option<f64>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metals: Option<MetalInputs>,
}

impl ReadingInput {
    /// Fill every field this input leaves unset from an existing reading.
    ///
    /// Metals are merged individually, so an update that only supplies
    /// `lead` keeps the stored cadmium, chromium, arsenic and mercury values.
    pub fn overlay(&self, base: &Reading) -> ReadingInput {
        let metals = self.metals.unwrap_or_default();
        ReadingInput {
            sample_id: Some(
                self.sample_id
                    .clone()
                    .unwrap_or_else(|| base.sample_id.clone()),
            ),
            date: Some(self.date.clone().unwrap_or_else(|| base.date.clone())),
            depth: Some(self.depth.unwrap_or(base.depth)),
            location: Some(
                self.location
                    .clone()
                    .unwrap_or_else(|| base.location.clone()),
            ),
            latitude: Some(self.latitude.unwrap_or(base.latitude)),
            longitude: Some(self.longitude.unwrap_or(base.longitude)),
            metals: Some(MetalInputs {
                lead: Some(metals.lead.unwrap_or(base.metals.lead)),
                cadmium: Some(metals.cadmium.unwrap_or(base.metals.cadmium)),
                chromium: Some(metals.chromium.unwrap_or(base.metals.chromium)),
                arsenic: Some(metals.arsenic.unwrap_or(base.metals.arsenic)),
                mercury: Some(metals.mercury.unwrap_or(base.metals.mercury)),
            }),
        }
    }
}

/// Number of readings a user submitted for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored() -> Reading {
        NewReading {
            sample_id: "S-1".to_string(),
            date: "2024-03-01".to_string(),
            depth: 3.5,
            location: "Well 4".to_string(),
            latitude: 28.61,
            longitude: 77.21,
            metals: Concentrations::new(0.01, 0.002, 0.04, 0.005, 0.001),
            user_id: Some(UserId(3)),
        }
        .into_reading(ReadingId(1), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_reading_serializes_metals_flat() {
        let json = serde_json::to_value(stored()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["lead"], 0.01);
        assert_eq!(json["mercury"], 0.001);
        assert_eq!(json["user_id"], 3);
        assert!(json.get("metals").is_none());
    }

    #[test]
    fn test_overlay_keeps_unset_fields() {
        let base = stored();
        let update = ReadingInput {
            location: Some("Well 5".to_string()),
            metals: Some(MetalInputs {
                lead: Some(0.2),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = update.overlay(&base);
        assert_eq!(merged.location.as_deref(), Some("Well 5"));
        assert_eq!(merged.sample_id.as_deref(), Some("S-1"));
        assert_eq!(merged.depth, Some(3.5));
        let metals = merged.metals.unwrap();
        assert_eq!(metals.lead, Some(0.2));
        assert_eq!(metals.chromium, Some(0.04));
    }
}
