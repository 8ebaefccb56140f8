use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double};
use serde_json::Value;

use super::schema::{readings, scientist_profiles};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{Concentrations, NewReading, Reading, ReadingId, ScientistProfile, UserId};
use crate::services::MetalSummary;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = readings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReadingRow {
    pub id: i64,
    pub sample_id: String,
    pub date: String,
    pub depth: f64,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub lead: f64,
    pub cadmium: f64,
    pub chromium: f64,
    pub arsenic: f64,
    pub mercury: f64,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        Reading {
            id: ReadingId(row.id),
            sample_id: row.sample_id,
            date: row.date,
            depth: row.depth,
            location: row.location,
            latitude: row.latitude,
            longitude: row.longitude,
            metals: Concentrations::new(
                row.lead,
                row.cadmium,
                row.chromium,
                row.arsenic,
                row.mercury,
            ),
            user_id: row.user_id.map(UserId),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = readings)]
pub struct NewReadingRow {
    pub sample_id: String,
    pub date: String,
    pub depth: f64,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub lead: f64,
    pub cadmium: f64,
    pub chromium: f64,
    pub arsenic: f64,
    pub mercury: f64,
    pub user_id: Option<i64>,
}

impl From<NewReading> for NewReadingRow {
    fn from(r: NewReading) -> Self {
        NewReadingRow {
            sample_id: r.sample_id,
            date: r.date,
            depth: r.depth,
            location: r.location,
            latitude: r.latitude,
            longitude: r.longitude,
            lead: r.metals.lead,
            cadmium: r.metals.cadmium,
            chromium: r.metals.chromium,
            arsenic: r.metals.arsenic,
            mercury: r.metals.mercury,
            user_id: r.user_id.map(|u| u.0),
        }
    }
}

/// Full replacement of the mutable reading columns. Owner and `created_at`
/// never change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = readings)]
pub struct ReadingChangeset {
    pub sample_id: String,
    pub date: String,
    pub depth: f64,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub lead: f64,
    pub cadmium: f64,
    pub chromium: f64,
    pub arsenic: f64,
    pub mercury: f64,
    pub updated_at: DateTime<Utc>,
}

impl ReadingChangeset {
    pub fn new(r: NewReading, updated_at: DateTime<Utc>) -> Self {
        ReadingChangeset {
            sample_id: r.sample_id,
            date: r.date,
            depth: r.depth,
            location: r.location,
            latitude: r.latitude,
            longitude: r.longitude,
            lead: r.metals.lead,
            cadmium: r.metals.cadmium,
            chromium: r.metals.chromium,
            arsenic: r.metals.arsenic,
            mercury: r.metals.mercury,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = scientist_profiles)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub organization: String,
    pub title: String,
    pub bio: String,
    pub expertise: Value,
    pub phone: String,
    pub website: String,
    pub location: String,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    pub fn from_profile(p: &ScientistProfile) -> Self {
        ProfileRow {
            user_id: p.user_id.0,
            name: p.name.clone(),
            email: p.email.clone(),
            organization: p.organization.clone(),
            title: p.title.clone(),
            bio: p.bio.clone(),
            expertise: Value::from(p.expertise.clone()),
            phone: p.phone.clone(),
            website: p.website.clone(),
            location: p.location.clone(),
            updated_at: p.updated_at,
        }
    }

    pub fn into_profile(self) -> RepositoryResult<ScientistProfile> {
        let expertise: Vec<String> = serde_json::from_value(self.expertise).map_err(|e| {
            RepositoryError::internal(format!("Failed to parse expertise JSON: {}", e))
        })?;
        Ok(ScientistProfile {
            user_id: UserId(self.user_id),
            name: self.name,
            email: self.email,
            organization: self.organization,
            title: self.title,
            bio: self.bio,
            expertise,
            phone: self.phone,
            website: self.website,
            location: self.location,
            updated_at: self.updated_at,
        })
    }
}

/// Result row of the collection-wide `AVG/MIN/MAX` query.
#[derive(Debug, Clone, QueryableByName)]
pub struct MetalSummaryRow {
    #[diesel(sql_type = BigInt)]
    pub total_samples: i64,
    #[diesel(sql_type = Double)]
    pub avg_lead: f64,
    #[diesel(sql_type = Double)]
    pub avg_cadmium: f64,
    #[diesel(sql_type = Double)]
    pub avg_chromium: f64,
    #[diesel(sql_type = Double)]
    pub avg_arsenic: f64,
    #[diesel(sql_type = Double)]
    pub avg_mercury: f64,
    #[diesel(sql_type = Double)]
    pub min_lead: f64,
    #[diesel(sql_type = Double)]
    pub min_cadmium: f64,
    #[diesel(sql_type = Double)]
    pub min_chromium: f64,
    #[diesel(sql_type = Double)]
    pub min_arsenic: f64,
    #[diesel(sql_type = Double)]
    pub min_mercury: f64,
    #[diesel(sql_type = Double)]
    pub max_lead: f64,
    #[diesel(sql_type = Double)]
    pub max_cadmium: f64,
    #[diesel(sql_type = Double)]
    pub max_chromium: f64,
    #[diesel(sql_type = Double)]
    pub max_arsenic: f64,
    #[diesel(sql_type = Double)]
    pub max_mercury: f64,
}

impl From<MetalSummaryRow> for MetalSummary {
    fn from(row: MetalSummaryRow) -> Self {
        MetalSummary {
            total_samples: row.total_samples.max(0) as u64,
            average: Concentrations::new(
                row.avg_lead,
                row.avg_cadmium,
                row.avg_chromium,
                row.avg_arsenic,
                row.avg_mercury,
            ),
            minimum: Concentrations::new(
                row.min_lead,
                row.min_cadmium,
                row.min_chromium,
                row.min_arsenic,
                row.min_mercury,
            ),
            maximum: Concentrations::new(
                row.max_lead,
                row.max_cadmium,
                row.max_chromium,
                row.max_arsenic,
                row.max_mercury,
            ),
        }
    }
}
