//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! See [`PostgresConfig::with_env_overrides`] for the environment variables read at
//! startup.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::config::PostgresConfig;
use crate::db::repository::{
    AnalyticsRepository, ErrorContext, ProfileRepository, ReadingRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{DailyCount, NewReading, Reading, ReadingId, ScientistProfile, UserId};
use crate::services::{BoundingBox, MetalSummary};

mod models;
mod schema;

use models::*;
use schema::{readings, scientist_profiles};

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

const METAL_SUMMARY_SQL: &str = "\
SELECT COUNT(*)::BIGINT AS total_samples, \
       COALESCE(AVG(lead), 0)::FLOAT8 AS avg_lead, \
       COALESCE(AVG(cadmium), 0)::FLOAT8 AS avg_cadmium, \
       COALESCE(AVG(chromium), 0)::FLOAT8 AS avg_chromium, \
       COALESCE(AVG(arsenic), 0)::FLOAT8 AS avg_arsenic, \
       COALESCE(AVG(mercury), 0)::FLOAT8 AS avg_mercury, \
       COALESCE(MIN(lead), 0)::FLOAT8 AS min_lead, \
       COALESCE(MIN(cadmium), 0)::FLOAT8 AS min_cadmium, \
       COALESCE(MIN(chromium), 0)::FLOAT8 AS min_chromium, \
       COALESCE(MIN(arsenic), 0)::FLOAT8 AS min_arsenic, \
       COALESCE(MIN(mercury), 0)::FLOAT8 AS min_mercury, \
       COALESCE(MAX(lead), 0)::FLOAT8 AS max_lead, \
       COALESCE(MAX(cadmium), 0)::FLOAT8 AS max_cadmium, \
       COALESCE(MAX(chromium), 0)::FLOAT8 AS max_chromium, \
       COALESCE(MAX(arsenic), 0)::FLOAT8 AS max_arsenic, \
       COALESCE(MAX(mercury), 0)::FLOAT8 AS max_mercury \
FROM readings";

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Retries up to `max_retries` times on retryable errors (connection
    /// errors, timeouts, serialization failures), doubling the delay each time.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("Retryable database error (attempt {}): {}", attempt + 1, e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// Like [`map_diesel_error`] but names the missing reading.
fn map_reading_error(
    operation: &'static str,
    id: ReadingId,
) -> impl Fn(diesel::result::Error) -> RepositoryError {
    move |err| match err {
        diesel::result::Error::NotFound => RepositoryError::not_found_with_context(
            format!("Reading {} not found", id),
            ErrorContext::new(operation)
                .with_entity("reading")
                .with_entity_id(id),
        ),
        other => map_diesel_error(other).with_operation(operation),
    }
}

fn rows_to_readings(rows: Vec<ReadingRow>) -> Vec<Reading> {
    rows.into_iter().map(Reading::from).collect()
}

#[async_trait]
impl ReadingRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn insert_reading(&self, reading: NewReading) -> RepositoryResult<Reading> {
        let row = NewReadingRow::from(reading);
        self.with_conn(move |conn| {
            diesel::insert_into(readings::table)
                .values(&row)
                .returning(ReadingRow::as_returning())
                .get_result::<ReadingRow>(conn)
                .map(Reading::from)
                .map_err(|e| map_diesel_error(e).with_operation("insert_reading"))
        })
        .await
    }

    async fn insert_readings(&self, batch: Vec<NewReading>) -> RepositoryResult<Vec<Reading>> {
        let rows: Vec<NewReadingRow> = batch.into_iter().map(NewReadingRow::from).collect();
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let stored = diesel::insert_into(readings::table)
                    .values(&rows)
                    .returning(ReadingRow::as_returning())
                    .get_results::<ReadingRow>(tx)?;
                Ok(rows_to_readings(stored))
            })
            .map_err(|e| e.with_operation("insert_readings"))
        })
        .await
    }

    async fn list_readings(&self) -> RepositoryResult<Vec<Reading>> {
        self.with_conn(|conn| {
            readings::table
                .select(ReadingRow::as_select())
                .order((readings::created_at.desc(), readings::id.desc()))
                .load::<ReadingRow>(conn)
                .map(rows_to_readings)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_reading(&self, id: ReadingId) -> RepositoryResult<Reading> {
        self.with_conn(move |conn| {
            readings::table
                .find(id.0)
                .select(ReadingRow::as_select())
                .first::<ReadingRow>(conn)
                .map(Reading::from)
                .map_err(map_reading_error("get_reading", id))
        })
        .await
    }

    async fn update_reading(
        &self,
        id: ReadingId,
        reading: NewReading,
    ) -> RepositoryResult<Reading> {
        let changes = ReadingChangeset::new(reading, Utc::now());
        self.with_conn(move |conn| {
            diesel::update(readings::table.find(id.0))
                .set(&changes)
                .returning(ReadingRow::as_returning())
                .get_result::<ReadingRow>(conn)
                .map(Reading::from)
                .map_err(map_reading_error("update_reading", id))
        })
        .await
    }

    async fn delete_reading(&self, id: ReadingId) -> RepositoryResult<Reading> {
        self.with_conn(move |conn| {
            diesel::delete(readings::table.find(id.0))
                .returning(ReadingRow::as_returning())
                .get_result::<ReadingRow>(conn)
                .map(Reading::from)
                .map_err(map_reading_error("delete_reading", id))
        })
        .await
    }

    async fn list_readings_for_user(&self, user: UserId) -> RepositoryResult<Vec<Reading>> {
        self.with_conn(move |conn| {
            readings::table
                .filter(readings::user_id.eq(user.0))
                .select(ReadingRow::as_select())
                .order((readings::created_at.desc(), readings::id.desc()))
                .load::<ReadingRow>(conn)
                .map(rows_to_readings)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn daily_counts_for_user(&self, user: UserId) -> RepositoryResult<Vec<DailyCount>> {
        self.with_conn(move |conn| {
            let rows: Vec<(String, i64)> = readings::table
                .filter(readings::user_id.eq(user.0))
                .group_by(readings::date)
                .select((readings::date, count_star()))
                .order(readings::date.asc())
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(rows
                .into_iter()
                .map(|(date, count)| DailyCount {
                    date,
                    count: count.max(0) as u64,
                })
                .collect())
        })
        .await
    }

    async fn fetch_readings_in_bounds(
        &self,
        bounds: &BoundingBox,
    ) -> RepositoryResult<Vec<Reading>> {
        let b = *bounds;
        self.with_conn(move |conn| {
            readings::table
                .filter(readings::latitude.between(b.min_lat, b.max_lat))
                .filter(readings::longitude.between(b.min_lng, b.max_lng))
                .select(ReadingRow::as_select())
                .order((readings::created_at.desc(), readings::id.desc()))
                .load::<ReadingRow>(conn)
                .map(rows_to_readings)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl AnalyticsRepository for PostgresRepository {
    async fn fetch_metal_summary(&self) -> RepositoryResult<MetalSummary> {
        self.with_conn(|conn| {
            sql_query(METAL_SUMMARY_SQL)
                .get_result::<MetalSummaryRow>(conn)
                .map(MetalSummary::from)
                .map_err(|e| map_diesel_error(e).with_operation("fetch_metal_summary"))
        })
        .await
    }
}

#[async_trait]
impl ProfileRepository for PostgresRepository {
    async fn get_profile(&self, user: UserId) -> RepositoryResult<Option<ScientistProfile>> {
        self.with_conn(move |conn| {
            let row = scientist_profiles::table
                .find(user.0)
                .select(ProfileRow::as_select())
                .first::<ProfileRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            row.map(ProfileRow::into_profile).transpose()
        })
        .await
    }

    async fn upsert_profile(&self, profile: ScientistProfile) -> RepositoryResult<ScientistProfile> {
        let row = ProfileRow::from_profile(&profile);
        self.with_conn(move |conn| {
            diesel::insert_into(scientist_profiles::table)
                .values(&row)
                .on_conflict(scientist_profiles::user_id)
                .do_update()
                .set(&row)
                .returning(ProfileRow::as_returning())
                .get_result::<ProfileRow>(conn)
                .map_err(|e| map_diesel_error(e).with_operation("upsert_profile"))?
                .into_profile()
        })
        .await
    }
}
