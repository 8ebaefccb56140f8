//! Pure computation layer.
//!
//! Everything here is synchronous and side-effect free: the index calculator,
//! synthetic hardness, great-circle geometry, area aggregation, collection
//! analytics and input validation. Persistence and transport live in
//! [`crate::db`] and `crate::http`.

pub mod analytics;
pub mod area;
pub mod error;
pub mod geo;
pub mod hardness;
pub mod indices;
pub mod validation;

pub use analytics::{build_analytics_report, summarize_readings, AnalyticsReport, MetalSummary};
pub use area::{aggregate_area, AreaQuery, AreaReport, AreaStatistics, EnrichedReading};
pub use error::{QualityError, QualityResult};
pub use geo::{haversine_distance_km, BoundingBox, GeoPoint, SearchRadius};
pub use hardness::{compute_hardness, HardnessCategory, WaterHardness};
pub use indices::{compute_indices, IndexInterpretation, WaterQualityIndices};
pub use validation::{
    validate_batch, validate_concentrations, validate_new_reading, BatchRowIssue, FieldIssue,
};
