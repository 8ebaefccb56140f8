//! Area aggregation: readings within a radius of a point, enriched with their
//! indices and hardness, plus summary statistics for the area.
//!
//! The aggregator is pure. The caller fetches candidate readings from the
//! store (usually prefiltered with [`AreaQuery::bounding_box`]) and this
//! module does the exact great-circle filter and the reductions.
//!
//! The per-reading list keeps the order in which readings were passed in.
//! That order is whatever the store yields and is not part of the contract.

use serde::{Deserialize, Serialize};

use super::error::QualityResult;
use super::geo::{BoundingBox, GeoPoint, SearchRadius};
use super::hardness::{compute_hardness, HardnessCategory, WaterHardness};
use super::indices::{compute_indices, WaterQualityIndices};
use crate::models::{Concentrations, Metal, Reading, Standards};

/// A validated location query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaQuery {
    pub center: GeoPoint,
    pub radius: SearchRadius,
}

impl AreaQuery {
    /// # Errors
    /// `InvalidArgument` for non-finite or out-of-range coordinates and for a
    /// supplied radius that is not a positive finite number. An absent radius
    /// defaults to 1 km.
    pub fn new(latitude: f64, longitude: f64, radius_km: Option<f64>) -> QualityResult<Self> {
        Ok(Self {
            center: GeoPoint::new(latitude, longitude)?,
            radius: SearchRadius::from_optional(radius_km)?,
        })
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::around(self.center, self.radius)
    }
}

/// A stored reading with its derived, never-persisted fields attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedReading {
    #[serde(flatten)]
    pub reading: Reading,
    pub water_quality_indices: WaterQualityIndices,
    pub water_hardness: WaterHardness,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HardnessDistribution {
    pub soft: u64,
    pub moderately_hard: u64,
    pub hard: u64,
    pub very_hard: u64,
}

impl HardnessDistribution {
    fn record(&mut self, category: HardnessCategory) {
        match category {
            HardnessCategory::Soft => self.soft += 1,
            HardnessCategory::ModeratelyHard => self.moderately_hard += 1,
            HardnessCategory::Hard => self.hard += 1,
            HardnessCategory::VeryHard => self.very_hard += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.soft + self.moderately_hard + self.hard + self.very_hard
    }
}

/// Summary of the readings inside a search circle.
///
/// All fields are zero when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaStatistics {
    pub total_samples: u64,
    pub avg_hardness: f64,
    pub hardness_distribution: HardnessDistribution,
    /// Mean HPI across the included readings.
    pub avg_pollution_index: f64,
    /// mCd of the area-averaged concentration vector.
    pub mcd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaReport {
    pub statistics: AreaStatistics,
    pub readings: Vec<EnrichedReading>,
}

/// Filter `readings` to the query circle and reduce them.
///
/// Readings with non-finite coordinates are skipped. A reading is included
/// iff its Haversine distance to the query point is `<= radius`.
///
/// # Errors
/// `InvalidConfiguration` if `standards` is degenerate.
pub fn aggregate_area(
    query: &AreaQuery,
    readings: Vec<Reading>,
    standards: &Standards,
) -> QualityResult<AreaReport> {
    let radius_km = query.radius.km();

    let mut enriched = Vec::new();
    let mut distribution = HardnessDistribution::default();
    let mut hardness_sum = 0.0;
    let mut hpi_sum = 0.0;
    let mut metal_sums = Concentrations::zero();

    for reading in readings {
        if !reading.latitude.is_finite() || !reading.longitude.is_finite() {
            continue;
        }
        let distance_km = super::geo::haversine_distance_km(
            query.center.latitude,
            query.center.longitude,
            reading.latitude,
            reading.longitude,
        );
        if distance_km > radius_km {
            continue;
        }

        let indices = compute_indices(&reading.metals, standards)?;
        let hardness = compute_hardness(&reading.metals);

        hardness_sum += hardness.value;
        hpi_sum += indices.hpi;
        distribution.record(hardness.category);
        for metal in Metal::ALL {
            metal_sums.set(metal, metal_sums.get(metal) + reading.metals.get(metal));
        }

        enriched.push(EnrichedReading {
            reading,
            water_quality_indices: indices,
            water_hardness: hardness,
            distance_km,
        });
    }

    if enriched.is_empty() {
        return Ok(AreaReport {
            statistics: AreaStatistics::default(),
            readings: enriched,
        });
    }

    let n = enriched.len() as f64;
    let averaged = Concentrations::from_fn(|m| metal_sums.get(m) / n);
    let area_indices = compute_indices(&averaged, standards)?;

    Ok(AreaReport {
        statistics: AreaStatistics {
            total_samples: enriched.len() as u64,
            avg_hardness: hardness_sum / n,
            hardness_distribution: distribution,
            avg_pollution_index: hpi_sum / n,
            mcd: area_indices.mcd,
        },
        readings: enriched,
    })
}

#[cfg(test)]
#[path = "area_tests.rs"]
mod area_tests;
