//! Whole-collection metal statistics.

use serde::{Deserialize, Serialize};

use super::error::QualityResult;
use super::indices::compute_indices;
use crate::models::{Concentrations, Metal, Reading, Standards};

/// Per-metal mean, minimum and maximum over a set of readings.
///
/// Every vector is zero when there are no readings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetalSummary {
    pub total_samples: u64,
    pub average: Concentrations,
    pub minimum: Concentrations,
    pub maximum: Concentrations,
}

pub fn summarize_readings(readings: &[Reading]) -> MetalSummary {
    let Some(first) = readings.first() else {
        return MetalSummary::default();
    };

    let mut sum = Concentrations::zero();
    let mut minimum = first.metals;
    let mut maximum = first.metals;

    for reading in readings {
        for (metal, value) in reading.metals.iter() {
            sum.set(metal, sum.get(metal) + value);
            minimum.set(metal, minimum.get(metal).min(value));
            maximum.set(metal, maximum.get(metal).max(value));
        }
    }

    let n = readings.len() as f64;
    MetalSummary {
        total_samples: readings.len() as u64,
        average: Concentrations::from_fn(|m| sum.get(m) / n),
        minimum,
        maximum,
    }
}

/// Indices of the averaged concentration vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculatedIndices {
    pub hpi: f64,
    pub hei: f64,
    pub cd: f64,
    pub mcd: f64,
    pub avg_concentrations: Concentrations,
}

/// Flat analytics payload: `avg_lead`, `min_lead`, `max_lead`, ... plus the
/// indices of the averaged vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_samples: u64,
    pub avg_lead: f64,
    pub avg_cadmium: f64,
    pub avg_chromium: f64,
    pub avg_arsenic: f64,
    pub avg_mercury: f64,
    pub min_lead: f64,
    pub min_cadmium: f64,
    pub min_chromium: f64,
    pub min_arsenic: f64,
    pub min_mercury: f64,
    pub max_lead: f64,
    pub max_cadmium: f64,
    pub max_chromium: f64,
    pub max_arsenic: f64,
    pub max_mercury: f64,
    pub calculated_indices: CalculatedIndices,
}

impl AnalyticsReport {
    pub fn average(&self, metal: Metal) -> f64 {
        match metal {
            Metal::Lead => self.avg_lead,
            Metal::Cadmium => self.avg_cadmium,
            Metal::Chromium => self.avg_chromium,
            Metal::Arsenic => self.avg_arsenic,
            Metal::Mercury => self.avg_mercury,
        }
    }
}

pub fn build_analytics_report(
    summary: &MetalSummary,
    standards: &Standards,
) -> QualityResult<AnalyticsReport> {
    let indices = compute_indices(&summary.average, standards)?;
    let (avg, min, max) = (&summary.average, &summary.minimum, &summary.maximum);

    Ok(AnalyticsReport {
        total_samples: summary.total_samples,
        avg_lead: avg.lead,
        avg_cadmium: avg.cadmium,
        avg_chromium: avg.chromium,
        avg_arsenic: avg.arsenic,
        avg_mercury: avg.mercury,
        min_lead: min.lead,
        min_cadmium: min.cadmium,
        min_chromium: min.chromium,
        min_arsenic: min.arsenic,
        min_mercury: min.mercury,
        max_lead: max.lead,
        max_cadmium: max.cadmium,
        max_chromium: max.chromium,
        max_arsenic: max.arsenic,
        max_mercury: max.mercury,
        calculated_indices: CalculatedIndices {
            hpi: indices.hpi,
            hei: indices.hei,
            cd: indices.cd,
            mcd: indices.mcd,
            avg_concentrations: summary.average,
        },
    })
}
