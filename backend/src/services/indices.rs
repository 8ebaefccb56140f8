//! Heavy-metal pollution indices for a single concentration vector.
//!
//! For every metal `m` with concentration `C` and limit `S`:
//!
//! ```text
//! W = 1 / S            unit weight
//! Q = (C / S) * 100    sub-index
//! ```
//!
//! and the reductions are
//!
//! ```text
//! HPI = Σ(W·Q) / Σ(W)
//! HEI = Σ(C/S)
//! Cd  = Σ(C/S - 1)
//! mCd = Σ(C/S) / n
//! ```
//!
//! The calculator is pure; it never looks at anything but its two arguments.

use serde::{Deserialize, Serialize};

use super::error::{QualityError, QualityResult};
use crate::models::{Concentrations, Metal, Standards};

/// The four pollution indices of one concentration vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WaterQualityIndices {
    /// Heavy Metal Pollution Index.
    pub hpi: f64,
    /// Heavy Metal Evaluation Index.
    pub hei: f64,
    /// Contamination Degree.
    pub cd: f64,
    /// Mean contamination degree.
    pub mcd: f64,
}

/// Compute HPI, HEI, Cd and mCd for `concentrations` against `standards`.
///
/// Concentrations are expected to be finite and non-negative; rejecting
/// anything else is the caller's job (see [`super::validation`]).
///
/// # Errors
/// [`QualityError::InvalidConfiguration`] if any limit is zero, negative or
/// non-finite. [`QualityError::InvalidArgument`] if the concentrations
/// overflow any index.
pub fn compute_indices(
    concentrations: &Concentrations,
    standards: &Standards,
) -> QualityResult<WaterQualityIndices> {
    let mut sum_wq = 0.0;
    let mut sum_w = 0.0;
    let mut hei = 0.0;
    let mut cd = 0.0;
    let mut sum_cs = 0.0;

    for metal in Metal::ALL {
        let s = standards.limit(metal);
        if !(s.is_finite() && s > 0.0) {
            return Err(QualityError::invalid_configuration(format!(
                "standard limit for {} must be a positive finite number, got {}",
                metal, s
            )));
        }

        let c = concentrations.get(metal);
        let ratio = c / s;
        let w = 1.0 / s;
        let q = ratio * 100.0;

        sum_wq += w * q;
        sum_w += w;
        hei += ratio;
        cd += ratio - 1.0;
        sum_cs += ratio;
    }

    if !(sum_w.is_finite() && sum_w > 0.0) {
        return Err(QualityError::invalid_configuration(format!(
            "sum of unit weights must be positive and finite, got {}",
            sum_w
        )));
    }

    let indices = WaterQualityIndices {
        hpi: sum_wq / sum_w,
        hei,
        cd,
        mcd: sum_cs / Metal::COUNT as f64,
    };
    if ![indices.hpi, indices.hei, indices.cd, indices.mcd]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(QualityError::invalid_argument(
            "metals",
            "concentrations are too large to produce finite indices",
        ));
    }
    Ok(indices)
}

// =============================================================================
// Interpretation bands (display only, never stored)
// =============================================================================

/// HPI band. The critical value is 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HpiBand {
    #[serde(rename = "Low Pollution")]
    LowPollution,
    #[serde(rename = "High Pollution")]
    HighPollution,
}

impl HpiBand {
    pub fn classify(hpi: f64) -> Self {
        if hpi < 100.0 {
            HpiBand::LowPollution
        } else {
            HpiBand::HighPollution
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HpiBand::LowPollution => "Low Pollution",
            HpiBand::HighPollution => "High Pollution",
        }
    }
}

/// Three-level band shared by HEI and Cd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollutionLevel {
    Low,
    Medium,
    High,
}

impl PollutionLevel {
    /// HEI: `< 10` low, `< 20` medium, else high.
    pub fn classify_hei(hei: f64) -> Self {
        Self::banded(hei, 10.0, 20.0)
    }

    /// Cd: `< 1` low, `< 3` medium, else high.
    pub fn classify_cd(cd: f64) -> Self {
        Self::banded(cd, 1.0, 3.0)
    }

    fn banded(value: f64, low: f64, medium: f64) -> Self {
        if value < low {
            PollutionLevel::Low
        } else if value < medium {
            PollutionLevel::Medium
        } else {
            PollutionLevel::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PollutionLevel::Low => "Low",
            PollutionLevel::Medium => "Medium",
            PollutionLevel::High => "High",
        }
    }
}

/// mCd contamination band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum McdBand {
    #[serde(rename = "Nil to Very Low")]
    NilToVeryLow,
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    #[serde(rename = "Ultra High")]
    UltraHigh,
}

impl McdBand {
    pub fn classify(mcd: f64) -> Self {
        match mcd {
            v if v < 1.5 => McdBand::NilToVeryLow,
            v if v < 2.0 => McdBand::Low,
            v if v < 4.0 => McdBand::Moderate,
            v if v < 8.0 => McdBand::High,
            v if v < 16.0 => McdBand::VeryHigh,
            _ => McdBand::UltraHigh,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            McdBand::NilToVeryLow => "Nil to Very Low",
            McdBand::Low => "Low",
            McdBand::Moderate => "Moderate",
            McdBand::High => "High",
            McdBand::VeryHigh => "Very High",
            McdBand::UltraHigh => "Ultra High",
        }
    }
}

/// Display bands for a full set of indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInterpretation {
    pub hpi: HpiBand,
    pub hei: PollutionLevel,
    pub cd: PollutionLevel,
    pub mcd: McdBand,
}

impl WaterQualityIndices {
    pub fn interpret(&self) -> IndexInterpretation {
        IndexInterpretation {
            hpi: HpiBand::classify(self.hpi),
            hei: PollutionLevel::classify_hei(self.hei),
            cd: PollutionLevel::classify_cd(self.cd),
            mcd: McdBand::classify(self.mcd),
        }
    }
}

#[cfg(test)]
#[path = "indices_tests.rs"]
mod indices_tests;
