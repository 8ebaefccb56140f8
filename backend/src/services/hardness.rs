//! Synthetic water hardness.
//!
//! Not a chemistry formula: a weighted linear combination of the metal
//! concentrations, reported in mg/L CaCO3 equivalent.

use serde::{Deserialize, Serialize};

use crate::models::{Concentrations, Metal};

pub const HARDNESS_UNIT: &str = "mg/L CaCO3 equivalent";

fn weight(metal: Metal) -> f64 {
    match metal {
        Metal::Lead => 10.0,
        Metal::Cadmium => 15.0,
        Metal::Chromium => 5.0,
        Metal::Arsenic => 12.0,
        Metal::Mercury => 20.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardnessCategory {
    Soft,
    #[serde(rename = "Moderately Hard")]
    ModeratelyHard,
    Hard,
    #[serde(rename = "Very Hard")]
    VeryHard,
}

impl HardnessCategory {
    /// `< 60` soft, `< 180` moderately hard, `< 300` hard, else very hard.
    pub fn classify(value: f64) -> Self {
        if value < 60.0 {
            HardnessCategory::Soft
        } else if value < 180.0 {
            HardnessCategory::ModeratelyHard
        } else if value < 300.0 {
            HardnessCategory::Hard
        } else {
            HardnessCategory::VeryHard
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HardnessCategory::Soft => "Soft",
            HardnessCategory::ModeratelyHard => "Moderately Hard",
            HardnessCategory::Hard => "Hard",
            HardnessCategory::VeryHard => "Very Hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterHardness {
    pub value: f64,
    pub category: HardnessCategory,
    pub unit: String,
}

pub fn hardness_value(concentrations: &Concentrations) -> f64 {
    concentrations.iter().map(|(m, c)| weight(m) * c).sum()
}

pub fn compute_hardness(concentrations: &Concentrations) -> WaterHardness {
    let value = hardness_value(concentrations);
    WaterHardness {
        value,
        category: HardnessCategory::classify(value),
        unit: HARDNESS_UNIT.to_string(),
    }
}
