//! Heavy metals tracked by a water sample, their measured concentrations,
//! and the regulatory limits they are compared against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five heavy metals measured in every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Lead,
    Cadmium,
    Chromium,
    Arsenic,
    Mercury,
}

impl Metal {
    /// All metals in canonical order. Every per-metal reduction iterates this.
    pub const ALL: [Metal; 5] = [
        Metal::Lead,
        Metal::Cadmium,
        Metal::Chromium,
        Metal::Arsenic,
        Metal::Mercury,
    ];

    /// Number of metals in a concentration vector.
    pub const COUNT: usize = Self::ALL.len();

    pub fn name(self) -> &'static str {
        match self {
            Metal::Lead => "lead",
            Metal::Cadmium => "cadmium",
            Metal::Chromium => "chromium",
            Metal::Arsenic => "arsenic",
            Metal::Mercury => "mercury",
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concentration vector in mg/L, one entry per [`Metal`].
///
/// Missing entries deserialize as `0.0`, matching how samples are recorded
/// when a metal was below detection or not measured.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Concentrations {
    #[serde(default)]
    pub lead: f64,
    #[serde(default)]
    pub cadmium: f64,
    #[serde(default)]
    pub chromium: f64,
    #[serde(default)]
    pub arsenic: f64,
    #[serde(default)]
    pub mercury: f64,
}

impl Concentrations {
    pub fn new(lead: f64, cadmium: f64, chromium: f64, arsenic: f64, mercury: f64) -> Self {
        Self {
            lead,
            cadmium,
            chromium,
            arsenic,
            mercury,
        }
    }

    /// All-zero vector.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, metal: Metal) -> f64 {
        match metal {
            Metal::Lead => self.lead,
            Metal::Cadmium => self.cadmium,
            Metal::Chromium => self.chromium,
            Metal::Arsenic => self.arsenic,
            Metal::Mercury => self.mercury,
        }
    }

    pub fn set(&mut self, metal: Metal, value: f64) {
        match metal {
            Metal::Lead => self.lead = value,
            Metal::Cadmium => self.cadmium = value,
            Metal::Chromium => self.chromium = value,
            Metal::Arsenic => self.arsenic = value,
            Metal::Mercury => self.mercury = value,
        }
    }

    /// Build a vector by evaluating `f` for every metal.
    pub fn from_fn(mut f: impl FnMut(Metal) -> f64) -> Self {
        let mut out = Self::zero();
        for metal in Metal::ALL {
            out.set(metal, f(metal));
        }
        out
    }

    /// `(metal, concentration)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Metal, f64)> + '_ {
        Metal::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

/// Regulatory safe limits in mg/L, one per metal.
///
/// The process-wide table is [`Standards::DEFAULT`]; other tables exist only
/// so the calculator can be exercised against degenerate configurations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standards {
    limits: Concentrations,
}

impl Standards {
    /// lead=0.01, cadmium=0.003, chromium=0.05, arsenic=0.01, mercury=0.006
    pub const DEFAULT: Standards = Standards {
        limits: Concentrations {
            lead: 0.01,
            cadmium: 0.003,
            chromium: 0.05,
            arsenic: 0.01,
            mercury: 0.006,
        },
    };

    /// Build a custom table. No validation happens here; the index calculator
    /// rejects non-positive or non-finite limits.
    pub fn from_limits(limits: Concentrations) -> Self {
        Self { limits }
    }

    pub fn limit(&self, metal: Metal) -> f64 {
        self.limits.get(metal)
    }

    /// The table viewed as a concentration vector (a sample exactly at the limits).
    pub fn as_concentrations(&self) -> Concentrations {
        self.limits
    }
}

impl Default for Standards {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metal_order_and_names() {
        let names: Vec<&str> = Metal::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["lead", "cadmium", "chromium", "arsenic", "mercury"]);
        assert_eq!(Metal::COUNT, 5);
        assert_eq!(Metal::Chromium.to_string(), "chromium");
    }

    #[test]
    fn test_concentrations_get_set() {
        let mut c = Concentrations::zero();
        c.set(Metal::Arsenic, 0.02);
        assert_eq!(c.get(Metal::Arsenic), 0.02);
        assert_eq!(c.get(Metal::Lead), 0.0);

        let pairs: Vec<(Metal, f64)> = c.iter().collect();
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[3], (Metal::Arsenic, 0.02));
    }

    #[test]
    fn test_concentrations_missing_fields_default_to_zero() {
        let c: Concentrations = serde_json::from_str(r#"{"lead": 0.5}"#).unwrap();
        assert_eq!(c.lead, 0.5);
        assert_eq!(c.mercury, 0.0);
    }

    #[test]
    fn test_default_standards() {
        let s = Standards::default();
        assert_eq!(s.limit(Metal::Lead), 0.01);
        assert_eq!(s.limit(Metal::Cadmium), 0.003);
        assert_eq!(s.limit(Metal::Chromium), 0.05);
        assert_eq!(s.limit(Metal::Arsenic), 0.01);
        assert_eq!(s.limit(Metal::Mercury), 0.006);
    }
}
