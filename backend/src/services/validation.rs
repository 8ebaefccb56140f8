//! Validation of client-supplied readings.
//!
//! Required: `sample_id`, `date`, `location` (non-empty after trimming),
//! `latitude` and `longitude` (finite, in range). `depth` and every metal
//! default to 0 and must be finite, non-negative and at most
//! [`MAX_MEASUREMENT`].

use serde::{Deserialize, Serialize};

use super::error::{QualityError, QualityResult};
use crate::models::{Concentrations, Metal, MetalInputs, NewReading, ReadingInput, UserId};

/// Upper bound for a concentration (mg/L) or a depth (m). Keeps every
/// derived index finite.
pub const MAX_MEASUREMENT: f64 = 1.0e6;

/// One problem with one field. `field` is the name the client sent
/// (`sampleId`, `metals.lead`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<FieldIssue> for QualityError {
    fn from(issue: FieldIssue) -> Self {
        QualityError::invalid_argument(issue.field, issue.message)
    }
}

/// Rejected row of a batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRowIssue {
    pub index: usize,
    /// Names of the offending fields.
    pub missing: Vec<String>,
    pub issues: Vec<FieldIssue>,
}

fn required_text(value: &Option<String>, field: &str, issues: &mut Vec<FieldIssue>) {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => {}
        _ => issues.push(FieldIssue::new(field, "is required")),
    }
}

fn coordinate(value: Option<f64>, field: &str, bound: f64, issues: &mut Vec<FieldIssue>) {
    match value {
        None => issues.push(FieldIssue::new(field, "is required")),
        Some(v) if !v.is_finite() => issues.push(FieldIssue::new(field, "must be a finite number")),
        Some(v) if v.abs() > bound => issues.push(FieldIssue::new(
            field,
            format!("must be within [-{}, {}]", bound, bound),
        )),
        Some(_) => {}
    }
}

fn non_negative(value: Option<f64>, field: &str, issues: &mut Vec<FieldIssue>) {
    match value {
        Some(v) if !v.is_finite() => issues.push(FieldIssue::new(field, "must be a finite number")),
        Some(v) if v < 0.0 => issues.push(FieldIssue::new(field, "must not be negative")),
        Some(v) if v > MAX_MEASUREMENT => issues.push(FieldIssue::new(
            field,
            format!("must not exceed {}", MAX_MEASUREMENT),
        )),
        _ => {}
    }
}

fn metal_input(inputs: &MetalInputs, metal: Metal) -> Option<f64> {
    match metal {
        Metal::Lead => inputs.lead,
        Metal::Cadmium => inputs.cadmium,
        Metal::Chromium => inputs.chromium,
        Metal::Arsenic => inputs.arsenic,
        Metal::Mercury => inputs.mercury,
    }
}

/// Every problem with `input`, in field order. Empty when valid.
pub fn reading_issues(input: &ReadingInput) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    required_text(&input.sample_id, "sampleId", &mut issues);
    required_text(&input.date, "date", &mut issues);
    non_negative(input.depth, "depth", &mut issues);
    required_text(&input.location, "location", &mut issues);
    coordinate(input.latitude, "latitude", 90.0, &mut issues);
    coordinate(input.longitude, "longitude", 180.0, &mut issues);

    let metals = input.metals.unwrap_or_default();
    for metal in Metal::ALL {
        non_negative(
            metal_input(&metals, metal),
            &format!("metals.{}", metal),
            &mut issues,
        );
    }

    issues
}

fn build(input: &ReadingInput, owner: Option<UserId>) -> NewReading {
    let metals = input.metals.unwrap_or_default();
    let text = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();

    NewReading {
        sample_id: text(&input.sample_id),
        date: text(&input.date),
        depth: input.depth.unwrap_or(0.0),
        location: text(&input.location),
        latitude: input.latitude.unwrap_or(0.0),
        longitude: input.longitude.unwrap_or(0.0),
        metals: Concentrations::from_fn(|m| metal_input(&metals, m).unwrap_or(0.0)),
        user_id: owner,
    }
}

/// Validate a single submission and attach its owner.
///
/// # Errors
/// `InvalidArgument` naming the first offending field.
pub fn validate_new_reading(
    input: &ReadingInput,
    owner: Option<UserId>,
) -> QualityResult<NewReading> {
    match reading_issues(input).into_iter().next() {
        Some(issue) => Err(issue.into()),
        None => Ok(build(input, owner)),
    }
}

/// Validate a bare concentration vector. Absent metals count as 0.
pub fn validate_concentrations(inputs: &MetalInputs) -> QualityResult<Concentrations> {
    let mut issues = Vec::new();
    for metal in Metal::ALL {
        non_negative(metal_input(inputs, metal), metal.name(), &mut issues);
    }
    match issues.into_iter().next() {
        Some(issue) => Err(issue.into()),
        None => Ok(Concentrations::from_fn(|m| {
            metal_input(inputs, m).unwrap_or(0.0)
        })),
    }
}

/// Validate every row of a batch. Batch rows are never owned.
///
/// Either every row is valid, or the result lists every invalid row.
pub fn validate_batch(inputs: &[ReadingInput]) -> Result<Vec<NewReading>, Vec<BatchRowIssue>> {
    let mut rows = Vec::with_capacity(inputs.len());
    let mut rejected = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        let issues = reading_issues(input);
        if issues.is_empty() {
            rows.push(build(input, None));
        } else {
            rejected.push(BatchRowIssue {
                index,
                missing: issues.iter().map(|i| i.field.clone()).collect(),
                issues,
            });
        }
    }

    if rejected.is_empty() {
        Ok(rows)
    } else {
        Err(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> ReadingInput {
        ReadingInput {
            sample_id: Some("  GW-12 ".to_string()),
            date: Some("2024-06-01".to_string()),
            depth: Some(12.5),
            location: Some("Village well".to_string()),
            latitude: Some(26.9),
            longitude: Some(75.8),
            metals: Some(MetalInputs {
                lead: Some(0.02),
                arsenic: Some(0.001),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_valid_input_builds_reading() {
        let r = validate_new_reading(&valid_input(), Some(UserId(9))).unwrap();
        assert_eq!(r.sample_id, "GW-12");
        assert_eq!(r.metals.lead, 0.02);
        assert_eq!(r.metals.mercury, 0.0);
        assert_eq!(r.user_id, Some(UserId(9)));
    }

    #[test]
    fn test_depth_and_metals_default_to_zero() {
        let input = ReadingInput {
            depth: None,
            metals: None,
            ..valid_input()
        };
        let r = validate_new_reading(&input, None).unwrap();
        assert_eq!(r.depth, 0.0);
        assert_eq!(r.metals, Concentrations::zero());
    }

    #[test]
    fn test_zero_coordinates_are_valid() {
        let input = ReadingInput {
            latitude: Some(0.0),
            longitude: Some(0.0),
            ..valid_input()
        };
        assert!(validate_new_reading(&input, None).is_ok());
    }

    #[test]
    fn test_missing_and_blank_required_fields() {
        let input = ReadingInput {
            sample_id: Some("   ".to_string()),
            latitude: None,
            ..valid_input()
        };
        let issues = reading_issues(&input);
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["sampleId", "latitude"]);

        let err = validate_new_reading(&input, None).unwrap_err();
        assert_eq!(err.field(), Some("sampleId"));
    }

    #[test]
    fn test_rejects_out_of_range_and_non_finite() {
        let input = ReadingInput {
            latitude: Some(91.0),
            longitude: Some(f64::NAN),
            depth: Some(-1.0),
            metals: Some(MetalInputs {
                cadmium: Some(-0.1),
                mercury: Some(f64::INFINITY),
                ..Default::default()
            }),
            ..valid_input()
        };
        let fields: Vec<String> = reading_issues(&input).into_iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                "depth",
                "latitude",
                "longitude",
                "metals.cadmium",
                "metals.mercury"
            ]
        );
    }

    #[test]
    fn test_batch_reports_every_bad_row() {
        let bad = ReadingInput {
            date: None,
            location: None,
            ..valid_input()
        };
        let rejected = validate_batch(&[valid_input(), bad.clone(), valid_input(), bad]).unwrap_err();

        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].index, 1);
        assert_eq!(rejected[0].missing, vec!["date", "location"]);
        assert_eq!(rejected[1].index, 3);
    }

    #[test]
    fn test_batch_rows_have_no_owner() {
        let rows = validate_batch(&[valid_input(), valid_input()]).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.user_id.is_none()));
    }

    #[test]
    fn test_validate_concentrations_defaults_and_rejects() {
        let partial = MetalInputs {
            lead: Some(0.01),
            ..Default::default()
        };
        let c = validate_concentrations(&partial).unwrap();
        assert_eq!(c.lead, 0.01);
        assert_eq!(c.mercury, 0.0);

        let bad = MetalInputs {
            arsenic: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(
            validate_concentrations(&bad).unwrap_err().field(),
            Some("arsenic")
        );
    }

    #[test]
    fn test_rejects_measurements_above_bound() {
        let input = ReadingInput {
            depth: Some(MAX_MEASUREMENT * 2.0),
            metals: Some(MetalInputs {
                lead: Some(1e305),
                ..Default::default()
            }),
            ..valid_input()
        };
        let fields: Vec<String> = reading_issues(&input).into_iter().map(|i| i.field).collect();
        assert_eq!(fields, vec!["depth", "metals.lead"]);

        let huge = MetalInputs {
            lead: Some(1e305),
            ..Default::default()
        };
        assert_eq!(validate_concentrations(&huge).unwrap_err().field(), Some("lead"));

        let at_bound = MetalInputs {
            mercury: Some(MAX_MEASUREMENT),
            ..Default::default()
        };
        assert!(validate_concentrations(&at_bound).is_ok());
    }
}
