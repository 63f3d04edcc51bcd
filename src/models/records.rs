//! Normalized in-memory records produced by the two source adapters and the derivation stages.
//!
//! Notes
//! - Every record is keyed by a local calendar date (`NaiveDate`), serialized as `YYYY-MM-DD`.
//! - Masses are kilograms, energy is kcal.
//! - Floating point values keep full precision; rounding happens in the `serialize_with` hooks.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::muscle::MuscleValues;
use crate::utils::{round1, round1_opt, round2, round2_opt};

// =====================
// Spreadsheet facets
// =====================

/// One row of the daily summary sheet. Every scalar is optional; blank or non-numeric cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub calories_kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub steps: Option<f64>,
    pub target_calories_kcal: Option<f64>,
    pub target_protein_g: Option<f64>,
    pub target_fat_g: Option<f64>,
    pub target_carbs_g: Option<f64>,
    pub expenditure_kcal: Option<f64>,
    pub trend_weight_kg: Option<f64>,
    pub weight_kg: Option<f64>,
}

impl DailyMetric {
    pub fn new(date: NaiveDate) -> Self {
        DailyMetric {
            date,
            calories_kcal: None,
            protein_g: None,
            fat_g: None,
            carbs_g: None,
            steps: None,
            target_calories_kcal: None,
            target_protein_g: None,
            target_fat_g: None,
            target_carbs_g: None,
            expenditure_kcal: None,
            trend_weight_kg: None,
            weight_kg: None,
        }
    }

    /// Expenditure minus intake, when both were logged.
    pub fn deficit_kcal(&self) -> Option<f64> {
        match (self.expenditure_kcal, self.calories_kcal) {
            (Some(out), Some(intake)) => Some(out - intake),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetKind {
    Normal,
    Failure,
    Drop,
    DropContinuation,
    WarmUp,
}

impl SetKind {
    /// Map the export's free-text set type. Unknown labels are treated as normal working sets.
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "failure" => SetKind::Failure,
            "drop" => SetKind::Drop,
            "drop continuation" | "dropset" | "drop set continuation" => SetKind::DropContinuation,
            "warm up" | "warmup" => SetKind::WarmUp,
            _ => SetKind::Normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSet {
    /// Exercise name with any superset suffix removed.
    pub exercise: String,
    pub kind: SetKind,
    pub weight_kg: Option<f64>,
    pub reps: Option<f64>,
    /// Reps in reserve, if logged.
    pub rir: Option<i64>,
}

/// A logged workout. Sets keep file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutDay {
    pub date: NaiveDate,
    pub name: String,
    #[serde(serialize_with = "round1_opt")]
    pub duration_min: Option<f64>,
    pub sets: Vec<TrainingSet>,
}

/// One row of a `Muscle Groups - *` sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleVolumeEntry {
    pub date: NaiveDate,
    pub muscles: MuscleValues,
}

// =====================
// Relational facets
// =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyFatReading {
    pub date: NaiveDate,
    #[serde(serialize_with = "round2")]
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseSegment {
    pub type_id: Option<i32>,
    pub reps: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "round2_opt")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardioSession {
    pub date: NaiveDate,
    /// Local wall-clock start, `YYYY-MM-DDTHH:MM:SS`.
    pub datetime: String,
    pub title: String,
    pub duration_min: i64,
    pub exercise_type: i32,
    pub segments: Vec<ExerciseSegment>,
}

// =====================
// Derived
// =====================

/// Which source supplied a reconciled raw scale reading.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum WeightSource {
    #[serde(rename = "primary-source")]
    Primary,
    #[serde(rename = "secondary-source")]
    Secondary,
    #[serde(rename = "none")]
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightObservation {
    pub date: NaiveDate,
    /// Smoothed mass; only ever taken from the spreadsheet export.
    pub trend_kg: Option<f64>,
    pub raw_kg: Option<f64>,
    pub source: WeightSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyCompositionEntry {
    pub date: NaiveDate,
    #[serde(serialize_with = "round2")]
    pub trend_kg: f64,
    /// Circumference-based estimate.
    #[serde(serialize_with = "round1")]
    pub bf_waist_pct: f64,
    /// BMI-based estimate.
    #[serde(serialize_with = "round1")]
    pub bf_bmi_pct: f64,
    /// Mean of the two estimates; display only.
    #[serde(serialize_with = "round1")]
    pub bf_avg_pct: f64,
    /// Value used for lean mass: manual override if configured, else the circumference estimate.
    #[serde(serialize_with = "round1")]
    pub bf_pct: f64,
    #[serde(serialize_with = "round1")]
    pub lean_kg: f64,
    #[serde(serialize_with = "round2")]
    pub ffmi: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_kind_labels() {
        assert_eq!(SetKind::parse("Failure"), SetKind::Failure);
        assert_eq!(SetKind::parse(" DROP "), SetKind::Drop);
        assert_eq!(SetKind::parse("Drop-Continuation"), SetKind::DropContinuation);
        assert_eq!(SetKind::parse("drop_continuation"), SetKind::DropContinuation);
        assert_eq!(SetKind::parse("Warm-up"), SetKind::WarmUp);
        assert_eq!(SetKind::parse("Working"), SetKind::Normal);
        assert_eq!(SetKind::parse(""), SetKind::Normal);
    }

    #[test]
    fn deficit_requires_both_sides() {
        let mut day = DailyMetric::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        day.expenditure_kcal = Some(2800.0);
        assert_eq!(day.deficit_kcal(), None);
        day.calories_kcal = Some(2000.0);
        assert_eq!(day.deficit_kcal(), Some(800.0));
    }

    #[test]
    fn rounding_happens_on_emission() {
        let entry = BodyCompositionEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            trend_kg: 100.004,
            bf_waist_pct: 13.857,
            bf_bmi_pct: 27.737,
            bf_avg_pct: 20.797,
            bf_pct: 13.857,
            lean_kg: 86.143,
            ffmi: 26.5873,
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["trend_kg"], 100.0);
        assert_eq!(json["bf_waist_pct"], 13.9);
        assert_eq!(json["lean_kg"], 86.1);
        assert_eq!(json["ffmi"], 26.59);
        assert_eq!(entry.lean_kg, 86.143);
    }

    #[test]
    fn weight_source_tags() {
        assert_eq!(serde_json::to_value(WeightSource::Primary).unwrap(), "primary-source");
        assert_eq!(serde_json::to_value(WeightSource::Secondary).unwrap(), "secondary-source");
        assert_eq!(serde_json::to_value(WeightSource::None).unwrap(), "none");
    }
}
