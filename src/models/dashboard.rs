//! Shape of the JSON document consumed by the static dashboard.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::AthleteProfile;
use crate::models::records::{
    BodyCompositionEntry, BodyFatReading, CardioSession, MuscleVolumeEntry, WeightSource, WorkoutDay,
};
use crate::utils::{round1_opt, round2, round2_opt};

/// Position of a weekly volume figure relative to its landmarks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Below,
    Ok,
    High,
    Over,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeanTrend {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternVolume {
    #[serde(serialize_with = "round2")]
    pub raw: f64,
    #[serde(serialize_with = "round2")]
    pub weighted: f64,
    pub zone: Zone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleWeekVolume {
    pub muscle: &'static str,
    #[serde(serialize_with = "round2")]
    pub raw: f64,
    #[serde(serialize_with = "round2")]
    pub weighted: f64,
    pub zone: Zone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyVolume {
    /// `YYYY-Www`, ISO week numbering.
    pub week: String,
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    pub training_days: u32,
    pub push: PatternVolume,
    pub pull: PatternVolume,
    pub upper: PatternVolume,
    pub lower: PatternVolume,
    #[serde(serialize_with = "round2_opt")]
    pub push_pull_ratio: Option<f64>,
    /// Muscles with at least one logged value that week, catalogue order.
    pub muscles: Vec<MuscleWeekVolume>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    #[serde(serialize_with = "round1_opt")]
    pub kcal: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub protein_g: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub carbs_g: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub fat_g: Option<f64>,
    pub steps: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub target_kcal: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub target_protein_g: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub target_carbs_g: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub target_fat_g: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub expenditure_kcal: Option<f64>,
    #[serde(serialize_with = "round2_opt")]
    pub trend_kg: Option<f64>,
    #[serde(serialize_with = "round2_opt")]
    pub raw_kg: Option<f64>,
    pub weight_source: WeightSource,
    pub body_comp: Option<BodyCompositionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Latest day with a known trend weight.
    pub latest: Option<BodyCompositionEntry>,
    #[serde(serialize_with = "round2_opt")]
    pub latest_raw_kg: Option<f64>,
    pub latest_raw_date: Option<NaiveDate>,
    pub latest_raw_source: Option<WeightSource>,
    #[serde(serialize_with = "round2_opt")]
    pub weight_delta_7d_kg: Option<f64>,
    #[serde(serialize_with = "round2_opt")]
    pub lean_delta_7d_kg: Option<f64>,
    pub lean_trend: Option<LeanTrend>,
    pub avg_deficit_7d_kcal: Option<i64>,
    pub avg_kcal_7d: Option<i64>,
    #[serde(serialize_with = "round1_opt")]
    pub avg_protein_7d_g: Option<f64>,
    pub latest_week: Option<String>,
    pub latest_week_training_days: Option<u32>,
    #[serde(serialize_with = "round2_opt")]
    pub latest_week_push_pull_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutProjection {
    #[serde(serialize_with = "round2_opt")]
    pub current_kg: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub lean_kg: Option<f64>,
    pub target_bf_pct: f64,
    #[serde(serialize_with = "round2_opt")]
    pub target_kg: Option<f64>,
    #[serde(serialize_with = "round2_opt")]
    pub kg_to_go: Option<f64>,
    pub goal_reached: bool,
    /// Regression slope over recent trend weights, kg/week; negative means losing.
    #[serde(serialize_with = "round2_opt")]
    pub rate_kg_per_week: Option<f64>,
    #[serde(serialize_with = "round1_opt")]
    pub weeks_remaining: Option<f64>,
    pub projected_date: Option<NaiveDate>,
    pub high_deficit_days_7d: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// UTC, `YYYY-MM-DDTHH:MM:SSZ`.
    pub generated_at: String,
    pub config: AthleteProfile,
    pub summary: Summary,
    pub cut: CutProjection,
    pub daily: Vec<DailyRow>,
    pub workouts: Vec<WorkoutDay>,
    pub muscle_sets: Vec<MuscleVolumeEntry>,
    pub muscle_volume: Vec<MuscleVolumeEntry>,
    pub weekly_volume: Vec<WeeklyVolume>,
    pub body_fat: Vec<BodyFatReading>,
    pub cardio: Vec<CardioSession>,
}
