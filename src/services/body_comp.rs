//! Body-composition estimates from trend weight and the athlete profile.
//!
//! Both estimates are always computed so the dashboard can show them side by side:
//! - waist circumference: `((-98.42 + 4.15 * waist_in - 0.082 * weight_lb) / weight_lb) * 100`
//! - BMI: `1.20 * bmi + 0.23 * age - 16.2`
//!
//! The primary body-fat figure is the manual override when one is configured, else the
//! waist estimate. The coefficients above are used as-is.

use log::debug;

use crate::config::AthleteProfile;
use crate::models::records::{BodyCompositionEntry, WeightObservation};

const LB_PER_KG: f64 = 2.20462;
const CM_PER_INCH: f64 = 2.54;

pub fn waist_body_fat_pct(trend_kg: f64, waist_cm: f64) -> f64 {
    let weight_lb = trend_kg * LB_PER_KG;
    let waist_in = waist_cm / CM_PER_INCH;
    ((-98.42 + 4.15 * waist_in - 0.082 * weight_lb) / weight_lb) * 100.0
}

pub fn bmi_body_fat_pct(trend_kg: f64, height_m: f64, age: f64) -> f64 {
    let bmi = trend_kg / (height_m * height_m);
    1.20 * bmi + 0.23 * age - 16.2
}

/// Estimate for one day. `None` when the day has no trend weight.
pub fn estimate(observation: &WeightObservation, athlete: &AthleteProfile) -> Option<BodyCompositionEntry> {
    let trend_kg = observation.trend_kg?;
    let height_m = athlete.height_m();

    let bf_waist_pct = waist_body_fat_pct(trend_kg, athlete.waist_cm);
    let bf_bmi_pct = bmi_body_fat_pct(trend_kg, height_m, athlete.age);
    let bf_pct = athlete.manual_body_fat_pct.unwrap_or(bf_waist_pct);
    let lean_kg = trend_kg * (1.0 - bf_pct / 100.0);

    Some(BodyCompositionEntry {
        date: observation.date,
        trend_kg,
        bf_waist_pct,
        bf_bmi_pct,
        bf_avg_pct: (bf_waist_pct + bf_bmi_pct) / 2.0,
        bf_pct,
        lean_kg,
        ffmi: lean_kg / (height_m * height_m),
    })
}

/// Estimates for every observation with a trend weight, preserving date order.
pub fn estimate_series(observations: &[WeightObservation], athlete: &AthleteProfile) -> Vec<BodyCompositionEntry> {
    let entries: Vec<_> = observations.iter().filter_map(|o| estimate(o, athlete)).collect();
    debug!(
        "Body comp: {} of {} day(s) have a trend weight",
        entries.len(),
        observations.len()
    );
    entries
}
