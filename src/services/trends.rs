//! Rolling deltas, intake/deficit windows and the cut projection.
//!
//! Two kinds of windows are used:
//! - entry windows over body-composition entries (days with a trend weight, date order), and
//! - calendar windows `[today - 7, today]` over the daily nutrition rows.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

use crate::config::AthleteProfile;
use crate::models::dashboard::{CutProjection, LeanTrend, Summary, WeeklyVolume};
use crate::models::records::{BodyCompositionEntry, DailyMetric, WeightObservation};

/// Entries needed for 7-day deltas and for a regression rate.
pub const MIN_TREND_ENTRIES: usize = 7;
/// Regression looks at no more than this many recent entries.
pub const RATE_WINDOW_ENTRIES: usize = 30;
/// Weekly loss below this is too flat to project a finish date from.
pub const MIN_PROJECTION_RATE_KG_PER_WEEK: f64 = 0.05;
pub const LEAN_TREND_THRESHOLD_KG: f64 = 0.3;
pub const HIGH_DEFICIT_KCAL: f64 = 800.0;
/// Averages cover [today-7, today].
const AVERAGE_WINDOW_DAYS_BACK: u64 = 7;
/// The high-deficit count covers the trailing 7 days, today included.
const HIGH_DEFICIT_WINDOW_DAYS_BACK: u64 = 6;

/// Latest value minus the 7th most recent one.
pub fn seven_day_delta(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_TREND_ENTRIES {
        return None;
    }
    let latest = values[values.len() - 1];
    let base = values[values.len() - MIN_TREND_ENTRIES];
    Some(latest - base)
}

pub fn lean_trend(lean_delta_kg: f64) -> LeanTrend {
    if lean_delta_kg > LEAN_TREND_THRESHOLD_KG {
        LeanTrend::Up
    } else if lean_delta_kg < -LEAN_TREND_THRESHOLD_KG {
        LeanTrend::Down
    } else {
        LeanTrend::Flat
    }
}

/// Ordinary least-squares slope of `values` against their 0-based index.
pub fn ols_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = values.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    if sxx == 0.0 { None } else { Some(sxy / sxx) }
}

/// Trend-weight change in kg/week from the last [`RATE_WINDOW_ENTRIES`] entries.
pub fn weekly_rate_kg(entries: &[BodyCompositionEntry]) -> Option<f64> {
    if entries.len() < MIN_TREND_ENTRIES {
        return None;
    }
    let window = &entries[entries.len().saturating_sub(RATE_WINDOW_ENTRIES)..];
    let weights: Vec<f64> = window.iter().map(|e| e.trend_kg).collect();
    ols_slope(&weights).map(|per_day| per_day * 7.0)
}

fn calendar_window(
    daily: &BTreeMap<NaiveDate, DailyMetric>,
    today: NaiveDate,
    days_back: u64,
) -> impl Iterator<Item = &DailyMetric> + '_ {
    let from = today.checked_sub_days(Days::new(days_back)).unwrap_or(NaiveDate::MIN);
    daily.range(from..=today).map(|(_, m)| m)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { None } else { Some(sum / count as f64) }
}

/// Mean of expenditure minus intake over the calendar window, whole kcal.
pub fn average_deficit_kcal(daily: &BTreeMap<NaiveDate, DailyMetric>, today: NaiveDate) -> Option<i64> {
    mean(calendar_window(daily, today, AVERAGE_WINDOW_DAYS_BACK).filter_map(DailyMetric::deficit_kcal)).map(|v| v.round() as i64)
}

/// Days among the trailing seven (today included) whose deficit exceeds [`HIGH_DEFICIT_KCAL`].
pub fn high_deficit_days(daily: &BTreeMap<NaiveDate, DailyMetric>, today: NaiveDate) -> u32 {
    calendar_window(daily, today, HIGH_DEFICIT_WINDOW_DAYS_BACK)
        .filter_map(DailyMetric::deficit_kcal)
        .filter(|deficit| *deficit > HIGH_DEFICIT_KCAL)
        .count() as u32
}

pub fn cut_projection(
    entries: &[BodyCompositionEntry],
    daily: &BTreeMap<NaiveDate, DailyMetric>,
    athlete: &AthleteProfile,
    today: NaiveDate,
) -> CutProjection {
    let latest = entries.last();
    let target_fraction = 1.0 - athlete.target_body_fat_pct / 100.0;
    let target_kg = latest
        .filter(|_| target_fraction > 0.0)
        .map(|e| e.lean_kg / target_fraction);
    let kg_to_go = match (latest, target_kg) {
        (Some(e), Some(target)) => Some(e.trend_kg - target),
        _ => None,
    };
    let goal_reached = kg_to_go.is_some_and(|kg| kg <= 0.0);
    let rate_kg_per_week = weekly_rate_kg(entries);

    let days_remaining = match (kg_to_go, rate_kg_per_week) {
        (Some(remaining), Some(rate)) if remaining > 0.0 && rate <= -MIN_PROJECTION_RATE_KG_PER_WEEK => {
            Some(remaining / (rate / 7.0).abs())
        }
        _ => None,
    };
    let projected_date = days_remaining.and_then(|days| today.checked_add_days(Days::new(days.round() as u64)));

    CutProjection {
        current_kg: latest.map(|e| e.trend_kg),
        lean_kg: latest.map(|e| e.lean_kg),
        target_bf_pct: athlete.target_body_fat_pct,
        target_kg,
        kg_to_go,
        goal_reached,
        rate_kg_per_week,
        weeks_remaining: days_remaining.map(|d| d / 7.0),
        projected_date,
        high_deficit_days_7d: high_deficit_days(daily, today),
    }
}

pub fn summary(
    entries: &[BodyCompositionEntry],
    observations: &[WeightObservation],
    daily: &BTreeMap<NaiveDate, DailyMetric>,
    weekly: &[WeeklyVolume],
    today: NaiveDate,
) -> Summary {
    let trend: Vec<f64> = entries.iter().map(|e| e.trend_kg).collect();
    let lean: Vec<f64> = entries.iter().map(|e| e.lean_kg).collect();
    let lean_delta_7d_kg = seven_day_delta(&lean);
    let latest_raw = observations.iter().rev().find(|o| o.raw_kg.is_some());
    let latest_week = weekly.last();

    Summary {
        latest: entries.last().cloned(),
        latest_raw_kg: latest_raw.and_then(|o| o.raw_kg),
        latest_raw_date: latest_raw.map(|o| o.date),
        latest_raw_source: latest_raw.map(|o| o.source),
        weight_delta_7d_kg: seven_day_delta(&trend),
        lean_delta_7d_kg,
        lean_trend: lean_delta_7d_kg.map(lean_trend),
        avg_deficit_7d_kcal: average_deficit_kcal(daily, today),
        avg_kcal_7d: mean(calendar_window(daily, today, AVERAGE_WINDOW_DAYS_BACK).filter_map(|m| m.calories_kcal)).map(|v| v.round() as i64),
        avg_protein_7d_g: mean(calendar_window(daily, today, AVERAGE_WINDOW_DAYS_BACK).filter_map(|m| m.protein_g)),
        latest_week: latest_week.map(|w| w.week.clone()),
        latest_week_training_days: latest_week.map(|w| w.training_days),
        latest_week_push_pull_ratio: latest_week.and_then(|w| w.push_pull_ratio),
    }
}
