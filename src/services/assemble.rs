//! Final document composition. Everything here is ordering and joining; the numbers come from the
//! reconcile, body composition, training and trend services.

use chrono::NaiveDate;
use log::info;
use std::collections::BTreeMap;

use crate::config::AthleteProfile;
use crate::models::dashboard::{Dashboard, DailyRow};
use crate::models::records::{BodyCompositionEntry, DailyMetric, MuscleVolumeEntry, WeightObservation};
use crate::services::{body_comp, reconcile, training, trends};
use crate::sources::health_connect::HealthConnectData;
use crate::sources::spreadsheet::SpreadsheetData;

fn daily_rows(
    observations: &[WeightObservation],
    daily: &BTreeMap<NaiveDate, DailyMetric>,
    body_comp: &[BodyCompositionEntry],
) -> Vec<DailyRow> {
    let by_date: BTreeMap<NaiveDate, &BodyCompositionEntry> = body_comp.iter().map(|e| (e.date, e)).collect();

    observations
        .iter()
        .map(|obs| {
            let metric = daily.get(&obs.date);
            DailyRow {
                date: obs.date,
                kcal: metric.and_then(|m| m.calories_kcal),
                protein_g: metric.and_then(|m| m.protein_g),
                carbs_g: metric.and_then(|m| m.carbs_g),
                fat_g: metric.and_then(|m| m.fat_g),
                steps: metric.and_then(|m| m.steps),
                target_kcal: metric.and_then(|m| m.target_calories_kcal),
                target_protein_g: metric.and_then(|m| m.target_protein_g),
                target_carbs_g: metric.and_then(|m| m.target_carbs_g),
                target_fat_g: metric.and_then(|m| m.target_fat_g),
                expenditure_kcal: metric.and_then(|m| m.expenditure_kcal),
                trend_kg: obs.trend_kg,
                raw_kg: obs.raw_kg,
                weight_source: obs.source,
                body_comp: by_date.get(&obs.date).map(|e| (*e).clone()),
            }
        })
        .collect()
}

fn ascending(series: &BTreeMap<NaiveDate, MuscleVolumeEntry>) -> Vec<MuscleVolumeEntry> {
    series.values().cloned().collect()
}

/// Run the derived-metrics pipeline over both sources and compose the dashboard document.
pub fn build_dashboard(
    health: &HealthConnectData,
    sheets: &SpreadsheetData,
    athlete: &AthleteProfile,
    today: NaiveDate,
    generated_at: String,
) -> Dashboard {
    let observations = reconcile::reconcile_weights(&sheets.daily, &health.weight_kg);
    let body_comp = body_comp::estimate_series(&observations, athlete);

    let mut workouts = sheets.workouts.clone();
    workouts.sort_by_key(|w| w.date);
    let multipliers = training::day_multipliers(&workouts);

    let muscle_sets = ascending(&sheets.muscle_sets);
    let weekly_volume = training::aggregate_weekly(&muscle_sets, &multipliers, athlete);

    let summary = trends::summary(&body_comp, &observations, &sheets.daily, &weekly_volume, today);
    let cut = trends::cut_projection(&body_comp, &sheets.daily, athlete, today);

    let mut body_fat = health.body_fat.clone();
    body_fat.sort_by_key(|r| r.date);
    let mut cardio = health.cardio.clone();
    cardio.sort_by(|a, b| a.datetime.cmp(&b.datetime));

    let daily = daily_rows(&observations, &sheets.daily, &body_comp);
    info!(
        "Dashboard: {} day(s), {} body comp entr(ies), {} week(s), {} workout(s), {} cardio session(s)",
        daily.len(),
        body_comp.len(),
        weekly_volume.len(),
        workouts.len(),
        cardio.len()
    );

    Dashboard {
        generated_at,
        config: athlete.clone(),
        summary,
        cut,
        daily,
        workouts,
        muscle_sets,
        muscle_volume: ascending(&sheets.muscle_volume),
        weekly_volume,
        body_fat,
        cardio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::muscle::{Muscle, MuscleValues};
    use crate::models::records::{BodyFatReading, WeightSource};
    use chrono::Days;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn chest_entry(date: NaiveDate, sets: f64) -> MuscleVolumeEntry {
        let mut muscles = MuscleValues::default();
        muscles.set(Muscle::Chest, Some(sets));
        MuscleVolumeEntry { date, muscles }
    }

    fn fixture() -> (HealthConnectData, SpreadsheetData) {
        let mut health = HealthConnectData::default();
        health.weight_kg.insert(ymd(2024, 3, 1), 91.3);
        health.weight_kg.insert(ymd(2024, 3, 2), 90.9);
        health.body_fat.push(BodyFatReading {
            date: ymd(2024, 3, 2),
            pct: 21.4,
        });
        health.body_fat.push(BodyFatReading {
            date: ymd(2024, 2, 20),
            pct: 22.0,
        });

        let mut sheets = SpreadsheetData::default();
        let mut day = DailyMetric::new(ymd(2024, 3, 1));
        day.weight_kg = Some(90.4);
        day.trend_weight_kg = Some(90.2);
        day.calories_kcal = Some(2100.0);
        day.expenditure_kcal = Some(2800.0);
        sheets.daily.insert(day.date, day);

        // Monday 2024-03-04 through Friday 2024-03-08.
        for offset in 0..5 {
            let date = ymd(2024, 3, 4) + Days::new(offset);
            sheets.muscle_sets.insert(date, chest_entry(date, 2.0));
        }
        (health, sheets)
    }

    #[test]
    fn primary_source_wins_overlapping_raw_weight() {
        let (health, sheets) = fixture();
        let dashboard = build_dashboard(
            &health,
            &sheets,
            &AthleteProfile::default(),
            ymd(2024, 3, 8),
            "2024-03-08T06:00:00Z".into(),
        );

        let march_first = dashboard
            .daily
            .iter()
            .find(|row| row.date == ymd(2024, 3, 1))
            .expect("row for 2024-03-01");
        assert_eq!(march_first.raw_kg, Some(90.4));
        assert_eq!(march_first.weight_source, WeightSource::Primary);
        assert_eq!(march_first.trend_kg, Some(90.2));
        assert!(march_first.body_comp.is_some());

        let march_second = dashboard
            .daily
            .iter()
            .find(|row| row.date == ymd(2024, 3, 2))
            .expect("row for 2024-03-02");
        assert_eq!(march_second.raw_kg, Some(90.9));
        assert_eq!(march_second.weight_source, WeightSource::Secondary);
        assert_eq!(march_second.trend_kg, None);
        assert!(march_second.body_comp.is_none());
    }

    #[test]
    fn five_training_days_of_chest_reach_push_volume() {
        let (health, sheets) = fixture();
        let dashboard = build_dashboard(
            &health,
            &sheets,
            &AthleteProfile::default(),
            ymd(2024, 3, 8),
            "2024-03-08T06:00:00Z".into(),
        );

        let week = dashboard
            .weekly_volume
            .iter()
            .find(|w| w.week == "2024-W10")
            .expect("week 10");
        assert_eq!(week.training_days, 5);
        assert!(week.push.raw >= 10.0);
        assert!(week.upper.raw >= 10.0);
        assert_eq!(week.pull.raw, 0.0);
    }

    #[test]
    fn series_are_date_ascending() {
        let (health, sheets) = fixture();
        let dashboard = build_dashboard(
            &health,
            &sheets,
            &AthleteProfile::default(),
            ymd(2024, 3, 8),
            "2024-03-08T06:00:00Z".into(),
        );

        assert!(dashboard.daily.windows(2).all(|w| w[0].date < w[1].date));
        assert!(dashboard.muscle_sets.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(dashboard.body_fat[0].date, ymd(2024, 2, 20));
    }

    #[test]
    fn rebuilding_from_same_inputs_is_byte_identical() {
        let (health, sheets) = fixture();
        let athlete = AthleteProfile::default();
        let render = || {
            let dashboard = build_dashboard(&health, &sheets, &athlete, ymd(2024, 3, 8), "2024-03-08T06:00:00Z".into());
            serde_json::to_vec_pretty(&dashboard).expect("serialize")
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn document_carries_every_top_level_section() {
        let (health, sheets) = fixture();
        let dashboard = build_dashboard(
            &health,
            &sheets,
            &AthleteProfile::default(),
            ymd(2024, 3, 8),
            "2024-03-08T06:00:00Z".into(),
        );
        let json = serde_json::to_value(&dashboard).expect("serialize");
        for key in [
            "generated_at",
            "config",
            "summary",
            "cut",
            "daily",
            "workouts",
            "muscle_sets",
            "muscle_volume",
            "weekly_volume",
            "body_fat",
            "cardio",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["generated_at"], "2024-03-08T06:00:00Z");
    }
}
