//! Merge the two daily weight series into one observation per date.
//!
//! Policy
//! - Raw scale weight comes from the spreadsheet export when it has one for the date, otherwise
//!   from the Health Connect export.
//! - Trend weight is only ever taken from the spreadsheet export; it is never backfilled.
//! - The date axis is the union of every date seen in either source, ascending.

use chrono::NaiveDate;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::records::{DailyMetric, WeightObservation, WeightSource};

pub fn reconcile_weights(
    daily: &BTreeMap<NaiveDate, DailyMetric>,
    secondary_raw_kg: &BTreeMap<NaiveDate, f64>,
) -> Vec<WeightObservation> {
    let axis: BTreeSet<NaiveDate> = daily.keys().chain(secondary_raw_kg.keys()).copied().collect();

    let observations: Vec<WeightObservation> = axis
        .into_iter()
        .map(|date| {
            let primary = daily.get(&date);
            let primary_raw = primary.and_then(|d| d.weight_kg);
            let secondary_raw = secondary_raw_kg.get(&date).copied();

            let (raw_kg, source) = match (primary_raw, secondary_raw) {
                (Some(kg), _) => (Some(kg), WeightSource::Primary),
                (None, Some(kg)) => (Some(kg), WeightSource::Secondary),
                (None, None) => (None, WeightSource::None),
            };

            WeightObservation {
                date,
                trend_kg: primary.and_then(|d| d.trend_weight_kg),
                raw_kg,
                source,
            }
        })
        .collect();

    debug!(
        "Reconcile: {} date(s), {} from spreadsheet, {} from Health Connect",
        observations.len(),
        observations.iter().filter(|o| o.source == WeightSource::Primary).count(),
        observations.iter().filter(|o| o.source == WeightSource::Secondary).count()
    );

    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn metric(date: NaiveDate, trend: Option<f64>, raw: Option<f64>) -> (NaiveDate, DailyMetric) {
        let mut m = DailyMetric::new(date);
        m.trend_weight_kg = trend;
        m.weight_kg = raw;
        (date, m)
    }

    #[test]
    fn spreadsheet_raw_wins_on_overlap() {
        let daily = BTreeMap::from([metric(ymd(2024, 3, 1), Some(90.2), Some(90.8))]);
        let secondary = BTreeMap::from([(ymd(2024, 3, 1), 91.4)]);

        let obs = reconcile_weights(&daily, &secondary);
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].raw_kg, Some(90.8));
        assert_eq!(obs[0].trend_kg, Some(90.2));
        assert_eq!(obs[0].source, WeightSource::Primary);
    }

    #[test]
    fn secondary_only_dates_keep_secondary_value_and_no_trend() {
        let daily = BTreeMap::from([metric(ymd(2024, 3, 2), Some(90.0), None)]);
        let secondary = BTreeMap::from([(ymd(2024, 3, 1), 91.4), (ymd(2024, 3, 2), 90.6)]);

        let obs = reconcile_weights(&daily, &secondary);
        assert_eq!(obs.iter().map(|o| o.date).collect::<Vec<_>>(), vec![ymd(2024, 3, 1), ymd(2024, 3, 2)]);

        assert_eq!(obs[0].raw_kg, Some(91.4));
        assert_eq!(obs[0].trend_kg, None);
        assert_eq!(obs[0].source, WeightSource::Secondary);

        // spreadsheet row exists but without a raw reading: fall back, keep its trend
        assert_eq!(obs[1].raw_kg, Some(90.6));
        assert_eq!(obs[1].trend_kg, Some(90.0));
        assert_eq!(obs[1].source, WeightSource::Secondary);
    }

    #[test]
    fn dates_without_any_reading_are_kept_with_no_source() {
        let daily = BTreeMap::from([metric(ymd(2024, 3, 5), None, None)]);
        let obs = reconcile_weights(&daily, &BTreeMap::new());
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].raw_kg, None);
        assert_eq!(obs[0].source, WeightSource::None);
    }
}
