//! Set-quality weighting and the weekly training-volume rollup.
//!
//! Each logged set gets a quality score in [0, 1] from its set type and reps in reserve. The
//! mean score of a day's sets scales that day's per-muscle set counts into quality-weighted
//! sets, which are then summed per ISO week for every muscle and movement pattern and compared
//! against the configured volume landmarks.

use chrono::{Datelike, Days, NaiveDate};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{AthleteProfile, VolumeLandmarks};
use crate::models::dashboard::{MuscleWeekVolume, PatternVolume, WeeklyVolume, Zone};
use crate::models::muscle::{MUSCLE_COUNT, MovementPattern, Muscle, PATTERN_COUNT};
use crate::models::records::{MuscleVolumeEntry, SetKind, WorkoutDay};

/// Score used when a set has no reps-in-reserve value.
pub const UNKNOWN_RIR_SCORE: f64 = 0.75;

/// Quality score of a single set.
///
/// | set                         | score |
/// |-----------------------------|-------|
/// | drop continuation           | 0.2   |
/// | failure / initial drop      | 1.0   |
/// | RIR 0 / 1 / 2 / 3 / 4       | 1.0 / 0.9 / 0.75 / 0.5 / 0.3 |
/// | RIR >= 5 or negative        | 0.1   |
/// | RIR unknown                 | 0.75  |
pub fn quality_score(kind: SetKind, rir: Option<i64>) -> f64 {
    match kind {
        SetKind::DropContinuation => 0.2,
        SetKind::Failure | SetKind::Drop => 1.0,
        SetKind::Normal | SetKind::WarmUp => match rir {
            None => UNKNOWN_RIR_SCORE,
            Some(0) => 1.0,
            Some(1) => 0.9,
            Some(2) => 0.75,
            Some(3) => 0.5,
            Some(4) => 0.3,
            Some(_) => 0.1,
        },
    }
}

/// Mean set quality per date across every workout logged that date.
/// Dates with no sets are absent; [`multiplier_for`] treats them as 1.0.
pub fn day_multipliers(workouts: &[WorkoutDay]) -> BTreeMap<NaiveDate, f64> {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for workout in workouts {
        for set in &workout.sets {
            let entry = sums.entry(workout.date).or_insert((0.0, 0));
            entry.0 += quality_score(set.kind, set.rir);
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect()
}

pub fn multiplier_for(multipliers: &BTreeMap<NaiveDate, f64>, date: NaiveDate) -> f64 {
    multipliers.get(&date).copied().unwrap_or(1.0)
}

/// `below` < MEV <= `ok` < MAV <= `high` <= MRV < `over`.
pub fn classify_zone(value: f64, landmarks: &VolumeLandmarks) -> Zone {
    if value < landmarks.mev {
        Zone::Below
    } else if value < landmarks.effective_mav() {
        Zone::Ok
    } else if value <= landmarks.mrv {
        Zone::High
    } else {
        Zone::Over
    }
}

/// ISO week label (`2024-W09`) and the Monday that starts it.
pub fn iso_week(date: NaiveDate) -> (String, NaiveDate) {
    let week = date.iso_week();
    let start = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
    (format!("{}-W{:02}", week.year(), week.week()), start)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tally {
    raw: f64,
    weighted: f64,
}

impl Tally {
    fn add(&mut self, raw: f64, multiplier: f64) {
        self.raw += raw;
        self.weighted += raw * multiplier;
    }
}

/// Running totals for one ISO week; created zeroed on the first date seen in that week.
#[derive(Debug, Clone)]
struct WeekAccumulator {
    label: String,
    start: NaiveDate,
    training_dates: BTreeSet<NaiveDate>,
    muscles: [Tally; MUSCLE_COUNT],
    seen: [bool; MUSCLE_COUNT],
    patterns: [Tally; PATTERN_COUNT],
}

impl WeekAccumulator {
    fn new(label: String, start: NaiveDate) -> Self {
        WeekAccumulator {
            label,
            start,
            training_dates: BTreeSet::new(),
            muscles: [Tally::default(); MUSCLE_COUNT],
            seen: [false; MUSCLE_COUNT],
            patterns: [Tally::default(); PATTERN_COUNT],
        }
    }

    fn add_entry(&mut self, entry: &MuscleVolumeEntry, multiplier: f64) {
        self.training_dates.insert(entry.date);
        for (muscle, sets) in entry.muscles.iter() {
            self.muscles[muscle.index()].add(sets, multiplier);
            self.seen[muscle.index()] = true;
            // a muscle counts toward every pattern it belongs to
            for pattern in muscle.patterns() {
                self.patterns[pattern.index()].add(sets, multiplier);
            }
        }
    }

    fn finish(self, athlete: &AthleteProfile) -> WeeklyVolume {
        let pattern = |p: MovementPattern, landmarks: &VolumeLandmarks| {
            let tally = self.patterns[p.index()];
            PatternVolume {
                raw: tally.raw,
                weighted: tally.weighted,
                zone: classify_zone(tally.weighted, landmarks),
            }
        };
        let lm = &athlete.volume_landmarks;
        let push = pattern(MovementPattern::Push, &lm.push);
        let pull = pattern(MovementPattern::Pull, &lm.pull);
        let upper = pattern(MovementPattern::Upper, &lm.upper);
        let lower = pattern(MovementPattern::Lower, &lm.lower);

        let push_pull_ratio = if pull.weighted > 0.0 {
            Some(push.weighted / pull.weighted)
        } else {
            None
        };

        let muscles = Muscle::ALL
            .iter()
            .filter(|m| self.seen[m.index()])
            .map(|m| {
                let tally = self.muscles[m.index()];
                MuscleWeekVolume {
                    muscle: m.name(),
                    raw: tally.raw,
                    weighted: tally.weighted,
                    zone: classify_zone(tally.weighted, &athlete.landmarks_for_muscle(m.name())),
                }
            })
            .collect();

        WeeklyVolume {
            week: self.label,
            week_start: self.start,
            training_days: self.training_dates.len() as u32,
            push,
            pull,
            upper,
            lower,
            push_pull_ratio,
            muscles,
        }
    }
}

/// Roll per-muscle daily set counts up into ISO weeks, ascending.
pub fn aggregate_weekly(
    entries: &[MuscleVolumeEntry],
    multipliers: &BTreeMap<NaiveDate, f64>,
    athlete: &AthleteProfile,
) -> Vec<WeeklyVolume> {
    let mut weeks: BTreeMap<NaiveDate, WeekAccumulator> = BTreeMap::new();
    for entry in entries.iter().filter(|e| !e.muscles.is_empty()) {
        let (label, start) = iso_week(entry.date);
        weeks
            .entry(start)
            .or_insert_with(|| WeekAccumulator::new(label, start))
            .add_entry(entry, multiplier_for(multipliers, entry.date));
    }

    let weekly: Vec<WeeklyVolume> = weeks.into_values().map(|acc| acc.finish(athlete)).collect();
    debug!(
        "Training: {} per-muscle day(s) rolled into {} week(s)",
        entries.len(),
        weekly.len()
    );
    weekly
}
