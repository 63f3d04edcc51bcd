//! Reader for the MacroFactor xlsx exports (the primary source).
//!
//! Each workbook may hold up to four sheets. A missing sheet or column is not an error: that facet
//! or field is simply absent. Columns are located by header text once per sheet through a
//! [`SheetSchema`], which yields a [`ColumnMap`] used to pull typed values out of each row.
//!
//! Several exports can be loaded at once; they are applied in file-name order and a later file
//! replaces an earlier one for every date it contains.

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::models::muscle::{Muscle, MuscleValues};
use crate::models::records::{DailyMetric, MuscleVolumeEntry, SetKind, TrainingSet, WorkoutDay};
use crate::services::normalize::{date_from_text, strip_superset_suffix};

pub const DAILY_SHEET: &str = "Quick Export";
pub const MUSCLE_SETS_SHEET: &str = "Muscle Groups - Sets";
pub const MUSCLE_VOLUME_SHEET: &str = "Muscle Groups - Volume";
pub const WORKOUT_LOG_SHEET: &str = "Workout Log";

/// How many leading rows are searched for the header row.
const HEADER_SCAN_ROWS: usize = 5;

#[derive(Debug)]
pub enum WorkbookError {
    Open { path: PathBuf, source: calamine::Error },
    Sheet { sheet: &'static str, source: calamine::Error },
}

impl core::fmt::Display for WorkbookError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WorkbookError::Open { path, source } => write!(f, "cannot open {}: {}", path.display(), source),
            WorkbookError::Sheet { sheet, source } => write!(f, "cannot read sheet '{}': {}", sheet, source),
        }
    }
}

impl std::error::Error for WorkbookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkbookError::Open { source, .. } | WorkbookError::Sheet { source, .. } => Some(source),
        }
    }
}

/// Everything the pipeline takes from the spreadsheet exports, keyed by local date.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetData {
    pub daily: BTreeMap<NaiveDate, DailyMetric>,
    pub muscle_sets: BTreeMap<NaiveDate, MuscleVolumeEntry>,
    pub muscle_volume: BTreeMap<NaiveDate, MuscleVolumeEntry>,
    /// Date ascending; workouts on the same date keep file order.
    pub workouts: Vec<WorkoutDay>,
}

impl SpreadsheetData {
    /// Apply a newer export on top of this one. Dates present in `newer` replace ours, facet by facet.
    pub fn merge(&mut self, newer: SpreadsheetData) {
        self.daily.extend(newer.daily);
        self.muscle_sets.extend(newer.muscle_sets);
        self.muscle_volume.extend(newer.muscle_volume);

        let replaced: BTreeSet<NaiveDate> = newer.workouts.iter().map(|w| w.date).collect();
        self.workouts.retain(|w| !replaced.contains(&w.date));
        self.workouts.extend(newer.workouts);
        self.workouts.sort_by_key(|w| w.date);
    }
}

// =====================
// Sheet schemas
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Calories,
    Protein,
    Fat,
    Carbs,
    Steps,
    TargetCalories,
    TargetProtein,
    TargetFat,
    TargetCarbs,
    Expenditure,
    TrendWeight,
    Weight,
    Workout,
    Duration,
    Exercise,
    SetType,
    SetWeight,
    Reps,
    Rir,
    Muscle(Muscle),
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub field: Field,
    /// Accepted header texts, compared case-insensitively after trimming.
    pub headers: Vec<&'static str>,
    /// Column index used when the sheet has no recognizable header row.
    pub fallback: Option<usize>,
}

impl ColumnSpec {
    fn new(field: Field, headers: &[&'static str]) -> Self {
        ColumnSpec {
            field,
            headers: headers.to_vec(),
            fallback: None,
        }
    }

    fn at(mut self, index: usize) -> Self {
        self.fallback = Some(index);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SheetSchema {
    pub sheet: &'static str,
    /// Header text that identifies the header row.
    pub key_header: &'static str,
    pub columns: Vec<ColumnSpec>,
}

pub fn daily_schema() -> SheetSchema {
    SheetSchema {
        sheet: DAILY_SHEET,
        key_header: "Date",
        columns: vec![
            ColumnSpec::new(Field::Date, &["Date"]),
            ColumnSpec::new(Field::Calories, &["Calories (kcal)", "Calories"]),
            ColumnSpec::new(Field::Protein, &["Protein (g)", "Protein"]),
            ColumnSpec::new(Field::Fat, &["Fat (g)", "Fat"]),
            ColumnSpec::new(Field::Carbs, &["Carbs (g)", "Carbs"]),
            ColumnSpec::new(Field::Steps, &["Steps"]),
            ColumnSpec::new(Field::TargetCalories, &["Target Calories (kcal)", "Target Calories"]),
            ColumnSpec::new(Field::TargetProtein, &["Target Protein (g)", "Target Protein"]),
            ColumnSpec::new(Field::TargetFat, &["Target Fat (g)", "Target Fat"]),
            ColumnSpec::new(Field::TargetCarbs, &["Target Carbs (g)", "Target Carbs"]),
            ColumnSpec::new(Field::Expenditure, &["Expenditure", "Expenditure (kcal)"]),
            ColumnSpec::new(Field::TrendWeight, &["Trend Weight (kg)", "Trend Weight"]),
            ColumnSpec::new(Field::Weight, &["Weight (kg)", "Scale Weight (kg)", "Weight"]),
        ],
    }
}

pub fn muscle_schema(sheet: &'static str) -> SheetSchema {
    let mut columns = vec![ColumnSpec::new(Field::Date, &["Date"])];
    columns.extend(
        Muscle::ALL
            .iter()
            .map(|m| ColumnSpec::new(Field::Muscle(*m), &[m.name()])),
    );
    SheetSchema {
        sheet,
        key_header: "Date",
        columns,
    }
}

pub fn workout_log_schema() -> SheetSchema {
    SheetSchema {
        sheet: WORKOUT_LOG_SHEET,
        key_header: "Exercise",
        columns: vec![
            ColumnSpec::new(Field::Date, &["Date"]).at(0),
            ColumnSpec::new(Field::Workout, &["Workout", "Workout Name"]).at(1),
            ColumnSpec::new(Field::Duration, &["Duration", "Duration (min)"]).at(2),
            ColumnSpec::new(Field::Exercise, &["Exercise"]).at(3),
            ColumnSpec::new(Field::SetType, &["Set Type", "Type"]).at(4),
            ColumnSpec::new(Field::SetWeight, &["Weight (kg)", "Weight"]).at(5),
            ColumnSpec::new(Field::Reps, &["Reps"]).at(6),
            ColumnSpec::new(Field::Rir, &["RIR", "Reps In Reserve"]).at(7),
        ],
    }
}

// =====================
// Column accessor
// =====================

/// Field → column index for one sheet. Fields with no column read as `None`.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    index: HashMap<Field, usize>,
}

fn header_matches(cell: &Data, header: &str) -> bool {
    matches!(cell, Data::String(s) if s.trim().eq_ignore_ascii_case(header))
}

impl ColumnMap {
    fn from_header(row: &[Data], schema: &SheetSchema) -> Self {
        let mut index = HashMap::new();
        for spec in &schema.columns {
            if let Some(pos) = row
                .iter()
                .position(|cell| spec.headers.iter().any(|h| header_matches(cell, h)))
            {
                index.insert(spec.field, pos);
            }
        }
        ColumnMap { index }
    }

    fn from_fallbacks(schema: &SheetSchema) -> Self {
        let index = schema
            .columns
            .iter()
            .filter_map(|spec| spec.fallback.map(|pos| (spec.field, pos)))
            .collect();
        ColumnMap { index }
    }

    /// Bind a sheet: returns the accessor and the index of the first data row.
    pub fn bind(rows: &[&[Data]], schema: &SheetSchema) -> (Self, usize) {
        let header_row = rows
            .iter()
            .take(HEADER_SCAN_ROWS)
            .position(|row| row.iter().any(|cell| header_matches(cell, schema.key_header)));

        match header_row {
            Some(i) => {
                let map = Self::from_header(rows[i], schema);
                let missing: Vec<_> = schema
                    .columns
                    .iter()
                    .filter(|spec| !map.index.contains_key(&spec.field))
                    .map(|spec| spec.headers[0])
                    .collect();
                if !missing.is_empty() {
                    debug!("Sheet '{}': no column for {}", schema.sheet, missing.join(", "));
                }
                (map, i + 1)
            }
            None => {
                let map = Self::from_fallbacks(schema);
                if map.index.is_empty() {
                    warn!("Sheet '{}': header row not found; sheet ignored", schema.sheet);
                } else {
                    debug!("Sheet '{}': header row not found; using default column positions", schema.sheet);
                }
                (map, 0)
            }
        }
    }

    fn cell<'a>(&self, row: &'a [Data], field: Field) -> Option<&'a Data> {
        self.index.get(&field).and_then(|i| row.get(*i))
    }

    pub fn number(&self, row: &[Data], field: Field) -> Option<f64> {
        self.cell(row, field).and_then(cell_number)
    }

    pub fn text(&self, row: &[Data], field: Field) -> Option<String> {
        self.cell(row, field).and_then(cell_text)
    }

    pub fn date(&self, row: &[Data], field: Field) -> Option<NaiveDate> {
        self.cell(row, field).and_then(cell_date)
    }

    pub fn minutes(&self, row: &[Data], field: Field) -> Option<f64> {
        self.cell(row, field).and_then(cell_minutes)
    }
}

// =====================
// Cell coercion (never fails: unusable cells are `None`)
// =====================

fn cell_number(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) | Data::DateTimeIso(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) | Data::String(s) => date_from_text(s),
        _ => None,
    }
}

/// Minutes from a plain number, an `h:mm[:ss]` string, or an Excel time value (fraction of a day).
fn cell_minutes(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(_) | Data::Int(_) => cell_number(cell),
        Data::DateTime(dt) => Some(dt.as_f64() * 24.0 * 60.0),
        Data::String(s) => {
            let s = s.trim();
            if !s.contains(':') {
                return s.parse::<f64>().ok().filter(|v| v.is_finite());
            }
            let parts: Vec<f64> = s
                .split(':')
                .map(|p| p.trim().parse::<f64>().ok())
                .collect::<Option<_>>()?;
            match parts.as_slice() {
                [h, m] => Some(h * 60.0 + m),
                [h, m, sec] => Some(h * 60.0 + m + sec / 60.0),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Reps in reserve; tolerates a trailing `+` (`"5+"`).
fn cell_rir(map: &ColumnMap, row: &[Data]) -> Option<i64> {
    let value = match map.cell(row, Field::Rir)? {
        Data::String(s) => s.trim().trim_end_matches('+').parse::<f64>().ok(),
        other => cell_number(other),
    }?;
    value.is_finite().then(|| value.round() as i64)
}

// =====================
// Sheet parsers
// =====================

pub fn parse_daily(rows: &[&[Data]]) -> BTreeMap<NaiveDate, DailyMetric> {
    let schema = daily_schema();
    let (map, first) = ColumnMap::bind(rows, &schema);

    let mut daily = BTreeMap::new();
    for row in rows.iter().skip(first) {
        let Some(date) = map.date(row, Field::Date) else {
            continue;
        };
        let mut metric = DailyMetric::new(date);
        metric.calories_kcal = map.number(row, Field::Calories);
        metric.protein_g = map.number(row, Field::Protein);
        metric.fat_g = map.number(row, Field::Fat);
        metric.carbs_g = map.number(row, Field::Carbs);
        metric.steps = map.number(row, Field::Steps);
        metric.target_calories_kcal = map.number(row, Field::TargetCalories);
        metric.target_protein_g = map.number(row, Field::TargetProtein);
        metric.target_fat_g = map.number(row, Field::TargetFat);
        metric.target_carbs_g = map.number(row, Field::TargetCarbs);
        metric.expenditure_kcal = map.number(row, Field::Expenditure);
        metric.trend_weight_kg = map.number(row, Field::TrendWeight);
        metric.weight_kg = map.number(row, Field::Weight);
        daily.insert(date, metric);
    }
    daily
}

pub fn parse_muscles(rows: &[&[Data]], sheet: &'static str) -> BTreeMap<NaiveDate, MuscleVolumeEntry> {
    let schema = muscle_schema(sheet);
    let (map, first) = ColumnMap::bind(rows, &schema);

    let mut entries = BTreeMap::new();
    for row in rows.iter().skip(first) {
        let Some(date) = map.date(row, Field::Date) else {
            continue;
        };
        let mut muscles = MuscleValues::default();
        for muscle in Muscle::ALL {
            muscles.set(muscle, map.number(row, Field::Muscle(muscle)));
        }
        entries.insert(date, MuscleVolumeEntry { date, muscles });
    }
    entries
}

/// Group set rows into workouts by (date, workout name), keeping file order for both workouts and sets.
pub fn parse_workout_log(rows: &[&[Data]]) -> Vec<WorkoutDay> {
    let schema = workout_log_schema();
    let (map, first) = ColumnMap::bind(rows, &schema);

    let mut workouts: Vec<WorkoutDay> = Vec::new();
    let mut by_key: HashMap<(NaiveDate, String), usize> = HashMap::new();

    for row in rows.iter().skip(first) {
        let Some(date) = map.date(row, Field::Date) else {
            continue;
        };
        let Some(exercise) = map.text(row, Field::Exercise) else {
            continue;
        };
        let name = map.text(row, Field::Workout).unwrap_or_default();
        let duration = map.minutes(row, Field::Duration);

        let idx = *by_key.entry((date, name.clone())).or_insert_with(|| {
            workouts.push(WorkoutDay {
                date,
                name,
                duration_min: None,
                sets: Vec::new(),
            });
            workouts.len() - 1
        });
        let workout = &mut workouts[idx];
        if workout.duration_min.is_none() {
            workout.duration_min = duration;
        }
        workout.sets.push(TrainingSet {
            exercise: strip_superset_suffix(&exercise).to_string(),
            kind: map
                .text(row, Field::SetType)
                .map(|t| SetKind::parse(&t))
                .unwrap_or(SetKind::Normal),
            weight_kg: map.number(row, Field::SetWeight),
            reps: map.number(row, Field::Reps),
            rir: cell_rir(&map, row),
        });
    }

    workouts.sort_by_key(|w| w.date);
    workouts
}

// =====================
// Files
// =====================

/// Export files in `dir` whose name matches `pattern`, sorted by file name (oldest export first).
/// A missing directory yields no files.
pub fn find_exports(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, String> {
    let pattern = glob::Pattern::new(pattern).map_err(|e| format!("invalid export pattern '{}': {}", pattern, e))?;
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(format!("failed to list {}: {}", dir.display(), e)),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| pattern.matches(n))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

type Workbook = calamine::Sheets<std::io::BufReader<std::fs::File>>;

fn sheet_rows(workbook: &mut Workbook, sheet: &'static str) -> Result<Option<calamine::Range<Data>>, WorkbookError> {
    if !workbook.sheet_names().iter().any(|n| n == sheet) {
        debug!("Sheet '{}' not present", sheet);
        return Ok(None);
    }
    workbook
        .worksheet_range(sheet)
        .map(Some)
        .map_err(|source| WorkbookError::Sheet { sheet, source })
}

/// Read one workbook. Absent sheets leave their facet empty.
pub fn read_workbook(path: &Path) -> Result<SpreadsheetData, WorkbookError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| WorkbookError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut data = SpreadsheetData::default();
    if let Some(range) = sheet_rows(&mut workbook, DAILY_SHEET)? {
        let rows: Vec<&[Data]> = range.rows().collect();
        data.daily = parse_daily(&rows);
    }
    if let Some(range) = sheet_rows(&mut workbook, MUSCLE_SETS_SHEET)? {
        let rows: Vec<&[Data]> = range.rows().collect();
        data.muscle_sets = parse_muscles(&rows, MUSCLE_SETS_SHEET);
    }
    if let Some(range) = sheet_rows(&mut workbook, MUSCLE_VOLUME_SHEET)? {
        let rows: Vec<&[Data]> = range.rows().collect();
        data.muscle_volume = parse_muscles(&rows, MUSCLE_VOLUME_SHEET);
    }
    if let Some(range) = sheet_rows(&mut workbook, WORKOUT_LOG_SHEET)? {
        let rows: Vec<&[Data]> = range.rows().collect();
        data.workouts = parse_workout_log(&rows);
    }

    debug!(
        "{}: {} daily row(s), {} muscle-set day(s), {} muscle-volume day(s), {} workout(s)",
        path.display(),
        data.daily.len(),
        data.muscle_sets.len(),
        data.muscle_volume.len(),
        data.workouts.len()
    );
    Ok(data)
}

/// Read and merge every export in order. Unreadable workbooks are skipped with a warning.
pub fn load(paths: &[PathBuf]) -> SpreadsheetData {
    let mut merged = SpreadsheetData::default();
    for path in paths {
        match read_workbook(path) {
            Ok(data) => merged.merge(data),
            Err(e) => warn!("Skipping export: {}", e),
        }
    }
    info!(
        "Spreadsheets: {} file(s) → {} daily row(s), {} muscle-set day(s), {} workout(s)",
        paths.len(),
        merged.daily.len(),
        merged.muscle_sets.len(),
        merged.workouts.len()
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn f(v: f64) -> Data {
        Data::Float(v)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn as_rows(rows: &[Vec<Data>]) -> Vec<&[Data]> {
        rows.iter().map(|r| r.as_slice()).collect()
    }

    #[test]
    fn daily_columns_are_found_by_header_in_any_order() {
        let rows = vec![
            vec![s("Weight (kg)"), s("Date"), s("Calories (kcal)"), s("Trend Weight (kg)"), s("Expenditure")],
            vec![f(90.4), s("2024-03-01"), f(2100.0), f(90.1), f(2750.0)],
            vec![Data::Empty, Data::DateTimeIso("2024-03-02T00:00:00".into()), s("n/a"), f(90.0), Data::Empty],
            vec![f(89.0), s("not a date"), f(1.0), f(1.0), f(1.0)],
        ];
        let daily = parse_daily(&as_rows(&rows));
        assert_eq!(daily.len(), 2);

        let first = &daily[&ymd(2024, 3, 1)];
        assert_eq!(first.weight_kg, Some(90.4));
        assert_eq!(first.calories_kcal, Some(2100.0));
        assert_eq!(first.trend_weight_kg, Some(90.1));
        assert_eq!(first.expenditure_kcal, Some(2750.0));
        assert_eq!(first.protein_g, None);

        let second = &daily[&ymd(2024, 3, 2)];
        assert_eq!(second.weight_kg, None);
        assert_eq!(second.calories_kcal, None);
        assert_eq!(second.trend_weight_kg, Some(90.0));
    }

    #[test]
    fn muscle_sheet_keeps_missing_columns_absent() {
        let rows = vec![
            vec![s("Date"), s("Chest"), s("Lats"), s("Quads")],
            vec![s("2024-03-01"), f(2.0), Data::Empty, f(0.0)],
        ];
        let entries = parse_muscles(&as_rows(&rows), MUSCLE_SETS_SHEET);
        let entry = &entries[&ymd(2024, 3, 1)];
        assert_eq!(entry.muscles.get(Muscle::Chest), Some(2.0));
        assert_eq!(entry.muscles.get(Muscle::Lats), None);
        assert_eq!(entry.muscles.get(Muscle::Quads), Some(0.0));
        assert_eq!(entry.muscles.get(Muscle::Biceps), None);
    }

    #[test]
    fn sheet_without_header_is_ignored_unless_it_has_fallbacks() {
        let rows = vec![vec![s("2024-03-01"), f(2.0)]];
        assert!(parse_muscles(&as_rows(&rows), MUSCLE_SETS_SHEET).is_empty());
        assert!(parse_daily(&as_rows(&rows)).is_empty());
    }

    #[test]
    fn workout_log_groups_sets_in_file_order() {
        let rows = vec![
            vec![s("MacroFactor workout export")],
            vec![
                s("Date"),
                s("Workout"),
                s("Duration"),
                s("Exercise"),
                s("Set Type"),
                s("Weight (kg)"),
                s("Reps"),
                s("RIR"),
            ],
            vec![s("2024-03-01"), s("Push A"), s("1:05:30"), s("Bench Press [Superset 1]"), s("Normal"), f(100.0), f(5.0), f(2.0)],
            vec![s("2024-03-01"), s("Push A"), Data::Empty, s("Cable Fly"), s("Failure"), f(20.0), f(12.0), Data::Empty],
            vec![s("2024-03-02"), s("Pull A"), f(48.0), s("Row"), s("Drop-Continuation"), f(60.0), f(8.0), s("5+")],
            vec![s("2024-03-01"), s("Push A"), Data::Empty, s("Dips"), Data::Empty, Data::Empty, f(10.0), s("x")],
            vec![Data::Empty, s("Push A"), Data::Empty, s("Orphan"), Data::Empty, Data::Empty, Data::Empty, Data::Empty],
        ];
        let workouts = parse_workout_log(&as_rows(&rows));
        assert_eq!(workouts.len(), 2);

        let push = &workouts[0];
        assert_eq!(push.date, ymd(2024, 3, 1));
        assert_eq!(push.name, "Push A");
        assert_eq!(push.duration_min, Some(65.5));
        let names: Vec<_> = push.sets.iter().map(|s| s.exercise.as_str()).collect();
        assert_eq!(names, vec!["Bench Press", "Cable Fly", "Dips"]);
        assert_eq!(push.sets[0].rir, Some(2));
        assert_eq!(push.sets[1].kind, SetKind::Failure);
        assert_eq!(push.sets[2].kind, SetKind::Normal);
        assert_eq!(push.sets[2].rir, None);

        let pull = &workouts[1];
        assert_eq!(pull.duration_min, Some(48.0));
        assert_eq!(pull.sets[0].kind, SetKind::DropContinuation);
        assert_eq!(pull.sets[0].rir, Some(5));
    }

    #[test]
    fn workout_log_without_header_uses_default_positions() {
        let rows = vec![vec![
            s("2024-03-04"),
            s("Legs"),
            f(70.0),
            s("Squat"),
            s("warm up"),
            f(60.0),
            f(5.0),
            f(4.0),
        ]];
        let workouts = parse_workout_log(&as_rows(&rows));
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].sets[0].exercise, "Squat");
        assert_eq!(workouts[0].sets[0].kind, SetKind::WarmUp);
        assert_eq!(workouts[0].sets[0].rir, Some(4));
        assert_eq!(workouts[0].duration_min, Some(70.0));
    }

    #[test]
    fn later_exports_replace_earlier_dates() {
        let mut older = SpreadsheetData::default();
        let mut day = DailyMetric::new(ymd(2024, 3, 1));
        day.weight_kg = Some(91.0);
        older.daily.insert(day.date, day);
        let mut kept = DailyMetric::new(ymd(2024, 2, 28));
        kept.weight_kg = Some(91.5);
        older.daily.insert(kept.date, kept);
        older.workouts.push(WorkoutDay {
            date: ymd(2024, 3, 1),
            name: "Old".into(),
            duration_min: None,
            sets: vec![],
        });

        let mut newer = SpreadsheetData::default();
        let mut day = DailyMetric::new(ymd(2024, 3, 1));
        day.weight_kg = Some(90.2);
        newer.daily.insert(day.date, day);
        newer.workouts.push(WorkoutDay {
            date: ymd(2024, 3, 1),
            name: "New".into(),
            duration_min: None,
            sets: vec![],
        });

        older.merge(newer);
        assert_eq!(older.daily[&ymd(2024, 3, 1)].weight_kg, Some(90.2));
        assert_eq!(older.daily[&ymd(2024, 2, 28)].weight_kg, Some(91.5));
        assert_eq!(older.workouts.len(), 1);
        assert_eq!(older.workouts[0].name, "New");
    }

    #[test]
    fn minutes_from_various_cells() {
        assert_eq!(cell_minutes(&f(42.0)), Some(42.0));
        assert_eq!(cell_minutes(&s("1:30")), Some(90.0));
        assert_eq!(cell_minutes(&s("0:45:30")), Some(45.5));
        assert_eq!(cell_minutes(&s("55")), Some(55.0));
        assert_eq!(cell_minutes(&s("soon")), None);
        assert_eq!(cell_minutes(&Data::Empty), None);
    }

    #[test]
    fn export_files_are_matched_and_sorted_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in [
            "MacroFactor-20240301.xlsx",
            "MacroFactor-20240115.xlsx",
            "notes.txt",
            "Other-20240101.xlsx",
        ] {
            std::fs::write(dir.path().join(name), b"").expect("write");
        }

        let files = find_exports(dir.path(), "MacroFactor-*.xlsx").expect("list");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["MacroFactor-20240115.xlsx", "MacroFactor-20240301.xlsx"]);

        assert!(find_exports(&dir.path().join("missing"), "*.xlsx").expect("missing dir").is_empty());
    }

    #[test]
    fn unreadable_workbooks_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bogus = dir.path().join("MacroFactor-broken.xlsx");
        std::fs::write(&bogus, b"not a zip archive").expect("write");

        assert!(read_workbook(&bogus).is_err());
        let data = load(&[bogus]);
        assert!(data.daily.is_empty());
        assert!(data.workouts.is_empty());
    }
}
