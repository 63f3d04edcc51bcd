//! Reader for the Health Connect SQLite export (the secondary source).
//!
//! - Blocking diesel `SqliteConnection`, one pass per table.
//! - All required tables are checked before any row is read.
//! - Rows whose value cannot be read as the expected type are skipped, not reported.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::{ConnectionError, SqliteConnection};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::db::models::{BodyFatRow, SegmentRow, SessionRow, TableName, WeightRow};
use crate::models::records::{BodyFatReading, CardioSession, ExerciseSegment};
use crate::schema::{self, REQUIRED_TABLES};
use crate::services::normalize::{local_date, local_datetime_string};
use crate::utils::round_to;

/// Health Connect `ExerciseSessionRecord` types reported as cardio.
pub mod exercise_types {
    pub const BIKING: i32 = 8;
    pub const BIKING_STATIONARY: i32 = 9;
    pub const ELLIPTICAL: i32 = 25;
    pub const HIKING: i32 = 37;
    pub const ROWING: i32 = 53;
    pub const ROWING_MACHINE: i32 = 54;
    pub const RUNNING: i32 = 56;
    pub const RUNNING_TREADMILL: i32 = 57;
    pub const STAIR_CLIMBING: i32 = 68;
    pub const STAIR_CLIMBING_MACHINE: i32 = 69;
    pub const SWIMMING_OPEN_WATER: i32 = 73;
    pub const SWIMMING_POOL: i32 = 74;
    pub const WALKING: i32 = 79;

    pub const CARDIO: [i32; 13] = [
        BIKING,
        BIKING_STATIONARY,
        ELLIPTICAL,
        HIKING,
        ROWING,
        ROWING_MACHINE,
        RUNNING,
        RUNNING_TREADMILL,
        STAIR_CLIMBING,
        STAIR_CLIMBING_MACHINE,
        SWIMMING_OPEN_WATER,
        SWIMMING_POOL,
        WALKING,
    ];
}

#[derive(Debug)]
pub enum HealthDbError {
    /// The export file does not exist.
    MissingFile(PathBuf),
    Connection(ConnectionError),
    /// One or more required tables are absent.
    MissingTables(Vec<String>),
    Query {
        table: &'static str,
        source: diesel::result::Error,
    },
}

impl core::fmt::Display for HealthDbError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HealthDbError::MissingFile(p) => write!(f, "Health Connect export not found: {}", p.display()),
            HealthDbError::Connection(e) => write!(f, "opening Health Connect export failed: {}", e),
            HealthDbError::MissingTables(t) => write!(f, "missing expected tables: {}", t.join(", ")),
            HealthDbError::Query { table, source } => write!(f, "reading {} failed: {}", table, source),
        }
    }
}

impl std::error::Error for HealthDbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HealthDbError::Connection(e) => Some(e),
            HealthDbError::Query { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConnectionError> for HealthDbError {
    fn from(value: ConnectionError) -> Self {
        HealthDbError::Connection(value)
    }
}

/// Everything the pipeline takes from the Health Connect export.
#[derive(Debug, Clone, Default)]
pub struct HealthConnectData {
    /// Last scale reading of each local day, kg.
    pub weight_kg: BTreeMap<NaiveDate, f64>,
    pub body_fat: Vec<BodyFatReading>,
    /// Qualifying cardio sessions, oldest first.
    pub cardio: Vec<CardioSession>,
}

pub fn open(path: &Path) -> Result<SqliteConnection, HealthDbError> {
    // sqlite would silently create an empty database
    if !path.is_file() {
        return Err(HealthDbError::MissingFile(path.to_path_buf()));
    }
    Ok(SqliteConnection::establish(&path.to_string_lossy())?)
}

pub fn validate_tables(conn: &mut SqliteConnection) -> Result<(), HealthDbError> {
    let existing: BTreeSet<String> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type = 'table'")
        .load::<TableName>(conn)
        .map_err(|source| HealthDbError::Query {
            table: "sqlite_master",
            source,
        })?
        .into_iter()
        .map(|t| t.name)
        .collect();

    let missing: Vec<String> = REQUIRED_TABLES
        .iter()
        .filter(|t| !existing.contains(**t))
        .map(|t| t.to_string())
        .collect();
    if missing.is_empty() {
        debug!("Health Connect: all {} required tables present", REQUIRED_TABLES.len());
        Ok(())
    } else {
        Err(HealthDbError::MissingTables(missing))
    }
}

pub fn read_weights(conn: &mut SqliteConnection) -> Result<BTreeMap<NaiveDate, f64>, HealthDbError> {
    use schema::weight_record_table::dsl as W;

    let rows: Vec<WeightRow> = W::weight_record_table
        .select(WeightRow::as_select())
        .order(W::time.asc())
        .load(conn)
        .map_err(|source| HealthDbError::Query {
            table: "weight_record_table",
            source,
        })?;

    // ascending time: a later reading on the same day replaces the earlier one
    let mut by_date = BTreeMap::new();
    for row in rows {
        if let (Some(grams), Some(date)) = (row.weight, local_date(row.time, row.zone_offset)) {
            by_date.insert(date, round_to(grams / 1000.0, 2));
        }
    }
    Ok(by_date)
}

pub fn read_body_fat(conn: &mut SqliteConnection) -> Result<Vec<BodyFatReading>, HealthDbError> {
    use schema::body_fat_record_table::dsl as B;

    let rows: Vec<BodyFatRow> = B::body_fat_record_table
        .select(BodyFatRow::as_select())
        .order(B::time.asc())
        .load(conn)
        .map_err(|source| HealthDbError::Query {
            table: "body_fat_record_table",
            source,
        })?;

    let mut by_date = BTreeMap::new();
    for row in rows {
        if let (Some(pct), Some(date)) = (row.percentage, local_date(row.time, row.zone_offset)) {
            by_date.insert(date, pct);
        }
    }
    Ok(by_date
        .into_iter()
        .map(|(date, pct)| BodyFatReading { date, pct })
        .collect())
}

fn segment_from_row(row: &SegmentRow) -> ExerciseSegment {
    ExerciseSegment {
        type_id: row.segment_type,
        reps: row.repetitions_count,
        weight_kg: row.weight_grams.filter(|g| *g > 0.0).map(|g| g / 1000.0),
        set_index: row.set_index.filter(|i| *i >= 0),
    }
}

/// Sessions of a cardio type lasting at least `min_minutes`, with their segments in start order.
pub fn read_cardio_sessions(
    conn: &mut SqliteConnection,
    min_minutes: i64,
) -> Result<Vec<CardioSession>, HealthDbError> {
    use schema::exercise_segments_table::dsl as G;
    use schema::exercise_session_record_table::dsl as S;

    let sessions: Vec<SessionRow> = S::exercise_session_record_table
        .select(SessionRow::as_select())
        .order(S::start_time.asc())
        .load(conn)
        .map_err(|source| HealthDbError::Query {
            table: "exercise_session_record_table",
            source,
        })?;

    let segment_rows: Vec<SegmentRow> = G::exercise_segments_table
        .select(SegmentRow::as_select())
        .order((G::parent_key.asc(), G::segment_start_time.asc()))
        .load(conn)
        .map_err(|source| HealthDbError::Query {
            table: "exercise_segments_table",
            source,
        })?;

    let mut segments_by_session: BTreeMap<i64, Vec<ExerciseSegment>> = BTreeMap::new();
    for row in &segment_rows {
        segments_by_session
            .entry(row.parent_key)
            .or_default()
            .push(segment_from_row(row));
    }

    let total = sessions.len();
    let cardio: Vec<CardioSession> = sessions
        .into_iter()
        .filter_map(|s| {
            let exercise_type = s.exercise_type.filter(|t| exercise_types::CARDIO.contains(t))?;
            let duration_min = ((s.end_time - s.start_time) as f64 / 60_000.0).round() as i64;
            if duration_min < min_minutes {
                return None;
            }
            Some(CardioSession {
                date: local_date(s.start_time, s.start_zone_offset)?,
                datetime: local_datetime_string(s.start_time, s.start_zone_offset)?,
                title: s.title.unwrap_or_default(),
                duration_min,
                exercise_type,
                segments: segments_by_session.remove(&s.row_id).unwrap_or_default(),
            })
        })
        .collect();

    debug!("Health Connect: {} of {} session(s) qualify as cardio", cardio.len(), total);
    Ok(cardio)
}

/// Open, validate and read the whole export.
pub fn load(path: &Path, min_cardio_minutes: i64) -> Result<HealthConnectData, HealthDbError> {
    let mut conn = open(path)?;
    validate_tables(&mut conn)?;

    let data = HealthConnectData {
        weight_kg: read_weights(&mut conn)?,
        body_fat: read_body_fat(&mut conn)?,
        cardio: read_cardio_sessions(&mut conn, min_cardio_minutes)?,
    };
    info!(
        "Health Connect: {} weight day(s), {} body-fat day(s), {} cardio session(s)",
        data.weight_kg.len(),
        data.body_fat.len(),
        data.cardio.len()
    );
    Ok(data)
}
