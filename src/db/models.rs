//! Diesel row structs for the Health Connect export tables.

use diesel::prelude::*;
use diesel::sql_types::Text;

use crate::schema;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::weight_record_table)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WeightRow {
    pub weight: Option<f64>,
    pub time: i64,
    pub zone_offset: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::body_fat_record_table)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BodyFatRow {
    pub percentage: Option<f64>,
    pub time: i64,
    pub zone_offset: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::exercise_session_record_table)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionRow {
    pub row_id: i64,
    pub title: Option<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub start_zone_offset: Option<i32>,
    pub exercise_type: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::exercise_segments_table)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SegmentRow {
    pub parent_key: i64,
    pub segment_type: Option<i32>,
    pub repetitions_count: Option<i32>,
    pub weight_grams: Option<f64>,
    pub set_index: Option<i32>,
}

/// Result row of the `sqlite_master` table listing.
#[derive(Debug, Clone, QueryableByName)]
pub struct TableName {
    #[diesel(sql_type = Text)]
    pub name: String,
}
