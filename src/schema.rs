//! Handwritten Diesel declarations for the subset of the Health Connect export we read.
//!
//! The export is produced by the Health Connect app; we never migrate it. Only the columns
//! listed here are selected, so additional columns in the real file are fine.

diesel::table! {
    weight_record_table (row_id) {
        row_id -> BigInt,
        // Grams.
        weight -> Nullable<Double>,
        // Epoch milliseconds, UTC.
        time -> BigInt,
        // Seconds east of UTC.
        zone_offset -> Nullable<Integer>,
    }
}

diesel::table! {
    body_fat_record_table (row_id) {
        row_id -> BigInt,
        percentage -> Nullable<Double>,
        time -> BigInt,
        zone_offset -> Nullable<Integer>,
    }
}

diesel::table! {
    exercise_session_record_table (row_id) {
        row_id -> BigInt,
        title -> Nullable<Text>,
        start_time -> BigInt,
        end_time -> BigInt,
        start_zone_offset -> Nullable<Integer>,
        exercise_type -> Nullable<Integer>,
    }
}

diesel::table! {
    exercise_segments_table (row_id) {
        row_id -> BigInt,
        parent_key -> BigInt,
        segment_start_time -> BigInt,
        segment_type -> Nullable<Integer>,
        repetitions_count -> Nullable<Integer>,
        weight_grams -> Nullable<Double>,
        set_index -> Nullable<Integer>,
    }
}

/// Tables that must exist before any parsing starts.
pub const REQUIRED_TABLES: [&str; 4] = [
    "weight_record_table",
    "body_fat_record_table",
    "exercise_session_record_table",
    "exercise_segments_table",
];
