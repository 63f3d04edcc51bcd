//! Runtime configuration (paths, from env + CLI) and the athlete profile document.
//! Path defaults assume the tool runs from the dashboard project root.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::models::muscle::Muscle;
use crate::utils::write_atomically;

pub const DEFAULT_HEALTH_DB_PATH: &str = "health_connect_export.db";
pub const DEFAULT_EXPORTS_DIR: &str = "exports";
pub const DEFAULT_EXPORT_PATTERN: &str = "MacroFactor-*.xlsx";
pub const DEFAULT_ATHLETE_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_OUTPUT_PATH: &str = "public/data.json";
pub const DEFAULT_MIN_CARDIO_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Health Connect SQLite export.
    pub health_db_path: PathBuf,
    /// Directory holding the spreadsheet exports.
    pub exports_dir: PathBuf,
    /// Glob matched against file names inside `exports_dir`.
    pub export_pattern: String,
    pub athlete_config_path: PathBuf,
    pub output_path: PathBuf,
    /// Shorter cardio sessions are not reported.
    pub min_cardio_minutes: i64,
}

/// Values given on the command line; each one wins over its environment variable.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub health_db_path: Option<PathBuf>,
    pub exports_dir: Option<PathBuf>,
    pub athlete_config_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env(cli: CliOverrides) -> Result<Self, String> {
        let env_path = |key: &str, default: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        let export_pattern = std::env::var("EXPORT_PATTERN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXPORT_PATTERN.to_string());
        glob::Pattern::new(&export_pattern)
            .map_err(|e| format!("EXPORT_PATTERN '{}' is not a valid glob: {}", export_pattern, e))?;

        let min_cardio_minutes = match std::env::var("MIN_CARDIO_MINUTES") {
            Ok(s) if !s.trim().is_empty() => s
                .trim()
                .parse::<i64>()
                .map_err(|_| "MIN_CARDIO_MINUTES must be a whole number of minutes".to_string())?,
            _ => DEFAULT_MIN_CARDIO_MINUTES,
        };

        Ok(Config {
            health_db_path: cli
                .health_db_path
                .unwrap_or_else(|| env_path("HEALTH_DB_PATH", DEFAULT_HEALTH_DB_PATH)),
            exports_dir: cli
                .exports_dir
                .unwrap_or_else(|| env_path("EXPORTS_DIR", DEFAULT_EXPORTS_DIR)),
            export_pattern,
            athlete_config_path: cli
                .athlete_config_path
                .unwrap_or_else(|| env_path("ATHLETE_CONFIG_PATH", DEFAULT_ATHLETE_CONFIG_PATH)),
            output_path: cli
                .output_path
                .unwrap_or_else(|| env_path("OUTPUT_PATH", DEFAULT_OUTPUT_PATH)),
            min_cardio_minutes,
        })
    }
}

/// Weekly set-count thresholds for one movement pattern or muscle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeLandmarks {
    /// Minimum effective volume.
    pub mev: f64,
    /// Maximum adaptive volume; midpoint of `mev` and `mrv` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mav: Option<f64>,
    /// Maximum recoverable volume.
    pub mrv: f64,
}

impl VolumeLandmarks {
    pub const fn new(mev: f64, mav: Option<f64>, mrv: f64) -> Self {
        VolumeLandmarks { mev, mav, mrv }
    }

    pub fn effective_mav(&self) -> f64 {
        self.mav.unwrap_or((self.mev + self.mrv) / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternLandmarks {
    pub push: VolumeLandmarks,
    pub pull: VolumeLandmarks,
    pub upper: VolumeLandmarks,
    pub lower: VolumeLandmarks,
}

impl Default for PatternLandmarks {
    fn default() -> Self {
        PatternLandmarks {
            push: VolumeLandmarks::new(10.0, Some(16.0), 22.0),
            pull: VolumeLandmarks::new(10.0, Some(16.0), 22.0),
            upper: VolumeLandmarks::new(20.0, Some(32.0), 44.0),
            lower: VolumeLandmarks::new(12.0, Some(18.0), 26.0),
        }
    }
}

/// Athlete biometrics and volume targets, stored as JSON next to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub age: f64,
    pub height_cm: f64,
    pub waist_cm: f64,
    /// Measured body-fat percentage that replaces the circumference estimate when set.
    #[serde(default)]
    pub manual_body_fat_pct: Option<f64>,
    pub target_body_fat_pct: f64,
    #[serde(default)]
    pub volume_landmarks: PatternLandmarks,
    #[serde(default = "default_muscle_landmarks")]
    pub default_muscle_landmarks: VolumeLandmarks,
    /// Per-muscle overrides keyed by display name (e.g. `"Side Delts"`).
    #[serde(default)]
    pub muscle_landmarks: BTreeMap<String, VolumeLandmarks>,
}

fn default_muscle_landmarks() -> VolumeLandmarks {
    VolumeLandmarks::new(6.0, None, 20.0)
}

impl Default for AthleteProfile {
    fn default() -> Self {
        AthleteProfile {
            age: 30.0,
            height_cm: 180.0,
            waist_cm: 90.0,
            manual_body_fat_pct: None,
            target_body_fat_pct: 12.0,
            volume_landmarks: PatternLandmarks::default(),
            default_muscle_landmarks: default_muscle_landmarks(),
            muscle_landmarks: BTreeMap::new(),
        }
    }
}

impl AthleteProfile {
    pub fn height_m(&self) -> f64 {
        self.height_cm / 100.0
    }

    /// Landmarks for a muscle: the override if one is configured (name match is case-insensitive),
    /// else the shared default.
    pub fn landmarks_for_muscle(&self, name: &str) -> VolumeLandmarks {
        self.muscle_landmarks
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
            .unwrap_or(self.default_muscle_landmarks)
    }

    /// Override keys that do not name a known muscle; these never match anything.
    pub fn unknown_muscle_overrides(&self) -> Vec<&str> {
        self.muscle_landmarks
            .keys()
            .filter(|k| Muscle::from_name(k).is_none())
            .map(String::as_str)
            .collect()
    }

    /// Read the profile, creating it with defaults when the file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self, String> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let profile = Self::parse(&text).map_err(|e| format!("{}: {}", path.display(), e))?;
                let unknown = profile.unknown_muscle_overrides();
                if !unknown.is_empty() {
                    warn!("{}: ignoring landmarks for unknown muscle(s): {}", path.display(), unknown.join(", "));
                }
                Ok(profile)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let profile = AthleteProfile::default();
                let json = serde_json::to_vec_pretty(&profile)
                    .map_err(|e| format!("serializing default athlete profile failed: {}", e))?;
                write_atomically(path, &json)?;
                info!("Created default athlete profile at {}", path.display());
                Ok(profile)
            }
            Err(e) => Err(format!("failed to read {}: {}", path.display(), e)),
        }
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let de = &mut serde_json::Deserializer::from_str(text);
        serde_path_to_error::deserialize(de).map_err(|e| format!("invalid athlete profile at `{}`: {}", e.path(), e))
    }
}
