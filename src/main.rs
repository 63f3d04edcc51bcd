pub mod models {
    pub mod dashboard;
    pub mod muscle;
    pub mod records;
}

pub mod config;
pub mod db {
    pub mod models;
}
pub mod schema;
pub mod utils;
pub mod sources {
    pub mod health_connect;
    pub mod spreadsheet;
}
pub mod services {
    pub mod assemble;
    pub mod body_comp;
    pub mod normalize;
    pub mod reconcile;
    pub mod training;
    pub mod trends;
}

use crate::config::{AthleteProfile, CliOverrides, Config};
use crate::services::assemble;
use crate::sources::{health_connect, spreadsheet};
use chrono::Utc;
use log::{error, info, warn};
use std::path::PathBuf;

pub fn run(cli: CliOverrides) -> Result<(), String> {
    // 1) Load config
    let cfg = Config::from_env(cli)?;
    info!(
        "Config loaded (health_db={}, exports={}/{}, athlete_config={}, output={}, min_cardio_minutes={})",
        cfg.health_db_path.display(),
        cfg.exports_dir.display(),
        cfg.export_pattern,
        cfg.athlete_config_path.display(),
        cfg.output_path.display(),
        cfg.min_cardio_minutes
    );

    // 2) Athlete profile (written with defaults on first run)
    let athlete = AthleteProfile::load_or_create(&cfg.athlete_config_path)?;

    // 3) Locate inputs. The relational export is required; spreadsheets are not.
    if !cfg.health_db_path.is_file() {
        return Err(format!("Health Connect export not found: {}", cfg.health_db_path.display()));
    }
    let exports = spreadsheet::find_exports(&cfg.exports_dir, &cfg.export_pattern)?;
    if exports.is_empty() {
        warn!(
            "No spreadsheet exports matching '{}' in {}; nothing written",
            cfg.export_pattern,
            cfg.exports_dir.display()
        );
        return Ok(());
    }
    info!("Found {} spreadsheet export(s)", exports.len());

    // 4) Parse both sources
    let (health, sheets) = std::thread::scope(|s| {
        let health = s.spawn(|| health_connect::load(&cfg.health_db_path, cfg.min_cardio_minutes));
        let sheets = spreadsheet::load(&exports);
        (health.join(), sheets)
    });
    let health = health
        .map_err(|_| "Health Connect reader panicked".to_string())?
        .map_err(|e| format!("Reading Health Connect export failed: {}", e))?;

    // 5) Derive and compose
    let now = Utc::now();
    let dashboard = assemble::build_dashboard(
        &health,
        &sheets,
        &athlete,
        now.date_naive(),
        now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    );

    // 6) Write
    let json = serde_json::to_vec_pretty(&dashboard).map_err(|e| format!("Serializing dashboard failed: {}", e))?;
    utils::write_atomically(&cfg.output_path, &json)?;
    info!("Wrote {} ({} bytes)", cfg.output_path.display(), json.len());

    Ok(())
}

fn take_path(flag: &str, value: Option<String>, slot: &mut Option<PathBuf>) -> Result<(), String> {
    if slot.is_some() {
        return Err(format!("`{}` provided more than once", flag));
    }
    match value {
        Some(v) if !v.is_empty() => {
            *slot = Some(PathBuf::from(v));
            Ok(())
        }
        _ => Err(format!("`{}` requires a path argument", flag)),
    }
}

fn parse_cli<I>(args: I) -> Result<CliOverrides, String>
where
    I: IntoIterator<Item = std::ffi::OsString>,
{
    let mut args = args.into_iter();
    let mut cli = CliOverrides::default();

    while let Some(arg) = args.next() {
        let arg = arg
            .into_string()
            .map_err(|_| "argument contains invalid UTF-8".to_string())?;
        if arg == "--" {
            break;
        }
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let slot = match flag.as_str() {
            "--db" => &mut cli.health_db_path,
            "--exports-dir" => &mut cli.exports_dir,
            "--config" => &mut cli.athlete_config_path,
            "--out" => &mut cli.output_path,
            _ => return Err(format!("unrecognised argument: {}", arg)),
        };
        let value = match inline {
            Some(v) => Some(v),
            None => args.next().and_then(|v| v.into_string().ok()),
        };
        take_path(&flag, value, slot)?;
    }

    Ok(cli)
}

fn main() {
    let cli = match parse_cli(std::env::args_os().skip(1)) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    info!(
        "fitdash {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run(cli) {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn cli_accepts_separate_and_inline_values() {
        let cli = parse_cli(args(&["--db", "hc.db", "--out=site/data.json", "--config", "me.json"])).expect("parse");
        assert_eq!(cli.health_db_path, Some(PathBuf::from("hc.db")));
        assert_eq!(cli.output_path, Some(PathBuf::from("site/data.json")));
        assert_eq!(cli.athlete_config_path, Some(PathBuf::from("me.json")));
        assert_eq!(cli.exports_dir, None);
    }

    #[test]
    fn cli_rejects_unknown_repeated_and_empty_flags() {
        assert!(parse_cli(args(&["--verbose"])).is_err());
        assert!(parse_cli(args(&["--db", "a.db", "--db", "b.db"])).is_err());
        assert!(parse_cli(args(&["--exports-dir"])).is_err());
        assert!(parse_cli(args(&["--out="])).is_err());
    }

    #[test]
    fn cli_stops_at_double_dash() {
        let cli = parse_cli(args(&["--exports-dir", "dl", "--", "--whatever"])).expect("parse");
        assert_eq!(cli.exports_dir, Some(PathBuf::from("dl")));
    }
}
