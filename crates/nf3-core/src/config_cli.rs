//! CLI commands for configuration inspection.
//!
//! Provides show, validate, schema, and presets subcommands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use nf3_common::{OutputFormat, RunId, SCHEMA_VERSION};
use nf3_config::{
    list_presets, load_config_file, resolve_config, validate, AnalysisConfig, ConfigPaths,
    ConfigSnapshot, PresetName,
};

use crate::exit_codes::ExitCode;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,
    /// Validate a config file (or the effective config when no file is given)
    Validate {
        /// Config file to check
        path: Option<PathBuf>,
    },
    /// Print the JSON schema of the config file format
    Schema,
    /// List built-in presets
    Presets,
}

/// Run the config command dispatcher
pub fn run_config(
    format: &OutputFormat,
    args: &ConfigArgs,
    explicit: Option<&Path>,
    preset: Option<PresetName>,
) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => run_config_show(format, explicit, preset),
        ConfigCommands::Validate { path } => {
            run_config_validate(format, path.as_deref().or(explicit), preset)
        }
        ConfigCommands::Schema => run_config_schema(),
        ConfigCommands::Presets => run_config_presets(format),
    }
}

fn print_json(value: &serde_json::Value) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            ExitCode::Clean
        }
        Err(e) => {
            eprintln!("nf3-core: failed to serialize output: {}", e);
            ExitCode::InternalError
        }
    }
}

fn run_config_show(format: &OutputFormat, explicit: Option<&Path>, preset: Option<PresetName>) -> ExitCode {
    let resolved = match resolve_config(&ConfigPaths::discover(explicit), preset) {
        Ok(r) => r,
        Err(e) => {
            let err: nf3_common::Error = e.into();
            eprintln!("nf3-core: {}", err);
            return ExitCode::from(&err);
        }
    };
    let snapshot = match ConfigSnapshot::capture(&resolved) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("nf3-core: {}", e);
            return ExitCode::InternalError;
        }
    };

    match format {
        OutputFormat::Summary => {
            let cfg = &snapshot.config;
            println!("source: {}", snapshot.source);
            println!("hash: {}", snapshot.config_hash);
            println!("unit: {}  granularity: {}", cfg.unit, cfg.granularity);
            let hierarchy: Vec<String> = cfg.hierarchy.iter().map(|d| d.to_string()).collect();
            println!("hierarchy: {}", hierarchy.join(" > "));
            println!("rolling windows: {:?}", cfg.rolling_windows);
            println!(
                "iqr x{}  abnormal {}x over {} buckets",
                cfg.outliers.iqr_multiplier, cfg.abnormal.multiplier, cfg.abnormal.window
            );
            for (dim, filter) in &cfg.filters {
                println!("filter {}: {:?}", dim, filter);
            }
            ExitCode::Clean
        }
        _ => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": RunId::new().0,
            "config": snapshot,
        })),
    }
}

fn run_config_validate(format: &OutputFormat, path: Option<&Path>, preset: Option<PresetName>) -> ExitCode {
    let (label, loaded) = match path {
        Some(p) => (p.display().to_string(), load_config_file(p)),
        None => (
            "effective config".to_string(),
            resolve_config(&ConfigPaths::discover(None), preset).map(|r| r.config),
        ),
    };
    let config: AnalysisConfig = match loaded {
        Ok(c) => c,
        Err(e) => {
            let err: nf3_common::Error = e.into();
            if matches!(format, OutputFormat::Json) {
                print_json(&serde_json::json!({
                    "schema_version": SCHEMA_VERSION,
                    "target": label,
                    "valid": false,
                    "errors": [err.to_string()],
                    "code": err.code(),
                }));
            } else {
                eprintln!("nf3-core: {}: {}", label, err);
            }
            return ExitCode::from(&err);
        }
    };

    let result = validate(&config);
    let exit = if result.is_valid() {
        ExitCode::Clean
    } else {
        ExitCode::ConfigError
    };
    match format {
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "target": label,
                "valid": result.is_valid(),
                "errors": result.errors,
            }));
        }
        _ => {
            if result.is_valid() {
                println!("{}: ok", label);
            } else {
                for e in &result.errors {
                    println!("{}: {}", label, e);
                }
            }
        }
    }
    exit
}

fn run_config_schema() -> ExitCode {
    let schema = schemars::schema_for!(AnalysisConfig);
    match serde_json::to_value(&schema) {
        Ok(v) => print_json(&v),
        Err(e) => {
            eprintln!("nf3-core: {}", e);
            ExitCode::InternalError
        }
    }
}

fn run_config_presets(format: &OutputFormat) -> ExitCode {
    let presets = list_presets();
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "presets": presets,
        })),
        _ => {
            for p in presets {
                println!("{:<10} {}", p.name, p.description);
            }
            ExitCode::Clean
        }
    }
}
