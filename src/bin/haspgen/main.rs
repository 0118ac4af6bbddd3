//! haspgen - openHASP plate generator
//!
//! Commands: generate, validate, icons
//! Outputs JSON to stdout, logs to stderr
//! Returns non-zero on failure, 2 on validation failure

mod plates;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openhasp_plates::{Generator, IconSet, PlateError, PlateRegistry, Result, Theme};

/// Icon table used when `--icons` is not given.
pub(crate) const BUNDLED_ICONS: &str = include_str!("../../../assets/icons.codepoints");

#[derive(Parser)]
#[command(name = "haspgen")]
#[command(about = "haspgen - openHASP plate and Home Assistant config generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Icon codepoint table (`name codepoint` per line)
    #[arg(short, long, global = true)]
    icons: Option<PathBuf>,

    /// Theme file (YAML or JSON); defaults to the built-in Dracula theme
    #[arg(short, long, global = true)]
    theme: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate plate JSONL and Home Assistant YAML
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Validate every plate first; violations block generation
        #[arg(long)]
        validate: bool,

        /// Print the generation manifest
        #[arg(long)]
        manifest: bool,
    },

    /// Validate every plate, or only the named one
    Validate {
        /// Plate name
        plate: Option<String>,
    },

    /// Resolve icon names to codepoints
    Icons {
        /// Icon names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn load_icons(path: Option<&Path>) -> Result<IconSet> {
    match path {
        Some(path) => IconSet::load(path),
        None => IconSet::parse(BUNDLED_ICONS),
    }
}

fn load_theme(path: Option<&Path>) -> Result<Theme> {
    match path {
        Some(path) => Theme::load(path),
        None => Ok(Theme::dracula()),
    }
}

fn load_registry(cli: &Cli) -> Result<(PlateRegistry, IconSet)> {
    let icons = load_icons(cli.icons.as_deref())?;
    let theme = load_theme(cli.theme.as_deref())?;
    info!(icons = icons.len(), theme = %theme.name, "inputs loaded");

    let mut registry = PlateRegistry::new();
    plates::build(&mut registry, &icons, &theme)?;
    Ok((registry, icons))
}

fn error_exit(e: &PlateError) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": e.to_string(),
    });
    println!("{}", output);
    match e {
        PlateError::ValidationFailed(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let (registry, icons) = match load_registry(&cli) {
        Ok(loaded) => loaded,
        Err(e) => return error_exit(&e),
    };

    match &cli.command {
        Commands::Generate {
            output,
            validate,
            manifest,
        } => {
            let generator = if *validate {
                Generator::new().validating()
            } else {
                Generator::new()
            };

            let written = generator
                .generate(&registry)
                .and_then(|files| files.write_to(output));

            match written {
                Ok(generated) => {
                    let mut result = serde_json::json!({
                        "success": true,
                        "plates": registry.list(),
                        "output": output.display().to_string(),
                    });
                    if *manifest {
                        result["manifest"] = serde_json::json!(generated);
                    }
                    match serde_json::to_string_pretty(&result) {
                        Ok(text) => {
                            println!("{}", text);
                            ExitCode::SUCCESS
                        }
                        Err(e) => error_exit(&e.into()),
                    }
                }
                Err(e) => error_exit(&e),
            }
        }

        Commands::Validate { plate } => {
            let report = match plate {
                Some(name) => match registry.plate(name) {
                    Ok(plate) => plate.validate(),
                    Err(e) => return error_exit(&e),
                },
                None => Generator::new().validate(&registry),
            };
            match serde_json::to_string_pretty(&report) {
                Ok(text) => println!("{}", text),
                Err(e) => return error_exit(&e.into()),
            }
            if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Validation failure
            }
        }

        Commands::Icons { names } => {
            let resolved: Result<Vec<_>> = names
                .iter()
                .map(|name| {
                    let glyph = icons.get(name)?;
                    Ok(serde_json::json!({
                        "name": name,
                        "codepoint": format!("{:x}", u32::from(glyph)),
                    }))
                })
                .collect();

            match resolved.and_then(|r| Ok(serde_json::to_string_pretty(&r)?)) {
                Ok(text) => {
                    println!("{}", text);
                    ExitCode::SUCCESS
                }
                Err(e) => error_exit(&e),
            }
        }
    }
}
