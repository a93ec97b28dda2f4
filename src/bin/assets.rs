//! Build-time helpers for the invitation's static assets.
//!
//! ## Usage
//!
//! ```bash
//! wedding-assets favicon                    # public/images/main.jpg -> public/favicon.{png,ico}
//! wedding-assets favicon --source logo.png  # Use another source image
//! wedding-assets optimize-main              # Shrink public/images/main.jpg in place
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info};

use wedding_invite::assets::HERO_IMAGE;
use wedding_invite::imaging::{self, MAX_MAIN_WIDTH};
use wedding_invite::logging::LOG_ENV;

const DEFAULT_PUBLIC_DIR: &str = "public";

enum Command {
    Favicon { source: Option<PathBuf> },
    OptimizeMain,
}

struct AssetsArgs {
    command: Command,
    public_dir: PathBuf,
}

fn main() {
    let args = parse_args();

    if let Err(e) = init_logging() {
        eprintln!("Warning: logging unavailable: {:#}", e);
    }

    if let Err(e) = run(args) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: AssetsArgs) -> Result<()> {
    match args.command {
        Command::Favicon { source } => {
            let source = source.unwrap_or_else(|| args.public_dir.join(HERO_IMAGE));
            info!("Generating favicon from {}", source.display());
            let output = imaging::generate_favicon(&source, &args.public_dir)
                .context("Failed to generate favicon")?;
            println!("Favicon generated:");
            println!("  {}", output.png.display());
            println!("  {}", output.ico.display());
        }
        Command::OptimizeMain => {
            let report = imaging::optimize_main(&args.public_dir)
                .context("Failed to optimize main image")?;
            if report.backup_created {
                println!("Original backed up to {}", report.backup.display());
            }
            println!(
                "Original:  {}x{}, {}",
                report.original_size.0,
                report.original_size.1,
                format_size(report.original_bytes)
            );
            println!(
                "Optimized: {}x{}, {}",
                report.optimized_size.0,
                report.optimized_size.1,
                format_size(report.optimized_bytes)
            );
            println!("Reduction: {:.1}%", report.reduction_percent());
        }
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

fn parse_args() -> AssetsArgs {
    let args: Vec<String> = std::env::args().collect();

    let mut command = None;
    let mut public_dir = PathBuf::from(DEFAULT_PUBLIC_DIR);
    let mut source = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "favicon" if command.is_none() => {
                command = Some("favicon");
            }
            "optimize-main" if command.is_none() => {
                command = Some("optimize-main");
            }
            "--public" | "-p" => {
                if i + 1 < args.len() {
                    public_dir = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--source" | "-s" => {
                if i + 1 < args.len() {
                    source = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let command = match command {
        Some("favicon") => Command::Favicon { source },
        Some(_) => Command::OptimizeMain,
        None => {
            eprintln!("Missing command");
            print_help();
            std::process::exit(1);
        }
    };

    AssetsArgs { command, public_dir }
}

fn print_help() {
    println!(
        r#"wedding-assets - Prepare static images for the wedding invitation

USAGE:
    wedding-assets <COMMAND> [OPTIONS]

COMMANDS:
    favicon             Write favicon.png and favicon.ico into the public directory
    optimize-main       Shrink images/main.jpg to at most {max} px wide (original kept
                        as images/main-original.jpg)

OPTIONS:
    --public, -p DIR    Public asset directory (default: {public})
    --source, -s FILE   Favicon source image (default: <public>/{hero})
    --help, -h          Show this help message

ENVIRONMENT:
    {log_env}   Log level (trace, debug, info, warn, error)
"#,
        max = MAX_MAIN_WIDTH,
        public = DEFAULT_PUBLIC_DIR,
        hero = HERO_IMAGE,
        log_env = LOG_ENV,
    );
}

fn init_logging() -> Result<()> {
    use tracing_subscriber::prelude::*;

    let filter = || {
        tracing_subscriber::filter::EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("warn"))
    };

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            let subscriber = tracing_subscriber::registry()
                .with(journald_layer)
                .with(filter());
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set tracing subscriber")?;
            return Ok(());
        }
    }

    // Fall back to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(())
}
