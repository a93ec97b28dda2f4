use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;

use wedding_invite::app::App;
use wedding_invite::config::Config;
use wedding_invite::logging;

#[derive(Debug, Default)]
struct Args {
    config_path: Option<PathBuf>,
    assets: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("wedding-invite {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--assets" | "-a" => {
                if i + 1 < args.len() {
                    parsed.assets = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("Error: --assets requires a directory or URL argument");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"wedding-invite - terminal wedding invitation

USAGE:
    wedding-invite [OPTIONS]

OPTIONS:
    --config, -c PATH   Path to config file
    --assets, -a DIR    Directory or URL holding images/ and audio/
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    WEDDING_INVITE_CONFIG   Path to config file (overrides default location)
    WEDDING_INVITE_LOG      Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/wedding-invite/config.toml

See also: wedding-assets --help"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    // Initialize logging (uses journald on Linux, file fallback otherwise)
    let _ = logging::init(Some(Config::config_dir().join("logs")));

    // Load configuration
    let mut config = match args.config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    if let Some(assets) = args.assets {
        config.assets.base_path = assets;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(config);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!("Invitation exited with error: {:#}", e);
    }
    result
}
