// Copyright 2026 Mapscout Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use mapscout::capture;
use mapscout::cli;

#[derive(Parser)]
#[command(
    name = "mapscout",
    about = "Mapscout — building address scanner for Google Maps",
    version,
    after_help = "Run 'mapscout <command> --help' for details on each command.\nRun 'mapscout' with no command to enter the interactive menu."
)]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan building addresses around a geographic point
    Scan {
        /// Center latitude in degrees
        #[arg(long)]
        lat: Option<f64>,
        /// Center longitude in degrees
        #[arg(long)]
        lon: Option<f64>,
        /// Scan radius in kilometers
        #[arg(long)]
        radius: Option<f64>,
        /// Run the browser without a visible window
        #[arg(long)]
        headless: bool,
    },
    /// Interactive set operations over saved location files
    Filter,
    /// Capture a screenshot for every location in a CSV file
    Capture {
        /// File name inside locations/ (prompted for when omitted)
        file: Option<String>,
        /// Number of parallel browser contexts
        #[arg(long, default_value_t = capture::DEFAULT_WORKERS)]
        workers: usize,
        /// Run the browser without a visible window
        #[arg(long)]
        headless: bool,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.quiet {
        std::env::set_var("MAPSCOUT_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("MAPSCOUT_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("MAPSCOUT_NO_COLOR", "1");
    }

    let default_level = if cli.verbose {
        "mapscout=debug"
    } else {
        "mapscout=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        // No subcommand → interactive menu
        None => cli::menu::run(false).await,

        Some(Commands::Scan {
            lat,
            lon,
            radius,
            headless,
        }) => cli::scan_cmd::run(lat, lon, radius, headless).await,
        Some(Commands::Filter) => cli::filter_cmd::run().await,
        Some(Commands::Capture {
            file,
            workers,
            headless,
        }) => cli::capture_cmd::run(file.as_deref(), workers, headless).await,
        Some(Commands::Doctor) => cli::doctor::run().await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "mapscout", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
