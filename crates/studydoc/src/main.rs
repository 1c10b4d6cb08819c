//! studydoc CLI - study document templates.
//!
//! Provides commands for:
//! - `render`: Print a template to HTML, filled from a consent record
//! - `segment`: Split a template into prose and widget segments (JSON)
//! - `pdf`: Print a template to PDF through a Chromium conversion service

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PdfArgs, RenderArgs, SegmentArgs};
use output::Output;

/// studydoc - study document templates.
#[derive(Parser)]
#[command(name = "studydoc", version, about)]
struct Cli {
    /// Enable info logging (otherwise RUST_LOG applies).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to HTML.
    Render(RenderArgs),
    /// Segment a template for interactive clients.
    Segment(SegmentArgs),
    /// Render a template to PDF.
    Pdf(PdfArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Segment(args) => args.execute(),
        Commands::Pdf(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
