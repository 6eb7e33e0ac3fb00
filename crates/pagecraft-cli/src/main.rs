//! Pagecraft block tree debug tool.
//!
//! Usage:
//!   # Apply an edit script to an empty page (or to --document) and print the result
//!   pagecraft replay script.json
//!   pagecraft replay script.json --document page.json --json
//!
//!   # Report invariant violations in a saved page
//!   pagecraft check page.json
//!
//!   # Print a page as a tree
//!   pagecraft outline page.json --depth 2
//!
//! Logging goes to stderr and follows RUST_LOG (default "info").

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pagecraft_cli::{check_file, load_config, load_document, read_script, replay};
use pagecraft_tree::{Document, format_outline};

#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(about = "Replay, check and outline Pagecraft block trees")]
struct Args {
    /// Editor config (RON). Defaults to ~/.config/pagecraft/editor.ron if present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the undo history limit
    #[arg(long, global = true)]
    history_limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON array of edit ops
    Replay {
        script: PathBuf,

        /// Starting document (empty page if omitted)
        #[arg(long)]
        document: Option<PathBuf>,

        /// Continue past rejected ops instead of stopping
        #[arg(long)]
        keep_going: bool,

        /// Print the resulting document as JSON instead of an outline
        #[arg(long)]
        json: bool,
    },

    /// Validate a document and list invariant violations
    Check { document: PathBuf },

    /// Print a document as an ASCII tree
    Outline {
        document: PathBuf,

        /// Deepest level to print (0 = root blocks only)
        #[arg(long)]
        depth: Option<usize>,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(limit) = args.history_limit {
        config = config.with_history_limit(limit);
    }

    match args.command {
        Command::Replay {
            script,
            document,
            keep_going,
            json,
        } => {
            let start = match document {
                Some(path) => load_document(&path, config)?,
                None => Document::with_config(config),
            };
            let ops = read_script(&script)?;
            tracing::info!(ops = ops.len(), script = %script.display(), "replaying");

            let report = replay(start, ops, keep_going)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.document)?);
            } else {
                print_outline(&report.document, None);
                println!(
                    "{} applied, {} rejected, {} undo steps, dirty: {}",
                    report.applied,
                    report.rejected.len(),
                    report.document.history().undo_depth(),
                    report.document.is_dirty()
                );
            }
            Ok(if report.rejected.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Check { document } => {
            let violations = check_file(&document)?;
            if violations.is_empty() {
                println!("{}: ok", document.display());
                return Ok(ExitCode::SUCCESS);
            }
            for violation in &violations {
                println!("{}: {}", document.display(), violation);
            }
            println!("{} violation(s)", violations.len());
            Ok(ExitCode::FAILURE)
        }
        Command::Outline { document, depth } => {
            let doc = load_document(&document, config)?;
            print_outline(&doc, depth);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_outline(doc: &Document, depth: Option<usize>) {
    if doc.is_empty() {
        println!("(empty page)");
        return;
    }
    for line in format_outline(doc.blocks(), depth) {
        println!("{line}");
    }
}
