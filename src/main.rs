//! sms-backup - extract SMS conversations from an iPhone backup.
//!
//! Direct SQLite queries over a working copy of the backup store, with
//! human, csv, or json output.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use sms_backup::backup::{self, WorkingCopy};
use sms_backup::classify;
use sms_backup::db::connection;
use sms_backup::engine::{Engine, ExtractOptions};
use sms_backup::error::UsageError;
use sms_backup::render::{self, Format};
use sms_backup::resolve::{alias, filter};

/// Extract SMS conversations from an iPhone backup.
#[derive(Parser, Debug)]
#[command(name = "sms-backup")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Reduce running commentary
    #[arg(short, long)]
    quiet: bool,

    /// Map a phone number to a name in output; can be used multiple times
    #[arg(short = 'a', long = "alias", value_name = "PHONE=NAME")]
    aliases: Vec<String>,

    /// Date format string
    #[arg(short = 'd', long, value_name = "FORMAT", default_value = "%Y-%m-%d %H:%M:%S")]
    date_format: String,

    /// How output is formatted
    #[arg(short, long, value_enum, default_value_t = Format::Human)]
    format: Format,

    /// Name of the phone's owner in output
    #[arg(short = 'm', long = "myname", value_name = "NAME", default_value = "Me")]
    identity: String,

    /// Name of output file; defaults to stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Limit output to messages to/from this number; can be used multiple times
    #[arg(short = 'p', long = "phone", value_name = "PHONE")]
    numbers: Vec<String>,

    /// Don't print a header row for 'human' or 'csv' formats
    #[arg(long = "no-header", action = clap::ArgAction::SetFalse)]
    header: bool,

    /// Name of the SMS db file; defaults to the standard backup location
    #[arg(short, long = "input", value_name = "FILE")]
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries only the rendered output.
    let level = if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<UsageError>().is_some() => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage.");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Usage validation happens before any storage access.
    let aliases = alias::parse_alias_pairs(&cli.aliases)?;
    filter::validate_numbers(&cli.numbers)?;
    classify::validate_date_format(&cli.date_format)?;

    let source = match &cli.input {
        Some(path) => path.clone(),
        None => backup::find_backup_db()?,
    };
    let copy = WorkingCopy::create(&source)?;
    let conn = connection::open_readonly(copy.path())?;

    let engine = Engine::new(conn);
    let messages = engine.extract(&ExtractOptions {
        identity: cli.identity,
        aliases,
        numbers: cli.numbers,
        date_format: cli.date_format,
    })?;

    let rendered = render::render(&messages, cli.format, cli.header)?;

    match &cli.output {
        Some(path) => std::fs::write(path, rendered.as_bytes())
            .with_context(|| format!("Failed to write output file {:?}", path))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write output")?;
        }
    }
    Ok(())
}
