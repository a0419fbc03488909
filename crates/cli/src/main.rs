//! txjournal CLI: list or prune the committed entries of a journal store.
//!
//! - `txjournal <STORE_DIR>`: print every entry, with participant summaries
//!   for recoverable transactions
//! - `txjournal <STORE_DIR> --types A,B`: print only the listed types
//! - `txjournal <STORE_DIR> --types A,B --prune`: remove the listed types' entries

mod commands;
mod format;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use txjournal_catalog::{print_entries, prune};
use txjournal_core::TypeSelector;
use txjournal_durability::{JournalConfig, JournalStore};

use commands::build_cli;
use format::{format_deleted, format_error, format_listing_header, OutputMode};

fn main() {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    if let Err(e) = run(&matches, mode) {
        eprintln!("{}", format_error(&e, mode));
        process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn run(matches: &ArgMatches, mode: OutputMode) -> Result<()> {
    let store_dir = store_dir(matches)?;
    let config = load_config(matches, &store_dir)?;
    let selector = TypeSelector::parse(matches.get_one::<String>("types").map(String::as_str))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if matches.get_flag("prune") {
        let mut store = JournalStore::open(&store_dir, config).with_context(|| {
            format!("Failed to open journal store '{}'", store_dir.display())
        })?;
        let removed = prune(&mut store, &selector)?;
        writeln!(out, "{}", format_deleted(removed, mode))?;
        return Ok(());
    }

    // Listing never writes to the store directory
    let store = JournalStore::open_read_only(&store_dir, config)
        .with_context(|| format!("Failed to open journal store '{}'", store_dir.display()))?;
    if let Some(header) = format_listing_header(&store_dir.display().to_string(), mode) {
        writeln!(out, "{}", header)?;
    }
    let summary = print_entries(&store, &selector, &mut out, mode.entry_format())?;
    out.flush()?;
    info!(
        target: "txjournal::cli",
        printed = summary.printed,
        view_failures = summary.view_failures,
        "Listing complete"
    );
    Ok(())
}

/// The positional store path, made absolute; it must be an existing directory.
fn store_dir(matches: &ArgMatches) -> Result<PathBuf> {
    let Some(raw) = matches.get_one::<String>("store") else {
        bail!("a store directory is required");
    };
    let path = Path::new(raw);
    if !path.is_dir() {
        bail!("'{}' is not an existing directory", raw);
    }
    path.canonicalize()
        .with_context(|| format!("Failed to resolve '{}'", raw))
}

fn load_config(matches: &ArgMatches, store_dir: &Path) -> Result<JournalConfig> {
    let config = match matches.get_one::<String>("config") {
        Some(file) => JournalConfig::from_file(Path::new(file))?,
        None => JournalConfig::load_from_dir(store_dir)?,
    };
    Ok(config)
}
