//! Catalog collector and printer
//!
//! [`collect_entries`] gathers a scan into a list. [`print_entries`] renders
//! each entry as it is scanned, activating recovered views to show their
//! participants. A view that fails to activate is reported and skipped; the
//! listing carries on with the next entry.

use crate::recovered::ActiveTransaction;
use crate::scanner::{scan, ScannedEntry};
use serde_json::{json, Map, Value};
use std::error::Error as _;
use std::io::{self, Write};
use tracing::warn;
use txjournal_core::{
    CatalogEntry, CatalogError, CatalogResult, CatalogStore, ParticipantStatus, TypeSelector,
};

/// Rendering of printed entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `<uid>, <type>` lines and transaction summaries
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Counts from a [`print_entries`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintSummary {
    /// Entries rendered
    pub printed: usize,
    /// Recovered views that could not be activated
    pub view_failures: usize,
}

/// Collect every selected entry in scan order.
///
/// # Errors
///
/// Any scan failure; see [`scan`].
pub fn collect_entries<S>(store: &S, selector: &TypeSelector) -> CatalogResult<Vec<CatalogEntry>>
where
    S: CatalogStore + ?Sized,
{
    let mut entries = Vec::new();
    scan(store, selector, |scanned| entries.push(scanned.into_entry()))?;
    Ok(entries)
}

/// Render every selected entry to `out`.
///
/// # Errors
///
/// Any scan failure, or `Output` if writing fails. View activation failures
/// are not errors; they are counted in the returned summary.
pub fn print_entries<S, W>(
    store: &S,
    selector: &TypeSelector,
    out: &mut W,
    format: OutputFormat,
) -> CatalogResult<PrintSummary>
where
    S: CatalogStore + ?Sized,
    W: Write + ?Sized,
{
    let mut summary = PrintSummary::default();
    let mut write_error: Option<io::Error> = None;

    scan(store, selector, |scanned| {
        if write_error.is_some() {
            return;
        }
        if let Err(e) = render(store, scanned, out, format, &mut summary) {
            write_error = Some(e);
        }
    })?;

    match write_error {
        Some(source) => Err(CatalogError::Output { source }),
        None => Ok(summary),
    }
}

fn render<S, W>(
    store: &S,
    scanned: ScannedEntry,
    out: &mut W,
    format: OutputFormat,
    summary: &mut PrintSummary,
) -> io::Result<()>
where
    S: CatalogStore + ?Sized,
    W: Write + ?Sized,
{
    let ScannedEntry { entry, view } = scanned;
    let Some(mut view) = view else {
        summary.printed += 1;
        return match format {
            OutputFormat::Text => writeln!(out, "{}", entry),
            OutputFormat::Json => writeln!(out, "{}", entry_json(&entry)),
        };
    };

    let rendered = match view.activate(store) {
        Ok(active) => {
            summary.printed += 1;
            match format {
                OutputFormat::Text => writeln!(out, "{}", active.summary()),
                OutputFormat::Json => writeln!(out, "{}", transaction_json(&active)),
            }
        }
        Err(err) => {
            summary.view_failures += 1;
            let message = error_chain(&err);
            warn!(
                target: "txjournal::print",
                uid = %entry.uid,
                type_name = %entry.type_name,
                error = %message,
                "Could not activate recovered transaction"
            );
            match format {
                OutputFormat::Text => writeln!(out, "(error) {}", message),
                OutputFormat::Json => writeln!(
                    out,
                    "{}",
                    json!({
                        "uid": entry.uid,
                        "type": entry.type_name,
                        "error": message,
                    })
                ),
            }
        }
    };
    rendered
}

fn entry_json(entry: &CatalogEntry) -> Value {
    json!({
        "uid": entry.uid,
        "type": entry.type_name,
    })
}

fn transaction_json(active: &ActiveTransaction<'_>) -> Value {
    let mut participants = Map::new();
    for status in ParticipantStatus::ALL {
        let records: Vec<Value> = active
            .records(status)
            .into_iter()
            .map(|r| json!({ "record_type": r.record_type, "uid": r.uid }))
            .collect();
        participants.insert(status.name().to_string(), Value::Array(records));
    }
    json!({
        "uid": active.uid(),
        "type": active.type_name(),
        "participants": participants,
    })
}

/// `outer: cause: root cause`
fn error_chain(err: &CatalogError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
