//! Table mode: one lookup per CSV row.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use chrono::Local;
use tcgimg_core::{AppConfig, CardRow};
use tcgimg_scraper::{RowResolver, TableCollector};

use crate::output;
use crate::site;
use crate::ListingArgs;

/// Reads `(name, number)` rows by position after a header row. Extra
/// columns are ignored and a missing column reads as empty. Rows with a
/// blank name are kept so they show up as misses in the summary.
pub(crate) fn read_rows<R: Read>(reader: R) -> anyhow::Result<Vec<CardRow>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv.records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV record {}", index + 1))?;
        let name = record.get(0).unwrap_or_default();
        if name.is_empty() {
            tracing::warn!(record = index + 1, "CSV row has no card name");
        }
        rows.push(CardRow::new(name, record.get(1).unwrap_or_default()));
    }
    Ok(rows)
}

/// Human-readable report: counts, then one line per row that did not resolve.
pub(crate) fn write_summary<W: Write>(mut out: W, table: &TableCollector) -> std::io::Result<()> {
    writeln!(out, "Rows attempted: {}", table.attempted())?;
    writeln!(out, "Found: {}", table.succeeded())?;
    writeln!(out, "Not found: {}", table.failed())?;
    let mut failures = table.failures().peekable();
    if failures.peek().is_some() {
        writeln!(out)?;
        writeln!(out, "Rows without an image:")?;
        for (row, reason) in failures {
            writeln!(out, "  {row}: {reason}")?;
        }
    }
    out.flush()
}

/// Resolves every row of `csv_name` (inside the input directory) and writes
/// the found image URLs plus a summary file.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read or an output file cannot be
/// written. Rows that fail to resolve are reported, not propagated.
pub(crate) async fn run_table(
    config: &AppConfig,
    args: &ListingArgs,
    csv_name: &Path,
) -> anyhow::Result<()> {
    let csv_path = config.input_dir.join(csv_name);
    let file =
        File::open(&csv_path).with_context(|| format!("failed to open {}", csv_path.display()))?;
    let rows = read_rows(file).with_context(|| format!("failed to read {}", csv_path.display()))?;
    let locale = args.locale();

    let path = output::resolve_output_path(args.output.as_deref(), &config.output_dir, || {
        let stem = csv_name.file_stem().map(|s| s.to_string_lossy());
        output::timestamped_filename(
            &output::slug(stem.as_deref()),
            locale,
            Local::now().naive_local(),
            "txt",
        )
    });
    tracing::info!(
        csv = %csv_path.display(),
        rows = rows.len(),
        %locale,
        output = %path.display(),
        "starting table lookup"
    );

    let (client, urls) = site::connect(config)?;
    let mut resolver = RowResolver::new(&client, &urls, config.scraper_inter_request_delay_ms);
    let table = resolver.resolve_all(rows, locale).await;

    output::write_url_lines(output::create(&path)?, table.found_urls())?;
    let summary = output::summary_path(&path);
    write_summary(output::create(&summary)?, &table)?;

    write_summary(std::io::stdout().lock(), &table)?;
    println!("Image URLs saved to {}", path.display());
    println!("Summary saved to {}", summary.display());
    Ok(())
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
