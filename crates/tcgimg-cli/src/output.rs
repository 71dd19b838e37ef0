//! Output file naming and writing.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDateTime;
use tcgimg_core::Locale;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Filename-safe form of a search term: ASCII letters and digits kept and
/// lowercased, everything else folded into single underscores. Falls back
/// to `all-cards` when nothing usable is left.
pub(crate) fn slug(term: Option<&str>) -> String {
    let mut slug = String::new();
    for c in term.unwrap_or_default().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let trimmed = slug.trim_end_matches('_');
    if trimmed.is_empty() {
        "all-cards".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// `<stem>[_jp]_<YYYY-MM-DD_HH-MM-SS>.<extension>`
pub(crate) fn timestamped_filename(
    stem: &str,
    locale: Locale,
    at: NaiveDateTime,
    extension: &str,
) -> String {
    let suffix = match locale {
        Locale::Global => "",
        Locale::Japanese => "_jp",
    };
    format!("{stem}{suffix}_{}.{extension}", at.format(TIMESTAMP_FORMAT))
}

/// The explicit `--output` path, or `generated` inside `output_dir`.
pub(crate) fn resolve_output_path(
    explicit: Option<&Path>,
    output_dir: &Path,
    generated: impl FnOnce() -> String,
) -> PathBuf {
    explicit.map_or_else(|| output_dir.join(generated()), Path::to_path_buf)
}

/// Sibling path for the table-mode report: `<stem>_summary.txt`.
pub(crate) fn summary_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    output.with_file_name(format!("{stem}_summary.txt"))
}

/// One URL per line, each terminated with `;`.
pub(crate) fn write_url_lines<'a, W, I>(mut out: W, urls: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a str>,
{
    for url in urls {
        writeln!(out, "{url};")?;
    }
    out.flush()
}

/// Creates `path` (and its parent directory) for buffered writing.
pub(crate) fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
