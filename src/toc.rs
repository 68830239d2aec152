//! Resolved table-of-contents entries and their delimited-text form.
//!
//! The on-disk format is shared between the EPUB extractor (writer) and the
//! PDF outline installer (reader): comma-separated, every field
//! double-quoted, no header row, fields `level,title,page`.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

/// One resolved table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Indentation level, 1-based. Extraction emits a flat list (always 1).
    pub level: u32,
    pub title: String,
    /// 1-based position in the reading order.
    pub page: u32,
}

impl TocEntry {
    pub fn new(level: u32, title: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}

/// Output path convention: `<input-stem>_toc.txt` beside the input.
pub fn toc_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_toc.txt"))
}

/// Write entries as fully-quoted CSV records, no header row.
pub fn write_toc<P: AsRef<Path>>(entries: &[TocEntry], path: P) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_path(path.as_ref())?;
    for entry in entries {
        writer.write_record(&[
            entry.level.to_string(),
            entry.title.clone(),
            entry.page.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a TOC CSV back into entries.
///
/// Rows with fewer than three fields or with non-numeric level/page fields
/// are skipped with a diagnostic naming the row.
pub fn read_toc<P: AsRef<Path>>(path: P) -> Result<Vec<TocEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path.as_ref())?;

    let mut entries = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        if record.len() < 3 {
            warn!(row, fields = record.len(), "short row skipped");
            continue;
        }
        let level = record[0].trim().parse::<u32>();
        let page = record[2].trim().parse::<u32>();
        match (level, page) {
            (Ok(level), Ok(page)) => entries.push(TocEntry::new(level, &record[1], page)),
            _ => warn!(row, "non-numeric level or page, row skipped"),
        }
    }
    Ok(entries)
}
