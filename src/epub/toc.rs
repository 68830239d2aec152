//! Table-of-contents resolution against the spine reading order.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::epub::container::{find_package_path, read_required};
use crate::epub::ncx::parse_nav_points;
use crate::epub::package::parse_package;
use crate::error::{Error, Result};
use crate::toc::{self, TocEntry};
use crate::util::{parent_dir, resolve_href, strip_fragment};

/// Resolve the navigation-control document of an EPUB into a flat list of
/// (level, title, page) entries in declaration order.
///
/// Pages are 1-based spine positions. Navigation points whose target does
/// not resolve to a spine position are dropped with a diagnostic; a
/// container missing its root descriptor, package document, or
/// navigation-control document is an error.
///
/// # Example
///
/// ```no_run
/// let entries = bindery::epub::resolve_toc("book.epub")?;
/// for entry in &entries {
///     println!("{} -> page {}", entry.title, entry.page);
/// }
/// # Ok::<(), bindery::Error>(())
/// ```
pub fn resolve_toc<P: AsRef<Path>>(path: P) -> Result<Vec<TocEntry>> {
    let file = File::open(path)?;
    resolve_toc_from_reader(file)
}

/// Resolve from any [`Read`] + [`Seek`] source.
pub fn resolve_toc_from_reader<R: Read + Seek>(reader: R) -> Result<Vec<TocEntry>> {
    let mut archive = ZipArchive::new(reader)?;

    let package_path = find_package_path(&mut archive)?;
    info!(package = %package_path, "package document located");

    let content = read_required(&mut archive, &package_path, "package document")?;
    let package = parse_package(&content, parent_dir(&package_path))?;

    let ncx_path = package.ncx_path.clone().ok_or_else(|| {
        Error::MissingElement("navigation-control document in manifest".into())
    })?;
    info!(ncx = %ncx_path, "navigation document located");

    let ncx_content = read_required(&mut archive, &ncx_path, "navigation document")?;
    let nav_points = parse_nav_points(&ncx_content)?;

    let ncx_dir = parent_dir(&ncx_path);
    let mut entries = Vec::new();
    for point in nav_points {
        let target = resolve_href(ncx_dir, strip_fragment(&point.target));
        match package.page_map.get(&target) {
            // Nesting depth is discarded; every entry is emitted at level 1.
            Some(&page) => entries.push(TocEntry::new(1, point.title, page)),
            None => warn!(
                title = %point.title,
                target = %target,
                "navigation target not in spine, entry dropped"
            ),
        }
    }

    debug!(entries = entries.len(), "table of contents resolved");
    Ok(entries)
}

/// Resolve and write `<input-stem>_toc.txt` beside the input.
///
/// Returns the output path and the number of entries written. No output
/// file is created when resolution fails.
pub fn extract_toc<P: AsRef<Path>>(input: P) -> Result<(PathBuf, usize)> {
    let input = input.as_ref();
    let entries = resolve_toc(input)?;
    let output = toc::toc_path_for(input);
    toc::write_toc(&entries, &output)?;
    info!(
        output = %output.display(),
        entries = entries.len(),
        "table of contents written"
    );
    Ok((output, entries.len()))
}
