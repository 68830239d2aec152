//! Viewer preferences: page layout and reading direction.

use std::path::Path;

use lopdf::{Dictionary, Document, Object};
use tracing::info;

use crate::error::{Error, Result};

const PAGE_LAYOUTS: [&str; 6] = [
    "SinglePage",
    "OneColumn",
    "TwoColumnLeft",
    "TwoColumnRight",
    "TwoPageLeft",
    "TwoPageRight",
];
const DIRECTIONS: [&str; 2] = ["L2R", "R2L"];

/// Set `/PageLayout` on the catalog and `/Direction` in the catalog's
/// `/ViewerPreferences` dictionary, then save over the input file.
///
/// A leading slash on either name is accepted and stripped; unknown names
/// are rejected before the file is opened.
pub fn set_viewer_prefs<P: AsRef<Path>>(input: P, layout: &str, direction: &str) -> Result<()> {
    let layout = layout.strip_prefix('/').unwrap_or(layout);
    let direction = direction.strip_prefix('/').unwrap_or(direction);

    if !PAGE_LAYOUTS.contains(&layout) {
        return Err(Error::InvalidArgument(format!(
            "unknown page layout: {layout}"
        )));
    }
    if !DIRECTIONS.contains(&direction) {
        return Err(Error::InvalidArgument(format!(
            "unknown reading direction: {direction}"
        )));
    }

    let input = input.as_ref();
    let mut doc = Document::load(input)?;

    // Existing preferences may sit behind a reference; rewrite them inline
    // so the updated dictionary is what the catalog carries.
    let mut prefs = match doc.catalog()?.get(b"ViewerPreferences") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_dictionary(*id)
            .ok()
            .cloned()
            .unwrap_or_else(Dictionary::new),
        _ => Dictionary::new(),
    };
    prefs.set("Direction", Object::Name(direction.as_bytes().to_vec()));

    let catalog = doc.catalog_mut()?;
    catalog.set("PageLayout", Object::Name(layout.as_bytes().to_vec()));
    catalog.set("ViewerPreferences", Object::Dictionary(prefs));

    doc.save(input)?;
    info!(file = %input.display(), layout, direction, "viewer preferences updated");
    Ok(())
}
