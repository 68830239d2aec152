//! Package document parsing: manifest, spine order, page map.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};

use crate::epub::container::NCX_MEDIA_TYPE;
use crate::error::{Error, Result};
use crate::util::{local_name, resolve_href};

/// Parsed package document.
pub(crate) struct PackageDoc {
    /// Manifest id -> fully-qualified container path.
    pub manifest: HashMap<String, String>,
    /// Spine idrefs in document order.
    pub spine_ids: Vec<String>,
    /// Fully-qualified container path -> 1-based spine position.
    pub page_map: HashMap<String, u32>,
    /// Fully-qualified path of the navigation-control document, if declared.
    pub ncx_path: Option<String>,
}

/// Parse a package document. `package_dir` is the document's own directory
/// inside the container; all manifest hrefs are resolved against it.
pub(crate) fn parse_package(content: &str, package_dir: &str) -> Result<PackageDoc> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut manifest: HashMap<String, String> = HashMap::new();
    let mut spine_ids: Vec<String> = Vec::new();
    let mut ncx_path: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"item" => {
                    if let Some(item) = parse_item(&e)? {
                        let full = resolve_href(package_dir, &item.href);
                        if item.media_type.as_deref() == Some(NCX_MEDIA_TYPE) {
                            ncx_path = Some(full.clone());
                        }
                        manifest.insert(item.id, full);
                    }
                }
                b"itemref" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"idref" {
                            spine_ids.push(String::from_utf8(attr.value.to_vec())?);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    // Spine positions are 1-based; a path referenced twice keeps the later
    // position (last-write-wins).
    let mut page_map = HashMap::new();
    for (index, idref) in spine_ids.iter().enumerate() {
        let seq = index as u32 + 1;
        match manifest.get(idref) {
            Some(path) => {
                page_map.insert(path.clone(), seq);
            }
            None => warn!(idref = %idref, seq, "spine idref not in manifest"),
        }
    }
    debug!(
        items = manifest.len(),
        spine = spine_ids.len(),
        "package document parsed"
    );

    Ok(PackageDoc {
        manifest,
        spine_ids,
        page_map,
        ncx_path,
    })
}

struct ManifestItem {
    id: String,
    href: String,
    media_type: Option<String>,
}

fn parse_item(e: &BytesStart<'_>) -> Result<Option<ManifestItem>> {
    let mut id = None;
    let mut href = None;
    let mut media_type = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => id = Some(String::from_utf8(attr.value.to_vec())?),
            b"href" => href = Some(String::from_utf8(attr.value.to_vec())?),
            b"media-type" => media_type = Some(String::from_utf8(attr.value.to_vec())?),
            _ => {}
        }
    }

    Ok(match (id, href) {
        (Some(id), Some(href)) => Some(ManifestItem {
            id,
            href,
            media_type,
        }),
        _ => None,
    })
}
