//! Document outline installation from resolved TOC entries.

use std::path::Path;

use lopdf::{Document, Object, ObjectId, StringFormat, dictionary};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::toc::TocEntry;

/// Replace `input`'s document outline with one item per entry and save the
/// result over the input file.
///
/// The outline is installed flat (all items are siblings), matching the
/// flat TOC the EPUB resolver emits; the level field is carried in the CSV
/// but not turned into nesting. Entries whose page is out of range are
/// dropped with a diagnostic. Returns the number of items installed.
pub fn set_outline<P: AsRef<Path>>(input: P, entries: &[TocEntry]) -> Result<usize> {
    let input = input.as_ref();
    let mut doc = Document::load(input)?;
    let pages = doc.get_pages();
    let page_count = pages.len() as u32;

    let usable: Vec<&TocEntry> = entries
        .iter()
        .filter(|entry| {
            let in_range = entry.page >= 1 && entry.page <= page_count;
            if !in_range {
                warn!(
                    title = %entry.title,
                    page = entry.page,
                    page_count,
                    "page out of range, outline entry dropped"
                );
            }
            in_range
        })
        .collect();

    if usable.is_empty() {
        return Err(Error::InvalidArgument(
            "no usable outline entries".into(),
        ));
    }

    let outlines_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = usable.iter().map(|_| doc.new_object_id()).collect();

    for (index, entry) in usable.iter().enumerate() {
        let page_ref = pages[&entry.page];
        let mut item = dictionary! {
            "Title" => text_string(&entry.title),
            "Parent" => Object::Reference(outlines_id),
            "Dest" => vec![
                Object::Reference(page_ref),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ],
        };
        if index > 0 {
            item.set("Prev", Object::Reference(item_ids[index - 1]));
        }
        if index + 1 < item_ids.len() {
            item.set("Next", Object::Reference(item_ids[index + 1]));
        }
        doc.objects.insert(item_ids[index], Object::Dictionary(item));
    }

    doc.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => Object::Reference(item_ids[0]),
            "Last" => Object::Reference(item_ids[item_ids.len() - 1]),
            "Count" => item_ids.len() as i64,
        }),
    );

    let catalog = doc.catalog_mut()?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

    doc.save(input)?;
    info!(
        file = %input.display(),
        entries = item_ids.len(),
        "outline installed"
    );
    Ok(item_ids.len())
}

/// PDF text string: ASCII stays literal, anything else goes UTF-16BE with a
/// byte order mark.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::String(s.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
