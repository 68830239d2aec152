//! Fixed-layout EPUB image extraction in spine order.

use std::fs::{self, File};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{info, warn};
use zip::ZipArchive;

use crate::epub::container::{find_package_path, read_entry, read_entry_bytes, read_required};
use crate::epub::package::parse_package;
use crate::error::{Error, Result};
use crate::util::{file_name, local_name, parent_dir, resolve_href};

/// Extract the page image of every spine document into `output_dir`.
///
/// Fixed-layout EPUBs wrap one full-page image per spine document, either
/// as `<svg><image xlink:href=...>` or as a plain `<img src=...>`. Output
/// files are named `NNNN_<original-name>` with a 4-digit counter that
/// advances only on successful extraction. Pages without a usable image
/// are skipped with a diagnostic.
pub fn extract_images<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    skip_cover: bool,
) -> Result<usize> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let file = File::open(input.as_ref())?;
    let mut archive = ZipArchive::new(file)?;

    let package_path = find_package_path(&mut archive)?;
    info!(package = %package_path, "package document located");

    let content = read_required(&mut archive, &package_path, "package document")?;
    let package = parse_package(&content, parent_dir(&package_path))?;

    info!(pages = package.spine_ids.len(), "spine pages found");
    let spine_ids: &[String] = if skip_cover && !package.spine_ids.is_empty() {
        info!("skipping cover (first spine page)");
        &package.spine_ids[1..]
    } else {
        &package.spine_ids
    };

    let mut count = 0usize;
    for idref in spine_ids {
        let Some(page_path) = package.manifest.get(idref) else {
            warn!(idref = %idref, "spine idref not in manifest, page skipped");
            continue;
        };

        let xhtml = match read_entry(&mut archive, page_path) {
            Ok(xhtml) => xhtml,
            Err(e) => {
                warn!(page = %page_path, error = %e, "page not readable, skipped");
                continue;
            }
        };

        let href = match first_image_href(&xhtml) {
            Ok(Some(href)) => href,
            Ok(None) => {
                warn!(page = %page_path, "no image link in page, skipped");
                continue;
            }
            Err(e) => {
                warn!(page = %page_path, error = %e, "page not parseable, skipped");
                continue;
            }
        };

        let image_path = resolve_href(parent_dir(page_path), &href);
        let data = match read_entry_bytes(&mut archive, &image_path) {
            Ok(data) => data,
            Err(e) => {
                warn!(image = %image_path, error = %e, "image not in container, skipped");
                continue;
            }
        };

        count += 1;
        let output = output_dir.join(format!("{:04}_{}", count, file_name(&image_path)));
        fs::write(&output, data)?;
        info!(output = %output.display(), "image written");
    }

    info!(count, "images extracted");
    Ok(count)
}

/// First image reference in an XHTML page document.
///
/// An SVG `<image>` (xlink:href, with unprefixed href as the SVG2 fallback)
/// wins over a plain `<img src>` wherever both appear.
fn first_image_href(xhtml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xhtml);

    let mut svg_href: Option<String> = None;
    let mut img_src: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"image" if svg_href.is_none() => {
                    let mut xlink = None;
                    let mut plain = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"xlink:href" => xlink = Some(String::from_utf8(attr.value.to_vec())?),
                            b"href" => plain = Some(String::from_utf8(attr.value.to_vec())?),
                            _ => {}
                        }
                    }
                    svg_href = xlink.or(plain);
                    if svg_href.is_some() {
                        break;
                    }
                }
                b"img" if img_src.is_none() => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"src" {
                            img_src = Some(String::from_utf8(attr.value.to_vec())?);
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

    Ok(svg_href.or(img_src))
}
