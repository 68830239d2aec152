//! Embedded image extraction from PDF page resources.

use std::fs;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{info, warn};

use crate::error::Result;

/// Extract every image XObject referenced by each page's resources into
/// `output_dir`, numbering across the whole document in page order.
///
/// DCT- and JPX-encoded streams are written verbatim as `.jpg`/`.jpx`;
/// other streams are decoded and re-encoded as PNG when dimensions and
/// color space allow it, and dumped verbatim as `.bin` otherwise.
pub fn extract_images<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output_dir: Q) -> Result<usize> {
    let output_dir = output_dir.as_ref();
    let doc = Document::load(input.as_ref())?;
    fs::create_dir_all(output_dir)?;

    let mut count = 0usize;
    for (page_no, page_id) in doc.get_pages() {
        let Some(resources) = page_resources(&doc, page_id) else {
            continue;
        };
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| resolve_dict(&doc, obj))
        else {
            continue;
        };

        let mut page_images = 0usize;
        for (name, value) in xobjects.iter() {
            let stream = match resolve(&doc, value) {
                Object::Stream(stream) => stream,
                _ => continue,
            };
            if !is_image(stream) {
                continue;
            }

            page_images += 1;
            count += 1;
            if let Err(e) = write_image(stream, output_dir, count) {
                warn!(
                    page = page_no,
                    name = %String::from_utf8_lossy(name),
                    error = %e,
                    "image not written"
                );
            }
        }

        if page_images > 0 {
            info!(page = page_no, images = page_images, "images found");
        }
    }

    info!(count, "images extracted");
    Ok(count)
}

/// Page resources, following the Parent chain for inherited dictionaries.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    loop {
        if let Ok(resources) = dict.get(b"Resources") {
            return resolve_dict(doc, resources);
        }
        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent_id).ok()?;
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj).as_dict().ok()
}

fn is_image(stream: &Stream) -> bool {
    matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

fn filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn write_image(stream: &Stream, output_dir: &Path, seq: usize) -> Result<()> {
    let filters = filters(stream);

    // Already-compressed image codecs keep their stream bytes untouched.
    if filters == [b"DCTDecode".to_vec()] {
        let output = output_dir.join(format!("{seq:04}.jpg"));
        fs::write(&output, &stream.content)?;
        info!(output = %output.display(), "image written");
        return Ok(());
    }
    if filters == [b"JPXDecode".to_vec()] {
        let output = output_dir.join(format!("{seq:04}.jpx"));
        fs::write(&output, &stream.content)?;
        info!(output = %output.display(), "image written");
        return Ok(());
    }

    if let Some(encoded) = encode_png(stream) {
        let output = output_dir.join(format!("{seq:04}.png"));
        encoded.save(&output)?;
        info!(output = %output.display(), "image written");
        return Ok(());
    }

    let output = output_dir.join(format!("{seq:04}.bin"));
    warn!(
        output = %output.display(),
        "unsupported image stream, raw bytes dumped"
    );
    fs::write(&output, &stream.content)?;
    Ok(())
}

/// Decode the stream to raw samples and wrap them as an 8-bit PNG.
///
/// Only DeviceGray and DeviceRGB at 8 bits per component are handled.
fn encode_png(stream: &Stream) -> Option<image::DynamicImage> {
    let dict = &stream.dict;
    let width = dict.get(b"Width").ok()?.as_i64().ok()?;
    let height = dict.get(b"Height").ok()?.as_i64().ok()?;
    let bits = dict.get(b"BitsPerComponent").ok()?.as_i64().ok()?;
    if bits != 8 || width <= 0 || height <= 0 {
        return None;
    }
    let (width, height) = (width as u32, height as u32);

    let color_space = match dict.get(b"ColorSpace") {
        Ok(Object::Name(name)) => name.clone(),
        _ => return None,
    };
    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    match color_space.as_slice() {
        b"DeviceGray" => {
            let buffer = image::GrayImage::from_raw(width, height, data)?;
            Some(image::DynamicImage::ImageLuma8(buffer))
        }
        b"DeviceRGB" => {
            let buffer = image::RgbImage::from_raw(width, height, data)?;
            Some(image::DynamicImage::ImageRgb8(buffer))
        }
        _ => None,
    }
}
