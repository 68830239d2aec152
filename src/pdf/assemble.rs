//! One-image-per-page PDF assembly from a directory of JPEG files.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::util::parse_jpeg_header;

/// Pack the `.jpg`/`.jpeg` files of `input_dir` into `output`, one page per
/// image, pages ordered by file stem.
///
/// JPEG data is embedded without re-encoding; each page is sized so its
/// image fills it exactly at `dpi`. Undecodable files are skipped with a
/// diagnostic. Returns the number of pages written; zero means no output
/// file was produced.
pub fn images_to_pdf<P: AsRef<Path>>(input_dir: P, output: &Path, dpi: u32) -> Result<usize> {
    let input_dir = input_dir.as_ref();
    if !input_dir.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "input directory not found: {}",
            input_dir.display()
        )));
    }
    if dpi == 0 {
        return Err(Error::InvalidArgument("dpi must be positive".into()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_jpeg_name(path))
        .collect();
    files.sort_by_key(|path| path.file_stem().map(|stem| stem.to_os_string()));

    if files.is_empty() {
        warn!(dir = %input_dir.display(), "no JPEG images found");
        return Ok(0);
    }
    info!(images = files.len(), dpi, "assembling PDF");

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    let scale = 72.0 / dpi as f32;

    for path in &files {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "file not readable, skipped");
                continue;
            }
        };
        let Some(jpeg) = parse_jpeg_header(&data) else {
            warn!(file = %path.display(), "not a parseable JPEG, skipped");
            continue;
        };

        let width_pt = jpeg.width as f32 * scale;
        let height_pt = jpeg.height as f32 * scale;
        let color_space = match jpeg.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        };

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => jpeg.width as i64,
                "Height" => jpeg.height as i64,
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            data,
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width_pt.into(),
                        0f32.into(),
                        0f32.into(),
                        height_pt.into(),
                        0f32.into(),
                        0f32.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im1", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), width_pt.into(), height_pt.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Dictionary(resources),
        });
        kids.push(Object::Reference(page_id));
    }

    if kids.is_empty() {
        warn!("no images were successfully processed");
        return Ok(0);
    }
    let page_count = kids.len();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    doc.save(output)?;
    info!(output = %output.display(), pages = page_count, "PDF written");

    Ok(page_count)
}

fn is_jpeg_name(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            ext == "jpg" || ext == "jpeg"
        })
}
