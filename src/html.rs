//! Slide image scraping from saved web-book pages.

use std::fs;
use std::io::Read;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Extract the images of every slide `<div>` into `output_dir`.
///
/// Sources are collected from `<img>` elements inside `div`s whose class
/// list contains `slide`, in document order. Data URIs are decoded, remote
/// URLs are downloaded, anything else is skipped. Output files are named
/// `NNNN.jpg`; the counter advances for every discovered source whether or
/// not it was saved, so numbering matches slide order. Returns the number
/// of files written.
pub fn extract_slide_images<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output_dir: Q) -> Result<usize> {
    let html = fs::read_to_string(input.as_ref())?;
    let sources = collect_slide_sources(&html);

    if sources.is_empty() {
        warn!("no slide image sources found");
        return Ok(0);
    }
    info!(sources = sources.len(), "image sources found");

    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let mut saved = 0usize;
    for (index, src) in sources.iter().enumerate() {
        let output = output_dir.join(format!("{:04}.jpg", index + 1));
        match fetch_source(src) {
            Ok(Some(data)) => {
                fs::write(&output, data)?;
                info!(output = %output.display(), "image written");
                saved += 1;
            }
            Ok(None) => warn!(src = %preview(src), "unsupported source form, skipped"),
            Err(e) => warn!(src = %preview(src), error = %e, "source not saved"),
        }
    }

    info!(saved, total = sources.len(), "slide images saved");
    Ok(saved)
}

fn collect_slide_sources(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    // The selector is a constant; parse failure would be a typo here, not input data.
    let Ok(selector) = Selector::parse("div.slide img[src]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|img| img.value().attr("src").map(str::to_string))
        .collect()
}

/// Fetch one source: `Some(bytes)` for data URIs and http(s) URLs, `None`
/// for source forms this tool does not handle.
fn fetch_source(src: &str) -> Result<Option<Vec<u8>>> {
    if let Some(rest) = src.strip_prefix("data:image") {
        let encoded = rest
            .split_once(',')
            .map(|(_, encoded)| encoded)
            .ok_or_else(|| Error::InvalidArgument("malformed data URI".into()))?;
        return Ok(Some(BASE64.decode(encoded.trim())?));
    }

    if src.starts_with("http://") || src.starts_with("https://") {
        let response = ureq::get(src).call().map_err(Box::new)?;
        let mut data = Vec::new();
        response.into_reader().read_to_end(&mut data)?;
        return Ok(Some(data));
    }

    Ok(None)
}

fn preview(src: &str) -> String {
    src.chars().take(70).collect()
}
