//! EPUB container access: ZIP entries and the root descriptor.

use std::io::{Read, Seek};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::util::local_name;

pub(crate) const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";
pub(crate) const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Read a container entry as UTF-8 text (BOM stripped).
pub(crate) fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String> {
    let bytes = read_entry_bytes(archive, path)?;
    let bytes = strip_bom(&bytes);
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Like [`read_entry`], but a missing entry becomes a [`Error::MissingElement`]
/// naming the artifact.
pub(crate) fn read_required<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
    what: &str,
) -> Result<String> {
    match read_entry(archive, path) {
        Err(Error::Zip(zip::result::ZipError::FileNotFound)) => {
            Err(Error::MissingElement(format!("{what} {path}")))
        }
        other => other,
    }
}

pub(crate) fn read_entry_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Vec<u8>> {
    // Try direct lookup first
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            return Ok(contents);
        }
        Err(zip::result::ZipError::FileNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    // Fallback: try percent-decoded path (handles malformed EPUBs)
    let decoded = percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| Error::InvalidArgument(format!("invalid UTF-8 in path: {path}")))?;

    let mut file = archive.by_name(&decoded)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Strip UTF-8 BOM (byte order mark) if present
fn strip_bom(data: &[u8]) -> &[u8] {
    // UTF-8 BOM: EF BB BF
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

/// Locate the package document path via `META-INF/container.xml`.
///
/// Selects the first rootfile declared with the package media type; a
/// rootfile without it is not a package document and is passed over.
pub(crate) fn find_package_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let container = read_required(archive, CONTAINER_PATH, "root descriptor")?;

    let mut reader = Reader::from_str(&container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                let mut full_path = None;
                let mut media_type = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"full-path" => full_path = Some(String::from_utf8(attr.value.to_vec())?),
                        b"media-type" => media_type = Some(String::from_utf8(attr.value.to_vec())?),
                        _ => {}
                    }
                }
                if media_type.as_deref() == Some(PACKAGE_MEDIA_TYPE)
                    && let Some(path) = full_path
                {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Err(Error::MissingElement(format!(
        "rootfile with media type {PACKAGE_MEDIA_TYPE} in {CONTAINER_PATH}"
    )))
}
