//! Navigation-control document parsing.
//!
//! Navigation points nest arbitrarily deep; traversal flattens them to a
//! single list in document order (depth-first, pre-order).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::util::local_name;

/// One navigation point as declared in the nav map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NavPoint {
    /// Display title; empty when the point declares none.
    pub title: String,
    /// Target reference as written, fragment included; empty when absent.
    pub target: String,
}

/// Collect all navigation points, ignoring nesting depth.
pub(crate) fn parse_nav_points(content: &str) -> Result<Vec<NavPoint>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut points: Vec<NavPoint> = Vec::new();
    // Indices of navPoints currently open; text and content belong to the
    // innermost one. Guards against docTitle/navInfo text outside the map.
    let mut open: Vec<usize> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"navPoint" => {
                    open.push(points.len());
                    points.push(NavPoint {
                        title: String::new(),
                        target: String::new(),
                    });
                }
                b"text" => in_text = true,
                b"content" => read_content_src(&e, &open, &mut points)?,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"content" {
                    read_content_src(&e, &open, &mut points)?;
                }
            }
            Ok(Event::Text(e)) => {
                if in_text && let Some(&idx) = open.last() {
                    points[idx].title.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                // Handle entity references like &apos; &lt; etc
                if in_text && let Some(&idx) = open.last() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    let resolved = match entity.as_ref() {
                        "apos" => "'",
                        "quot" => "\"",
                        "lt" => "<",
                        "gt" => ">",
                        "amp" => "&",
                        _ => "",
                    };
                    points[idx].title.push_str(resolved);
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"text" => in_text = false,
                b"navPoint" => {
                    open.pop();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(points)
}

fn read_content_src(
    e: &BytesStart<'_>,
    open: &[usize],
    points: &mut [NavPoint],
) -> Result<()> {
    if let Some(&idx) = open.last() {
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"src" {
                points[idx].target = String::from_utf8(attr.value.to_vec())?;
            }
        }
    }
    Ok(())
}
