//! # bindery
//!
//! Batch converters for e-book artifacts: extract images from PDF/EPUB/HTML
//! sources, assemble images into PDFs, and edit PDF table-of-contents and
//! viewer-preference metadata.
//!
//! Each converter is a standalone, single-pass function over the
//! filesystem; the `bindery` binary exposes them as subcommands. There is
//! no shared runtime and no state that outlives a run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bindery::epub;
//!
//! // Resolve an EPUB's table of contents to (level, title, page) entries
//! let entries = epub::resolve_toc("book.epub")?;
//! for entry in &entries {
//!     println!("{} -> page {}", entry.title, entry.page);
//! }
//!
//! // Or write it straight to `book_toc.txt` beside the input
//! let (output, count) = epub::extract_toc("book.epub")?;
//! println!("{count} entries -> {}", output.display());
//! # Ok::<(), bindery::Error>(())
//! ```
//!
//! ## Converters
//!
//! - [`epub::resolve_toc`] / [`epub::extract_toc`]: TOC resolution against
//!   the spine reading order
//! - [`epub::extract_images`]: fixed-layout page images in spine order
//! - [`pdf::extract_images`]: embedded images from PDF page resources
//! - [`pdf::images_to_pdf`]: JPEG directory to one-image-per-page PDF
//! - [`pdf::set_outline`]: install a TOC CSV as the document outline
//! - [`pdf::set_viewer_prefs`]: page layout and reading direction
//! - [`html::extract_slide_images`]: slide images from saved web-book pages

pub mod epub;
pub mod error;
pub mod html;
pub mod pdf;
pub mod toc;
pub(crate) mod util;

pub use error::{Error, Result};
pub use toc::TocEntry;
