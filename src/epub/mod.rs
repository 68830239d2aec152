mod container;
mod images;
mod ncx;
mod package;
mod toc;

pub use images::extract_images;
pub use toc::{extract_toc, resolve_toc, resolve_toc_from_reader};
