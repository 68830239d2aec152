mod assemble;
mod images;
mod outline;
mod prefs;

pub use assemble::images_to_pdf;
pub use images::extract_images;
pub use outline::set_outline;
pub use prefs::set_viewer_prefs;
