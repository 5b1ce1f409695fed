pub mod detection;
pub mod image;

pub use detection::{detect_image_mime, detect_mime};
pub use image::{ImageData, elide_reference, resolve_reference};
