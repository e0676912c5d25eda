pub mod color;
pub mod image_io;
pub mod overlay;
