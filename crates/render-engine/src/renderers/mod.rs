//! Built-in element renderers, one per visual filetype.

mod gif;
mod image;
mod shape;
mod text;
mod video;

pub use gif::GifRenderer;
pub use image::ImageRenderer;
pub use shape::ShapeRenderer;
pub use text::TextRenderer;
pub use video::VideoRenderer;
