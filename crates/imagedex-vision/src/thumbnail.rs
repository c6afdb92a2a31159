use image::ImageReader;
use std::path::Path;

use imagedex_core::error::{Error, Result};
use imagedex_core::traits::Thumbnailer;
use imagedex_core::types::Thumbnail;

/// Decodes with the `image` crate and shrinks to fit a square of
/// `max_pixel_size`, keeping the aspect ratio. Smaller images are kept as is.
#[derive(Debug, Clone, Copy)]
pub struct ImageThumbnailer {
    max_pixel_size: u32,
}

impl ImageThumbnailer {
    pub fn new(max_pixel_size: u32) -> Self {
        Self { max_pixel_size: max_pixel_size.max(1) }
    }
}

impl Default for ImageThumbnailer {
    fn default() -> Self { Self::new(256) }
}

impl Thumbnailer for ImageThumbnailer {
    fn thumbnail(&self, path: &Path) -> Result<Thumbnail> {
        let decoded = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| Error::Thumbnail(format!("{}: {}", path.display(), e)))?;
        let fitted = if decoded.width().max(decoded.height()) > self.max_pixel_size {
            decoded.thumbnail(self.max_pixel_size, self.max_pixel_size)
        } else {
            decoded
        };
        Ok(Thumbnail::new(fitted.to_rgba8()))
    }
}

/// Used when thumbnails are disabled in config.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThumbnails;

impl Thumbnailer for NoThumbnails {
    fn thumbnail(&self, path: &Path) -> Result<Thumbnail> {
        Err(Error::Thumbnail(format!("thumbnails disabled ({})", path.display())))
    }
}
