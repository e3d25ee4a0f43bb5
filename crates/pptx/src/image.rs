//! Pictures embedded in slides.

use ::image::ImageReader;
use std::io::Cursor;
use std::path::Path;

/// Raster formats that can be embedded in a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Map a decoder format onto the formats a slide can carry.
    pub fn from_decoded(format: ::image::ImageFormat) -> Option<Self> {
        match format {
            ::image::ImageFormat::Png => Some(Self::Png),
            ::image::ImageFormat::Jpeg => Some(Self::Jpeg),
            ::image::ImageFormat::Gif => Some(Self::Gif),
            ::image::ImageFormat::Bmp => Some(Self::Bmp),
            ::image::ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }

    /// File extension used for the media part.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// MIME type registered in `[Content_Types].xml`.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }
}

/// A picture loaded from disk, ready to embed.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Load an image, returning `None` if it is missing or not a supported raster.
    pub fn load(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                log::debug!("Skipping image '{}': {}", path.display(), e);
                return None;
            }
        };

        match Self::from_bytes(data) {
            Ok(image) => Some(image),
            Err(reason) => {
                log::warn!("Skipping image '{}': {}", path.display(), reason);
                None
            }
        }
    }

    /// Detect the format and read the pixel size of in-memory image data.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, String> {
        let reader = ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .map_err(|e| e.to_string())?;

        let format = reader
            .format()
            .and_then(ImageFormat::from_decoded)
            .ok_or_else(|| "unsupported format".to_string())?;

        let (width_px, height_px) = reader.into_dimensions().map_err(|e| e.to_string())?;
        if width_px == 0 || height_px == 0 {
            return Err("empty image".to_string());
        }

        Ok(Self {
            data,
            format,
            width_px,
            height_px,
        })
    }

    /// Height for the given display width, preserving aspect ratio.
    pub fn height_for_width(&self, width: i64) -> i64 {
        (width as f64 * self.height_px as f64 / self.width_px as f64).round() as i64
    }
}
