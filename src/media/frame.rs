use crate::foundation::core::{FrameSize, Rotation};
use crate::foundation::error::{OverlayError, OverlayResult};

/// One opaque video frame as straight (non-premultiplied) RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Wrap raw bytes, validating their length.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> OverlayResult<Self> {
        let expected = FrameSize::new(width, height).rgba_len();
        if width == 0 || height == 0 {
            return Err(OverlayError::validation("frame width/height must be non-zero"));
        }
        if data.len() != expected {
            return Err(OverlayError::validation(format!(
                "frame data has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with one color.
    pub fn solid(size: FrameSize, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(size.rgba_len());
        for _ in 0..(size.width as usize * size.height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width: size.width,
            height: size.height,
            data,
        }
    }

    /// Frame dimensions.
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ])
    }

    /// Copy into an [`image::RgbaImage`].
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Take ownership of an [`image::RgbaImage`].
    pub fn from_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    /// Copy rotated clockwise by `rotation`.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        if rotation == Rotation::Deg0 {
            return self.clone();
        }
        Self::from_image(rotate_image(&self.to_image(), rotation))
    }

    /// Luma copy for analysis.
    pub fn to_luma(&self) -> image::GrayImage {
        image::imageops::grayscale(&self.to_image())
    }
}

/// Rotate an image clockwise by `rotation`.
pub fn rotate_image<P>(
    img: &image::ImageBuffer<P, Vec<P::Subpixel>>,
    rotation: Rotation,
) -> image::ImageBuffer<P, Vec<P::Subpixel>>
where
    P: image::Pixel + 'static,
{
    match rotation {
        Rotation::Deg0 => img.clone(),
        Rotation::Deg90 => image::imageops::rotate90(img),
        Rotation::Deg180 => image::imageops::rotate180(img),
        Rotation::Deg270 => image::imageops::rotate270(img),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/frame.rs"]
mod tests;
