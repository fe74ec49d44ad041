//! CPU-side image buffers.

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

/// A single RGBA pixel with one `f32` per channel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Rgba {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a pixel from channel values.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Color space an image's pixel values are expressed in.
///
/// Passed as a hint to [`TextureResolver::fetch`](super::TextureResolver::fetch)
/// so that decoders can pick the right transfer function, and recorded on the
/// decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Linear values (data textures: normals, occlusion, metallic-roughness).
    Linear,
    /// sRGB-encoded values (color textures: base color, emissive).
    Srgb,
}

/// Backing storage of a [`TextureImage`].
#[derive(Debug, Clone)]
pub enum ImageData {
    /// CPU-addressable pixel buffer, row-major, `width * height` entries.
    Pixels(Vec<Rgba>),
    /// GPU-resident image; pixel data is not CPU-addressable.
    GpuResident {
        /// Opaque renderer-side handle.
        handle: u64,
    },
}

/// Error decoding an encoded image into a [`TextureImage`].
#[derive(Debug, Error)]
pub enum ImageDecodeError {
    /// The encoded bytes could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A width x height grid of RGBA pixels, or a GPU-resident placeholder.
///
/// Pixel operations (channel packing) require a CPU-readable buffer; callers
/// must check [`is_readable`](Self::is_readable) before touching pixels.
/// GPU-resident images still carry their dimensions and color space so they
/// can be bound to texture slots.
#[derive(Debug, Clone)]
pub struct TextureImage {
    /// Image name, when the source document provides one.
    pub name: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color space of the pixel values.
    pub color_space: ColorSpace,
    data: ImageData,
}

impl TextureImage {
    /// Create an image from a CPU pixel buffer.
    ///
    /// The buffer length must be `width * height`; a mismatched buffer is a
    /// caller bug and panics in debug builds.
    pub fn from_pixels(width: u32, height: u32, color_space: ColorSpace, pixels: Vec<Rgba>) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize));
        Self {
            name: None,
            width,
            height,
            color_space,
            data: ImageData::Pixels(pixels),
        }
    }

    /// Create a GPU-resident image that cannot be read back.
    pub fn gpu_resident(width: u32, height: u32, color_space: ColorSpace, handle: u64) -> Self {
        Self {
            name: None,
            width,
            height,
            color_space,
            data: ImageData::GpuResident { handle },
        }
    }

    /// Create a 1x1 image of a single color.
    pub fn solid(color: Rgba, color_space: ColorSpace) -> Self {
        Self::from_pixels(1, 1, color_space, vec![color])
    }

    /// Decode PNG/JPEG/etc. bytes into an RGBA image.
    ///
    /// Channel values are normalized from 8-bit to `[0, 1]` floats; the
    /// `color_space` argument records how the source values are encoded.
    pub fn from_encoded_bytes(bytes: &[u8], color_space: ColorSpace) -> Result<Self, ImageDecodeError> {
        let decoded = image::load_from_memory(bytes)?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba
            .pixels()
            .map(|p| {
                Rgba::new(
                    f32::from(p[0]) / 255.0,
                    f32::from(p[1]) / 255.0,
                    f32::from(p[2]) / 255.0,
                    f32::from(p[3]) / 255.0,
                )
            })
            .collect();
        Ok(Self::from_pixels(width, height, color_space, pixels))
    }

    /// Set the image name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether the pixel buffer is CPU-addressable.
    pub fn is_readable(&self) -> bool {
        matches!(self.data, ImageData::Pixels(_))
    }

    /// The pixel buffer, or `None` for GPU-resident images.
    pub fn pixels(&self) -> Option<&[Rgba]> {
        match &self.data {
            ImageData::Pixels(pixels) => Some(pixels),
            ImageData::GpuResident { .. } => None,
        }
    }

    /// The pixel buffer as raw bytes (for GPU upload), or `None` when not
    /// CPU-addressable.
    pub fn pixel_bytes(&self) -> Option<&[u8]> {
        self.pixels().map(bytemuck::cast_slice)
    }

    /// The renderer-side handle of a GPU-resident image.
    pub fn gpu_handle(&self) -> Option<u64> {
        match self.data {
            ImageData::GpuResident { handle } => Some(handle),
            ImageData::Pixels(_) => None,
        }
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_image_exposes_pixels() {
        let image = TextureImage::from_pixels(
            2,
            1,
            ColorSpace::Linear,
            vec![Rgba::BLACK, Rgba::WHITE],
        );
        assert!(image.is_readable());
        assert_eq!(image.pixel_count(), 2);
        assert_eq!(image.pixels().map(<[Rgba]>::len), Some(2));
    }

    #[test]
    fn gpu_resident_image_is_not_readable() {
        let image = TextureImage::gpu_resident(64, 64, ColorSpace::Srgb, 17);
        assert!(!image.is_readable());
        assert!(image.pixels().is_none());
        assert!(image.pixel_bytes().is_none());
        assert_eq!(image.gpu_handle(), Some(17));
        assert_eq!(image.pixel_count(), 64 * 64);
    }

    #[test]
    fn pixel_bytes_match_pixel_layout() {
        let image = TextureImage::solid(Rgba::new(1.0, 0.5, 0.25, 1.0), ColorSpace::Linear);
        let bytes = image.pixel_bytes().unwrap();
        assert_eq!(bytes.len(), std::mem::size_of::<Rgba>());
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes()[..]);
    }

    #[test]
    fn decode_round_trip() {
        // Encode a tiny RGBA image to PNG in memory, then decode it back.
        let mut encoded = Vec::new();
        let source = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 128, 0, 255]));
        source
            .write_to(
                &mut std::io::Cursor::new(&mut encoded),
                image::ImageFormat::Png,
            )
            .unwrap();

        let decoded = TextureImage::from_encoded_bytes(&encoded, ColorSpace::Srgb).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
        let first = decoded.pixels().unwrap()[0];
        assert_eq!(first.r, 1.0);
        assert_eq!(first.b, 0.0);
        assert!((first.g - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn decode_rejects_garbage() {
        let result = TextureImage::from_encoded_bytes(b"not an image", ColorSpace::Srgb);
        assert!(result.is_err());
    }
}
