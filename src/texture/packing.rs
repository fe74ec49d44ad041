//! Channel packing for the unified pipeline.
//!
//! The unified shader samples one packed channel map instead of separate
//! metallic-roughness and occlusion textures. Packing is a pure, synchronous
//! pixel loop; it never touches GPU resources.

use super::types::{ColorSpace, Rgba, TextureImage};

/// Merge a metallic-roughness image and an optional occlusion image into one
/// packed channel map.
///
/// Per pixel:
///
/// | output | source |
/// |--------|--------|
/// | `r` | metallic-roughness `b` (glTF stores metallic in blue) |
/// | `g` | occlusion `r`, or `1.0` when no occlusion image |
/// | `b` | `0.0` (emission channel, unused here) |
/// | `a` | `1.0 - ` metallic-roughness `g` (roughness inverted to smoothness) |
///
/// Returns `None` when the metallic-roughness image is not CPU-readable; the
/// caller must leave the channel-map feature disabled in that case. An
/// occlusion image that is unreadable or has a different pixel count is
/// ignored with a warning, as if absent.
pub fn pack_channel_map(
    metallic_roughness: &TextureImage,
    occlusion: Option<&TextureImage>,
) -> Option<TextureImage> {
    let source = metallic_roughness.pixels()?;

    let occlusion_pixels = occlusion.and_then(|image| match image.pixels() {
        Some(pixels) if pixels.len() == source.len() => Some(pixels),
        Some(_) => {
            log::warn!(
                "occlusion image is {}x{} but metallic-roughness is {}x{}; ignoring occlusion",
                image.width,
                image.height,
                metallic_roughness.width,
                metallic_roughness.height,
            );
            None
        }
        None => {
            log::warn!("occlusion image is not CPU-readable; ignoring occlusion");
            None
        }
    });

    let packed = source
        .iter()
        .enumerate()
        .map(|(i, pixel)| Rgba {
            r: pixel.b,
            g: occlusion_pixels.map_or(1.0, |occl| occl[i].r),
            b: 0.0,
            a: 1.0 - pixel.g,
        })
        .collect();

    let mut result = TextureImage::from_pixels(
        metallic_roughness.width,
        metallic_roughness.height,
        ColorSpace::Linear,
        packed,
    );
    if let Some(name) = &metallic_roughness.name {
        result = result.with_name(format!("{name}_channel_map"));
    }
    Some(result)
}
