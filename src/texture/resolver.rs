//! Texture retrieval abstraction.

use std::sync::Arc;

use super::types::{ColorSpace, TextureImage};

/// Index-addressable access to decoded textures.
///
/// The resolution pipeline fetches every texture through this trait; how the
/// images are decoded, cached, or reference-counted is the implementor's
/// concern. A `None` result always means "no texture"; implementations must
/// never panic on a bad index.
pub trait TextureResolver {
    /// Number of textures the collection declares.
    fn len(&self) -> usize;

    /// Whether the collection declares no textures.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the decoded image at `index`.
    ///
    /// `color_space` is a decode hint: implementations that decode lazily
    /// should interpret the source data accordingly. Returns `None` when the
    /// index is out of range or the image is unavailable.
    fn fetch(&self, index: usize, color_space: ColorSpace) -> Option<Arc<TextureImage>>;
}

/// [`TextureResolver`] backed by a slice of already-decoded images.
///
/// The decode hint is ignored; each image carries its own color space.
pub struct SliceResolver<'a> {
    textures: &'a [Arc<TextureImage>],
}

impl<'a> SliceResolver<'a> {
    /// Create a resolver over a slice of decoded images.
    pub fn new(textures: &'a [Arc<TextureImage>]) -> Self {
        Self { textures }
    }
}

impl TextureResolver for SliceResolver<'_> {
    fn len(&self) -> usize {
        self.textures.len()
    }

    fn fetch(&self, index: usize, _color_space: ColorSpace) -> Option<Arc<TextureImage>> {
        self.textures.get(index).cloned()
    }
}
