//! Bound material parameters.
//!
//! A [`ParameterSet`] is the declarative output of parameter binding: render
//! state, feature flags, scalar/color values, and texture slot assignments.
//! It records references only; binding never fetches or uploads anything.

use std::sync::Arc;

use bitflags::bitflags;

use crate::material::{AlphaMode, UvTransform};
use crate::shader::TextureSlot;
use crate::texture::TextureImage;

/// Blend factor for the color output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// 0.0
    Zero,
    /// 1.0
    One,
    /// Source alpha
    SrcAlpha,
    /// 1 - source alpha
    OneMinusSrcAlpha,
    /// Destination alpha
    DstAlpha,
    /// 1 - destination alpha
    OneMinusDstAlpha,
}

/// Source and destination blend factors, when blending is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendPair {
    /// Source factor.
    pub src: BlendFactor,
    /// Destination factor.
    pub dst: BlendFactor,
}

/// Render queue bucket a material sorts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderQueue {
    /// Default opaque geometry.
    #[default]
    Geometry,
    /// Alpha-tested geometry, drawn after opaque.
    Cutout,
    /// Alpha-blended geometry, drawn back-to-front last.
    Transparent,
}

impl RenderQueue {
    /// Numeric sort index of the bucket.
    pub fn sort_index(self) -> u32 {
        match self {
            Self::Geometry => 2000,
            Self::Cutout => 2450,
            Self::Transparent => 3000,
        }
    }
}

/// Face culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// Cull back faces (single-sided).
    #[default]
    Back,
    /// No culling (double-sided).
    Off,
}

/// Fixed-function render state derived from the alpha mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    /// Blend factors, or `None` when blending is disabled.
    pub blend: Option<BlendPair>,
    /// Whether depth writes are enabled.
    pub depth_write: bool,
    /// Render queue bucket.
    pub queue: RenderQueue,
    /// Face culling mode.
    pub cull_mode: CullMode,
}

impl RenderState {
    /// Render state for an alpha mode.
    ///
    /// | mode | blend | depth write | queue |
    /// |------|-------|-------------|-------|
    /// | Opaque | none | on | Geometry |
    /// | Mask | One / Zero | on | Cutout |
    /// | Blend | One / OneMinusSrcAlpha | off | Transparent |
    pub fn for_alpha_mode(mode: AlphaMode) -> Self {
        match mode {
            AlphaMode::Opaque => Self {
                blend: None,
                depth_write: true,
                queue: RenderQueue::Geometry,
                cull_mode: CullMode::Back,
            },
            AlphaMode::Mask => Self {
                blend: Some(BlendPair {
                    src: BlendFactor::One,
                    dst: BlendFactor::Zero,
                }),
                depth_write: true,
                queue: RenderQueue::Cutout,
                cull_mode: CullMode::Back,
            },
            AlphaMode::Blend => Self {
                blend: Some(BlendPair {
                    src: BlendFactor::One,
                    dst: BlendFactor::OneMinusSrcAlpha,
                }),
                depth_write: false,
                queue: RenderQueue::Transparent,
                cull_mode: CullMode::Back,
            },
        }
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::for_alpha_mode(AlphaMode::Opaque)
    }
}

bitflags! {
    /// Shader feature flags (keywords) toggled by the binder.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialFeatures: u32 {
        /// Directional lighting (always on for the unified pipeline).
        const DIRECTIONAL_LIGHT = 1 << 0;
        /// Specular highlights (always on for the unified pipeline).
        const SPECULAR_HIGHLIGHTS = 1 << 1;
        /// Alpha testing against the cutoff.
        const ALPHA_TEST = 1 << 2;
        /// Premultiplied alpha blending.
        const ALPHA_PREMULTIPLY = 1 << 3;
        /// Sample the packed channel map.
        const CHANNEL_MAP = 1 << 4;
        /// Sample the normal map.
        const NORMAL_MAP = 1 << 5;
        /// Emission enabled.
        const EMISSION = 1 << 6;
        /// Sample the raw metallic-roughness map (legacy metallic).
        const METALLIC_GLOSS_MAP = 1 << 7;
        /// Sample the specular-glossiness map (legacy specular).
        const SPEC_GLOSS_MAP = 1 << 8;
    }
}

impl MaterialFeatures {
    /// Feature flags implied by an alpha mode.
    pub fn for_alpha_mode(mode: AlphaMode) -> Self {
        match mode {
            AlphaMode::Opaque => Self::empty(),
            AlphaMode::Mask => Self::ALPHA_TEST,
            AlphaMode::Blend => Self::ALPHA_PREMULTIPLY,
        }
    }
}

/// A texture assignment recorded in a [`ParameterSet`].
#[derive(Debug, Clone)]
pub struct TextureBinding {
    /// Slot the image is bound to.
    pub slot: TextureSlot,
    /// The bound image.
    pub image: Arc<TextureImage>,
    /// Texture coordinate set index.
    pub uv_channel: u32,
    /// UV transform applied by the bind hooks, if any.
    pub transform: Option<UvTransform>,
}

/// All parameters bound for a single material.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    /// Fixed-function render state.
    pub render_state: RenderState,
    /// Toggled shader features.
    pub features: MaterialFeatures,
    /// Base color / diffuse factor (linear RGBA).
    pub base_color: [f32; 4],
    /// Metallic factor (metallic-roughness workflows).
    pub metallic: Option<f32>,
    /// Roughness factor (legacy metallic workflow).
    pub roughness: Option<f32>,
    /// Smoothness (unified pipeline; inverse-roughness scale).
    pub smoothness: Option<f32>,
    /// Specular color factor (legacy specular workflow).
    pub specular_color: Option<[f32; 3]>,
    /// Glossiness factor (legacy specular workflow).
    pub glossiness: Option<f32>,
    /// Emissive color, when emission is enabled.
    pub emissive_color: Option<[f32; 3]>,
    /// Normal map scale, when a normal map is bound.
    pub normal_scale: Option<f32>,
    /// Alpha cutoff threshold (mask mode only).
    pub alpha_cutoff: Option<f32>,
    textures: Vec<TextureBinding>,
}

impl ParameterSet {
    /// Create a parameter set with render state and feature flags derived
    /// from the alpha mode, everything else at defaults.
    pub fn for_alpha_mode(mode: AlphaMode) -> Self {
        Self {
            render_state: RenderState::for_alpha_mode(mode),
            features: MaterialFeatures::for_alpha_mode(mode),
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: None,
            roughness: None,
            smoothness: None,
            specular_color: None,
            glossiness: None,
            emissive_color: None,
            normal_scale: None,
            alpha_cutoff: None,
            textures: Vec::new(),
        }
    }

    /// Record a texture assignment, replacing any previous binding in the
    /// same slot.
    pub fn bind_texture(&mut self, binding: TextureBinding) {
        if let Some(existing) = self.textures.iter_mut().find(|b| b.slot == binding.slot) {
            *existing = binding;
        } else {
            self.textures.push(binding);
        }
    }

    /// The binding in `slot`, if one was recorded.
    pub fn texture(&self, slot: TextureSlot) -> Option<&TextureBinding> {
        self.textures.iter().find(|b| b.slot == slot)
    }

    /// Whether `slot` has a binding.
    pub fn has_texture(&self, slot: TextureSlot) -> bool {
        self.texture(slot).is_some()
    }

    /// All recorded texture assignments.
    pub fn textures(&self) -> &[TextureBinding] {
        &self.textures
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::for_alpha_mode(AlphaMode::Opaque)
    }
}

static_assertions::assert_impl_all!(ParameterSet: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{ColorSpace, Rgba};

    #[test]
    fn opaque_render_state() {
        let state = RenderState::for_alpha_mode(AlphaMode::Opaque);
        assert!(state.blend.is_none());
        assert!(state.depth_write);
        assert_eq!(state.queue, RenderQueue::Geometry);
    }

    #[test]
    fn mask_render_state() {
        let state = RenderState::for_alpha_mode(AlphaMode::Mask);
        assert_eq!(
            state.blend,
            Some(BlendPair {
                src: BlendFactor::One,
                dst: BlendFactor::Zero,
            })
        );
        assert!(state.depth_write);
        assert_eq!(state.queue, RenderQueue::Cutout);
        assert_eq!(state.queue.sort_index(), 2450);
    }

    #[test]
    fn blend_render_state() {
        let state = RenderState::for_alpha_mode(AlphaMode::Blend);
        assert_eq!(
            state.blend,
            Some(BlendPair {
                src: BlendFactor::One,
                dst: BlendFactor::OneMinusSrcAlpha,
            })
        );
        assert!(!state.depth_write);
        assert_eq!(state.queue.sort_index(), 3000);
    }

    #[test]
    fn alpha_mode_features() {
        assert_eq!(
            MaterialFeatures::for_alpha_mode(AlphaMode::Opaque),
            MaterialFeatures::empty()
        );
        assert_eq!(
            MaterialFeatures::for_alpha_mode(AlphaMode::Mask),
            MaterialFeatures::ALPHA_TEST
        );
        assert_eq!(
            MaterialFeatures::for_alpha_mode(AlphaMode::Blend),
            MaterialFeatures::ALPHA_PREMULTIPLY
        );
    }

    #[test]
    fn bind_texture_replaces_same_slot() {
        let first = Arc::new(TextureImage::solid(Rgba::BLACK, ColorSpace::Srgb));
        let second = Arc::new(TextureImage::solid(Rgba::WHITE, ColorSpace::Srgb));

        let mut params = ParameterSet::default();
        params.bind_texture(TextureBinding {
            slot: TextureSlot::Main,
            image: Arc::clone(&first),
            uv_channel: 0,
            transform: None,
        });
        params.bind_texture(TextureBinding {
            slot: TextureSlot::Main,
            image: Arc::clone(&second),
            uv_channel: 1,
            transform: None,
        });

        assert_eq!(params.textures().len(), 1);
        let binding = params.texture(TextureSlot::Main).unwrap();
        assert!(Arc::ptr_eq(&binding.image, &second));
        assert_eq!(binding.uv_channel, 1);
    }
}
