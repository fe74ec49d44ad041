//! Material descriptor data types.
//!
//! A [`MaterialDescriptor`] is the declarative, read-only input to the
//! resolution pipeline. It mirrors the glTF 2.0 material model: one of two
//! mutually exclusive PBR workflows plus the workflow-independent texture
//! references, emissive factor, and alpha state.

/// UV-coordinate transform (`KHR_texture_transform` shape).
///
/// Applied to a bound texture slot after assignment by the default texture
/// bind hook (see [`crate::binder::apply_uv_transform`]).
#[derive(Debug, Clone, PartialEq)]
pub struct UvTransform {
    /// Offset applied to UV coordinates.
    pub offset: [f32; 2],
    /// Rotation in radians, counter-clockwise around the UV origin.
    pub rotation: f32,
    /// Scale applied to UV coordinates.
    pub scale: [f32; 2],
    /// Overriding texture coordinate set, if the transform redirects it.
    pub uv_channel: Option<u32>,
}

impl Default for UvTransform {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.0],
            rotation: 0.0,
            scale: [1.0, 1.0],
            uv_channel: None,
        }
    }
}

/// Reference to a texture in the owning document's texture array.
///
/// `index: None` means "no texture". Out-of-range indices are legal in the
/// descriptor; the resolution task degrades them to a null image with a
/// diagnostic instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureReference {
    /// Index into the texture collection, or `None` for "no texture".
    pub index: Option<usize>,
    /// Texture coordinate set index (0, 1, …).
    pub uv_channel: u32,
    /// Slot-dependent scalar: normal-map scale or occlusion strength.
    pub scale: f32,
    /// Optional UV transform extension data.
    pub transform: Option<UvTransform>,
}

impl TextureReference {
    /// Create a reference to the texture at `index`, UV set 0, scale 1.
    pub fn new(index: usize) -> Self {
        Self {
            index: Some(index),
            ..Self::default()
        }
    }

    /// Set the texture coordinate set index.
    pub fn with_uv_channel(mut self, uv_channel: u32) -> Self {
        self.uv_channel = uv_channel;
        self
    }

    /// Set the slot-dependent scale factor.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Attach a UV transform.
    pub fn with_transform(mut self, transform: UvTransform) -> Self {
        self.transform = Some(transform);
        self
    }
}

impl Default for TextureReference {
    fn default() -> Self {
        Self {
            index: None,
            uv_channel: 0,
            scale: 1.0,
            transform: None,
        }
    }
}

/// Alpha rendering mode.
///
/// Affects render state (blend configuration), not shader bindings. The
/// cutoff threshold lives on [`MaterialDescriptor::alpha_cutoff`] and is
/// only meaningful in [`Mask`](Self::Mask) mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Fully opaque (alpha ignored).
    #[default]
    Opaque,
    /// Alpha masking: fragments below the cutoff are discarded.
    Mask,
    /// Full alpha blending.
    Blend,
}

/// Metallic-roughness workflow parameters (glTF core PBR model).
#[derive(Debug, Clone, PartialEq)]
pub struct MetallicRoughness {
    /// Base color factor (linear RGBA).
    pub base_color_factor: [f32; 4],
    /// Base color texture.
    pub base_color_texture: Option<TextureReference>,
    /// Metallic factor.
    pub metallic_factor: f32,
    /// Roughness factor.
    pub roughness_factor: f32,
    /// Metallic-roughness texture (glTF: B = metallic, G = roughness).
    pub metallic_roughness_texture: Option<TextureReference>,
}

impl Default for MetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
        }
    }
}

/// Specular-glossiness workflow parameters
/// (`KHR_materials_pbrSpecularGlossiness` extension).
#[derive(Debug, Clone, PartialEq)]
pub struct SpecularGlossiness {
    /// Reflected diffuse factor (linear RGBA).
    pub diffuse_factor: [f32; 4],
    /// Diffuse texture.
    pub diffuse_texture: Option<TextureReference>,
    /// Specular color factor (linear RGB).
    pub specular_factor: [f32; 3],
    /// Glossiness factor.
    pub glossiness_factor: f32,
    /// Combined specular-glossiness texture.
    pub specular_glossiness_texture: Option<TextureReference>,
}

impl Default for SpecularGlossiness {
    fn default() -> Self {
        Self {
            diffuse_factor: [1.0, 1.0, 1.0, 1.0],
            diffuse_texture: None,
            specular_factor: [1.0, 1.0, 1.0],
            glossiness_factor: 1.0,
            specular_glossiness_texture: None,
        }
    }
}

/// PBR workflow: exactly one of the two parameter sets.
///
/// A material carries either metallic-roughness or specular-glossiness
/// parameters, never both. The "neither" state is
/// `Option::<PbrWorkflow>::None` on the descriptor and feeds the fallback
/// binding path.
#[derive(Debug, Clone, PartialEq)]
pub enum PbrWorkflow {
    /// glTF core metallic-roughness model.
    MetallicRoughness(MetallicRoughness),
    /// Specular-glossiness extension model.
    SpecularGlossiness(SpecularGlossiness),
}

/// Declarative material description, one per glTF material.
///
/// Immutable input to the resolution pipeline: the pipeline never mutates a
/// descriptor, and each descriptor is resolved at most once per task.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    /// Material name from the source document.
    pub name: Option<String>,
    /// Active PBR workflow, or `None` when the material declares neither.
    pub workflow: Option<PbrWorkflow>,
    /// Normal map texture (`scale` on the reference is the normal scale).
    pub normal_texture: Option<TextureReference>,
    /// Occlusion texture (`scale` on the reference is the strength).
    pub occlusion_texture: Option<TextureReference>,
    /// Emissive texture.
    pub emissive_texture: Option<TextureReference>,
    /// Emissive factor (linear RGB).
    pub emissive_factor: [f32; 3],
    /// Alpha rendering mode.
    pub alpha_mode: AlphaMode,
    /// Alpha cutoff threshold, meaningful only in [`AlphaMode::Mask`].
    pub alpha_cutoff: f32,
    /// Whether the material is double-sided.
    pub double_sided: bool,
}

impl MaterialDescriptor {
    /// Create an empty descriptor (no workflow, no textures, opaque).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the material name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the PBR workflow.
    pub fn with_workflow(mut self, workflow: PbrWorkflow) -> Self {
        self.workflow = Some(workflow);
        self
    }

    /// Set the normal map texture reference.
    pub fn with_normal_texture(mut self, reference: TextureReference) -> Self {
        self.normal_texture = Some(reference);
        self
    }

    /// Set the occlusion texture reference.
    pub fn with_occlusion_texture(mut self, reference: TextureReference) -> Self {
        self.occlusion_texture = Some(reference);
        self
    }

    /// Set the emissive texture reference.
    pub fn with_emissive_texture(mut self, reference: TextureReference) -> Self {
        self.emissive_texture = Some(reference);
        self
    }

    /// Set the emissive factor.
    pub fn with_emissive_factor(mut self, factor: [f32; 3]) -> Self {
        self.emissive_factor = factor;
        self
    }

    /// Set the alpha mode.
    pub fn with_alpha_mode(mut self, mode: AlphaMode) -> Self {
        self.alpha_mode = mode;
        self
    }

    /// Set the alpha cutoff threshold.
    pub fn with_alpha_cutoff(mut self, cutoff: f32) -> Self {
        self.alpha_cutoff = cutoff;
        self
    }

    /// Mark the material double-sided.
    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    /// Whether the emissive factor is non-black.
    pub fn has_emissive_factor(&self) -> bool {
        self.emissive_factor != [0.0, 0.0, 0.0]
    }
}

impl Default for MaterialDescriptor {
    fn default() -> Self {
        Self {
            name: None,
            workflow: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_defaults() {
        let descriptor = MaterialDescriptor::new();
        assert!(descriptor.name.is_none());
        assert!(descriptor.workflow.is_none());
        assert_eq!(descriptor.alpha_mode, AlphaMode::Opaque);
        assert_eq!(descriptor.alpha_cutoff, 0.5);
        assert!(!descriptor.double_sided);
        assert!(!descriptor.has_emissive_factor());
    }

    #[test]
    fn metallic_roughness_gltf_defaults() {
        let pbr = MetallicRoughness::default();
        assert_eq!(pbr.base_color_factor, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(pbr.metallic_factor, 1.0);
        assert_eq!(pbr.roughness_factor, 1.0);
        assert!(pbr.base_color_texture.is_none());
    }

    #[test]
    fn specular_glossiness_gltf_defaults() {
        let sg = SpecularGlossiness::default();
        assert_eq!(sg.diffuse_factor, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(sg.specular_factor, [1.0, 1.0, 1.0]);
        assert_eq!(sg.glossiness_factor, 1.0);
    }

    #[test]
    fn texture_reference_builder() {
        let reference = TextureReference::new(3)
            .with_uv_channel(1)
            .with_scale(0.75)
            .with_transform(UvTransform {
                offset: [0.5, 0.0],
                ..UvTransform::default()
            });
        assert_eq!(reference.index, Some(3));
        assert_eq!(reference.uv_channel, 1);
        assert_eq!(reference.scale, 0.75);
        assert_eq!(reference.transform.as_ref().map(|t| t.offset), Some([0.5, 0.0]));
    }

    #[test]
    fn workflow_is_exclusive() {
        let descriptor = MaterialDescriptor::new()
            .with_workflow(PbrWorkflow::MetallicRoughness(MetallicRoughness::default()));
        match descriptor.workflow {
            Some(PbrWorkflow::MetallicRoughness(_)) => {}
            other => panic!("unexpected workflow: {other:?}"),
        }
    }

    #[test]
    fn emissive_factor_detection() {
        let descriptor = MaterialDescriptor::new().with_emissive_factor([0.0, 0.2, 0.0]);
        assert!(descriptor.has_emissive_factor());
    }
}
