//! Parameter binding: descriptor + fetched images -> parameter set.

use std::sync::Arc;

use crate::error::ResolveIssue;
use crate::material::{
    AlphaMode, MaterialDescriptor, MetallicRoughness, PbrWorkflow, SpecularGlossiness,
    TextureReference,
};
use crate::shader::{
    PipelineKind, ShaderLookup, ShaderProgram, ShaderSettings, SlotMask, TextureSlot,
    DEFAULT_LIT_SHADER, PACKED_CHANNEL_SHADER,
};
use crate::texture::TextureImage;

use super::params::{CullMode, MaterialFeatures, ParameterSet, TextureBinding};

/// Images fetched for one material, keyed by their role.
///
/// Slots that were not referenced, out of range, or unavailable are `None`.
/// `channel_map` holds the packed output produced between fetching and
/// binding, never a fetched image.
#[derive(Debug, Clone, Default)]
pub struct FetchedImages {
    /// Base color (metallic-roughness) or diffuse (specular-glossiness).
    pub base_color: Option<Arc<TextureImage>>,
    /// Ambient occlusion.
    pub occlusion: Option<Arc<TextureImage>>,
    /// Raw metallic-roughness.
    pub metallic_roughness: Option<Arc<TextureImage>>,
    /// Tangent-space normal map.
    pub normal: Option<Arc<TextureImage>>,
    /// Emissive.
    pub emissive: Option<Arc<TextureImage>>,
    /// Combined specular-glossiness.
    pub specular_glossiness: Option<Arc<TextureImage>>,
    /// Packed channel map produced by
    /// [`pack_channel_map`](crate::texture::pack_channel_map).
    pub channel_map: Option<Arc<TextureImage>>,
}

/// Hook invoked after a texture slot is assigned in the legacy pipeline.
///
/// Hooks run in order and may adjust the recorded binding; the default set
/// contains [`apply_uv_transform`].
pub type TextureBindHook = fn(&TextureReference, &mut TextureBinding);

/// Copy the reference's UV transform onto the binding.
pub fn apply_uv_transform(reference: &TextureReference, binding: &mut TextureBinding) {
    if let Some(transform) = &reference.transform {
        binding.transform = Some(transform.clone());
        if let Some(uv_channel) = transform.uv_channel {
            binding.uv_channel = uv_channel;
        }
    }
}

/// The hooks applied when none are configured.
pub const DEFAULT_BIND_HOOKS: &[TextureBindHook] = &[apply_uv_transform];

/// Maps a material descriptor onto a pipeline's parameter set.
///
/// Stateless apart from the injected collaborators; `bind` only constructs
/// the returned parameter set and records diagnostics, it never fetches.
pub struct ParameterBinder<'a> {
    registry: &'a dyn ShaderLookup,
    settings: &'a ShaderSettings,
    hooks: &'a [TextureBindHook],
}

impl<'a> ParameterBinder<'a> {
    /// Create a binder with the default bind hooks.
    pub fn new(registry: &'a dyn ShaderLookup, settings: &'a ShaderSettings) -> Self {
        Self {
            registry,
            settings,
            hooks: DEFAULT_BIND_HOOKS,
        }
    }

    /// Replace the texture bind hooks.
    pub fn with_hooks(mut self, hooks: &'a [TextureBindHook]) -> Self {
        self.hooks = hooks;
        self
    }

    /// Derive the shader program and parameter set for `descriptor` under
    /// the selected pipeline.
    pub fn bind(
        &self,
        descriptor: &MaterialDescriptor,
        pipeline: PipelineKind,
        images: &FetchedImages,
        issues: &mut Vec<ResolveIssue>,
    ) -> (ShaderProgram, ParameterSet) {
        match pipeline {
            PipelineKind::Unified => self.bind_unified(descriptor, images, issues),
            PipelineKind::Legacy => match &descriptor.workflow {
                Some(PbrWorkflow::MetallicRoughness(pbr)) => {
                    self.bind_legacy_metallic(descriptor, pbr, images, issues)
                }
                Some(PbrWorkflow::SpecularGlossiness(sg)) => {
                    self.bind_legacy_specular(descriptor, sg, images, issues)
                }
                None => self.bind_fallback(descriptor, issues),
            },
        }
    }

    fn bind_unified(
        &self,
        descriptor: &MaterialDescriptor,
        images: &FetchedImages,
        issues: &mut Vec<ResolveIssue>,
    ) -> (ShaderProgram, ParameterSet) {
        let program = self
            .settings
            .override_shader
            .clone()
            .or_else(|| self.registry.find(PACKED_CHANNEL_SHADER))
            .unwrap_or_else(|| self.missing_program(descriptor, PACKED_CHANNEL_SHADER, issues));

        let mut params = ParameterSet::for_alpha_mode(descriptor.alpha_mode);
        params.features |=
            MaterialFeatures::DIRECTIONAL_LIGHT | MaterialFeatures::SPECULAR_HIGHLIGHTS;

        match &descriptor.workflow {
            Some(PbrWorkflow::MetallicRoughness(pbr)) => {
                params.base_color = pbr.base_color_factor;
                if let Some(image) = &images.base_color {
                    self.assign(
                        &mut params,
                        TextureSlot::Main,
                        image,
                        pbr.base_color_texture.as_ref(),
                    );
                }
                // Smoothness uses the source's absolute-value inversion, not
                // a clamp: roughness 1.3 yields smoothness 0.3.
                params.smoothness = Some((pbr.roughness_factor - 1.0).abs());
                params.metallic = Some(pbr.metallic_factor);
                if let Some(channel_map) = &images.channel_map {
                    self.assign(
                        &mut params,
                        TextureSlot::ChannelMap,
                        channel_map,
                        pbr.metallic_roughness_texture.as_ref(),
                    );
                    params.features |= MaterialFeatures::CHANNEL_MAP;
                }
            }
            Some(PbrWorkflow::SpecularGlossiness(sg)) => {
                // The unified program has no specular workflow; glossiness
                // feeds the smoothness scalar directly.
                params.base_color = sg.diffuse_factor;
                if let Some(image) = &images.base_color {
                    self.assign(
                        &mut params,
                        TextureSlot::Main,
                        image,
                        sg.diffuse_texture.as_ref(),
                    );
                }
                params.smoothness = Some(sg.glossiness_factor);
            }
            None => {}
        }

        let wants_emission = images.emissive.is_some() || descriptor.has_emissive_factor();
        if wants_emission && program.has_slot(TextureSlot::EmissionMap) {
            params.features |= MaterialFeatures::EMISSION;
            params.emissive_color = Some(descriptor.emissive_factor);
            if let Some(image) = &images.emissive {
                self.assign(
                    &mut params,
                    TextureSlot::EmissionMap,
                    image,
                    descriptor.emissive_texture.as_ref(),
                );
            }
        }

        if let Some(image) = &images.normal {
            self.assign(
                &mut params,
                TextureSlot::NormalMap,
                image,
                descriptor.normal_texture.as_ref(),
            );
            params.normal_scale =
                Some(descriptor.normal_texture.as_ref().map_or(1.0, |r| r.scale));
            params.features |= MaterialFeatures::NORMAL_MAP;
        }

        if descriptor.double_sided {
            params.render_state.cull_mode = CullMode::Off;
        }

        (program, params)
    }

    fn bind_legacy_metallic(
        &self,
        descriptor: &MaterialDescriptor,
        pbr: &MetallicRoughness,
        images: &FetchedImages,
        issues: &mut Vec<ResolveIssue>,
    ) -> (ShaderProgram, ParameterSet) {
        let configured = match descriptor.alpha_mode {
            AlphaMode::Blend => &self.settings.legacy_metallic_blend,
            _ => &self.settings.legacy_metallic,
        };
        let program = configured
            .clone()
            .unwrap_or_else(|| self.missing_program(descriptor, "legacy metallic", issues));

        let mut params = ParameterSet::for_alpha_mode(descriptor.alpha_mode);
        params.base_color = pbr.base_color_factor;
        params.metallic = Some(pbr.metallic_factor);
        params.roughness = Some(pbr.roughness_factor);

        if let Some(image) = &images.base_color {
            self.assign_with_hooks(
                &mut params,
                TextureSlot::Main,
                image,
                pbr.base_color_texture.as_ref(),
            );
        }
        if let Some(image) = &images.metallic_roughness {
            self.assign_with_hooks(
                &mut params,
                TextureSlot::MetallicGlossMap,
                image,
                pbr.metallic_roughness_texture.as_ref(),
            );
            params.features |= MaterialFeatures::METALLIC_GLOSS_MAP;
        }

        self.bind_legacy_shared(descriptor, images, &mut params);
        (program, params)
    }

    fn bind_legacy_specular(
        &self,
        descriptor: &MaterialDescriptor,
        sg: &SpecularGlossiness,
        images: &FetchedImages,
        issues: &mut Vec<ResolveIssue>,
    ) -> (ShaderProgram, ParameterSet) {
        let configured = match descriptor.alpha_mode {
            AlphaMode::Blend => &self.settings.legacy_specular_blend,
            _ => &self.settings.legacy_specular,
        };
        let program = configured
            .clone()
            .unwrap_or_else(|| self.missing_program(descriptor, "legacy specular", issues));

        let mut params = ParameterSet::for_alpha_mode(descriptor.alpha_mode);
        params.base_color = sg.diffuse_factor;
        params.specular_color = Some(sg.specular_factor);
        params.glossiness = Some(sg.glossiness_factor);

        if let Some(image) = &images.base_color {
            self.assign_with_hooks(
                &mut params,
                TextureSlot::Main,
                image,
                sg.diffuse_texture.as_ref(),
            );
        }
        if let Some(image) = &images.specular_glossiness {
            self.assign_with_hooks(
                &mut params,
                TextureSlot::SpecGlossMap,
                image,
                sg.specular_glossiness_texture.as_ref(),
            );
            params.features |= MaterialFeatures::SPEC_GLOSS_MAP;
        }

        self.bind_legacy_shared(descriptor, images, &mut params);
        (program, params)
    }

    /// Texture and emissive assignments shared by both legacy workflows.
    fn bind_legacy_shared(
        &self,
        descriptor: &MaterialDescriptor,
        images: &FetchedImages,
        params: &mut ParameterSet,
    ) {
        if let Some(image) = &images.normal {
            self.assign_with_hooks(
                params,
                TextureSlot::NormalMap,
                image,
                descriptor.normal_texture.as_ref(),
            );
            params.normal_scale =
                Some(descriptor.normal_texture.as_ref().map_or(1.0, |r| r.scale));
            params.features |= MaterialFeatures::NORMAL_MAP;
        }

        if let Some(image) = &images.occlusion {
            self.assign_with_hooks(
                params,
                TextureSlot::OcclusionMap,
                image,
                descriptor.occlusion_texture.as_ref(),
            );
        }

        if descriptor.has_emissive_factor() || images.emissive.is_some() {
            params.features |= MaterialFeatures::EMISSION;
            params.emissive_color = Some(descriptor.emissive_factor);
        }
        if let Some(image) = &images.emissive {
            self.assign_with_hooks(
                params,
                TextureSlot::EmissionMap,
                image,
                descriptor.emissive_texture.as_ref(),
            );
        }

        if descriptor.alpha_mode == AlphaMode::Mask {
            params.alpha_cutoff = Some(descriptor.alpha_cutoff);
        }
    }

    fn bind_fallback(
        &self,
        descriptor: &MaterialDescriptor,
        issues: &mut Vec<ResolveIssue>,
    ) -> (ShaderProgram, ParameterSet) {
        let program = self
            .registry
            .find(DEFAULT_LIT_SHADER)
            .unwrap_or_else(|| self.missing_program(descriptor, DEFAULT_LIT_SHADER, issues));

        let mut params = ParameterSet::for_alpha_mode(descriptor.alpha_mode);
        if descriptor.has_emissive_factor() {
            params.features |= MaterialFeatures::EMISSION;
            params.emissive_color = Some(descriptor.emissive_factor);
        }
        if descriptor.alpha_mode == AlphaMode::Mask {
            params.alpha_cutoff = Some(descriptor.alpha_cutoff);
        }

        (program, params)
    }

    /// Record a texture assignment without running bind hooks (unified
    /// pipeline behavior).
    fn assign(
        &self,
        params: &mut ParameterSet,
        slot: TextureSlot,
        image: &Arc<TextureImage>,
        reference: Option<&TextureReference>,
    ) {
        params.bind_texture(TextureBinding {
            slot,
            image: Arc::clone(image),
            uv_channel: reference.map_or(0, |r| r.uv_channel),
            transform: None,
        });
    }

    /// Record a texture assignment and run the bind hooks on it.
    fn assign_with_hooks(
        &self,
        params: &mut ParameterSet,
        slot: TextureSlot,
        image: &Arc<TextureImage>,
        reference: Option<&TextureReference>,
    ) {
        let mut binding = TextureBinding {
            slot,
            image: Arc::clone(image),
            uv_channel: reference.map_or(0, |r| r.uv_channel),
            transform: None,
        };
        if let Some(reference) = reference {
            for hook in self.hooks {
                hook(reference, &mut binding);
            }
        }
        params.bind_texture(binding);
    }

    /// Record a missing-shader diagnostic and synthesize a placeholder.
    fn missing_program(
        &self,
        descriptor: &MaterialDescriptor,
        name: &str,
        issues: &mut Vec<ResolveIssue>,
    ) -> ShaderProgram {
        let material = descriptor
            .name
            .clone()
            .unwrap_or_else(|| "<unnamed>".to_string());
        log::warn!("shader program `{name}` unavailable for material `{material}`");
        issues.push(ResolveIssue::NoCompatibleShader { material });
        ShaderProgram::new(DEFAULT_LIT_SHADER, SlotMask::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::UvTransform;
    use crate::shader::ShaderLibrary;
    use crate::texture::{ColorSpace, Rgba};

    fn image() -> Arc<TextureImage> {
        Arc::new(TextureImage::solid(Rgba::WHITE, ColorSpace::Srgb))
    }

    fn unified_registry() -> ShaderLibrary {
        ShaderLibrary::new()
            .with_program(ShaderProgram::new(PACKED_CHANNEL_SHADER, SlotMask::all()))
    }

    fn legacy_settings() -> ShaderSettings {
        ShaderSettings::new()
            .with_legacy_metallic(
                ShaderProgram::new("lit/metallic", SlotMask::all()),
                ShaderProgram::new("lit/metallic-blend", SlotMask::all()),
            )
            .with_legacy_specular(
                ShaderProgram::new("lit/specular", SlotMask::all()),
                ShaderProgram::new("lit/specular-blend", SlotMask::all()),
            )
    }

    #[test]
    fn unified_sets_base_features_and_scalars() {
        let registry = unified_registry();
        let settings = ShaderSettings::new();
        let binder = ParameterBinder::new(&registry, &settings);

        let descriptor = MaterialDescriptor::new().with_workflow(PbrWorkflow::MetallicRoughness(
            MetallicRoughness {
                base_color_factor: [0.5, 0.25, 0.125, 1.0],
                metallic_factor: 0.7,
                roughness_factor: 0.4,
                ..MetallicRoughness::default()
            },
        ));

        let mut issues = Vec::new();
        let (program, params) = binder.bind(
            &descriptor,
            PipelineKind::Unified,
            &FetchedImages::default(),
            &mut issues,
        );

        assert_eq!(program.name(), PACKED_CHANNEL_SHADER);
        assert!(params.features.contains(MaterialFeatures::DIRECTIONAL_LIGHT));
        assert!(params
            .features
            .contains(MaterialFeatures::SPECULAR_HIGHLIGHTS));
        assert_eq!(params.base_color, [0.5, 0.25, 0.125, 1.0]);
        assert_eq!(params.metallic, Some(0.7));
        assert!((params.smoothness.unwrap() - 0.6).abs() < 1e-6);
        assert!(issues.is_empty());
    }

    #[test]
    fn unified_channel_map_binding() {
        let registry = unified_registry();
        let settings = ShaderSettings::new();
        let binder = ParameterBinder::new(&registry, &settings);

        let descriptor = MaterialDescriptor::new().with_workflow(PbrWorkflow::MetallicRoughness(
            MetallicRoughness {
                metallic_roughness_texture: Some(TextureReference::new(0).with_uv_channel(2)),
                ..MetallicRoughness::default()
            },
        ));
        let images = FetchedImages {
            channel_map: Some(image()),
            ..FetchedImages::default()
        };

        let mut issues = Vec::new();
        let (_, params) = binder.bind(&descriptor, PipelineKind::Unified, &images, &mut issues);

        assert!(params.features.contains(MaterialFeatures::CHANNEL_MAP));
        let binding = params.texture(TextureSlot::ChannelMap).unwrap();
        assert_eq!(binding.uv_channel, 2);
    }

    #[test]
    fn unified_emission_requires_program_slot() {
        let registry = ShaderLibrary::new().with_program(ShaderProgram::new(
            PACKED_CHANNEL_SHADER,
            SlotMask::MAIN | SlotMask::NORMAL_MAP,
        ));
        let settings = ShaderSettings::new();
        let binder = ParameterBinder::new(&registry, &settings);

        let descriptor = MaterialDescriptor::new().with_emissive_factor([1.0, 0.5, 0.0]);

        let mut issues = Vec::new();
        let (_, params) = binder.bind(
            &descriptor,
            PipelineKind::Unified,
            &FetchedImages::default(),
            &mut issues,
        );

        // Program has no emission slot: feature stays off, no error.
        assert!(!params.features.contains(MaterialFeatures::EMISSION));
        assert!(params.emissive_color.is_none());
        assert!(issues.is_empty());
    }

    #[test]
    fn unified_prefers_override_program() {
        let registry = unified_registry();
        let settings = ShaderSettings::new()
            .with_override(ShaderProgram::new("custom", SlotMask::MAIN));
        let binder = ParameterBinder::new(&registry, &settings);

        let mut issues = Vec::new();
        let (program, _) = binder.bind(
            &MaterialDescriptor::new(),
            PipelineKind::Unified,
            &FetchedImages::default(),
            &mut issues,
        );
        assert_eq!(program.name(), "custom");
    }

    #[test]
    fn legacy_metallic_picks_blend_variant() {
        let registry = ShaderLibrary::new();
        let settings = legacy_settings();
        let binder = ParameterBinder::new(&registry, &settings);

        let descriptor = MaterialDescriptor::new()
            .with_workflow(PbrWorkflow::MetallicRoughness(MetallicRoughness::default()))
            .with_alpha_mode(AlphaMode::Blend);

        let mut issues = Vec::new();
        let (program, _) = binder.bind(
            &descriptor,
            PipelineKind::Legacy,
            &FetchedImages::default(),
            &mut issues,
        );
        assert_eq!(program.name(), "lit/metallic-blend");
    }

    #[test]
    fn legacy_specular_scalars() {
        let registry = ShaderLibrary::new();
        let settings = legacy_settings();
        let binder = ParameterBinder::new(&registry, &settings);

        let descriptor = MaterialDescriptor::new().with_workflow(PbrWorkflow::SpecularGlossiness(
            SpecularGlossiness {
                diffuse_factor: [0.8, 0.7, 0.6, 1.0],
                specular_factor: [0.1, 0.2, 0.3],
                glossiness_factor: 0.9,
                ..SpecularGlossiness::default()
            },
        ));

        let mut issues = Vec::new();
        let (program, params) = binder.bind(
            &descriptor,
            PipelineKind::Legacy,
            &FetchedImages::default(),
            &mut issues,
        );

        assert_eq!(program.name(), "lit/specular");
        assert_eq!(params.base_color, [0.8, 0.7, 0.6, 1.0]);
        assert_eq!(params.specular_color, Some([0.1, 0.2, 0.3]));
        assert_eq!(params.glossiness, Some(0.9));
        // Specular workflow never produces metallic parameters.
        assert!(params.metallic.is_none());
        assert!(params.roughness.is_none());
    }

    #[test]
    fn legacy_mask_sets_cutoff() {
        let registry = ShaderLibrary::new();
        let settings = legacy_settings();
        let binder = ParameterBinder::new(&registry, &settings);

        let descriptor = MaterialDescriptor::new()
            .with_workflow(PbrWorkflow::MetallicRoughness(MetallicRoughness::default()))
            .with_alpha_mode(AlphaMode::Mask)
            .with_alpha_cutoff(0.33);

        let mut issues = Vec::new();
        let (_, params) = binder.bind(
            &descriptor,
            PipelineKind::Legacy,
            &FetchedImages::default(),
            &mut issues,
        );
        assert_eq!(params.alpha_cutoff, Some(0.33));
    }

    #[test]
    fn legacy_hooks_copy_uv_transform() {
        let registry = ShaderLibrary::new();
        let settings = legacy_settings();
        let binder = ParameterBinder::new(&registry, &settings);

        let transform = UvTransform {
            offset: [0.25, 0.5],
            uv_channel: Some(3),
            ..UvTransform::default()
        };
        let descriptor = MaterialDescriptor::new()
            .with_workflow(PbrWorkflow::MetallicRoughness(MetallicRoughness {
                base_color_texture: Some(TextureReference::new(0).with_transform(transform)),
                ..MetallicRoughness::default()
            }));
        let images = FetchedImages {
            base_color: Some(image()),
            ..FetchedImages::default()
        };

        let mut issues = Vec::new();
        let (_, params) = binder.bind(&descriptor, PipelineKind::Legacy, &images, &mut issues);

        let binding = params.texture(TextureSlot::Main).unwrap();
        let bound = binding.transform.as_ref().unwrap();
        assert_eq!(bound.offset, [0.25, 0.5]);
        assert_eq!(binding.uv_channel, 3);
    }

    #[test]
    fn fallback_is_minimal() {
        let registry = ShaderLibrary::new()
            .with_program(ShaderProgram::new(DEFAULT_LIT_SHADER, SlotMask::MAIN));
        let settings = ShaderSettings::new();
        let binder = ParameterBinder::new(&registry, &settings);

        let descriptor = MaterialDescriptor::new();
        let mut issues = Vec::new();
        let (program, params) = binder.bind(
            &descriptor,
            PipelineKind::Legacy,
            &FetchedImages::default(),
            &mut issues,
        );

        assert_eq!(program.name(), DEFAULT_LIT_SHADER);
        assert!(params.textures().is_empty());
        assert!(params.metallic.is_none());
        assert!(params.specular_color.is_none());
        assert!(issues.is_empty());
    }

    #[test]
    fn missing_legacy_program_degrades_with_issue() {
        let registry = ShaderLibrary::new();
        let settings = ShaderSettings::new(); // no legacy programs configured
        let binder = ParameterBinder::new(&registry, &settings);

        let descriptor = MaterialDescriptor::new()
            .with_name("Rock")
            .with_workflow(PbrWorkflow::MetallicRoughness(MetallicRoughness::default()));

        let mut issues = Vec::new();
        let (program, _) = binder.bind(
            &descriptor,
            PipelineKind::Legacy,
            &FetchedImages::default(),
            &mut issues,
        );

        assert_eq!(program.name(), DEFAULT_LIT_SHADER);
        assert_eq!(
            issues,
            vec![ResolveIssue::NoCompatibleShader {
                material: "Rock".to_string(),
            }]
        );
    }
}
