//! Single-material resolution task.
//!
//! [`MaterialResolveTask`] is an explicit state machine driven by repeated
//! [`resume`](MaterialResolveTask::resume) calls. Each resume performs one
//! unit of work; the boundary between resumes is the cooperative suspension
//! point where a driver can interleave other work, report progress, or
//! cancel. Texture fetches happen one per resume, in a fixed order.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::binder::{FetchedImages, ParameterBinder, ParameterSet};
use crate::error::ResolveIssue;
use crate::material::{MaterialDescriptor, PbrWorkflow, TextureReference};
use crate::shader::{
    select_pipeline, PipelineKind, ShaderLookup, ShaderProgram, ShaderSettings,
};
use crate::texture::{pack_channel_map, ColorSpace, TextureImage, TextureResolver};

use super::cancellation::CancellationToken;

/// Borrowed collaborators a task needs while resuming.
///
/// All collaborators are read-only; tasks own no shared state and need no
/// locks.
pub struct ResolveContext<'a> {
    /// Texture collection the descriptor's indices point into.
    pub textures: &'a dyn TextureResolver,
    /// Runtime shader registry.
    pub registry: &'a dyn ShaderLookup,
    /// Configured shader programs.
    pub settings: &'a ShaderSettings,
    /// Texture bind hooks for the legacy pipeline.
    pub hooks: &'a [crate::binder::TextureBindHook],
}

impl<'a> ResolveContext<'a> {
    /// Create a context with the default bind hooks.
    pub fn new(
        textures: &'a dyn TextureResolver,
        registry: &'a dyn ShaderLookup,
        settings: &'a ShaderSettings,
    ) -> Self {
        Self {
            textures,
            registry,
            settings,
            hooks: crate::binder::DEFAULT_BIND_HOOKS,
        }
    }

    /// Replace the texture bind hooks.
    pub fn with_hooks(mut self, hooks: &'a [crate::binder::TextureBindHook]) -> Self {
        self.hooks = hooks;
        self
    }
}

/// State of a [`MaterialResolveTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Not started.
    Pending,
    /// Fetching referenced textures, one per resume.
    FetchingTextures,
    /// Producing the packed channel map (unified pipeline only).
    Packing,
    /// Binding parameters.
    Binding,
    /// Finished; the material is available via
    /// [`take_material`](MaterialResolveTask::take_material).
    Completed,
    /// Cancelled through the cancellation token before completion.
    Cancelled,
}

impl TaskState {
    /// Whether the task will make no further progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// A fully resolved material, produced exactly once per descriptor.
///
/// Owned by the caller after the task completes; the task holds no lingering
/// reference. The shader program plus parameter set is the renderer-facing
/// bundle a host turns into its own material object.
#[derive(Debug, Clone)]
pub struct ResolvedMaterial {
    /// Display name: the descriptor's name, or `material{i}` for unnamed
    /// descriptors at batch position `i`.
    pub name: String,
    /// The shader program the material targets.
    pub shader: ShaderProgram,
    /// Bound parameters.
    pub params: ParameterSet,
}

static_assertions::assert_impl_all!(ResolvedMaterial: Send, Sync);

/// Which image a planned fetch feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchSlot {
    BaseColor,
    Occlusion,
    MetallicRoughness,
    Normal,
    Emissive,
    SpecularGlossiness,
}

/// One pending texture fetch.
#[derive(Debug, Clone, Copy)]
struct PlannedFetch {
    slot: FetchSlot,
    index: usize,
    color_space: ColorSpace,
}

/// Asynchronous orchestrator resolving one material.
///
/// Drive it with a loop:
///
/// ```ignore
/// let mut task = MaterialResolveTask::new(descriptor, 0);
/// while !task.resume(&ctx).is_terminal() {}
/// let material = task.take_material();
/// ```
pub struct MaterialResolveTask {
    descriptor: MaterialDescriptor,
    batch_index: usize,
    state: TaskState,
    pipeline: Option<PipelineKind>,
    plan: VecDeque<PlannedFetch>,
    images: FetchedImages,
    issues: Vec<ResolveIssue>,
    token: Option<CancellationToken>,
    material: Option<ResolvedMaterial>,
}

impl MaterialResolveTask {
    /// Create a task for `descriptor` at position `batch_index` in its batch
    /// (used only to synthesize a name for unnamed materials).
    pub fn new(descriptor: MaterialDescriptor, batch_index: usize) -> Self {
        Self {
            descriptor,
            batch_index,
            state: TaskState::Pending,
            pipeline: None,
            plan: VecDeque::new(),
            images: FetchedImages::default(),
            issues: Vec::new(),
            token: None,
            material: None,
        }
    }

    /// Attach a cancellation token, checked at every suspension point.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Current state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// The pipeline selected for this material (after the first resume).
    pub fn pipeline(&self) -> Option<PipelineKind> {
        self.pipeline
    }

    /// Diagnostics recorded so far.
    pub fn issues(&self) -> &[ResolveIssue] {
        &self.issues
    }

    /// Take the resolved material. Returns `Some` exactly once, after the
    /// task reaches [`TaskState::Completed`].
    pub fn take_material(&mut self) -> Option<ResolvedMaterial> {
        self.material.take()
    }

    /// Perform one unit of work and return the new state.
    ///
    /// Terminal states are sticky; resuming a finished task is a no-op.
    pub fn resume(&mut self, ctx: &ResolveContext<'_>) -> TaskState {
        if self.state.is_terminal() {
            return self.state;
        }
        if self.cancelled() {
            // Release partially-acquired image buffers.
            self.images = FetchedImages::default();
            self.plan.clear();
            self.state = TaskState::Cancelled;
            return self.state;
        }

        match self.state {
            TaskState::Pending => {
                let pipeline = select_pipeline(ctx.registry, ctx.settings);
                self.plan = plan_fetches(&self.descriptor, pipeline);
                self.pipeline = Some(pipeline);
                self.state = TaskState::FetchingTextures;
            }
            TaskState::FetchingTextures => {
                if let Some(fetch) = self.plan.pop_front() {
                    let image = self.try_fetch(ctx.textures, fetch);
                    self.store(fetch.slot, image);
                }
                if self.plan.is_empty() {
                    self.state = TaskState::Packing;
                }
            }
            TaskState::Packing => {
                self.pack();
                self.state = TaskState::Binding;
            }
            TaskState::Binding => {
                let binder =
                    ParameterBinder::new(ctx.registry, ctx.settings).with_hooks(ctx.hooks);
                let pipeline = self.pipeline.unwrap_or(PipelineKind::Legacy);
                let (shader, params) =
                    binder.bind(&self.descriptor, pipeline, &self.images, &mut self.issues);

                let name = match &self.descriptor.name {
                    Some(name) if !name.is_empty() => name.clone(),
                    _ => format!("material{}", self.batch_index),
                };
                self.material = Some(ResolvedMaterial {
                    name,
                    shader,
                    params,
                });
                self.state = TaskState::Completed;
            }
            TaskState::Completed | TaskState::Cancelled => unreachable!(),
        }

        self.state
    }

    /// Drive the task until it reaches a terminal state.
    pub fn run_to_completion(&mut self, ctx: &ResolveContext<'_>) -> TaskState {
        while !self.state.is_terminal() {
            self.resume(ctx);
        }
        self.state
    }

    fn cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Fetch one texture, degrading out-of-range indices to a null image
    /// with a diagnostic.
    fn try_fetch(
        &mut self,
        textures: &dyn TextureResolver,
        fetch: PlannedFetch,
    ) -> Option<Arc<TextureImage>> {
        let available = textures.len();
        if fetch.index >= available {
            log::warn!(
                "attempted to get texture index {} when only {} exist",
                fetch.index,
                available
            );
            self.issues.push(ResolveIssue::MissingTexture {
                index: fetch.index,
                available,
            });
            return None;
        }
        textures.fetch(fetch.index, fetch.color_space)
    }

    fn store(&mut self, slot: FetchSlot, image: Option<Arc<TextureImage>>) {
        match slot {
            FetchSlot::BaseColor => self.images.base_color = image,
            FetchSlot::Occlusion => self.images.occlusion = image,
            FetchSlot::MetallicRoughness => self.images.metallic_roughness = image,
            FetchSlot::Normal => self.images.normal = image,
            FetchSlot::Emissive => self.images.emissive = image,
            FetchSlot::SpecularGlossiness => self.images.specular_glossiness = image,
        }
    }

    /// Produce the packed channel map when the unified pipeline has a
    /// metallic-roughness image. An unreadable image disables the feature
    /// instead of failing.
    fn pack(&mut self) {
        if self.pipeline != Some(PipelineKind::Unified) {
            return;
        }
        let Some(metallic_roughness) = &self.images.metallic_roughness else {
            return;
        };
        if !metallic_roughness.is_readable() {
            let name = metallic_roughness
                .name
                .clone()
                .unwrap_or_else(|| "<metallic-roughness>".to_string());
            log::warn!("image `{name}` is not CPU-readable; channel map disabled");
            self.issues.push(ResolveIssue::UnreadableImage { name });
            return;
        }
        self.images.channel_map =
            pack_channel_map(metallic_roughness, self.images.occlusion.as_deref()).map(Arc::new);
    }
}

/// Build the fetch plan for a descriptor under the selected pipeline.
///
/// Fixed order: base/diffuse, occlusion, metallic-roughness, normal,
/// emissive, specular-glossiness. Only slots the pipeline consumes are
/// planned; the fallback path (no workflow under the legacy pipeline) plans
/// nothing.
fn plan_fetches(descriptor: &MaterialDescriptor, pipeline: PipelineKind) -> VecDeque<PlannedFetch> {
    let mut plan = VecDeque::new();
    let mut push = |slot: FetchSlot, reference: Option<&TextureReference>, color_space| {
        if let Some(index) = reference.and_then(|r| r.index) {
            plan.push_back(PlannedFetch {
                slot,
                index,
                color_space,
            });
        }
    };

    match (&descriptor.workflow, pipeline) {
        (Some(PbrWorkflow::MetallicRoughness(pbr)), PipelineKind::Unified) => {
            push(
                FetchSlot::BaseColor,
                pbr.base_color_texture.as_ref(),
                ColorSpace::Srgb,
            );
            // Occlusion only feeds the channel map, so it is skipped unless
            // a metallic-roughness image will be packed.
            if pbr.metallic_roughness_texture.is_some() {
                push(
                    FetchSlot::Occlusion,
                    descriptor.occlusion_texture.as_ref(),
                    ColorSpace::Linear,
                );
            }
            push(
                FetchSlot::MetallicRoughness,
                pbr.metallic_roughness_texture.as_ref(),
                ColorSpace::Linear,
            );
            push(
                FetchSlot::Normal,
                descriptor.normal_texture.as_ref(),
                ColorSpace::Linear,
            );
            push(
                FetchSlot::Emissive,
                descriptor.emissive_texture.as_ref(),
                ColorSpace::Srgb,
            );
        }
        (Some(PbrWorkflow::SpecularGlossiness(sg)), PipelineKind::Unified) => {
            push(
                FetchSlot::BaseColor,
                sg.diffuse_texture.as_ref(),
                ColorSpace::Srgb,
            );
            push(
                FetchSlot::Normal,
                descriptor.normal_texture.as_ref(),
                ColorSpace::Linear,
            );
            push(
                FetchSlot::Emissive,
                descriptor.emissive_texture.as_ref(),
                ColorSpace::Srgb,
            );
        }
        (None, PipelineKind::Unified) => {
            push(
                FetchSlot::Normal,
                descriptor.normal_texture.as_ref(),
                ColorSpace::Linear,
            );
            push(
                FetchSlot::Emissive,
                descriptor.emissive_texture.as_ref(),
                ColorSpace::Srgb,
            );
        }
        (Some(PbrWorkflow::MetallicRoughness(pbr)), PipelineKind::Legacy) => {
            push(
                FetchSlot::BaseColor,
                pbr.base_color_texture.as_ref(),
                ColorSpace::Srgb,
            );
            push(
                FetchSlot::Occlusion,
                descriptor.occlusion_texture.as_ref(),
                ColorSpace::Linear,
            );
            push(
                FetchSlot::MetallicRoughness,
                pbr.metallic_roughness_texture.as_ref(),
                ColorSpace::Linear,
            );
            push(
                FetchSlot::Normal,
                descriptor.normal_texture.as_ref(),
                ColorSpace::Linear,
            );
            push(
                FetchSlot::Emissive,
                descriptor.emissive_texture.as_ref(),
                ColorSpace::Srgb,
            );
        }
        (Some(PbrWorkflow::SpecularGlossiness(sg)), PipelineKind::Legacy) => {
            push(
                FetchSlot::BaseColor,
                sg.diffuse_texture.as_ref(),
                ColorSpace::Srgb,
            );
            push(
                FetchSlot::Occlusion,
                descriptor.occlusion_texture.as_ref(),
                ColorSpace::Linear,
            );
            push(
                FetchSlot::Normal,
                descriptor.normal_texture.as_ref(),
                ColorSpace::Linear,
            );
            push(
                FetchSlot::Emissive,
                descriptor.emissive_texture.as_ref(),
                ColorSpace::Srgb,
            );
            push(
                FetchSlot::SpecularGlossiness,
                sg.specular_glossiness_texture.as_ref(),
                ColorSpace::Srgb,
            );
        }
        // Fallback: minimal material, no texture assignments, no fetches.
        (None, PipelineKind::Legacy) => {}
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MetallicRoughness;
    use crate::shader::{ShaderLibrary, SlotMask, PACKED_CHANNEL_SHADER};
    use crate::texture::{Rgba, SliceResolver};

    fn unified_registry() -> ShaderLibrary {
        ShaderLibrary::new()
            .with_program(ShaderProgram::new(PACKED_CHANNEL_SHADER, SlotMask::all()))
    }

    fn textures(count: usize) -> Vec<Arc<TextureImage>> {
        (0..count)
            .map(|_| Arc::new(TextureImage::solid(Rgba::WHITE, ColorSpace::Srgb)))
            .collect()
    }

    fn full_descriptor() -> MaterialDescriptor {
        MaterialDescriptor::new()
            .with_workflow(PbrWorkflow::MetallicRoughness(MetallicRoughness {
                base_color_texture: Some(TextureReference::new(0)),
                metallic_roughness_texture: Some(TextureReference::new(1)),
                ..MetallicRoughness::default()
            }))
            .with_normal_texture(TextureReference::new(2))
    }

    #[test]
    fn states_advance_one_fetch_per_resume() {
        let images = textures(3);
        let resolver = SliceResolver::new(&images);
        let registry = unified_registry();
        let settings = ShaderSettings::new();
        let ctx = ResolveContext::new(&resolver, &registry, &settings);

        let mut task = MaterialResolveTask::new(full_descriptor(), 0);
        assert_eq!(task.state(), TaskState::Pending);

        // Pending -> FetchingTextures (plan: base, mr, normal; occlusion not
        // referenced).
        assert_eq!(task.resume(&ctx), TaskState::FetchingTextures);
        // Three fetches, one per resume; the last one also advances.
        assert_eq!(task.resume(&ctx), TaskState::FetchingTextures);
        assert_eq!(task.resume(&ctx), TaskState::FetchingTextures);
        assert_eq!(task.resume(&ctx), TaskState::Packing);
        assert_eq!(task.resume(&ctx), TaskState::Binding);
        assert_eq!(task.resume(&ctx), TaskState::Completed);

        let material = task.take_material().unwrap();
        assert_eq!(material.name, "material0");
        assert!(task.take_material().is_none());
    }

    #[test]
    fn terminal_state_is_sticky() {
        let resolver = SliceResolver::new(&[]);
        let registry = ShaderLibrary::new();
        let settings = ShaderSettings::new();
        let ctx = ResolveContext::new(&resolver, &registry, &settings);

        let mut task = MaterialResolveTask::new(MaterialDescriptor::new(), 0);
        task.run_to_completion(&ctx);
        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(task.resume(&ctx), TaskState::Completed);
    }

    #[test]
    fn out_of_range_index_degrades_to_null() {
        let images = textures(3);
        let resolver = SliceResolver::new(&images);
        let registry = unified_registry();
        let settings = ShaderSettings::new();
        let ctx = ResolveContext::new(&resolver, &registry, &settings);

        let descriptor = MaterialDescriptor::new().with_workflow(
            PbrWorkflow::MetallicRoughness(MetallicRoughness {
                base_color_texture: Some(TextureReference::new(7)),
                ..MetallicRoughness::default()
            }),
        );

        let mut task = MaterialResolveTask::new(descriptor, 0);
        task.run_to_completion(&ctx);

        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(
            task.issues(),
            &[ResolveIssue::MissingTexture {
                index: 7,
                available: 3,
            }]
        );
        let material = task.take_material().unwrap();
        assert!(!material
            .params
            .has_texture(crate::shader::TextureSlot::Main));
    }

    #[test]
    fn cancellation_releases_images_and_produces_nothing() {
        let images = textures(3);
        let resolver = SliceResolver::new(&images);
        let registry = unified_registry();
        let settings = ShaderSettings::new();
        let ctx = ResolveContext::new(&resolver, &registry, &settings);

        let token = CancellationToken::new();
        let mut task =
            MaterialResolveTask::new(full_descriptor(), 0).with_cancellation(token.clone());

        // Start fetching, then cancel between suspension points.
        task.resume(&ctx);
        task.resume(&ctx);
        token.cancel();

        assert_eq!(task.resume(&ctx), TaskState::Cancelled);
        assert!(task.take_material().is_none());
        assert_eq!(task.resume(&ctx), TaskState::Cancelled);
    }

    #[test]
    fn unreadable_metallic_roughness_disables_channel_map() {
        let images = vec![
            Arc::new(TextureImage::solid(Rgba::WHITE, ColorSpace::Srgb)),
            Arc::new(TextureImage::gpu_resident(8, 8, ColorSpace::Linear, 42).with_name("mr")),
        ];
        let resolver = SliceResolver::new(&images);
        let registry = unified_registry();
        let settings = ShaderSettings::new();
        let ctx = ResolveContext::new(&resolver, &registry, &settings);

        let descriptor = MaterialDescriptor::new().with_workflow(
            PbrWorkflow::MetallicRoughness(MetallicRoughness {
                base_color_texture: Some(TextureReference::new(0)),
                metallic_roughness_texture: Some(TextureReference::new(1)),
                ..MetallicRoughness::default()
            }),
        );

        let mut task = MaterialResolveTask::new(descriptor, 0);
        task.run_to_completion(&ctx);

        assert_eq!(
            task.issues(),
            &[ResolveIssue::UnreadableImage { name: "mr".into() }]
        );
        let material = task.take_material().unwrap();
        assert!(!material
            .params
            .features
            .contains(crate::binder::MaterialFeatures::CHANNEL_MAP));
    }

    #[test]
    fn named_descriptor_keeps_its_name() {
        let resolver = SliceResolver::new(&[]);
        let registry = ShaderLibrary::new();
        let settings = ShaderSettings::new();
        let ctx = ResolveContext::new(&resolver, &registry, &settings);

        let mut task =
            MaterialResolveTask::new(MaterialDescriptor::new().with_name("Rock"), 5);
        task.run_to_completion(&ctx);
        assert_eq!(task.take_material().unwrap().name, "Rock");
    }

    #[test]
    fn empty_name_synthesizes_from_batch_position() {
        let resolver = SliceResolver::new(&[]);
        let registry = ShaderLibrary::new();
        let settings = ShaderSettings::new();
        let ctx = ResolveContext::new(&resolver, &registry, &settings);

        let mut task = MaterialResolveTask::new(MaterialDescriptor::new().with_name(""), 2);
        task.run_to_completion(&ctx);
        assert_eq!(task.take_material().unwrap().name, "material2");
    }
}
