//! Shader program handles and resolution configuration.

use std::sync::Arc;

use bitflags::bitflags;

/// Name of the unified packed-channel shader program looked up in the
/// registry to decide pipeline selection.
pub const PACKED_CHANNEL_SHADER: &str = "Graphics Tools/Standard";

/// Name of the default-lit shader program used by the fallback path.
pub const DEFAULT_LIT_SHADER: &str = "Standard";

/// Texture parameter slot on a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Base color / diffuse texture.
    Main,
    /// Packed channel map (unified pipeline).
    ChannelMap,
    /// Tangent-space normal map.
    NormalMap,
    /// Ambient occlusion map (legacy pipeline).
    OcclusionMap,
    /// Emission map.
    EmissionMap,
    /// Raw metallic-roughness map (legacy metallic pipeline).
    MetallicGlossMap,
    /// Combined specular-glossiness map (legacy specular pipeline).
    SpecGlossMap,
}

impl TextureSlot {
    /// The corresponding bit in a [`SlotMask`].
    pub fn mask(self) -> SlotMask {
        match self {
            Self::Main => SlotMask::MAIN,
            Self::ChannelMap => SlotMask::CHANNEL_MAP,
            Self::NormalMap => SlotMask::NORMAL_MAP,
            Self::OcclusionMap => SlotMask::OCCLUSION_MAP,
            Self::EmissionMap => SlotMask::EMISSION_MAP,
            Self::MetallicGlossMap => SlotMask::METALLIC_GLOSS_MAP,
            Self::SpecGlossMap => SlotMask::SPEC_GLOSS_MAP,
        }
    }
}

bitflags! {
    /// Set of texture slots a shader program exposes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SlotMask: u32 {
        /// Base color / diffuse texture slot.
        const MAIN = 1 << 0;
        /// Packed channel map slot.
        const CHANNEL_MAP = 1 << 1;
        /// Normal map slot.
        const NORMAL_MAP = 1 << 2;
        /// Occlusion map slot.
        const OCCLUSION_MAP = 1 << 3;
        /// Emission map slot.
        const EMISSION_MAP = 1 << 4;
        /// Metallic-roughness map slot.
        const METALLIC_GLOSS_MAP = 1 << 5;
        /// Specular-glossiness map slot.
        const SPEC_GLOSS_MAP = 1 << 6;
    }
}

/// Cheap-to-clone handle to a shader program.
///
/// Carries the program name and the set of texture slots the program
/// exposes, so the binder can gate optional features (e.g. emission) on
/// whether the program actually has the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    name: Arc<str>,
    slots: SlotMask,
}

impl ShaderProgram {
    /// Create a program handle.
    pub fn new(name: impl Into<Arc<str>>, slots: SlotMask) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    /// Program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All texture slots the program exposes.
    pub fn slots(&self) -> SlotMask {
        self.slots
    }

    /// Whether the program exposes `slot`.
    pub fn has_slot(&self, slot: TextureSlot) -> bool {
        self.slots.contains(slot.mask())
    }
}

/// Lookup of shader programs by name.
///
/// Stands in for the runtime shader registry. Injected into the pipeline so
/// that selection is deterministic and testable; availability is re-queried
/// on every resolution since programs can appear or disappear at runtime
/// (e.g. hot reload).
pub trait ShaderLookup {
    /// Resolve a program by name, if the runtime has it.
    fn find(&self, name: &str) -> Option<ShaderProgram>;
}

/// Simple in-memory [`ShaderLookup`] implementation.
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary {
    programs: Vec<ShaderProgram>,
}

impl ShaderLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a program.
    pub fn with_program(mut self, program: ShaderProgram) -> Self {
        self.insert(program);
        self
    }

    /// Add or replace a program with the same name.
    pub fn insert(&mut self, program: ShaderProgram) {
        if let Some(existing) = self.programs.iter_mut().find(|p| p.name == program.name) {
            *existing = program;
        } else {
            self.programs.push(program);
        }
    }
}

impl ShaderLookup for ShaderLibrary {
    fn find(&self, name: &str) -> Option<ShaderProgram> {
        self.programs.iter().find(|p| p.name() == name).cloned()
    }
}

/// Configured shader programs for material resolution.
///
/// All fields are optional: a missing program degrades to a best-effort
/// default material with a diagnostic instead of failing the resolution.
#[derive(Debug, Clone, Default)]
pub struct ShaderSettings {
    /// Explicit override; when set, the unified pipeline is always selected
    /// and this program is used for every material.
    pub override_shader: Option<ShaderProgram>,
    /// Reserved unified metallic-workflow override. Carried for configuration
    /// parity; the packed-channel program is currently resolved from the
    /// registry by name.
    pub unified_metallic: Option<ShaderProgram>,
    /// Reserved unified specular-workflow override, likewise unused.
    pub unified_specular: Option<ShaderProgram>,
    /// Legacy metallic-roughness program (opaque and mask modes).
    pub legacy_metallic: Option<ShaderProgram>,
    /// Legacy metallic-roughness program for blend mode.
    pub legacy_metallic_blend: Option<ShaderProgram>,
    /// Legacy specular-glossiness program (opaque and mask modes).
    pub legacy_specular: Option<ShaderProgram>,
    /// Legacy specular-glossiness program for blend mode.
    pub legacy_specular_blend: Option<ShaderProgram>,
}

impl ShaderSettings {
    /// Create empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the override program.
    pub fn with_override(mut self, program: ShaderProgram) -> Self {
        self.override_shader = Some(program);
        self
    }

    /// Set the legacy metallic-roughness programs (base and blend variants).
    pub fn with_legacy_metallic(mut self, base: ShaderProgram, blend: ShaderProgram) -> Self {
        self.legacy_metallic = Some(base);
        self.legacy_metallic_blend = Some(blend);
        self
    }

    /// Set the legacy specular-glossiness programs (base and blend variants).
    pub fn with_legacy_specular(mut self, base: ShaderProgram, blend: ShaderProgram) -> Self {
        self.legacy_specular = Some(base);
        self.legacy_specular_blend = Some(blend);
        self
    }
}

/// Which shading pipeline a material resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    /// Single program with a packed channel map.
    Unified,
    /// Per-workflow program pairs without channel packing.
    Legacy,
}
