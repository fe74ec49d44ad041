//! Shader programs, settings, and pipeline selection.
//!
//! The resolution pipeline never compiles or owns shaders; it only holds
//! [`ShaderProgram`] handles resolved through an injected [`ShaderLookup`]
//! or supplied in [`ShaderSettings`]. [`select_pipeline`] picks between the
//! unified packed-channel pipeline and the legacy per-workflow pipeline.

mod selector;
mod types;

pub use selector::select_pipeline;
pub use types::{
    PipelineKind, ShaderLibrary, ShaderLookup, ShaderProgram, ShaderSettings, SlotMask,
    TextureSlot, DEFAULT_LIT_SHADER, PACKED_CHANNEL_SHADER,
};
