//! Parameter binding.
//!
//! Maps a [`MaterialDescriptor`](crate::material::MaterialDescriptor) plus
//! the images fetched for it onto the selected pipeline's parameter set:
//! render state from the alpha mode, feature flags, scalar and color values,
//! and texture slot assignments. Binding records references; it performs no
//! I/O and no pixel work.

mod bind;
mod params;

pub use bind::{
    apply_uv_transform, FetchedImages, ParameterBinder, TextureBindHook, DEFAULT_BIND_HOOKS,
};
pub use params::{
    BlendFactor, BlendPair, CullMode, MaterialFeatures, ParameterSet, RenderQueue, RenderState,
    TextureBinding,
};
