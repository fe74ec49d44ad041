//! Pipeline variant selection.

use super::types::{PipelineKind, ShaderLookup, ShaderSettings, PACKED_CHANNEL_SHADER};

/// Decide which pipeline to target for the current resolution.
///
/// Returns [`PipelineKind::Unified`] when an override program is configured
/// or the registry resolves the packed-channel program, otherwise
/// [`PipelineKind::Legacy`]. No side effects and no caching: availability is
/// re-queried per call because registry contents can change at runtime.
pub fn select_pipeline(registry: &dyn ShaderLookup, settings: &ShaderSettings) -> PipelineKind {
    if settings.override_shader.is_some() {
        return PipelineKind::Unified;
    }
    if registry.find(PACKED_CHANNEL_SHADER).is_some() {
        PipelineKind::Unified
    } else {
        PipelineKind::Legacy
    }
}
