//! # glTF Material Resolver
//!
//! Converts declarative glTF material descriptions into renderer-ready
//! shader parameter sets, targeting one of two shading pipelines:
//!
//! - **Unified**: a single program sampling one packed channel map
//!   (metallic, occlusion, and smoothness merged into one texture).
//! - **Legacy**: per-workflow program pairs (metallic-roughness and
//!   specular-glossiness) without channel packing.
//!
//! The core is the cooperative resolution pipeline: pipeline selection from
//! runtime shader availability, one-at-a-time texture fetching through an
//! injected resolver, CPU-side channel packing, and conditional parameter
//! binding, all driven by a scheduler calling `resume()` until completion.
//! Anomalies (missing textures, unreadable images, unavailable shaders)
//! degrade to partial materials with diagnostics; an import never fails.
//!
//! # Example
//!
//! ```
//! use gltf_material_resolver::material::{MaterialDescriptor, MetallicRoughness, PbrWorkflow};
//! use gltf_material_resolver::resolve::{MaterialBatchTask, ResolveContext};
//! use gltf_material_resolver::shader::{ShaderLibrary, ShaderSettings};
//! use gltf_material_resolver::texture::SliceResolver;
//!
//! let descriptors = vec![MaterialDescriptor::new()
//!     .with_name("Rock")
//!     .with_workflow(PbrWorkflow::MetallicRoughness(MetallicRoughness::default()))];
//!
//! let resolver = SliceResolver::new(&[]);
//! let registry = ShaderLibrary::new();
//! let settings = ShaderSettings::new();
//! let ctx = ResolveContext::new(&resolver, &registry, &settings);
//!
//! let mut batch = MaterialBatchTask::new(descriptors);
//! while !batch.resume(&ctx).is_terminal() {}
//!
//! let materials = batch.into_materials();
//! assert_eq!(materials[0].name, "Rock");
//! ```

pub mod binder;
pub mod error;
#[cfg(feature = "gltf")]
pub mod gltf;
pub mod material;
pub mod resolve;
pub mod shader;
pub mod texture;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
