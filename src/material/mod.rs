//! Declarative material model.
//!
//! The types here describe *what* a material is (the glTF material model:
//! workflow parameters, texture references, alpha state). How those fields
//! become shader parameters is the [`binder`](crate::binder) module's job;
//! fetching the referenced textures is the [`resolve`](crate::resolve)
//! module's job.

mod types;

pub use types::{
    AlphaMode, MaterialDescriptor, MetallicRoughness, PbrWorkflow, SpecularGlossiness,
    TextureReference, UvTransform,
};
