//! Cooperative material resolution.
//!
//! The resolution task is an explicit state machine
//! (`Pending → FetchingTextures → Packing → Binding → Completed`) driven by
//! an external scheduler that calls `resume()` until completion. Suspension
//! points sit exactly at texture-fetch boundaries and, within a batch, once
//! after each completed material, so a single thread can interleave many
//! resolutions, progress reporting, and cancellation checks.
//!
//! No anomaly aborts a task: missing or out-of-range textures, unreadable
//! images, and unavailable shaders all degrade to a partial material with a
//! recorded [`ResolveIssue`](crate::error::ResolveIssue).
//!
//! # Example
//!
//! ```ignore
//! use gltf_material_resolver::resolve::{MaterialBatchTask, ResolveContext};
//!
//! let mut batch = MaterialBatchTask::new(descriptors)
//!     .with_progress(|p| println!("import {:.0}%", p * 100.0));
//! let ctx = ResolveContext::new(&resolver, &registry, &settings);
//! while !batch.resume(&ctx).is_terminal() {}
//! let materials = batch.into_materials();
//! ```

mod batch;
mod cancellation;
mod task;

pub use batch::{BatchState, MaterialBatchTask};
pub use cancellation::CancellationToken;
pub use task::{MaterialResolveTask, ResolveContext, ResolvedMaterial, TaskState};
