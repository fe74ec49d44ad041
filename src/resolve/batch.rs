//! Batch resolution with progress reporting.

use crate::error::ResolveIssue;
use crate::material::MaterialDescriptor;

use super::cancellation::CancellationToken;
use super::task::{MaterialResolveTask, ResolveContext, ResolvedMaterial, TaskState};

/// State of a [`MaterialBatchTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// More work remains.
    InProgress,
    /// All materials resolved; results are available.
    Completed,
    /// Cancelled through the cancellation token.
    Cancelled,
}

impl BatchState {
    /// Whether the batch will make no further progress.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Resolves an ordered collection of materials cooperatively.
///
/// Each [`resume`](Self::resume) call advances the current material's task by
/// one unit; after a material completes the batch emits a progress value and
/// yields once before starting the next, so a driver can interleave many
/// batches (or other work) without blocking.
///
/// Progress values are strictly increasing and reach exactly `1.0` when all
/// materials are done (immediately, for an empty input).
pub struct MaterialBatchTask {
    descriptors: Vec<MaterialDescriptor>,
    next: usize,
    current: Option<MaterialResolveTask>,
    results: Vec<ResolvedMaterial>,
    issues: Vec<ResolveIssue>,
    progress: f32,
    on_progress: Option<Box<dyn FnMut(f32) + Send>>,
    token: Option<CancellationToken>,
    state: BatchState,
    yield_before_next: bool,
}

impl MaterialBatchTask {
    /// Create a batch over `descriptors`.
    pub fn new(descriptors: Vec<MaterialDescriptor>) -> Self {
        Self {
            descriptors,
            next: 0,
            current: None,
            results: Vec::new(),
            issues: Vec::new(),
            progress: 0.0,
            on_progress: None,
            token: None,
            state: BatchState::InProgress,
            yield_before_next: false,
        }
    }

    /// Register a progress callback, invoked with a value in `[0, 1]` after
    /// each material completes.
    pub fn with_progress(mut self, callback: impl FnMut(f32) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Attach a cancellation token shared with every material task.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Current state.
    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Latest progress value.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Materials resolved so far, index-aligned with the input descriptors.
    pub fn materials(&self) -> &[ResolvedMaterial] {
        &self.results
    }

    /// Diagnostics accumulated across all materials.
    pub fn issues(&self) -> &[ResolveIssue] {
        &self.issues
    }

    /// Consume the batch and return the resolved materials.
    pub fn into_materials(self) -> Vec<ResolvedMaterial> {
        self.results
    }

    /// Perform one unit of work and return the new state.
    pub fn resume(&mut self, ctx: &ResolveContext<'_>) -> BatchState {
        if self.state.is_terminal() {
            return self.state;
        }
        if self
            .token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            self.current = None;
            self.state = BatchState::Cancelled;
            return self.state;
        }

        // Empty input completes immediately with a single full-progress
        // emission.
        if self.descriptors.is_empty() {
            self.emit_progress(1.0);
            self.state = BatchState::Completed;
            return self.state;
        }

        // The post-material suspension point: one resume that does nothing
        // but hand control back to the driver.
        if self.yield_before_next {
            self.yield_before_next = false;
            return self.state;
        }

        if self.current.is_none() {
            let mut task =
                MaterialResolveTask::new(self.descriptors[self.next].clone(), self.next);
            if let Some(token) = &self.token {
                task = task.with_cancellation(token.clone());
            }
            self.current = Some(task);
        }

        let Some(task) = self.current.as_mut() else {
            return self.state;
        };
        match task.resume(ctx) {
            TaskState::Completed => {
                self.issues.extend(task.issues().iter().cloned());
                if let Some(material) = task.take_material() {
                    self.results.push(material);
                }
                self.current = None;
                self.next += 1;

                let fraction = self.next as f32 / self.descriptors.len() as f32;
                self.emit_progress(fraction);

                if self.next == self.descriptors.len() {
                    self.state = BatchState::Completed;
                } else {
                    self.yield_before_next = true;
                }
            }
            TaskState::Cancelled => {
                self.current = None;
                self.state = BatchState::Cancelled;
            }
            _ => {}
        }

        self.state
    }

    /// Drive the batch until it reaches a terminal state.
    pub fn run_to_completion(&mut self, ctx: &ResolveContext<'_>) -> BatchState {
        while !self.state.is_terminal() {
            self.resume(ctx);
        }
        self.state
    }

    fn emit_progress(&mut self, value: f32) {
        self.progress = value;
        if let Some(callback) = &mut self.on_progress {
            callback(value);
        }
    }
}
