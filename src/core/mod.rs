//! The processor core: pipeline controller, functional units, caches and
//! their composition.

/// The assembled core (pipeline plus caches).
pub mod cpu;

/// The five-stage pipeline controller.
pub mod pipeline;

/// Per-cycle status and external request types.
pub mod status;

/// Functional units (ALU, caches).
pub mod units;

pub use cpu::{Core, CoreInput, CoreOutput};
pub use status::{ExceptionReason, ExternalRequest, PipelineStatus, StallReason};
