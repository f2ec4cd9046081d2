//! # streamweave-dag
//!
//! Topology capture for StreamWeave pipelines. The engine calls a
//! [ConstructionHook] each time it builds a stage; the hook records the stage
//! and its input/output channels into the [Dag] of the current build session,
//! so schedulers, validators and visualizers can inspect the pipeline shape
//! without the engine doing any graph bookkeeping itself.
//!
//! ## Architecture
//!
//! - [extract]: channel lists out of construction parameters ([ParamBundle] or
//!   [StageDescriptor]); never fails.
//! - [dag]: thread-safe, append-only store of [Stage]s and their [Port]s, with
//!   derived [Edge]s.
//! - [interceptor]: the [StageInterceptor] hook.
//! - [session]: [SessionLookup] and [BuildSession], passed explicitly to the hook.
//!
//! The crate only emits `tracing` events; installing a subscriber is up to the host.

pub mod dag;
pub mod error;
#[cfg(test)]
mod error_test;
pub mod extract;
pub mod interceptor;
#[cfg(test)]
mod interceptor_test;
pub mod session;
#[cfg(test)]
mod test_support;
pub mod types;

pub use dag::{Dag, DagOptions};
pub use error::DagError;
pub use extract::{
  ChannelParams, INPUTS_KEY, OUTPUTS_KEY, ParamBundle, ParamValue, extract_inputs, extract_outputs,
};
pub use interceptor::{
  ConstructionHook, InterceptorOptions, Registration, SkipReason, StageInterceptor,
};
pub use session::{BuildSession, NoSession, SessionLookup};
pub use types::{
  ChannelRef, DagSnapshot, Edge, NodeHandle, Port, PortDirection, Stage, StageDescriptor,
};
