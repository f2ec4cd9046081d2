//! Construction hook that records every stage the engine builds into a DAG.
//!
//! The engine calls [ConstructionHook::stage_constructed] right after it builds
//! a stage, passing the build's [SessionLookup], the stage itself (for its
//! label) and the raw construction parameters. The hook never reports failure
//! to the engine: events without channel metadata are skipped, a missing
//! session falls back to a DAG private to the interceptor, and malformed
//! channel lists read as empty.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{error, instrument, trace, warn};

use crate::dag::{Dag, DagOptions};
use crate::error::DagError;
use crate::extract::{ChannelParams, ParamBundle};
use crate::session::SessionLookup;
use crate::types::{NodeHandle, StageDescriptor};

/// Options for [StageInterceptor].
#[derive(Debug, Clone, Default)]
pub struct InterceptorOptions {
  /// Register a stage whose parameters name the channel keys but list no
  /// channels. Off by default: such a stage has no edges to show.
  pub register_portless: bool,
  /// Options for the fallback DAG created when no session is active.
  pub fallback_dag: DagOptions,
}

/// Why a construction event was not recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// The engine passed no parameters.
  NoParams,
  /// The parameters are neither a [ParamBundle] nor a [StageDescriptor].
  UnrecognizedParams,
  /// The parameters carry no channels.
  NoChannels,
}

impl fmt::Display for SkipReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SkipReason::NoParams => write!(f, "no parameters"),
      SkipReason::UnrecognizedParams => write!(f, "unrecognized parameters"),
      SkipReason::NoChannels => write!(f, "no channels"),
    }
  }
}

/// Outcome of one construction event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
  Registered(NodeHandle),
  Skipped(SkipReason),
  /// The DAG rejected the stage. Only reachable through a bug.
  Failed(DagError),
}

impl Registration {
  pub fn node(&self) -> Option<NodeHandle> {
    match self {
      Registration::Registered(handle) => Some(*handle),
      _ => None,
    }
  }
}

/// Callback the engine invokes once per constructed stage.
pub trait ConstructionHook: Send + Sync {
  fn stage_constructed(
    &self,
    ctx: &dyn SessionLookup,
    stage: &dyn fmt::Display,
    params: Option<&(dyn Any + Send + Sync)>,
  ) -> Registration;
}

/// [ConstructionHook] that registers stages and their channel bindings.
#[derive(Debug, Default)]
pub struct StageInterceptor {
  options: InterceptorOptions,
  fallback: OnceCell<Arc<Dag>>,
}

impl StageInterceptor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_options(options: InterceptorOptions) -> Self {
    Self {
      options,
      fallback: OnceCell::new(),
    }
  }

  pub fn options(&self) -> &InterceptorOptions {
    &self.options
  }

  /// The private DAG used while no session was active, if one was ever needed.
  pub fn fallback_dag(&self) -> Option<Arc<Dag>> {
    self.fallback.get().cloned()
  }

  /// Whether this interceptor has had to record into its fallback DAG.
  pub fn is_degraded(&self) -> bool {
    self.fallback.get().is_some()
  }

  /// Session DAG if one is active, otherwise the fallback (created on first use).
  fn resolve_dag(&self, ctx: &dyn SessionLookup) -> Arc<Dag> {
    if let Some(dag) = ctx.current_dag() {
      return dag;
    }
    let dag = self.fallback.get_or_init(|| {
      warn!("no build session found, recording stages into a private fallback DAG");
      Arc::new(Dag::with_options(self.options.fallback_dag.clone()))
    });
    Arc::clone(dag)
  }

  /// Records a stage built from typed parameters.
  ///
  /// This is the path [ConstructionHook::stage_constructed] takes once it has
  /// recognized the parameters.
  #[instrument(level = "trace", skip_all, fields(stage = %stage))]
  pub(crate) fn register(
    &self,
    ctx: &dyn SessionLookup,
    stage: &dyn fmt::Display,
    params: &dyn ChannelParams,
  ) -> Registration {
    if !params.has_channel_metadata() {
      trace!(stage = %stage, reason = %SkipReason::NoChannels, "stage not registered");
      return Registration::Skipped(SkipReason::NoChannels);
    }
    let inputs = params.input_channels();
    let outputs = params.output_channels();
    if inputs.is_empty() && outputs.is_empty() && !self.options.register_portless {
      trace!(stage = %stage, reason = %SkipReason::NoChannels, "stage not registered");
      return Registration::Skipped(SkipReason::NoChannels);
    }

    // Resolved only once there is something to record, so skipped events
    // never create the fallback DAG or log the no-session warning.
    let dag = self.resolve_dag(ctx);
    let label = stage.to_string();
    match dag.register_stage(&label, &inputs, &outputs) {
      Ok(handle) => {
        trace!(
          stage = %label,
          node = %handle,
          inputs = inputs.len(),
          outputs = outputs.len(),
          "stage registered"
        );
        Registration::Registered(handle)
      }
      Err(e) => {
        error!(stage = %label, error = %e, "failed to register stage");
        if cfg!(debug_assertions) {
          panic!("DAG rejected stage {}: {}", label, e);
        }
        Registration::Failed(e)
      }
    }
  }
}

/// Recognizes the parameter shapes that carry channel metadata.
fn classify(
  params: Option<&(dyn Any + Send + Sync)>,
) -> Result<&dyn ChannelParams, SkipReason> {
  let params = params.ok_or(SkipReason::NoParams)?;
  if let Some(bundle) = params.downcast_ref::<ParamBundle>() {
    return Ok(bundle as &dyn ChannelParams);
  }
  if let Some(descriptor) = params.downcast_ref::<StageDescriptor>() {
    return Ok(descriptor as &dyn ChannelParams);
  }
  Err(SkipReason::UnrecognizedParams)
}

impl ConstructionHook for StageInterceptor {
  fn stage_constructed(
    &self,
    ctx: &dyn SessionLookup,
    stage: &dyn fmt::Display,
    params: Option<&(dyn Any + Send + Sync)>,
  ) -> Registration {
    match classify(params) {
      Ok(params) => self.register(ctx, stage, params),
      Err(reason) => {
        trace!(stage = %stage, reason = %reason, "not a graph-relevant construction");
        Registration::Skipped(reason)
      }
    }
  }
}
