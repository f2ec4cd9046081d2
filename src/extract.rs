//! Channel-list extraction from stage construction parameters.
//!
//! Engines hand over either a loosely-typed [ParamBundle] or a typed
//! [StageDescriptor]; both are read through [ChannelParams]. Extraction never
//! fails: a missing key, or a value of an unexpected type, reads as an empty list.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::types::{ChannelRef, StageDescriptor};

/// Bundle key holding the ordered input channels of a stage.
pub const INPUTS_KEY: &str = "inputs";
/// Bundle key holding the ordered output channels of a stage.
pub const OUTPUTS_KEY: &str = "outputs";

/// One value of a [ParamBundle].
pub type ParamValue = Arc<dyn Any + Send + Sync>;

/// Loosely-typed construction parameters, as produced by the engine.
pub type ParamBundle = HashMap<String, ParamValue>;

/// Read access to the channel lists carried by construction parameters.
pub trait ChannelParams {
  /// Input channels in declaration order.
  fn input_channels(&self) -> Arc<[ChannelRef]>;

  /// Output channels in declaration order.
  fn output_channels(&self) -> Arc<[ChannelRef]>;

  /// Whether the parameters say anything about channels at all.
  fn has_channel_metadata(&self) -> bool;
}

/// Returns the input channels under [INPUTS_KEY], or an empty list.
pub fn extract_inputs(params: &ParamBundle) -> Arc<[ChannelRef]> {
  channels_under(params, INPUTS_KEY)
}

/// Returns the output channels under [OUTPUTS_KEY], or an empty list.
pub fn extract_outputs(params: &ParamBundle) -> Arc<[ChannelRef]> {
  channels_under(params, OUTPUTS_KEY)
}

fn channels_under(params: &ParamBundle, key: &str) -> Arc<[ChannelRef]> {
  let Some(value) = params.get(key) else {
    return Arc::from(Vec::new());
  };
  if let Some(list) = value.downcast_ref::<Vec<ChannelRef>>() {
    return Arc::from(list.as_slice());
  }
  if let Some(list) = value.downcast_ref::<Arc<[ChannelRef]>>() {
    return Arc::clone(list);
  }
  trace!(key, "parameter is not a channel list, reading as empty");
  Arc::from(Vec::new())
}

impl ChannelParams for ParamBundle {
  fn input_channels(&self) -> Arc<[ChannelRef]> {
    extract_inputs(self)
  }

  fn output_channels(&self) -> Arc<[ChannelRef]> {
    extract_outputs(self)
  }

  fn has_channel_metadata(&self) -> bool {
    self.contains_key(INPUTS_KEY) || self.contains_key(OUTPUTS_KEY)
  }
}

impl ChannelParams for StageDescriptor {
  fn input_channels(&self) -> Arc<[ChannelRef]> {
    self.inputs.as_deref().map(Arc::from).unwrap_or_else(|| Arc::from(Vec::new()))
  }

  fn output_channels(&self) -> Arc<[ChannelRef]> {
    self.outputs.as_deref().map(Arc::from).unwrap_or_else(|| Arc::from(Vec::new()))
  }

  fn has_channel_metadata(&self) -> bool {
    self.inputs.is_some() || self.outputs.is_some()
  }
}
