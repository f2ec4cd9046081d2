//! Typed construction parameters for a stage.

use std::sync::Arc;

use crate::extract::{INPUTS_KEY, OUTPUTS_KEY, ParamBundle, ParamValue, extract_inputs, extract_outputs};

use super::ChannelRef;

/// Channel lists an engine declares when constructing a stage.
///
/// `None` and an empty list both mean "no channels"; `None` additionally means
/// the engine said nothing about that direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageDescriptor {
  pub inputs: Option<Vec<ChannelRef>>,
  pub outputs: Option<Vec<ChannelRef>>,
}

impl StageDescriptor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = ChannelRef>) -> Self {
    self.inputs = Some(inputs.into_iter().collect());
    self
  }

  pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = ChannelRef>) -> Self {
    self.outputs = Some(outputs.into_iter().collect());
    self
  }

  /// Reads a descriptor out of a loosely-typed bundle. Returns `None` if the
  /// bundle has neither well-known key.
  pub fn from_bundle(params: &ParamBundle) -> Option<Self> {
    let has_inputs = params.contains_key(INPUTS_KEY);
    let has_outputs = params.contains_key(OUTPUTS_KEY);
    if !has_inputs && !has_outputs {
      return None;
    }
    Some(Self {
      inputs: has_inputs.then(|| extract_inputs(params).to_vec()),
      outputs: has_outputs.then(|| extract_outputs(params).to_vec()),
    })
  }

  /// Converts into the loosely-typed bundle form, omitting `None` lists.
  pub fn into_bundle(self) -> ParamBundle {
    let mut params = ParamBundle::new();
    if let Some(inputs) = self.inputs {
      params.insert(INPUTS_KEY.to_string(), Arc::new(inputs) as ParamValue);
    }
    if let Some(outputs) = self.outputs {
      params.insert(OUTPUTS_KEY.to_string(), Arc::new(outputs) as ParamValue);
    }
    params
  }
}
