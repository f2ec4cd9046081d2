//! A registered processing stage (graph node).

use serde::Serialize;

use super::{ChannelRef, NodeHandle, Port, PortDirection};

/// A registered processing stage with its ordered input and output ports.
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
  handle: NodeHandle,
  /// Display label, taken from the engine's textual form of the stage.
  label: String,
  inputs: Vec<Port>,
  outputs: Vec<Port>,
}

impl Stage {
  pub(crate) fn new(handle: NodeHandle, label: String) -> Self {
    Self {
      handle,
      label,
      inputs: Vec::new(),
      outputs: Vec::new(),
    }
  }

  /// Appends `channel` as the next port in `direction`.
  pub(crate) fn push_port(&mut self, channel: ChannelRef, direction: PortDirection) {
    let ports = match direction {
      PortDirection::Input => &mut self.inputs,
      PortDirection::Output => &mut self.outputs,
    };
    let index = ports.len();
    ports.push(Port::new(channel, direction, index));
  }

  pub fn handle(&self) -> NodeHandle {
    self.handle
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn input_ports(&self) -> &[Port] {
    &self.inputs
  }

  pub fn output_ports(&self) -> &[Port] {
    &self.outputs
  }

  /// All ports, inputs first, each group in declaration order.
  pub fn ports(&self) -> impl Iterator<Item = &Port> {
    self.inputs.iter().chain(self.outputs.iter())
  }

  pub fn reads(&self, channel: &ChannelRef) -> bool {
    self.inputs.iter().any(|p| p.channel() == channel)
  }

  pub fn writes(&self, channel: &ChannelRef) -> bool {
    self.outputs.iter().any(|p| p.channel() == channel)
  }
}
