//! A producer-to-consumer connection derived from port bindings.

use serde::Serialize;

use super::{ChannelRef, NodeHandle};

/// A connection carried by `channel` from the stage writing it to a stage reading it.
///
/// A channel nobody writes yields edges with `from: None` (an external source);
/// a channel nobody reads yields edges with `to: None` (an external sink).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
  pub channel: ChannelRef,
  pub from: Option<NodeHandle>,
  pub to: Option<NodeHandle>,
}

impl Edge {
  pub fn is_dangling(&self) -> bool {
    self.from.is_none() || self.to.is_none()
  }
}
