//! A directional binding between a stage and a channel.

use serde::Serialize;

use super::{ChannelRef, PortDirection};

/// A directional binding between a stage and a channel.
///
/// `index` is the position among the stage's ports of the same direction and
/// follows the order the channels were declared at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
  channel: ChannelRef,
  direction: PortDirection,
  index: usize,
}

impl Port {
  pub(crate) fn new(channel: ChannelRef, direction: PortDirection, index: usize) -> Self {
    Self {
      channel,
      direction,
      index,
    }
  }

  pub fn channel(&self) -> &ChannelRef {
    &self.channel
  }

  pub fn direction(&self) -> PortDirection {
    self.direction
  }

  pub fn index(&self) -> usize {
    self.index
  }
}
