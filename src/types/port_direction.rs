//! Direction of a port binding.

use std::fmt;

use serde::Serialize;

/// Whether a stage reads from (`Input`) or writes to (`Output`) a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
  Input,
  Output,
}

impl fmt::Display for PortDirection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PortDirection::Input => write!(f, "input"),
      PortDirection::Output => write!(f, "output"),
    }
  }
}
