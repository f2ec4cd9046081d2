//! Identifier of a stage within one DAG.

use std::fmt;

use serde::Serialize;

/// Identifier of a registered stage, unique for the lifetime of its [Dag](crate::Dag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeHandle(pub(crate) u64);

impl NodeHandle {
  pub fn as_u64(self) -> u64 {
    self.0
  }
}

impl fmt::Display for NodeHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "n{}", self.0)
  }
}
