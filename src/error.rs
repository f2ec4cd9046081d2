//! Errors raised by the DAG model.
//!
//! Every variant signals a defect in the caller or in this crate, not a
//! runtime condition: malformed parameters and missing sessions never error.

use thiserror::Error;

use crate::types::NodeHandle;

/// Internal invariant violations of the DAG model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DagError {
  /// A port was bound to a handle this DAG never issued.
  #[error("unknown node handle {0}")]
  UnknownNode(NodeHandle),
  /// A writer panicked while holding the DAG lock.
  #[error("DAG storage lock poisoned")]
  Poisoned,
}
