//! Serializable point-in-time view of a DAG, for external tooling.

use std::sync::Arc;

use serde::Serialize;

use super::{Edge, Stage};

/// Point-in-time view of a [Dag](crate::Dag): its stages in registration order
/// and the edges derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct DagSnapshot {
  pub stages: Vec<Arc<Stage>>,
  pub edges: Vec<Edge>,
}

impl DagSnapshot {
  pub fn node_count(&self) -> usize {
    self.stages.len()
  }

  pub fn edge_count(&self) -> usize {
    self.edges.len()
  }
}
