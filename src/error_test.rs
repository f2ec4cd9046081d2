//! Tests for `DagError`.

use crate::error::DagError;
use crate::types::NodeHandle;

#[test]
fn unknown_node_names_the_handle() {
  assert_eq!(
    DagError::UnknownNode(NodeHandle(4)).to_string(),
    "unknown node handle n4"
  );
}

#[test]
fn poisoned_display() {
  assert_eq!(DagError::Poisoned.to_string(), "DAG storage lock poisoned");
}
