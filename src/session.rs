//! Build sessions and the lookup the interceptor uses to find the current DAG.
//!
//! The lookup is passed explicitly to every construction event, so there is no
//! process-wide "current session". Returning `None` is a normal state: builds
//! outside a session fall back to a DAG private to the interceptor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dag::{Dag, DagOptions};

/// Source of the DAG that construction events should be recorded into.
pub trait SessionLookup: Send + Sync {
  /// The DAG of the active build session, if any.
  fn current_dag(&self) -> Option<Arc<Dag>>;
}

/// Lookup for builds running outside any session.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

impl SessionLookup for NoSession {
  fn current_dag(&self) -> Option<Arc<Dag>> {
    None
  }
}

/// One pipeline build, owning the DAG its stages are recorded into.
#[derive(Debug, Clone)]
pub struct BuildSession {
  id: Uuid,
  name: String,
  started_at: DateTime<Utc>,
  dag: Arc<Dag>,
}

impl BuildSession {
  pub fn new(name: impl Into<String>) -> Self {
    Self::with_dag(name, Arc::new(Dag::new()))
  }

  pub fn with_options(name: impl Into<String>, options: DagOptions) -> Self {
    Self::with_dag(name, Arc::new(Dag::with_options(options)))
  }

  pub fn with_dag(name: impl Into<String>, dag: Arc<Dag>) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      started_at: Utc::now(),
      dag,
    }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn started_at(&self) -> DateTime<Utc> {
    self.started_at
  }

  pub fn dag(&self) -> &Arc<Dag> {
    &self.dag
  }
}

impl SessionLookup for BuildSession {
  fn current_dag(&self) -> Option<Arc<Dag>> {
    Some(Arc::clone(&self.dag))
  }
}

impl<S: SessionLookup> SessionLookup for Option<S> {
  fn current_dag(&self) -> Option<Arc<Dag>> {
    self.as_ref().and_then(SessionLookup::current_dag)
  }
}

impl<S: SessionLookup + ?Sized> SessionLookup for Arc<S> {
  fn current_dag(&self) -> Option<Arc<Dag>> {
    (**self).current_dag()
  }
}
