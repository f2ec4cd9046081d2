//! Append-only topology model: stages, their ports, and derived edges.
//!
//! A [Dag] is shared by every stage constructed within one build session and
//! may be written from many threads at once. Stages are stored as `Arc<Stage>`
//! and updated copy-on-write, so a snapshot taken by [Dag::nodes] never changes
//! after it is returned.
//!
//! Use [Dag::register_stage] to add a stage together with its ports: it holds
//! the write lock for the whole sequence, so readers never see a stage without
//! the ports it was constructed with.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{instrument, trace, warn};

use crate::error::DagError;
use crate::types::{ChannelRef, DagSnapshot, Edge, NodeHandle, PortDirection, Stage};

/// Behaviour switches for a [Dag].
#[derive(Debug, Clone)]
pub struct DagOptions {
  /// Warn when a channel is bound as the output of more than one stage.
  /// The binding is recorded either way.
  pub warn_on_shared_producer: bool,
}

impl Default for DagOptions {
  fn default() -> Self {
    Self {
      warn_on_shared_producer: true,
    }
  }
}

#[derive(Debug, Default)]
struct DagInner {
  stages: Vec<Arc<Stage>>,
  /// Position of each stage in `stages`.
  positions: HashMap<NodeHandle, usize>,
  /// First stage seen writing each channel.
  producers: HashMap<ChannelRef, NodeHandle>,
  next_handle: u64,
}

/// A second stage bound a channel another stage already writes.
struct SharedProducer {
  channel: ChannelRef,
  first: NodeHandle,
  second: NodeHandle,
}

impl DagInner {
  fn add_stage(&mut self, label: String) -> NodeHandle {
    let handle = NodeHandle(self.next_handle);
    self.next_handle += 1;
    self.positions.insert(handle, self.stages.len());
    self.stages.push(Arc::new(Stage::new(handle, label)));
    handle
  }

  fn bind(
    &mut self,
    channel: ChannelRef,
    handle: NodeHandle,
    direction: PortDirection,
  ) -> Result<Option<SharedProducer>, DagError> {
    let pos = *self
      .positions
      .get(&handle)
      .ok_or(DagError::UnknownNode(handle))?;
    let shared = match direction {
      PortDirection::Input => None,
      PortDirection::Output => match self.producers.get(&channel).copied() {
        Some(first) if first != handle => Some(SharedProducer {
          channel: channel.clone(),
          first,
          second: handle,
        }),
        Some(_) => None,
        None => {
          self.producers.insert(channel.clone(), handle);
          None
        }
      },
    };
    Arc::make_mut(&mut self.stages[pos]).push_port(channel, direction);
    Ok(shared)
  }
}

/// Thread-safe, append-only graph of stages and their channel bindings.
#[derive(Debug, Default)]
pub struct Dag {
  options: DagOptions,
  inner: RwLock<DagInner>,
}

impl Dag {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_options(options: DagOptions) -> Self {
    Self {
      options,
      inner: RwLock::default(),
    }
  }

  pub fn options(&self) -> &DagOptions {
    &self.options
  }

  fn write(&self) -> Result<RwLockWriteGuard<'_, DagInner>, DagError> {
    self.inner.write().map_err(|_| DagError::Poisoned)
  }

  // Readers tolerate poisoning: stages are published whole, so whatever a
  // panicking writer left behind is still a consistent prefix.
  fn read(&self) -> RwLockReadGuard<'_, DagInner> {
    self.inner.read().unwrap_or_else(PoisonError::into_inner)
  }

  /// Registers a new stage with no ports and returns its handle.
  pub fn add_node(&self, label: impl Into<String>) -> Result<NodeHandle, DagError> {
    let label = label.into();
    let handle = self.write()?.add_stage(label);
    trace!(node = %handle, "stage added");
    Ok(handle)
  }

  /// Appends `channel` as the next input port of `node`.
  pub fn bind_input(&self, channel: ChannelRef, node: NodeHandle) -> Result<(), DagError> {
    self.write()?.bind(channel, node, PortDirection::Input)?;
    Ok(())
  }

  /// Appends `channel` as the next output port of `node`.
  pub fn bind_output(&self, channel: ChannelRef, node: NodeHandle) -> Result<(), DagError> {
    let shared = self.write()?.bind(channel, node, PortDirection::Output)?;
    if let Some(shared) = shared {
      self.report_shared_producer(&shared);
    }
    Ok(())
  }

  /// Adds a stage and binds all of its ports in one critical section.
  ///
  /// Ports keep the order of `inputs` and `outputs`.
  #[instrument(level = "trace", skip(self, inputs, outputs), fields(inputs = inputs.len(), outputs = outputs.len()))]
  pub fn register_stage(
    &self,
    label: &str,
    inputs: &[ChannelRef],
    outputs: &[ChannelRef],
  ) -> Result<NodeHandle, DagError> {
    let mut shared = Vec::new();
    let handle = {
      let mut inner = self.write()?;
      let handle = inner.add_stage(label.to_string());
      for channel in inputs {
        inner.bind(channel.clone(), handle, PortDirection::Input)?;
      }
      for channel in outputs {
        shared.extend(inner.bind(channel.clone(), handle, PortDirection::Output)?);
      }
      handle
    };
    for s in &shared {
      self.report_shared_producer(s);
    }
    Ok(handle)
  }

  fn report_shared_producer(&self, shared: &SharedProducer) {
    if self.options.warn_on_shared_producer {
      warn!(
        channel = %shared.channel,
        first = %shared.first,
        second = %shared.second,
        "channel bound as output of more than one stage"
      );
    }
  }

  /// Snapshot of all stages in registration order.
  ///
  /// Each call takes a fresh snapshot; later registrations do not show up in
  /// an iterator already returned.
  pub fn nodes(&self) -> std::vec::IntoIter<Arc<Stage>> {
    self.read().stages.clone().into_iter()
  }

  pub fn len(&self) -> usize {
    self.read().stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.read().stages.is_empty()
  }

  pub fn stage(&self, handle: NodeHandle) -> Option<Arc<Stage>> {
    let inner = self.read();
    inner
      .positions
      .get(&handle)
      .map(|&pos| Arc::clone(&inner.stages[pos]))
  }

  /// Stages that write `channel`, in registration order.
  pub fn producers_of(&self, channel: &ChannelRef) -> Vec<NodeHandle> {
    self
      .read()
      .stages
      .iter()
      .filter(|s| s.writes(channel))
      .map(|s| s.handle())
      .collect()
  }

  /// Stages that read `channel`, in registration order.
  pub fn consumers_of(&self, channel: &ChannelRef) -> Vec<NodeHandle> {
    self
      .read()
      .stages
      .iter()
      .filter(|s| s.reads(channel))
      .map(|s| s.handle())
      .collect()
  }

  /// Producer-to-consumer edges, one per (producer, consumer) pair of each channel.
  ///
  /// Channels are visited in the order they first appear, walking stages in
  /// registration order. A channel with no producer yields one edge per
  /// consumer with `from: None`; a channel with no consumer yields one edge per
  /// producer with `to: None`.
  pub fn edges(&self) -> Vec<Edge> {
    edges_of(&self.read().stages)
  }

  /// Consistent view of stages and edges taken under a single read lock.
  pub fn snapshot(&self) -> DagSnapshot {
    let stages = self.read().stages.clone();
    let edges = edges_of(&stages);
    DagSnapshot { stages, edges }
  }
}

#[derive(Default)]
struct ChannelUse {
  producers: Vec<NodeHandle>,
  consumers: Vec<NodeHandle>,
}

fn edges_of(stages: &[Arc<Stage>]) -> Vec<Edge> {
  let mut order: Vec<ChannelRef> = Vec::new();
  let mut uses: HashMap<ChannelRef, ChannelUse> = HashMap::new();
  for stage in stages {
    for port in stage.ports() {
      let entry = uses.entry(port.channel().clone()).or_insert_with(|| {
        order.push(port.channel().clone());
        ChannelUse::default()
      });
      match port.direction() {
        PortDirection::Input => entry.consumers.push(stage.handle()),
        PortDirection::Output => entry.producers.push(stage.handle()),
      }
    }
  }

  let mut edges = Vec::new();
  for channel in order {
    let Some(u) = uses.remove(&channel) else {
      continue;
    };
    let from: Vec<Option<NodeHandle>> = if u.producers.is_empty() {
      vec![None]
    } else {
      u.producers.into_iter().map(Some).collect()
    };
    let to: Vec<Option<NodeHandle>> = if u.consumers.is_empty() {
      vec![None]
    } else {
      u.consumers.into_iter().map(Some).collect()
    };
    for &f in &from {
      for &t in &to {
        edges.push(Edge {
          channel: channel.clone(),
          from: f,
          to: t,
        });
      }
    }
  }
  edges
}
