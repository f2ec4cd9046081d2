//! Opaque identity of a dataflow channel.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
struct ChannelInner {
  id: u64,
  name: Option<String>,
}

/// Handle to a channel created and owned by the engine.
///
/// Clones share identity. Two handles compare equal only if they were cloned
/// from the same [ChannelRef::new] / [ChannelRef::anonymous] call; the name is
/// a debugging aid and takes no part in equality.
#[derive(Clone)]
pub struct ChannelRef {
  inner: Arc<ChannelInner>,
}

impl ChannelRef {
  /// Creates a new channel identity with a debug name.
  pub fn new(name: impl Into<String>) -> Self {
    Self::with_name(Some(name.into()))
  }

  /// Creates a new channel identity without a name.
  pub fn anonymous() -> Self {
    Self::with_name(None)
  }

  fn with_name(name: Option<String>) -> Self {
    Self {
      inner: Arc::new(ChannelInner {
        id: NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed),
        name,
      }),
    }
  }

  /// Process-unique numeric id of this channel.
  pub fn id(&self) -> u64 {
    self.inner.id
  }

  pub fn name(&self) -> Option<&str> {
    self.inner.name.as_deref()
  }
}

impl PartialEq for ChannelRef {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Eq for ChannelRef {}

impl Hash for ChannelRef {
  fn hash<H: Hasher>(&self, state: &mut H) {
    // ids are unique per allocation, so this agrees with pointer equality
    self.inner.id.hash(state);
  }
}

impl fmt::Debug for ChannelRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.inner.name {
      Some(name) => write!(f, "ChannelRef(#{} {})", self.inner.id, name),
      None => write!(f, "ChannelRef(#{})", self.inner.id),
    }
  }
}

impl fmt::Display for ChannelRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.inner.name {
      Some(name) => write!(f, "{}", name),
      None => write!(f, "ch{}", self.inner.id),
    }
  }
}

impl Serialize for ChannelRef {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("ChannelRef", 2)?;
    s.serialize_field("id", &self.inner.id)?;
    s.serialize_field("name", &self.inner.name)?;
    s.end()
  }
}
