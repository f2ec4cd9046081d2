//! Value types of the topology model.
//!
//! Channels are opaque identities owned by the engine; stages and ports are
//! owned by the [Dag](crate::Dag) that registered them.

mod channel_ref;
mod dag_snapshot;
mod edge;
mod node_handle;
mod port;
mod port_direction;
mod stage;
mod stage_descriptor;

pub use channel_ref::ChannelRef;
pub use dag_snapshot::DagSnapshot;
pub use edge::Edge;
pub use node_handle::NodeHandle;
pub use port::Port;
pub use port_direction::PortDirection;
pub use stage::Stage;
pub use stage_descriptor::StageDescriptor;
