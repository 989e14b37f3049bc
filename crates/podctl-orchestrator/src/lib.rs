//! podctl-orchestrator: VM power and NIC orchestration for lab pods
//!
//! Resolves inventory names to live control-plane objects, reads their
//! state, and drives power and network-adapter mutations as ordered,
//! task-tracked sequences. The HTTP API in [`api`] is a thin layer on top.

pub mod api;
pub mod reconfigure;
pub mod resolver;
pub mod state;
pub mod state_reader;
pub mod status;
pub mod tracker;

pub use reconfigure::{RebindOutcome, Reconfigurator};
pub use resolver::{list_objects, resolve, resolve_host, resolve_port_group, resolve_vm, RemoteHandle};
pub use state::ControllerState;
pub use state_reader::{read_state, VmState};
pub use status::{refresh_pod, refresh_vm, VmStatus};
pub use tracker::TaskTracker;
