//! podctl-core: Core abstractions and configuration for podctl
//!
//! This crate provides the pod inventory model, the error taxonomy, remote
//! task types, and the narrow control-plane traits that the orchestrator
//! drives and that backends implement.

pub mod config;
pub mod error;
pub mod task;
pub mod traits;
pub mod types;

pub use config::{Inventory, Pod, PortGroupOption, VmEntry};
pub use error::{ConfigError, ConnectionError, ControlPlaneError, PodError};
pub use task::{TaskFault, TaskId, TaskState};
pub use types::{ManagedObject, NicStatus, ObjectKind, ObjectRef, PowerState};
