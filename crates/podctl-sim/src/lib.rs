//! podctl-sim: In-memory virtualization control plane
//!
//! Implements every podctl control-plane trait against local state so the
//! orchestrator can be exercised without a real management server. Task
//! outcomes can be scripted per operation, and held tasks are released by
//! hand, which makes ordering and partial-failure behavior observable.

mod plane;
mod tasks;

pub use plane::{SimFilter, SimView, SimulatedControlPlane, SimulatorBuilder, DEFAULT_NETWORK};
pub use tasks::{Mutation, OperationKind, Submission, TaskScript};
