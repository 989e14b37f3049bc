//! Core trait definitions

mod control_plane;
mod scoped;

pub use control_plane::{
    ContainerView, ControlPlane, TaskEvents, UpdateFilter, ViewManager, VirtualMachineOps,
};
pub use scoped::{Scoped, ScopedResource};
