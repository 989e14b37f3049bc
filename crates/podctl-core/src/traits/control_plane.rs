//! Control-plane capability traits
//!
//! A backend only has to provide the narrow set of operations podctl needs:
//! enumerate objects of a kind, read and mutate a VM, and subscribe to
//! change batches for a set of tasks.

use async_trait::async_trait;

use super::scoped::ScopedResource;
use crate::error::ControlPlaneError;
use crate::task::{TaskId, UpdateSet, Version};
use crate::types::{DeviceEdit, EthernetCard, ManagedObject, ObjectKind, ObjectRef, PowerState};

/// A live view over every object of one kind under the root folder
#[async_trait]
pub trait ContainerView: ScopedResource + Sync {
    /// Objects currently in the view
    async fn objects(&self) -> Result<Vec<ManagedObject>, ControlPlaneError>;
}

/// A change-notification subscription over a fixed set of tasks
#[async_trait]
pub trait UpdateFilter: ScopedResource {
    /// Block until the control plane has changes newer than `since`.
    ///
    /// `None` asks for everything from the beginning, including the
    /// current state of every watched task.
    async fn wait_for_updates(
        &mut self,
        since: Option<&Version>,
    ) -> Result<UpdateSet, ControlPlaneError>;
}

/// Object enumeration
#[async_trait]
pub trait ViewManager: Send + Sync {
    /// The view type handed out by this backend
    type View: ContainerView;

    /// Open a recursive view over all objects of `kind`
    async fn create_container_view(&self, kind: ObjectKind)
        -> Result<Self::View, ControlPlaneError>;
}

/// Reads and mutations on a single VM
#[async_trait]
pub trait VirtualMachineOps: Send + Sync {
    /// Runtime power state
    async fn power_state(&self, vm: &ObjectRef) -> Result<PowerState, ControlPlaneError>;

    /// Virtual Ethernet cards, in device order. Empty if the VM has none.
    async fn ethernet_cards(&self, vm: &ObjectRef)
        -> Result<Vec<EthernetCard>, ControlPlaneError>;

    async fn power_on(&self, vm: &ObjectRef) -> Result<TaskId, ControlPlaneError>;

    async fn power_off(&self, vm: &ObjectRef) -> Result<TaskId, ControlPlaneError>;

    /// Submit a single device edit as one reconfiguration task
    async fn reconfigure(
        &self,
        vm: &ObjectRef,
        edit: DeviceEdit,
    ) -> Result<TaskId, ControlPlaneError>;
}

/// Task change notifications
#[async_trait]
pub trait TaskEvents: Send + Sync {
    /// The filter type handed out by this backend
    type Filter: UpdateFilter;

    /// Subscribe to full-object updates for the given tasks
    async fn create_filter(&self, tasks: &[TaskId]) -> Result<Self::Filter, ControlPlaneError>;
}

/// Everything the orchestrator needs from a control-plane session
pub trait ControlPlane: ViewManager + VirtualMachineOps + TaskEvents {}

impl<T> ControlPlane for T where T: ViewManager + VirtualMachineOps + TaskEvents {}
