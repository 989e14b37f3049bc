//! Live VM state
//!
//! Only the first network adapter is reported. VMs with several adapters
//! show adapter 0 and the rest are ignored.

use serde::Serialize;

use podctl_core::traits::{ControlPlane, VirtualMachineOps};
use podctl_core::types::{EthernetCard, NetworkBacking, ObjectKind, PowerState};
use podctl_core::PodError;

use crate::resolver::{list_objects, RemoteHandle};

/// Snapshot of a VM's power and first-adapter state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmState {
    pub power: PowerState,
    /// Port group adapter 0 is bound to; `None` when the VM has no adapter
    pub first_adapter_port_group: Option<String>,
    /// Whether adapter 0 is connected; `None` when the VM has no adapter
    pub adapter_connected: Option<bool>,
}

/// Read the current power state and adapter 0 binding of a VM
pub async fn read_state<C: ControlPlane>(
    conn: &C,
    vm: &RemoteHandle<'_>,
) -> Result<VmState, PodError> {
    vm.expect_kind(ObjectKind::VirtualMachine)?;

    let power = conn.power_state(vm.reference()).await?;
    let cards = conn.ethernet_cards(vm.reference()).await?;
    let first = cards.first();

    let first_adapter_port_group = match first.and_then(|card| card.backing.as_ref()) {
        Some(backing) => Some(network_name(conn, backing).await?),
        None => None,
    };

    Ok(VmState {
        power,
        first_adapter_port_group,
        adapter_connected: first.map(|card| card.connected),
    })
}

/// Current name of the network behind `backing`.
///
/// The device name on the backing is a copy taken at bind time and goes
/// stale when the network is renamed; it is only used when the network
/// itself is gone.
async fn network_name<C: ControlPlane>(
    conn: &C,
    backing: &NetworkBacking,
) -> Result<String, PodError> {
    let name = list_objects(conn, ObjectKind::Network)
        .await?
        .into_iter()
        .find(|network| network.reference == backing.network)
        .map(|network| network.name);

    Ok(name.unwrap_or_else(|| {
        tracing::debug!(
            "Network {} not listed, using device name '{}'",
            backing.network,
            backing.device_name
        );
        backing.device_name.clone()
    }))
}

/// Adapter 0 of a VM, or `NotFound` if it has none
pub(crate) async fn first_adapter<C: VirtualMachineOps>(
    conn: &C,
    vm: &RemoteHandle<'_>,
) -> Result<EthernetCard, PodError> {
    conn.ethernet_cards(vm.reference())
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            PodError::not_found("network adapter", format!("{} adapter 0", vm.name()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{resolve_port_group, resolve_vm};
    use podctl_sim::SimulatedControlPlane;

    #[tokio::test]
    async fn test_reads_power_and_adapter() {
        let plane = SimulatedControlPlane::builder()
            .vm_with_adapter("p1_client2", PowerState::PoweredOn, "Pod1_Edge1-Port10", true)
            .build();
        let vm = resolve_vm(&plane, "p1_client2").await.unwrap();

        let state = read_state(&plane, &vm).await.unwrap();
        assert_eq!(state.power, PowerState::PoweredOn);
        assert_eq!(state.first_adapter_port_group.as_deref(), Some("Pod1_Edge1-Port10"));
        assert_eq!(state.adapter_connected, Some(true));
    }

    #[tokio::test]
    async fn test_missing_adapter_is_not_an_error() {
        let plane = SimulatedControlPlane::builder()
            .vm("appliance", PowerState::Suspended)
            .build();
        let vm = resolve_vm(&plane, "appliance").await.unwrap();

        let state = read_state(&plane, &vm).await.unwrap();
        assert_eq!(state.power, PowerState::Suspended);
        assert!(state.first_adapter_port_group.is_none());
        assert!(state.adapter_connected.is_none());

        let err = first_adapter(&plane, &vm).await.unwrap_err();
        assert!(matches!(err, PodError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reports_renamed_network_by_live_name() {
        let plane = SimulatedControlPlane::builder()
            .vm_with_adapter("p1_client2", PowerState::PoweredOff, "Pod1_Edge1-Port10", false)
            .build();
        let vm = resolve_vm(&plane, "p1_client2").await.unwrap();
        let network = plane.find(ObjectKind::Network, "Pod1_Edge1-Port10").unwrap();
        assert!(plane.rename(&network, "Pod1_Edge1-Mgmt"));

        let state = read_state(&plane, &vm).await.unwrap();
        assert_eq!(state.first_adapter_port_group.as_deref(), Some("Pod1_Edge1-Mgmt"));
        assert_eq!(plane.open_views(), 0);
    }

    #[tokio::test]
    async fn test_rejects_non_vm_handle() {
        let plane = SimulatedControlPlane::builder().network("net").build();
        let net = resolve_port_group(&plane, "net").await.unwrap();
        let err = read_state(&plane, &net).await.unwrap_err();
        assert!(matches!(err, PodError::InvalidArgument(_)));
    }
}
