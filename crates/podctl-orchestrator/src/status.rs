//! Live pod status

use serde::Serialize;

use podctl_core::config::{Pod, PortGroupOption, VmEntry};
use podctl_core::traits::ControlPlane;
use podctl_core::types::{NicStatus, PowerState};
use podctl_core::PodError;

use crate::resolver::resolve_vm;
use crate::state_reader::read_state;

/// Runtime status of one inventory VM.
///
/// Built fresh on every refresh; the inventory entry it came from is left
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmStatus {
    pub vm_name: String,
    pub display_name: String,
    pub power_status: PowerState,
    /// Only reported for VMs declaring port group options and having an adapter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nic_status: Option<NicStatus>,
    /// Port group adapter 0 is currently bound to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portgroup_key: Option<String>,
    /// Alias of `portgroup_key` when it matches a declared option
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portgroup_name: Option<String>,
    pub portgroup_options: Vec<PortGroupOption>,
}

/// Resolve one inventory VM and read its live state
pub async fn refresh_vm<C: ControlPlane>(conn: &C, entry: &VmEntry) -> Result<VmStatus, PodError> {
    let vm = resolve_vm(conn, &entry.vm_name).await?;
    let state = read_state(conn, &vm).await?;

    let nic_status = if entry.has_port_group_options() {
        state.adapter_connected.map(NicStatus::from)
    } else {
        None
    };
    let portgroup_name = state
        .first_adapter_port_group
        .as_deref()
        .and_then(|key| entry.port_group(key))
        .map(|option| option.label().to_string());

    Ok(VmStatus {
        vm_name: entry.vm_name.clone(),
        display_name: entry.label().to_string(),
        power_status: state.power,
        nic_status,
        portgroup_key: state.first_adapter_port_group,
        portgroup_name,
        portgroup_options: entry.port_groups().to_vec(),
    })
}

/// Refresh every VM of a pod, in inventory order.
///
/// The first VM that cannot be resolved or read aborts the refresh.
pub async fn refresh_pod<C: ControlPlane>(conn: &C, pod: &Pod) -> Result<Vec<VmStatus>, PodError> {
    let mut statuses = Vec::with_capacity(pod.vms.len());
    for entry in &pod.vms {
        statuses.push(refresh_vm(conn, entry).await?);
    }
    tracing::debug!("Refreshed {} VM(s) of pod {}", statuses.len(), pod.id);
    Ok(statuses)
}
