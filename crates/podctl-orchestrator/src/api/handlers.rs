//! Route handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::Uri;
use axum::Json;
use serde::{Deserialize, Serialize};

use podctl_core::config::VmEntry;
use podctl_core::traits::ControlPlane;
use podctl_core::{Inventory, Pod, PodError};

use super::messages::{failure_message, VmAction};
use super::ApiError;
use crate::resolver::{resolve_port_group, resolve_vm};
use crate::state::ControllerState;
use crate::status::{refresh_pod, VmStatus};

type Shared<C> = State<Arc<ControllerState<C>>>;

/// Entry of `GET /pods`
#[derive(Debug, Serialize, Deserialize)]
pub struct PodSummary {
    pub id: String,
    pub name: String,
    pub vm_count: usize,
}

/// Body of `GET /pods/:pod`
#[derive(Debug, Serialize)]
pub struct PodDetail {
    pub id: String,
    pub name: String,
    pub vms: Vec<VmStatus>,
}

/// Result of a mutation, successful or not
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub pod: String,
    pub vm: String,
    pub ok: bool,
    pub message: String,
}

pub async fn list_pods<C: ControlPlane + 'static>(State(state): Shared<C>) -> Json<Vec<PodSummary>> {
    let pods = state
        .inventory
        .pods
        .iter()
        .map(|pod| PodSummary {
            id: pod.id.clone(),
            name: pod.name.clone(),
            vm_count: pod.vms.len(),
        })
        .collect();
    Json(pods)
}

pub async fn pod_detail<C: ControlPlane + 'static>(
    State(state): Shared<C>,
    Path(pod_id): Path<String>,
) -> Result<Json<PodDetail>, ApiError> {
    let pod = lookup_pod(&state.inventory, &pod_id)?;
    let vms = refresh_pod(&state.control_plane, pod).await?;
    Ok(Json(PodDetail {
        id: pod.id.clone(),
        name: pod.name.clone(),
        vms,
    }))
}

pub async fn power_on<C: ControlPlane + 'static>(
    State(state): Shared<C>,
    Path((pod_id, vm_name)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (pod, entry) = lookup_vm(&state.inventory, &pod_id, &vm_name)?;
    run_action(&state, pod, entry, VmAction::PowerOn).await
}

pub async fn power_off<C: ControlPlane + 'static>(
    State(state): Shared<C>,
    Path((pod_id, vm_name)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (pod, entry) = lookup_vm(&state.inventory, &pod_id, &vm_name)?;
    run_action(&state, pod, entry, VmAction::PowerOff).await
}

pub async fn nic_connect<C: ControlPlane + 'static>(
    State(state): Shared<C>,
    Path((pod_id, vm_name)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (pod, entry) = lookup_vm(&state.inventory, &pod_id, &vm_name)?;
    run_action(&state, pod, entry, VmAction::ConnectNic).await
}

pub async fn nic_disconnect<C: ControlPlane + 'static>(
    State(state): Shared<C>,
    Path((pod_id, vm_name)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (pod, entry) = lookup_vm(&state.inventory, &pod_id, &vm_name)?;
    run_action(&state, pod, entry, VmAction::DisconnectNic).await
}

pub async fn move_port_group<C: ControlPlane + 'static>(
    State(state): Shared<C>,
    Path((pod_id, vm_name, port_group)): Path<(String, String, String)>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (pod, entry) = lookup_vm(&state.inventory, &pod_id, &vm_name)?;
    let option = entry.port_group(&port_group).ok_or_else(|| {
        PodError::InvalidArgument(format!(
            "'{}' is not a port group option for {}",
            port_group,
            entry.label()
        ))
    })?;
    run_action(&state, pod, entry, VmAction::MovePortGroup(option)).await
}

pub async fn fallback(uri: Uri) -> ApiError {
    PodError::not_found("route", uri.path()).into()
}

fn lookup_pod<'i>(inventory: &'i Inventory, pod_id: &str) -> Result<&'i Pod, PodError> {
    inventory
        .pod(pod_id)
        .ok_or_else(|| PodError::not_found("pod", pod_id))
}

fn lookup_vm<'i>(
    inventory: &'i Inventory,
    pod_id: &str,
    vm_name: &str,
) -> Result<(&'i Pod, &'i VmEntry), PodError> {
    let pod = lookup_pod(inventory, pod_id)?;
    let entry = pod
        .vm(vm_name)
        .ok_or_else(|| PodError::not_found("VM", format!("{} in pod {}", vm_name, pod_id)))?;
    Ok((pod, entry))
}

async fn run_action<C: ControlPlane>(
    state: &ControllerState<C>,
    pod: &Pod,
    entry: &VmEntry,
    action: VmAction<'_>,
) -> Result<Json<ActionResponse>, ApiError> {
    let message = action.describe(entry);
    tracing::info!("[pod {}] {}", pod.id, message);

    match perform(state, entry, action).await {
        Ok(()) => Ok(Json(ActionResponse {
            pod: pod.id.clone(),
            vm: entry.vm_name.clone(),
            ok: true,
            message,
        })),
        Err(error) => {
            let message = failure_message(&message, &error);
            tracing::warn!("[pod {}] {}", pod.id, message);
            Err(ApiError::action(
                error,
                ActionResponse {
                    pod: pod.id.clone(),
                    vm: entry.vm_name.clone(),
                    ok: false,
                    message,
                },
            ))
        }
    }
}

async fn perform<C: ControlPlane>(
    state: &ControllerState<C>,
    entry: &VmEntry,
    action: VmAction<'_>,
) -> Result<(), PodError> {
    let conn = &state.control_plane;
    let ops = state.reconfigurator();
    let vm = resolve_vm(conn, &entry.vm_name).await?;

    match action {
        VmAction::PowerOn => {
            ops.power_on(&vm).await?;
        }
        VmAction::PowerOff => {
            ops.power_off(&vm).await?;
        }
        VmAction::ConnectNic => {
            ops.set_adapter_connected(&vm, true).await?;
        }
        VmAction::DisconnectNic => {
            ops.set_adapter_connected(&vm, false).await?;
        }
        VmAction::MovePortGroup(option) => {
            let port_group = resolve_port_group(conn, &option.portgroup).await?;
            ops.rebind_adapter_port_group(&vm, &port_group, true).await?;
        }
    }
    Ok(())
}
