//! VM reconfiguration sequences
//!
//! Every operation submits its mutation(s) and returns only once the
//! [`TaskTracker`] has seen each task reach a terminal state. Compound
//! operations are strictly sequential and stop at the first failed step,
//! leaving whatever the earlier steps already changed in place. Once the
//! tracker's cancellation token fires, no further mutation is submitted.

use podctl_core::task::TaskId;
use podctl_core::traits::ControlPlane;
use podctl_core::types::{DeviceEdit, ObjectKind};
use podctl_core::PodError;

use crate::resolver::RemoteHandle;
use crate::state_reader::first_adapter;
use crate::tracker::TaskTracker;

/// Tasks produced by a port group rebind, in submission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebindOutcome {
    pub disable_task: TaskId,
    pub rebind_task: TaskId,
}

/// Drives mutations against one control-plane session
pub struct Reconfigurator<'a, C: ControlPlane> {
    conn: &'a C,
    tracker: &'a TaskTracker,
}

impl<'a, C: ControlPlane> Reconfigurator<'a, C> {
    pub fn new(conn: &'a C, tracker: &'a TaskTracker) -> Self {
        Self { conn, tracker }
    }

    /// Power a VM on. Already-on VMs resolve as a successful no-op task.
    pub async fn power_on(&self, vm: &RemoteHandle<'_>) -> Result<TaskId, PodError> {
        vm.expect_kind(ObjectKind::VirtualMachine)?;
        tracing::info!("Powering on {}", vm.name());
        self.tracker.check_cancelled()?;
        let task = self.conn.power_on(vm.reference()).await?;
        self.track(task).await
    }

    /// Power a VM off
    pub async fn power_off(&self, vm: &RemoteHandle<'_>) -> Result<TaskId, PodError> {
        vm.expect_kind(ObjectKind::VirtualMachine)?;
        tracing::info!("Powering off {}", vm.name());
        self.tracker.check_cancelled()?;
        let task = self.conn.power_off(vm.reference()).await?;
        self.track(task).await
    }

    /// Connect or disconnect adapter 0
    pub async fn set_adapter_connected(
        &self,
        vm: &RemoteHandle<'_>,
        connected: bool,
    ) -> Result<TaskId, PodError> {
        vm.expect_kind(ObjectKind::VirtualMachine)?;
        let adapter = first_adapter(self.conn, vm).await?;
        tracing::info!(
            "{} {} on {}",
            if connected { "Connecting" } else { "Disconnecting" },
            adapter.label,
            vm.name()
        );

        let edit = DeviceEdit::device(adapter.key).connected(connected);
        self.tracker.check_cancelled()?;
        let task = self.conn.reconfigure(vm.reference(), edit).await?;
        self.track(task).await
    }

    /// Move adapter 0 onto `port_group`.
    ///
    /// The adapter is disconnected first and the rebind is only submitted
    /// once that task has succeeded. The rebind flags the adapter to
    /// connect at next power-on. `disable_first = false` is rejected
    /// before anything is submitted.
    pub async fn rebind_adapter_port_group(
        &self,
        vm: &RemoteHandle<'_>,
        port_group: &RemoteHandle<'_>,
        disable_first: bool,
    ) -> Result<RebindOutcome, PodError> {
        if !disable_first {
            return Err(PodError::InvalidArgument(format!(
                "refusing to rebind {} without disconnecting its adapter first",
                vm.name()
            )));
        }
        vm.expect_kind(ObjectKind::VirtualMachine)?;
        port_group.expect_kind(ObjectKind::Network)?;

        let disable_task = self.set_adapter_connected(vm, false).await?;

        // Re-read so the edit targets the device as it is now
        let adapter = first_adapter(self.conn, vm).await?;
        tracing::info!(
            "Moving {} of {} to {}",
            adapter.label,
            vm.name(),
            port_group.name()
        );
        let edit = DeviceEdit::device(adapter.key)
            .backing(port_group.reference().clone(), port_group.name())
            .start_connected(true);
        self.tracker.check_cancelled()?;
        let task = self.conn.reconfigure(vm.reference(), edit).await?;
        let rebind_task = self.track(task).await?;

        Ok(RebindOutcome {
            disable_task,
            rebind_task,
        })
    }

    async fn track(&self, task: TaskId) -> Result<TaskId, PodError> {
        self.tracker
            .await_all(self.conn, std::slice::from_ref(&task))
            .await?;
        Ok(task)
    }
}
