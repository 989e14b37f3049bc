//! In-memory control plane

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{watch, Mutex};

use podctl_core::config::{ConnectionConfig, Inventory};
use podctl_core::task::{TaskFault, TaskId, TaskState, UpdateSet, Version};
use podctl_core::traits::{
    ContainerView, ScopedResource, TaskEvents, UpdateFilter, ViewManager, VirtualMachineOps,
};
use podctl_core::types::{
    DeviceEdit, EthernetCard, ManagedObject, NetworkBacking, ObjectKind, ObjectRef, PowerState,
};
use podctl_core::{ConnectionError, ControlPlaneError};

use crate::tasks::{Mutation, OperationKind, Submission, TaskScript, TaskTable};

/// Network every inventory VM without port group options is attached to
pub const DEFAULT_NETWORK: &str = "VM Network";

/// First device key handed to virtual Ethernet cards
const FIRST_NIC_KEY: i32 = 4000;

struct SimObject {
    name: String,
    /// Creation order, used to keep enumeration stable
    seq: u64,
}

struct SimVm {
    power: PowerState,
    cards: Vec<EthernetCard>,
}

struct Shared {
    objects: DashMap<ObjectRef, SimObject>,
    vms: DashMap<ObjectRef, SimVm>,
    tasks: Mutex<TaskTable>,
    /// Open filters per watched task
    watchers: DashMap<TaskId, usize>,
    version_tx: watch::Sender<u64>,
    credentials: Option<(String, String)>,
    next_seq: AtomicU64,
    open_views: AtomicUsize,
    open_filters: AtomicUsize,
}

/// A control plane living entirely in memory.
///
/// Cloning is cheap and every clone observes the same inventory and tasks,
/// so a test can keep one handle for inspection while the orchestrator
/// drives another.
#[derive(Clone)]
pub struct SimulatedControlPlane {
    shared: Arc<Shared>,
}

impl SimulatedControlPlane {
    /// Start building a simulator
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::default()
    }

    /// Seed a simulator from a pod inventory.
    ///
    /// Every VM starts powered off with one adapter bound to its first port
    /// group option (or [`DEFAULT_NETWORK`]) and flagged start-connected.
    /// Every port group named by any option exists as a network.
    pub fn from_inventory(inventory: &Inventory) -> SimulatorBuilder {
        let mut builder = SimulatorBuilder::default();
        for pod in &inventory.pods {
            for vm in &pod.vms {
                for option in vm.port_groups() {
                    builder = builder.network(&option.portgroup);
                }
                let network = vm
                    .port_groups()
                    .first()
                    .map(|o| o.portgroup.clone())
                    .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
                builder =
                    builder.vm_with_adapter(&vm.vm_name, PowerState::PoweredOff, &network, false);
            }
        }
        builder
    }

    /// Open a session, checking credentials when the simulator has any
    pub fn connect(&self, config: &ConnectionConfig) -> Result<Self, ConnectionError> {
        if config.host.trim().is_empty() {
            return Err(ConnectionError::ConnectionRefused(
                "no control plane host configured".to_string(),
            ));
        }
        if let Some((username, password)) = &self.shared.credentials {
            if &config.username != username || &config.password != password {
                return Err(ConnectionError::AuthenticationFailed {
                    username: config.username.clone(),
                    host: config.host.clone(),
                });
            }
        }
        tracing::debug!("Simulated session opened for {}", config.endpoint());
        Ok(self.clone())
    }

    /// Script the outcome of the next task of `kind`.
    ///
    /// Scripts queue up; unscripted tasks complete successfully.
    pub async fn script(&self, kind: OperationKind, script: TaskScript) {
        self.shared.tasks.lock().await.push_script(kind, script);
    }

    /// Also report terminal transitions on the `info.state` path
    pub async fn echo_state_path(&self, enabled: bool) {
        self.shared.tasks.lock().await.echo_state_path = enabled;
    }

    /// Finish a held task successfully and apply its mutation
    pub async fn complete_task(&self, task: &TaskId) -> Result<(), ControlPlaneError> {
        let mut tasks = self.shared.tasks.lock().await;
        let (vm, mutation) = tasks
            .target(task)
            .ok_or_else(|| ControlPlaneError::ManagedObjectNotFound(task.to_string()))?;
        tasks.transition(task, TaskState::Success)?;
        self.apply(&vm, &mutation);
        self.publish(tasks.version());
        Ok(())
    }

    /// Fail a held task
    pub async fn fail_task(
        &self,
        task: &TaskId,
        fault: TaskFault,
    ) -> Result<(), ControlPlaneError> {
        let mut tasks = self.shared.tasks.lock().await;
        tasks.transition(task, TaskState::Error(fault))?;
        self.publish(tasks.version());
        Ok(())
    }

    /// Current state of a task
    pub async fn task_state(&self, task: &TaskId) -> Option<TaskState> {
        self.shared.tasks.lock().await.state(task)
    }

    /// Recent mutations, oldest first
    pub async fn submissions(&self) -> Vec<Submission> {
        self.shared.tasks.lock().await.submissions()
    }

    /// Number of task records the simulator still holds
    pub async fn retained_tasks(&self) -> usize {
        self.shared.tasks.lock().await.retained()
    }

    /// Look up an object reference by kind and name
    pub fn find(&self, kind: ObjectKind, name: &str) -> Option<ObjectRef> {
        self.shared
            .objects
            .iter()
            .filter(|e| e.key().kind == kind && e.value().name == name)
            .min_by_key(|e| e.value().seq)
            .map(|e| e.key().clone())
    }

    /// Rename an object, as an operator might in the management UI
    pub fn rename(&self, reference: &ObjectRef, name: &str) -> bool {
        match self.shared.objects.get_mut(reference) {
            Some(mut object) => {
                object.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Cards of a VM, for assertions
    pub fn cards(&self, vm: &ObjectRef) -> Option<Vec<EthernetCard>> {
        self.shared.vms.get(vm).map(|v| v.cards.clone())
    }

    /// Number of container views not yet released
    pub fn open_views(&self) -> usize {
        self.shared.open_views.load(Ordering::SeqCst)
    }

    /// Number of update filters not yet released
    pub fn open_filters(&self) -> usize {
        self.shared.open_filters.load(Ordering::SeqCst)
    }

    async fn submit(
        &self,
        vm: &ObjectRef,
        mutation: Mutation,
    ) -> Result<TaskId, ControlPlaneError> {
        if !self.shared.vms.contains_key(vm) {
            return Err(ControlPlaneError::ManagedObjectNotFound(vm.to_string()));
        }
        if let Mutation::Reconfigure(edit) = &mutation {
            let has_device = self
                .shared
                .vms
                .get(vm)
                .map(|v| v.cards.iter().any(|c| c.key == edit.device_key))
                .unwrap_or(false);
            if !has_device {
                return Err(ControlPlaneError::DeviceNotFound {
                    vm: vm.to_string(),
                    key: edit.device_key,
                });
            }
        }

        let mut tasks = self.shared.tasks.lock().await;
        self.shared.reclaim(&mut tasks);
        let script = tasks.next_script(mutation.kind());
        let id = tasks.submit(vm.clone(), mutation.clone());
        tracing::debug!("{} submitted as {} on {}", mutation.description(), id, vm);

        tasks.transition(&id, TaskState::Running)?;
        match script {
            TaskScript::Complete => {
                tasks.transition(&id, TaskState::Success)?;
                self.apply(vm, &mutation);
            }
            TaskScript::Fail(fault) => {
                tasks.transition(&id, TaskState::Error(fault))?;
            }
            TaskScript::Hold => {}
        }
        self.publish(tasks.version());
        Ok(id)
    }

    fn apply(&self, vm: &ObjectRef, mutation: &Mutation) {
        let Some(mut record) = self.shared.vms.get_mut(vm) else {
            return;
        };
        match mutation {
            Mutation::PowerOn => {
                if record.power != PowerState::PoweredOn {
                    record.power = PowerState::PoweredOn;
                    for card in record.cards.iter_mut() {
                        card.connected = card.start_connected;
                    }
                }
            }
            Mutation::PowerOff => {
                record.power = PowerState::PoweredOff;
                for card in record.cards.iter_mut() {
                    card.connected = false;
                }
            }
            Mutation::Reconfigure(edit) => {
                if let Some(card) = record.cards.iter_mut().find(|c| c.key == edit.device_key) {
                    if let Some(connected) = edit.connected {
                        card.connected = connected;
                    }
                    if let Some(start_connected) = edit.start_connected {
                        card.start_connected = start_connected;
                    }
                    if let Some(backing) = &edit.backing {
                        card.backing = Some(backing.clone());
                    }
                }
            }
        }
    }

    fn publish(&self, version: u64) {
        self.shared.version_tx.send_replace(version);
    }

    fn insert_object(&self, kind: ObjectKind, prefix: &str, name: &str) -> ObjectRef {
        let seq = self.shared.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = ObjectRef::new(kind, format!("{}-{}", prefix, seq));
        self.shared.objects.insert(
            reference.clone(),
            SimObject {
                name: name.to_string(),
                seq,
            },
        );
        reference
    }
}

#[async_trait]
impl ViewManager for SimulatedControlPlane {
    type View = SimView;

    async fn create_container_view(
        &self,
        kind: ObjectKind,
    ) -> Result<SimView, ControlPlaneError> {
        self.shared.open_views.fetch_add(1, Ordering::SeqCst);
        Ok(SimView {
            shared: Arc::clone(&self.shared),
            kind,
            released: false,
        })
    }
}

#[async_trait]
impl VirtualMachineOps for SimulatedControlPlane {
    async fn power_state(&self, vm: &ObjectRef) -> Result<PowerState, ControlPlaneError> {
        self.shared
            .vms
            .get(vm)
            .map(|v| v.power)
            .ok_or_else(|| ControlPlaneError::ManagedObjectNotFound(vm.to_string()))
    }

    async fn ethernet_cards(
        &self,
        vm: &ObjectRef,
    ) -> Result<Vec<EthernetCard>, ControlPlaneError> {
        self.cards(vm)
            .ok_or_else(|| ControlPlaneError::ManagedObjectNotFound(vm.to_string()))
    }

    async fn power_on(&self, vm: &ObjectRef) -> Result<TaskId, ControlPlaneError> {
        self.submit(vm, Mutation::PowerOn).await
    }

    async fn power_off(&self, vm: &ObjectRef) -> Result<TaskId, ControlPlaneError> {
        self.submit(vm, Mutation::PowerOff).await
    }

    async fn reconfigure(
        &self,
        vm: &ObjectRef,
        edit: DeviceEdit,
    ) -> Result<TaskId, ControlPlaneError> {
        self.submit(vm, Mutation::Reconfigure(edit)).await
    }
}

#[async_trait]
impl TaskEvents for SimulatedControlPlane {
    type Filter = SimFilter;

    async fn create_filter(&self, tasks: &[TaskId]) -> Result<SimFilter, ControlPlaneError> {
        self.shared.open_filters.fetch_add(1, Ordering::SeqCst);
        let watched: HashSet<TaskId> = tasks.iter().cloned().collect();
        for task in &watched {
            *self.shared.watchers.entry(task.clone()).or_insert(0) += 1;
        }
        Ok(SimFilter {
            shared: Arc::clone(&self.shared),
            watched,
            version_rx: self.shared.version_tx.subscribe(),
            released: false,
        })
    }
}

/// Container view handed out by the simulator
pub struct SimView {
    shared: Arc<Shared>,
    kind: ObjectKind,
    released: bool,
}

#[async_trait]
impl ContainerView for SimView {
    async fn objects(&self) -> Result<Vec<ManagedObject>, ControlPlaneError> {
        if self.released {
            return Err(ControlPlaneError::Released("container view".to_string()));
        }
        let mut found: Vec<(u64, ManagedObject)> = self
            .shared
            .objects
            .iter()
            .filter(|e| e.key().kind == self.kind)
            .map(|e| {
                (
                    e.value().seq,
                    ManagedObject {
                        reference: e.key().clone(),
                        name: e.value().name.clone(),
                    },
                )
            })
            .collect();
        found.sort_by_key(|(seq, _)| *seq);
        Ok(found.into_iter().map(|(_, object)| object).collect())
    }
}

impl ScopedResource for SimView {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.shared.open_views.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Update filter handed out by the simulator
pub struct SimFilter {
    shared: Arc<Shared>,
    watched: HashSet<TaskId>,
    version_rx: watch::Receiver<u64>,
    released: bool,
}

#[async_trait]
impl UpdateFilter for SimFilter {
    async fn wait_for_updates(
        &mut self,
        since: Option<&Version>,
    ) -> Result<UpdateSet, ControlPlaneError> {
        let since = match since {
            None => 0,
            Some(version) => version
                .0
                .parse::<u64>()
                .map_err(|_| ControlPlaneError::Other(format!("invalid version '{}'", version)))?,
        };

        loop {
            if self.released {
                return Err(ControlPlaneError::Released("update filter".to_string()));
            }

            // Mark the current version seen before reading the log so a
            // publish that lands in between still wakes `changed()`.
            let _seen = *self.version_rx.borrow_and_update();
            if let Some(set) = self.shared.tasks.lock().await.updates_since(&self.watched, since) {
                return Ok(set);
            }

            if self.version_rx.changed().await.is_err() {
                return Err(ControlPlaneError::SessionLost(
                    "change stream closed".to_string(),
                ));
            }
        }
    }
}

impl ScopedResource for SimFilter {
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for task in &self.watched {
            if let Some(mut count) = self.shared.watchers.get_mut(task) {
                *count = count.saturating_sub(1);
            }
            self.shared.watchers.remove_if(task, |_, count| *count == 0);
        }
        self.shared.open_filters.fetch_sub(1, Ordering::SeqCst);

        // Otherwise the next submission reclaims
        if let Ok(mut tasks) = self.shared.tasks.try_lock() {
            self.shared.reclaim(&mut tasks);
        }
    }
}

impl Shared {
    fn reclaim(&self, tasks: &mut TaskTable) {
        let reclaimed = tasks.reclaim(|task| self.watchers.contains_key(task));
        if reclaimed > 0 {
            tracing::trace!("Reclaimed {} finished task(s)", reclaimed);
        }
    }
}

/// Builder for [`SimulatedControlPlane`]
#[derive(Default)]
pub struct SimulatorBuilder {
    networks: Vec<String>,
    hosts: Vec<String>,
    vms: Vec<VmSeed>,
    credentials: Option<(String, String)>,
    echo_state_path: bool,
}

struct VmSeed {
    name: String,
    power: PowerState,
    adapter: Option<(String, bool)>,
}

impl SimulatorBuilder {
    /// Add a network / port group (idempotent by name)
    pub fn network(mut self, name: &str) -> Self {
        if !self.networks.iter().any(|n| n == name) {
            self.networks.push(name.to_string());
        }
        self
    }

    /// Add a hypervisor host
    pub fn host(mut self, name: &str) -> Self {
        self.hosts.push(name.to_string());
        self
    }

    /// Add a VM with no network adapter
    pub fn vm(mut self, name: &str, power: PowerState) -> Self {
        self.vms.push(VmSeed {
            name: name.to_string(),
            power,
            adapter: None,
        });
        self
    }

    /// Add a VM with one adapter on `network`, creating the network if needed.
    ///
    /// The adapter is flagged start-connected; `connected` only takes
    /// effect on a powered-on VM.
    pub fn vm_with_adapter(
        mut self,
        name: &str,
        power: PowerState,
        network: &str,
        connected: bool,
    ) -> Self {
        self = self.network(network);
        self.vms.push(VmSeed {
            name: name.to_string(),
            power,
            adapter: Some((network.to_string(), connected)),
        });
        self
    }

    /// Require these credentials on `connect`
    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// Also report terminal transitions on the `info.state` path
    pub fn echo_state_path(mut self) -> Self {
        self.echo_state_path = true;
        self
    }

    pub fn build(self) -> SimulatedControlPlane {
        let (version_tx, _) = watch::channel(0);
        let mut table = TaskTable::default();
        table.echo_state_path = self.echo_state_path;
        let shared = Arc::new(Shared {
            objects: DashMap::new(),
            vms: DashMap::new(),
            tasks: Mutex::new(table),
            watchers: DashMap::new(),
            version_tx,
            credentials: self.credentials,
            next_seq: AtomicU64::new(0),
            open_views: AtomicUsize::new(0),
            open_filters: AtomicUsize::new(0),
        });
        let plane = SimulatedControlPlane { shared };

        for name in &self.networks {
            plane.insert_object(ObjectKind::Network, "network", name);
        }
        for name in &self.hosts {
            plane.insert_object(ObjectKind::Host, "host", name);
        }
        for seed in self.vms {
            let reference = plane.insert_object(ObjectKind::VirtualMachine, "vm", &seed.name);
            let cards = match seed.adapter {
                Some((network, connected)) => {
                    let network_ref = plane
                        .find(ObjectKind::Network, &network)
                        .unwrap_or_else(|| ObjectRef::new(ObjectKind::Network, network.clone()));
                    vec![EthernetCard {
                        key: FIRST_NIC_KEY,
                        label: "Network adapter 1".to_string(),
                        backing: Some(NetworkBacking {
                            network: network_ref,
                            device_name: network,
                        }),
                        connected: connected && seed.power == PowerState::PoweredOn,
                        start_connected: true,
                    }]
                }
                None => Vec::new(),
            };
            plane.shared.vms.insert(
                reference,
                SimVm {
                    power: seed.power,
                    cards,
                },
            );
        }
        plane
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use podctl_core::task::PropertyValue;
    use podctl_core::traits::Scoped;

    fn lab() -> SimulatedControlPlane {
        SimulatedControlPlane::builder()
            .vm_with_adapter("p1_client2", PowerState::PoweredOn, "Pod1_Edge1-Port10", true)
            .vm("p1_headless", PowerState::PoweredOff)
            .network("Pod1_Edge1-Port11")
            .host("esx01")
            .credentials("admin", "pw")
            .build()
    }

    fn conn(username: &str, password: &str) -> ConnectionConfig {
        ConnectionConfig {
            host: "vcenter.lab".into(),
            username: username.into(),
            password: password.into(),
            port: 443,
        }
    }

    #[test]
    fn test_connect_checks_credentials() {
        let plane = lab();
        assert!(plane.connect(&conn("admin", "pw")).is_ok());
        assert!(matches!(
            plane.connect(&conn("admin", "wrong")),
            Err(ConnectionError::AuthenticationFailed { .. })
        ));

        let mut no_host = conn("admin", "pw");
        no_host.host.clear();
        assert!(matches!(
            plane.connect(&no_host),
            Err(ConnectionError::ConnectionRefused(_))
        ));
    }

    #[tokio::test]
    async fn test_view_lists_kind_in_creation_order() {
        let plane = lab();
        let view = Scoped::new(plane.create_container_view(ObjectKind::Network).await.unwrap());
        let names: Vec<String> = view.objects().await.unwrap().into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["Pod1_Edge1-Port10", "Pod1_Edge1-Port11"]);
        assert_eq!(plane.open_views(), 1);
        drop(view);
        assert_eq!(plane.open_views(), 0);
    }

    #[tokio::test]
    async fn test_power_on_applies_start_connected() {
        let plane = SimulatedControlPlane::builder()
            .vm_with_adapter("vm", PowerState::PoweredOff, "net", true)
            .build();
        let vm = plane.find(ObjectKind::VirtualMachine, "vm").unwrap();
        assert!(!plane.cards(&vm).unwrap()[0].connected);

        let task = plane.power_on(&vm).await.unwrap();
        assert_eq!(plane.task_state(&task).await, Some(TaskState::Success));
        assert_eq!(plane.power_state(&vm).await.unwrap(), PowerState::PoweredOn);
        assert!(plane.cards(&vm).unwrap()[0].connected);
    }

    #[tokio::test]
    async fn test_reconfigure_unknown_device_rejected() {
        let plane = lab();
        let vm = plane.find(ObjectKind::VirtualMachine, "p1_headless").unwrap();
        let err = plane
            .reconfigure(&vm, DeviceEdit::device(FIRST_NIC_KEY).connected(true))
            .await
            .unwrap_err();
        assert!(matches!(err, ControlPlaneError::DeviceNotFound { .. }));
        assert!(plane.submissions().await.is_empty());
    }

    #[tokio::test]
    async fn test_held_task_blocks_filter_until_completed() {
        let plane = lab();
        let vm = plane.find(ObjectKind::VirtualMachine, "p1_client2").unwrap();
        plane.script(OperationKind::PowerOff, TaskScript::Hold).await;
        let task = plane.power_off(&vm).await.unwrap();

        let mut filter = plane.create_filter(&[task.clone()]).await.unwrap();
        let first = filter.wait_for_updates(None).await.unwrap();
        assert_eq!(first.objects[0].task, task);

        // Nothing new until the task is released
        assert!(filter.wait_for_updates(Some(&first.version)).now_or_never().is_none());

        plane.complete_task(&task).await.unwrap();
        let next = filter.wait_for_updates(Some(&first.version)).await.unwrap();
        let states: Vec<_> = next.objects[0]
            .changes
            .iter()
            .filter_map(|c| match &c.value {
                PropertyValue::Info(info) => Some(info.state.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(states, vec![TaskState::Success]);
        assert_eq!(plane.power_state(&vm).await.unwrap(), PowerState::PoweredOff);

        filter.release();
        assert_eq!(plane.open_filters(), 0);
    }

    #[tokio::test]
    async fn test_builder_echo_reports_state_path() {
        let plane = SimulatedControlPlane::builder()
            .vm("vm", PowerState::PoweredOff)
            .echo_state_path()
            .build();
        let vm = plane.find(ObjectKind::VirtualMachine, "vm").unwrap();
        let task = plane.power_on(&vm).await.unwrap();

        let mut filter = Scoped::new(plane.create_filter(&[task]).await.unwrap());
        let set = filter.wait_for_updates(None).await.unwrap();
        let paths: Vec<&str> = set.objects[0].changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["info", "info", "info", "info.state"]);
    }

    #[tokio::test]
    async fn test_observed_tasks_are_reclaimed() {
        let plane = lab();
        let vm = plane.find(ObjectKind::VirtualMachine, "p1_client2").unwrap();

        let mut last = None;
        for _ in 0..1000 {
            let task = plane.power_on(&vm).await.unwrap();
            let mut filter = plane.create_filter(&[task.clone()]).await.unwrap();
            let set = filter.wait_for_updates(None).await.unwrap();
            assert_eq!(set.objects[0].task, task);
            filter.release();
            last = Some(task);
        }

        assert_eq!(plane.retained_tasks().await, 0);
        assert_eq!(plane.open_filters(), 0);
        let last = last.unwrap();
        assert_eq!(plane.task_state(&last).await, Some(TaskState::Success));
        assert_eq!(plane.submissions().await.len(), 1000);
    }

    #[tokio::test]
    async fn test_watched_task_survives_reclaim() {
        let plane = lab();
        let vm = plane.find(ObjectKind::VirtualMachine, "p1_client2").unwrap();
        let task = plane.power_on(&vm).await.unwrap();

        let mut watching = plane.create_filter(&[task.clone()]).await.unwrap();
        let mut other = plane.create_filter(&[task.clone()]).await.unwrap();
        other.wait_for_updates(None).await.unwrap();
        other.release();

        // The second subscriber has not consumed the outcome yet
        assert_eq!(plane.retained_tasks().await, 1);
        let set = watching.wait_for_updates(None).await.unwrap();
        assert_eq!(set.objects[0].task, task);
        watching.release();
        assert_eq!(plane.retained_tasks().await, 0);
    }

    #[tokio::test]
    async fn test_completing_terminal_task_rejected() {
        let plane = lab();
        let vm = plane.find(ObjectKind::VirtualMachine, "p1_client2").unwrap();
        let task = plane.power_on(&vm).await.unwrap();
        assert!(plane.complete_task(&task).await.is_err());
        assert!(plane
            .fail_task(&task, TaskFault::new("X", "late"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_from_inventory_seeds_objects() {
        let inventory = Inventory::from_yaml_str(
            r#"
pods:
  - id: "1"
    name: Pod 1
    vms:
      - vmName: p1_client2
        portgroup_options:
          - portgroup: Pod1_Edge1-Port10
          - portgroup: Pod1_Edge1-Port11
      - vmName: p1_ise
"#,
        )
        .unwrap();
        let plane = SimulatedControlPlane::from_inventory(&inventory).build();

        assert!(plane.find(ObjectKind::Network, "Pod1_Edge1-Port11").is_some());
        assert!(plane.find(ObjectKind::Network, DEFAULT_NETWORK).is_some());

        let vm = plane.find(ObjectKind::VirtualMachine, "p1_client2").unwrap();
        let cards = plane.cards(&vm).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(
            cards[0].backing.as_ref().unwrap().device_name,
            "Pod1_Edge1-Port10"
        );
        assert!(cards[0].start_connected);
    }
}
