//! Task table and versioned change log

use std::collections::{HashMap, HashSet, VecDeque};

use podctl_core::task::{
    ObjectUpdate, PropertyChange, TaskFault, TaskId, TaskInfo, TaskState, UpdateSet, Version,
};
use podctl_core::types::{DeviceEdit, ObjectRef};
use podctl_core::ControlPlaneError;

/// A mutation submitted to the simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    PowerOn,
    PowerOff,
    Reconfigure(DeviceEdit),
}

impl Mutation {
    /// Name of the remote method that produced the task
    pub fn description(&self) -> &'static str {
        match self {
            Mutation::PowerOn => "PowerOnVM_Task",
            Mutation::PowerOff => "PowerOffVM_Task",
            Mutation::Reconfigure(_) => "ReconfigVM_Task",
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Mutation::PowerOn => OperationKind::PowerOn,
            Mutation::PowerOff => OperationKind::PowerOff,
            Mutation::Reconfigure(_) => OperationKind::Reconfigure,
        }
    }
}

/// Mutation class used to script outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    PowerOn,
    PowerOff,
    Reconfigure,
}

/// How the simulator resolves the next task of a given kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScript {
    /// Run and succeed immediately, applying the mutation
    Complete,
    /// Run and fail immediately with the given fault
    Fail(TaskFault),
    /// Start running and wait for `complete_task` / `fail_task`
    Hold,
}

/// One entry of the submission log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub task: TaskId,
    pub vm: ObjectRef,
    pub mutation: Mutation,
}

/// Unobserved finished tasks kept for late subscribers
const RETAINED_UNOBSERVED: usize = 256;

/// Final states remembered after a task is reclaimed
const HISTORY_LIMIT: usize = 256;

/// Submissions kept for inspection
const SUBMISSION_LIMIT: usize = 1024;

struct TaskRecord {
    info: TaskInfo,
    vm: ObjectRef,
    mutation: Mutation,
    /// Changes tagged with the version that produced them
    changes: Vec<(u64, PropertyChange)>,
    /// A filter has delivered the terminal state
    observed: bool,
}

/// Tasks, their change logs and the outcome scripts.
///
/// A finished task is reclaimed once a filter has delivered its terminal
/// state and no open filter still watches it. Finished tasks nobody ever
/// observed are capped at [`RETAINED_UNOBSERVED`], oldest first.
#[derive(Default)]
pub(crate) struct TaskTable {
    tasks: HashMap<TaskId, TaskRecord>,
    /// Retained terminal tasks in the order they finished
    finished: VecDeque<TaskId>,
    /// Final states of reclaimed tasks, oldest first
    history: VecDeque<(TaskId, TaskState)>,
    version: u64,
    next_id: u64,
    scripts: HashMap<OperationKind, VecDeque<TaskScript>>,
    submissions: VecDeque<Submission>,
    pub(crate) echo_state_path: bool,
}

impl TaskTable {
    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn push_script(&mut self, kind: OperationKind, script: TaskScript) {
        self.scripts.entry(kind).or_default().push_back(script);
    }

    pub(crate) fn next_script(&mut self, kind: OperationKind) -> TaskScript {
        self.scripts
            .get_mut(&kind)
            .and_then(VecDeque::pop_front)
            .unwrap_or(TaskScript::Complete)
    }

    pub(crate) fn submissions(&self) -> Vec<Submission> {
        self.submissions.iter().cloned().collect()
    }

    /// Number of task records still held
    pub(crate) fn retained(&self) -> usize {
        self.tasks.len()
    }

    /// Register a new queued task and return its ID
    pub(crate) fn submit(&mut self, vm: ObjectRef, mutation: Mutation) -> TaskId {
        self.next_id += 1;
        let id = TaskId::new(format!("task-{}", self.next_id));
        let info = TaskInfo {
            key: id.clone(),
            description: mutation.description().to_string(),
            state: TaskState::Queued,
        };

        self.version += 1;
        if self.submissions.len() == SUBMISSION_LIMIT {
            self.submissions.pop_front();
        }
        self.submissions.push_back(Submission {
            task: id.clone(),
            vm: vm.clone(),
            mutation: mutation.clone(),
        });
        self.tasks.insert(
            id.clone(),
            TaskRecord {
                changes: vec![(self.version, PropertyChange::info(info.clone()))],
                info,
                vm,
                mutation,
                observed: false,
            },
        );
        id
    }

    /// Move a task to `next`, enforcing the lifecycle
    pub(crate) fn transition(
        &mut self,
        id: &TaskId,
        next: TaskState,
    ) -> Result<(), ControlPlaneError> {
        let echo = self.echo_state_path;
        let record = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| ControlPlaneError::ManagedObjectNotFound(id.to_string()))?;

        if !record.info.state.can_transition_to(&next) {
            return Err(ControlPlaneError::Other(format!(
                "task {} cannot move from {} to {}",
                id, record.info.state, next
            )));
        }
        record.info.state = next.clone();

        self.version += 1;
        record
            .changes
            .push((self.version, PropertyChange::info(record.info.clone())));
        if next.is_terminal() {
            if echo {
                record
                    .changes
                    .push((self.version, PropertyChange::info_state(next)));
            }
            self.finished.push_back(id.clone());
        }
        Ok(())
    }

    /// The VM and mutation behind a task
    pub(crate) fn target(&self, id: &TaskId) -> Option<(ObjectRef, Mutation)> {
        self.tasks
            .get(id)
            .map(|r| (r.vm.clone(), r.mutation.clone()))
    }

    /// State of a live task, or the final state of a recently reclaimed one
    pub(crate) fn state(&self, id: &TaskId) -> Option<TaskState> {
        match self.tasks.get(id) {
            Some(record) => Some(record.info.state.clone()),
            None => self
                .history
                .iter()
                .rev()
                .find(|(task, _)| task == id)
                .map(|(_, state)| state.clone()),
        }
    }

    /// Changes newer than `since` for the watched tasks, if any.
    ///
    /// Delivering a terminal change marks the task observed.
    pub(crate) fn updates_since(
        &mut self,
        watched: &HashSet<TaskId>,
        since: u64,
    ) -> Option<UpdateSet> {
        let mut objects: Vec<(u64, ObjectUpdate)> = Vec::new();
        for id in watched {
            let Some(record) = self.tasks.get_mut(id) else {
                continue;
            };
            let fresh: Vec<&(u64, PropertyChange)> =
                record.changes.iter().filter(|(v, _)| *v > since).collect();
            let Some(first) = fresh.first().map(|(v, _)| *v) else {
                continue;
            };
            let changes = fresh.into_iter().map(|(_, c)| c.clone()).collect();
            if record.info.state.is_terminal() {
                record.observed = true;
            }
            objects.push((
                first,
                ObjectUpdate {
                    task: id.clone(),
                    changes,
                },
            ));
        }

        if objects.is_empty() {
            return None;
        }
        objects.sort_by_key(|(first, _)| *first);
        Some(UpdateSet {
            version: Version::from(self.version),
            objects: objects.into_iter().map(|(_, update)| update).collect(),
        })
    }

    /// Drop finished tasks no open filter still needs.
    ///
    /// Returns how many records were reclaimed.
    pub(crate) fn reclaim(&mut self, is_watched: impl Fn(&TaskId) -> bool) -> usize {
        let finished = std::mem::take(&mut self.finished);
        let mut kept = VecDeque::with_capacity(finished.len());
        let mut unobserved = 0;
        let mut reclaimed = 0;

        // Newest first so the cap keeps the latest unobserved tasks
        for id in finished.into_iter().rev() {
            let Some(record) = self.tasks.get(&id) else {
                continue;
            };
            let keep = if is_watched(&id) {
                true
            } else if record.observed {
                false
            } else {
                unobserved += 1;
                unobserved <= RETAINED_UNOBSERVED
            };

            if keep {
                kept.push_front(id);
            } else if let Some(record) = self.tasks.remove(&id) {
                if self.history.len() == HISTORY_LIMIT {
                    self.history.pop_front();
                }
                self.history.push_back((id, record.info.state));
                reclaimed += 1;
            }
        }
        self.finished = kept;
        reclaimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podctl_core::types::ObjectKind;

    fn vm() -> ObjectRef {
        ObjectRef::new(ObjectKind::VirtualMachine, "vm-1")
    }

    #[test]
    fn test_submit_logs_queued() {
        let mut table = TaskTable::default();
        let id = table.submit(vm(), Mutation::PowerOn);
        assert_eq!(table.state(&id), Some(TaskState::Queued));
        assert_eq!(table.version(), 1);
        assert_eq!(table.submissions().len(), 1);
    }

    #[test]
    fn test_terminal_transition_rejected() {
        let mut table = TaskTable::default();
        let id = table.submit(vm(), Mutation::PowerOff);
        table.transition(&id, TaskState::Success).unwrap();
        assert!(table.transition(&id, TaskState::Running).is_err());
        assert!(table
            .transition(&id, TaskState::Error(TaskFault::new("X", "late")))
            .is_err());
    }

    #[test]
    fn test_updates_filtered_by_task_and_version() {
        let mut table = TaskTable::default();
        let a = table.submit(vm(), Mutation::PowerOn);
        let b = table.submit(vm(), Mutation::PowerOff);
        table.transition(&a, TaskState::Running).unwrap();

        let watched: HashSet<TaskId> = [a.clone()].into_iter().collect();
        let set = table.updates_since(&watched, 0).unwrap();
        assert_eq!(set.objects.len(), 1);
        assert_eq!(set.objects[0].task, a);
        assert_eq!(set.objects[0].changes.len(), 2);
        assert_eq!(set.version, Version::from(3));

        assert!(table.updates_since(&watched, 3).is_none());
        let only_b: HashSet<TaskId> = [b].into_iter().collect();
        assert_eq!(table.updates_since(&only_b, 0).unwrap().objects.len(), 1);
    }

    #[test]
    fn test_echo_state_path_on_terminal() {
        let mut table = TaskTable::default();
        table.echo_state_path = true;
        let id = table.submit(vm(), Mutation::PowerOn);
        table.transition(&id, TaskState::Running).unwrap();
        table.transition(&id, TaskState::Success).unwrap();

        let watched: HashSet<TaskId> = [id].into_iter().collect();
        let set = table.updates_since(&watched, 2).unwrap();
        let paths: Vec<&str> = set.objects[0].changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["info", "info.state"]);
    }

    fn watching(id: &TaskId) -> HashSet<TaskId> {
        [id.clone()].into_iter().collect()
    }

    #[test]
    fn test_observed_task_reclaimed_once_unwatched() {
        let mut table = TaskTable::default();
        let id = table.submit(vm(), Mutation::PowerOn);
        table.transition(&id, TaskState::Running).unwrap();
        table.transition(&id, TaskState::Success).unwrap();

        // Still watched: kept even though its outcome was delivered
        assert!(table.updates_since(&watching(&id), 0).is_some());
        assert_eq!(table.reclaim(|t| *t == id), 0);
        assert_eq!(table.retained(), 1);

        assert_eq!(table.reclaim(|_| false), 1);
        assert_eq!(table.retained(), 0);
        assert_eq!(table.state(&id), Some(TaskState::Success));
        assert!(table.target(&id).is_none());
    }

    #[test]
    fn test_unobserved_and_running_tasks_survive_reclaim() {
        let mut table = TaskTable::default();
        let running = table.submit(vm(), Mutation::PowerOff);
        table.transition(&running, TaskState::Running).unwrap();
        let done = table.submit(vm(), Mutation::PowerOn);
        table.transition(&done, TaskState::Success).unwrap();

        // A filter created after completion must still see the outcome
        assert_eq!(table.reclaim(|_| false), 0);
        let set = table.updates_since(&watching(&done), 0).unwrap();
        assert_eq!(set.objects[0].changes.len(), 2);

        assert_eq!(table.reclaim(|_| false), 1);
        assert_eq!(table.state(&running), Some(TaskState::Running));
        assert_eq!(table.retained(), 1);
    }

    #[test]
    fn test_unobserved_finished_tasks_are_capped() {
        let mut table = TaskTable::default();
        let ids: Vec<TaskId> = (0..RETAINED_UNOBSERVED + 10)
            .map(|_| {
                let id = table.submit(vm(), Mutation::PowerOn);
                table.transition(&id, TaskState::Success).unwrap();
                id
            })
            .collect();

        assert_eq!(table.reclaim(|_| false), 10);
        assert_eq!(table.retained(), RETAINED_UNOBSERVED);
        assert!(table.target(&ids[9]).is_none());
        assert!(table.target(&ids[10]).is_some());
    }

    #[test]
    fn test_scripts_are_consumed_in_order() {
        let mut table = TaskTable::default();
        table.push_script(OperationKind::Reconfigure, TaskScript::Hold);
        assert_eq!(table.next_script(OperationKind::Reconfigure), TaskScript::Hold);
        assert_eq!(table.next_script(OperationKind::Reconfigure), TaskScript::Complete);
        assert_eq!(table.next_script(OperationKind::PowerOn), TaskScript::Complete);
    }
}
