//! Remote task types and change-notification payloads

use serde::{Deserialize, Serialize};
use std::fmt;

/// Property path carrying a full [`TaskInfo`]
pub const INFO_PATH: &str = "info";

/// Property path carrying a bare [`TaskState`]
pub const INFO_STATE_PATH: &str = "info.state";

/// Opaque identifier of an in-flight remote mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new task ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Error payload of a failed task, passed through verbatim from the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFault {
    /// Fault class name (e.g. `InvalidPowerState`)
    pub fault_type: String,
    /// Localized message
    pub message: String,
}

impl TaskFault {
    pub fn new(fault_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fault_type: fault_type.into(),
            message: message.into(),
        }
    }

    /// Human-readable cause, never empty
    pub fn cause(&self) -> &str {
        if !self.message.trim().is_empty() {
            &self.message
        } else if !self.fault_type.trim().is_empty() {
            &self.fault_type
        } else {
            "unknown control plane fault"
        }
    }
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause())
    }
}

/// Lifecycle state of a remote task.
///
/// `Queued -> Running -> {Success | Error}`; the last two are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Queued,
    Running,
    Success,
    Error(TaskFault),
}

impl TaskState {
    /// Whether no further transitions can occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Success | TaskState::Error(_))
    }

    /// Whether moving from `self` to `next` respects the lifecycle
    pub fn can_transition_to(&self, next: &TaskState) -> bool {
        match (self, next) {
            (TaskState::Queued, TaskState::Queued) => false,
            (TaskState::Queued, _) => true,
            (TaskState::Running, TaskState::Queued | TaskState::Running) => false,
            (TaskState::Running, _) => true,
            (TaskState::Success | TaskState::Error(_), _) => false,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Queued => write!(f, "queued"),
            TaskState::Running => write!(f, "running"),
            TaskState::Success => write!(f, "success"),
            TaskState::Error(fault) => write!(f, "error: {}", fault),
        }
    }
}

/// Full task object as pushed on the `info` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub key: TaskId,
    /// Operation name (e.g. `PowerOnVM_Task`)
    pub description: String,
    pub state: TaskState,
}

/// Opaque, monotonically increasing version token of the change stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(pub String);

impl From<u64> for Version {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value carried by a property change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Info(TaskInfo),
    State(TaskState),
    Text(String),
}

/// A single changed property of a watched object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub path: String,
    pub value: PropertyValue,
}

impl PropertyChange {
    pub fn info(info: TaskInfo) -> Self {
        Self {
            path: INFO_PATH.to_string(),
            value: PropertyValue::Info(info),
        }
    }

    pub fn info_state(state: TaskState) -> Self {
        Self {
            path: INFO_STATE_PATH.to_string(),
            value: PropertyValue::State(state),
        }
    }

    /// The task state this change reports, regardless of which path carried it
    pub fn task_state(&self) -> Option<&TaskState> {
        match (self.path.as_str(), &self.value) {
            (INFO_PATH, PropertyValue::Info(info)) => Some(&info.state),
            (INFO_STATE_PATH, PropertyValue::State(state)) => Some(state),
            _ => None,
        }
    }
}

/// All changes to one watched task within a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUpdate {
    pub task: TaskId,
    pub changes: Vec<PropertyChange>,
}

/// One batch of changes delivered by a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSet {
    /// Version to pass to the next wait
    pub version: Version,
    pub objects: Vec<ObjectUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_never_transition() {
        let fault = TaskState::Error(TaskFault::new("SystemError", "boom"));
        for next in [TaskState::Queued, TaskState::Running, TaskState::Success] {
            assert!(!TaskState::Success.can_transition_to(&next));
            assert!(!fault.can_transition_to(&next));
        }
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(TaskState::Queued.can_transition_to(&TaskState::Running));
        assert!(TaskState::Queued.can_transition_to(&TaskState::Success));
        assert!(TaskState::Running.can_transition_to(&TaskState::Success));
        assert!(!TaskState::Running.can_transition_to(&TaskState::Queued));
    }

    #[test]
    fn test_fault_cause_never_empty() {
        assert_eq!(TaskFault::new("InvalidPowerState", "").cause(), "InvalidPowerState");
        assert_eq!(TaskFault::new("", " ").cause(), "unknown control plane fault");
        assert_eq!(TaskFault::new("X", "disk full").to_string(), "disk full");
    }

    #[test]
    fn test_task_state_from_either_path() {
        let info = PropertyChange::info(TaskInfo {
            key: TaskId::new("task-1"),
            description: "PowerOnVM_Task".into(),
            state: TaskState::Success,
        });
        let bare = PropertyChange::info_state(TaskState::Success);
        assert_eq!(info.task_state(), bare.task_state());

        let other = PropertyChange {
            path: "info.progress".into(),
            value: PropertyValue::Text("50".into()),
        };
        assert!(other.task_state().is_none());
    }

    #[test]
    fn test_mismatched_path_and_value_is_ignored() {
        let change = PropertyChange {
            path: INFO_PATH.into(),
            value: PropertyValue::State(TaskState::Success),
        };
        assert!(change.task_state().is_none());
    }
}
