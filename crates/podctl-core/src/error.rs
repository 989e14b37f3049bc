//! Core error types for podctl

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::task::{TaskFault, TaskId};
use crate::types::ObjectKind;

/// Top-level error type for pod operations
#[derive(Error, Debug)]
pub enum PodError {
    /// Name resolution failed (object absent or renamed)
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// A tracked mutation finished in the Error state
    #[error("Task {task} failed: {fault}")]
    RemoteTask { task: TaskId, fault: TaskFault },

    /// The requested operation combination is not allowed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Could not establish a control-plane session
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Waiting for tasks exceeded the configured bound
    #[error("Timed out after {after:?} waiting for {pending} task(s); they may still be running")]
    Timeout { pending: usize, after: Duration },

    /// Waiting for tasks was interrupted by the caller
    #[error("Cancelled while waiting for {pending} task(s)")]
    Cancelled { pending: usize },

    /// Transport or protocol failure talking to the control plane
    #[error("Control plane error: {0}")]
    ControlPlane(#[from] ControlPlaneError),
}

impl PodError {
    /// Build a NotFound error for a control-plane object
    pub fn object_not_found(kind: ObjectKind, name: impl Into<String>) -> Self {
        PodError::NotFound {
            kind: kind.to_string(),
            name: name.into(),
        }
    }

    /// Build a NotFound error for something that is not a control-plane object
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        PodError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Whether the task(s) behind this error may still be running remotely
    pub fn may_still_be_running(&self) -> bool {
        matches!(self, PodError::Timeout { .. } | PodError::Cancelled { .. })
    }
}

/// Control-plane session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Credentials were rejected
    #[error("Authentication failed for {username}@{host}")]
    AuthenticationFailed { username: String, host: String },

    /// The endpoint could not be reached
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    /// The session dropped after it was established
    #[error("Connection lost: {0}")]
    ConnectionLost(String),
}

/// Errors reported by a control-plane backend outside of task faults
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlPlaneError {
    /// The referenced object no longer exists on the control plane
    #[error("Managed object {0} does not exist")]
    ManagedObjectNotFound(String),

    /// The referenced device is not present on the VM
    #[error("Device {key} not found on {vm}")]
    DeviceNotFound { vm: String, key: i32 },

    /// The subscription or view was used after being released
    #[error("{0} has already been released")]
    Released(String),

    /// Session dropped while a request was in flight
    #[error("Session lost: {0}")]
    SessionLost(String),

    /// Anything else the backend wants to report
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Inventory YAML parse error
    #[error("Inventory parse error: {0}")]
    Inventory(#[from] serde_yaml::Error),

    /// Environment override could not be applied
    #[error("Invalid value for {var}: {value}")]
    Environment { var: String, value: String },
}
