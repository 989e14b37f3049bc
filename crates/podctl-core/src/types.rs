//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of control-plane object that can be looked up by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A virtual machine
    VirtualMachine,
    /// A network or port group
    Network,
    /// A hypervisor host
    Host,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::VirtualMachine => write!(f, "virtual machine"),
            ObjectKind::Network => write!(f, "network"),
            ObjectKind::Host => write!(f, "host"),
        }
    }
}

/// Opaque identity of a control-plane object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Kind of the referenced object
    pub kind: ObjectKind,
    /// Backend-assigned identifier (e.g. `vm-42`)
    pub id: String,
}

impl ObjectRef {
    /// Create a new object reference
    pub fn new(kind: ObjectKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// An object returned by enumerating a container view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedObject {
    /// Remote identity
    pub reference: ObjectRef,
    /// Inventory name as reported by the control plane
    pub name: String,
}

/// Runtime power state of a VM, as reported by the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerState {
    PoweredOn,
    PoweredOff,
    Suspended,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::PoweredOn => write!(f, "poweredOn"),
            PowerState::PoweredOff => write!(f, "poweredOff"),
            PowerState::Suspended => write!(f, "suspended"),
        }
    }
}

/// Connection status of a VM's network adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NicStatus {
    Connected,
    Disconnected,
}

impl From<bool> for NicStatus {
    fn from(connected: bool) -> Self {
        if connected {
            NicStatus::Connected
        } else {
            NicStatus::Disconnected
        }
    }
}

impl fmt::Display for NicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NicStatus::Connected => write!(f, "Connected"),
            NicStatus::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Network backing of a virtual Ethernet card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkBacking {
    /// Network / port group the card is attached to
    pub network: ObjectRef,
    /// Backing device name, normally the port group's name
    pub device_name: String,
}

/// A virtual Ethernet card attached to a VM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetCard {
    /// Device key, unique within the VM
    pub key: i32,
    /// Device label (e.g. "Network adapter 1")
    pub label: String,
    /// Current backing, if any
    pub backing: Option<NetworkBacking>,
    /// Whether the card is currently connected
    pub connected: bool,
    /// Whether the card connects when the VM powers on
    pub start_connected: bool,
}

/// An edit to a single virtual device, submitted as one reconfiguration task.
///
/// Fields left as `None` are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceEdit {
    /// Key of the device being edited
    pub device_key: i32,
    pub connected: Option<bool>,
    pub start_connected: Option<bool>,
    pub backing: Option<NetworkBacking>,
}

impl DeviceEdit {
    /// Start an edit of the device with the given key
    pub fn device(device_key: i32) -> Self {
        Self {
            device_key,
            ..Default::default()
        }
    }

    pub fn connected(mut self, connected: bool) -> Self {
        self.connected = Some(connected);
        self
    }

    pub fn start_connected(mut self, start_connected: bool) -> Self {
        self.start_connected = Some(start_connected);
        self
    }

    pub fn backing(mut self, network: ObjectRef, device_name: impl Into<String>) -> Self {
        self.backing = Some(NetworkBacking {
            network,
            device_name: device_name.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_state_serializes_like_control_plane() {
        let json = serde_json::to_string(&PowerState::PoweredOn).unwrap();
        assert_eq!(json, r#""poweredOn""#);
        assert_eq!(PowerState::Suspended.to_string(), "suspended");
    }

    #[test]
    fn test_nic_status_from_bool() {
        assert_eq!(NicStatus::from(true), NicStatus::Connected);
        assert_eq!(NicStatus::from(false).to_string(), "Disconnected");
    }

    #[test]
    fn test_device_edit_builder_leaves_unset_fields() {
        let edit = DeviceEdit::device(4000).connected(false);
        assert_eq!(edit.device_key, 4000);
        assert_eq!(edit.connected, Some(false));
        assert!(edit.start_connected.is_none());
        assert!(edit.backing.is_none());
    }
}
