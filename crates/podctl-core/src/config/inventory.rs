//! Static pod inventory
//!
//! Loaded once at startup from YAML and never written back. The runtime
//! status of each VM lives in the result of a refresh, not here.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;

/// All pods known to the controller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub pods: Vec<Pod>,
}

/// A named group of VMs forming one lab environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pod {
    /// Identifier used in routes
    #[serde(alias = "pod_number")]
    pub id: String,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub vms: Vec<VmEntry>,
}

/// A VM as declared in the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmEntry {
    /// Control-plane lookup key
    #[serde(rename = "vmName", alias = "vmname")]
    pub vm_name: String,

    /// Human-readable alias
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Port groups this VM's first adapter may be moved to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portgroup_options: Option<Vec<PortGroupOption>>,
}

/// A port group a VM may be attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortGroupOption {
    /// Control-plane port group name
    pub portgroup: String,

    /// Human-readable alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Inventory {
    /// Parse and validate an inventory document
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let inventory: Inventory = serde_yaml::from_str(content)?;
        inventory.validate()?;
        Ok(inventory)
    }

    /// Look up a pod by ID
    pub fn pod(&self, id: &str) -> Option<&Pod> {
        self.pods.iter().find(|p| p.id == id)
    }

    /// Check structural invariants the rest of the system relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut pod_ids = HashSet::new();
        for pod in &self.pods {
            if pod.id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "pod '{}' has an empty id",
                    pod.name
                )));
            }
            if !pod_ids.insert(pod.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate pod id '{}'", pod.id)));
            }

            let mut vm_names = HashSet::new();
            for vm in &pod.vms {
                if vm.vm_name.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "pod '{}' has a VM with an empty vmName",
                        pod.id
                    )));
                }
                if !vm_names.insert(vm.vm_name.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "pod '{}' lists VM '{}' twice",
                        pod.id, vm.vm_name
                    )));
                }
                if vm.port_groups().iter().any(|o| o.portgroup.trim().is_empty()) {
                    return Err(ConfigError::Invalid(format!(
                        "VM '{}' in pod '{}' has an empty portgroup key",
                        vm.vm_name, pod.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Pod {
    /// Look up a VM of this pod by its control-plane name
    pub fn vm(&self, vm_name: &str) -> Option<&VmEntry> {
        self.vms.iter().find(|v| v.vm_name == vm_name)
    }
}

impl VmEntry {
    pub fn new(vm_name: impl Into<String>) -> Self {
        Self {
            vm_name: vm_name.into(),
            display_name: None,
            portgroup_options: None,
        }
    }

    /// Display alias, falling back to the control-plane name
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.vm_name)
    }

    /// Declared port group options (empty if none)
    pub fn port_groups(&self) -> &[PortGroupOption] {
        self.portgroup_options.as_deref().unwrap_or(&[])
    }

    /// Whether the inventory declares port group options for this VM
    pub fn has_port_group_options(&self) -> bool {
        self.portgroup_options.is_some()
    }

    /// Find a declared option by its control-plane key
    pub fn port_group(&self, key: &str) -> Option<&PortGroupOption> {
        self.port_groups().iter().find(|o| o.portgroup == key)
    }
}

impl PortGroupOption {
    /// Display alias, falling back to the port group key
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.portgroup)
    }
}

/// Load and validate the inventory file
pub fn load_inventory(path: &Path) -> Result<Inventory, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read inventory: {}", e)))?;

    let inventory = Inventory::from_yaml_str(&content)?;
    tracing::debug!(
        "Loaded {} pod(s) from {}",
        inventory.pods.len(),
        path.display()
    );
    Ok(inventory)
}
