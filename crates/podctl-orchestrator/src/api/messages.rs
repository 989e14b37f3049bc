//! Operator-facing status messages
//!
//! Messages always use the inventory's display aliases, falling back to the
//! raw control-plane keys when no alias is declared.

use podctl_core::config::{PortGroupOption, VmEntry};
use podctl_core::PodError;

/// A mutation requested against one inventory VM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmAction<'a> {
    PowerOn,
    PowerOff,
    ConnectNic,
    DisconnectNic,
    MovePortGroup(&'a PortGroupOption),
}

impl VmAction<'_> {
    /// Message shown while the action runs
    pub fn describe(&self, vm: &VmEntry) -> String {
        let name = vm.label();
        match self {
            VmAction::PowerOn => format!("Powering on {}", name),
            VmAction::PowerOff => format!("Powering off {}", name),
            VmAction::ConnectNic => format!("Connecting NIC for {}", name),
            VmAction::DisconnectNic => format!("Disconnecting NIC for {}", name),
            VmAction::MovePortGroup(option) => {
                format!("Moving {} NIC to {}", name, option.label())
            }
        }
    }
}

/// Cause of a failure as shown to the operator; never empty
pub fn error_cause(error: &PodError) -> String {
    match error {
        PodError::RemoteTask { fault, .. } => fault.cause().to_string(),
        other => other.to_string(),
    }
}

/// Message shown when an action fails
pub fn failure_message(action: &str, error: &PodError) -> String {
    format!("Failed: {}: {}", action, error_cause(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use podctl_core::task::{TaskFault, TaskId};

    fn client2() -> VmEntry {
        VmEntry {
            display_name: Some("Client 2".into()),
            portgroup_options: Some(vec![PortGroupOption {
                portgroup: "Pod1_Edge1-Port11".into(),
                name: Some("Edge1 Net".into()),
            }]),
            ..VmEntry::new("p1_client2")
        }
    }

    #[test]
    fn test_messages_use_aliases() {
        let vm = client2();
        let option = &vm.port_groups()[0];
        assert_eq!(VmAction::PowerOn.describe(&vm), "Powering on Client 2");
        assert_eq!(VmAction::DisconnectNic.describe(&vm), "Disconnecting NIC for Client 2");
        assert_eq!(
            VmAction::MovePortGroup(option).describe(&vm),
            "Moving Client 2 NIC to Edge1 Net"
        );
    }

    #[test]
    fn test_messages_fall_back_to_keys() {
        let vm = VmEntry::new("p1_router");
        let option = PortGroupOption {
            portgroup: "Pod1_Core".into(),
            name: None,
        };
        assert_eq!(VmAction::PowerOff.describe(&vm), "Powering off p1_router");
        assert_eq!(
            VmAction::MovePortGroup(&option).describe(&vm),
            "Moving p1_router NIC to Pod1_Core"
        );
    }

    #[test]
    fn test_failure_cause_is_never_empty() {
        let err = PodError::RemoteTask {
            task: TaskId::new("task-3"),
            fault: TaskFault::new("", ""),
        };
        let message = failure_message("Powering on Client 2", &err);
        assert_eq!(
            message,
            "Failed: Powering on Client 2: unknown control plane fault"
        );

        let err = PodError::not_found("virtual machine", "p1_client2");
        assert!(failure_message("Powering on Client 2", &err).ends_with("p1_client2"));
    }
}
