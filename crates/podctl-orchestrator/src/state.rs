//! Shared controller state

use std::sync::Arc;

use podctl_core::traits::ControlPlane;
use podctl_core::Inventory;

use crate::reconfigure::Reconfigurator;
use crate::tracker::TaskTracker;

/// State shared by every request handler
pub struct ControllerState<C: ControlPlane> {
    /// Read-only pod inventory loaded at startup
    pub inventory: Arc<Inventory>,
    /// Control-plane session
    pub control_plane: C,
    /// Task wait policy (timeout and shutdown token)
    pub tracker: TaskTracker,
}

impl<C: ControlPlane> ControllerState<C> {
    pub fn new(inventory: Inventory, control_plane: C, tracker: TaskTracker) -> Self {
        Self {
            inventory: Arc::new(inventory),
            control_plane,
            tracker,
        }
    }

    /// Mutation driver bound to this state's session and tracker
    pub fn reconfigurator(&self) -> Reconfigurator<'_, C> {
        Reconfigurator::new(&self.control_plane, &self.tracker)
    }
}
