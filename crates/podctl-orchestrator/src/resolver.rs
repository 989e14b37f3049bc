//! Name-to-object resolution
//!
//! Every lookup opens a fresh container view and scans it. Nothing is
//! cached between calls.

use std::marker::PhantomData;

use podctl_core::traits::{ContainerView, Scoped, ViewManager};
use podctl_core::types::{ManagedObject, ObjectKind, ObjectRef};
use podctl_core::PodError;

/// A resolved control-plane object.
///
/// Borrows the session it was resolved through, so it cannot be carried
/// past the lifetime of that connection.
#[derive(Debug, Clone)]
pub struct RemoteHandle<'c> {
    object: ManagedObject,
    _session: PhantomData<&'c ()>,
}

impl<'c> RemoteHandle<'c> {
    fn new(object: ManagedObject) -> Self {
        Self {
            object,
            _session: PhantomData,
        }
    }

    /// Remote identity
    pub fn reference(&self) -> &ObjectRef {
        &self.object.reference
    }

    /// Name as reported by the control plane
    pub fn name(&self) -> &str {
        &self.object.name
    }

    pub fn kind(&self) -> ObjectKind {
        self.object.reference.kind
    }

    /// Fail with `InvalidArgument` unless this handle is of `kind`
    pub(crate) fn expect_kind(&self, kind: ObjectKind) -> Result<(), PodError> {
        if self.kind() == kind {
            Ok(())
        } else {
            Err(PodError::InvalidArgument(format!(
                "'{}' is a {}, expected a {}",
                self.name(),
                self.kind(),
                kind
            )))
        }
    }
}

/// Enumerate every object of `kind` under the root folder
pub async fn list_objects<C: ViewManager>(
    conn: &C,
    kind: ObjectKind,
) -> Result<Vec<ManagedObject>, PodError> {
    let view = Scoped::new(conn.create_container_view(kind).await?);
    let objects = view.objects().await;
    view.release();
    Ok(objects?)
}

/// Resolve `name` to the first live object of `kind` with exactly that name
pub async fn resolve<'c, C: ViewManager>(
    conn: &'c C,
    kind: ObjectKind,
    name: &str,
) -> Result<RemoteHandle<'c>, PodError> {
    let object = list_objects(conn, kind)
        .await?
        .into_iter()
        .find(|o| o.name == name)
        .ok_or_else(|| PodError::object_not_found(kind, name))?;

    tracing::debug!("Resolved {} '{}' to {}", kind, name, object.reference);
    Ok(RemoteHandle::new(object))
}

/// Resolve a virtual machine by name
pub async fn resolve_vm<'c, C: ViewManager>(
    conn: &'c C,
    name: &str,
) -> Result<RemoteHandle<'c>, PodError> {
    resolve(conn, ObjectKind::VirtualMachine, name).await
}

/// Resolve a network / port group by name
pub async fn resolve_port_group<'c, C: ViewManager>(
    conn: &'c C,
    name: &str,
) -> Result<RemoteHandle<'c>, PodError> {
    resolve(conn, ObjectKind::Network, name).await
}

/// Resolve a hypervisor host by name
pub async fn resolve_host<'c, C: ViewManager>(
    conn: &'c C,
    name: &str,
) -> Result<RemoteHandle<'c>, PodError> {
    resolve(conn, ObjectKind::Host, name).await
}
