//! Scoped control-plane resources
//!
//! Container views and update filters are server-side objects that must be
//! destroyed once the caller is done with them. [`Scoped`] owns such a
//! resource and releases it exactly once when dropped, so early returns,
//! `?` propagation, panics and dropped futures all release it.

use std::ops::{Deref, DerefMut};

/// A server-side resource that must be released when no longer used
pub trait ScopedResource: Send {
    /// Release the resource. Called at most once by [`Scoped`].
    fn release(&mut self);
}

/// Guard that releases the wrapped resource on drop
pub struct Scoped<R: ScopedResource> {
    inner: Option<R>,
}

impl<R: ScopedResource> Scoped<R> {
    /// Take ownership of a freshly created resource
    pub fn new(resource: R) -> Self {
        Self {
            inner: Some(resource),
        }
    }

    /// Release now instead of waiting for drop
    pub fn release(mut self) {
        if let Some(mut resource) = self.inner.take() {
            resource.release();
        }
    }
}

impl<R: ScopedResource> Deref for Scoped<R> {
    type Target = R;

    fn deref(&self) -> &R {
        // Only `release(self)` and `drop` take the resource out
        self.inner.as_ref().expect("scoped resource already released")
    }
}

impl<R: ScopedResource> DerefMut for Scoped<R> {
    fn deref_mut(&mut self) -> &mut R {
        self.inner.as_mut().expect("scoped resource already released")
    }
}

impl<R: ScopedResource> Drop for Scoped<R> {
    fn drop(&mut self) {
        if let Some(mut resource) = self.inner.take() {
            resource.release();
        }
    }
}
