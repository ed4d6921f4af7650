//! Per-call snapshot of the registry.
//!
//! Both phases walk the same order: last registered first. An interceptor
//! registered after `A` therefore transforms the call arguments before `A`
//! does, and transforms the response before `A` does as well.

use std::sync::Arc;

use crate::Interceptor;

/// Interceptors captured for one call, last registered first.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    stages: Vec<Arc<Interceptor>>,
}

impl Chain {
    /// Build a chain from interceptors in registration order.
    #[must_use]
    pub fn from_registered(
        registered: impl DoubleEndedIterator<Item = Arc<Interceptor>>,
    ) -> Self {
        Self {
            stages: registered.rev().collect(),
        }
    }

    /// Number of interceptors captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if no interceptor was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// All captured interceptors, in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Interceptor>> {
        self.stages.iter()
    }

    /// Interceptors that take part in the request phase, in traversal order.
    pub fn request_stages(&self) -> impl Iterator<Item = &Interceptor> {
        self.stages
            .iter()
            .map(AsRef::as_ref)
            .filter(|interceptor| interceptor.has_request_phase())
    }

    /// Interceptors that take part in the response phase, in traversal order.
    pub fn response_stages(&self) -> impl Iterator<Item = &Interceptor> {
        self.stages
            .iter()
            .map(AsRef::as_ref)
            .filter(|interceptor| interceptor.has_response_phase())
    }
}
