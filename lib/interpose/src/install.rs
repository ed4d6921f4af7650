//! Installing a pipeline into a host's fetch slot.
//!
//! A [`FetchSlot`] is the place a host keeps its network primitive. Calling
//! [`attach`] swaps the primitive for an [`InterceptedFetch`] around it and
//! hands back an [`Attachment`] to manage interceptors and undo the swap.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use interpose::{FetchSlot, HyperClient, Interceptor, attach};
//!
//! let slot = Arc::new(FetchSlot::new(HyperClient::new()));
//! let attachment = attach(&slot);
//!
//! let registration = attachment.register(Interceptor::new().map_request(|mut args| {
//!     args.set_header("X-Client", "interpose");
//!     Ok(args)
//! }));
//!
//! let response = slot.fetch("https://example.com/").await?;
//!
//! registration.unregister();
//! attachment.detach();
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::{
    Fetch, FetchArgs, FetchFuture, InterceptedFetch, Interceptor, Pipeline, Registration,
    Registry,
};

/// The host's network-call slot.
pub struct FetchSlot {
    current: RwLock<Arc<dyn Fetch>>,
}

impl std::fmt::Debug for FetchSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchSlot").finish_non_exhaustive()
    }
}

impl FetchSlot {
    /// A slot holding the given primitive.
    pub fn new(primitive: impl Fetch + 'static) -> Self {
        Self::from_shared(Arc::new(primitive))
    }

    /// A slot holding an already shared primitive.
    #[must_use]
    pub fn from_shared(primitive: Arc<dyn Fetch>) -> Self {
        Self {
            current: RwLock::new(primitive),
        }
    }

    /// The primitive currently installed.
    #[must_use]
    pub fn current(&self) -> Arc<dyn Fetch> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Install a primitive, returning the previous one.
    pub fn replace(&self, primitive: Arc<dyn Fetch>) -> Arc<dyn Fetch> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, primitive)
    }

    /// Call whatever primitive is installed right now.
    pub fn fetch(&self, args: impl Into<FetchArgs>) -> FetchFuture {
        self.current().fetch(args.into())
    }
}

/// Wrap the slot's current primitive with a fresh, empty interceptor chain.
///
/// Attaching to a slot that is already attached nests the wrappers.
#[must_use]
pub fn attach(slot: &Arc<FetchSlot>) -> Attachment {
    let original = slot.current();
    let registry = Registry::new();
    let intercepted = InterceptedFetch::from_pipeline(Pipeline::with_registry(
        Arc::clone(&original),
        registry.clone(),
    ));
    slot.replace(Arc::new(intercepted.clone()));
    debug!("interceptor chain attached");

    Attachment {
        slot: Arc::clone(slot),
        original,
        intercepted,
        registry,
    }
}

/// Management handle for an installed pipeline.
pub struct Attachment {
    slot: Arc<FetchSlot>,
    original: Arc<dyn Fetch>,
    intercepted: InterceptedFetch,
    registry: Registry,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("registry", &self.registry)
            .field("detached", &self.is_detached())
            .finish_non_exhaustive()
    }
}

impl Attachment {
    /// Register an interceptor. See [`Registry::register`].
    pub fn register(&self, interceptor: impl Into<Arc<Interceptor>>) -> Registration {
        self.registry.register(interceptor)
    }

    /// Remove every registered interceptor.
    pub fn clear(&self) {
        self.registry.clear();
    }

    /// Put the original primitive back and clear the registry.
    ///
    /// Calls already in flight finish with the chain they captured. Later
    /// calls through a retained [`InterceptedFetch`] go straight to the
    /// original primitive. Detaching again is harmless.
    pub fn detach(&self) {
        self.intercepted.pipeline().bypass();
        self.slot.replace(Arc::clone(&self.original));
        self.registry.clear();
        debug!("interceptor chain detached");
    }

    /// Returns `true` once [`Attachment::detach`] has run.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.intercepted.pipeline().is_bypassed()
    }

    /// The registry behind this attachment.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The wrapping primitive that was installed.
    #[must_use]
    pub const fn intercepted(&self) -> &InterceptedFetch {
        &self.intercepted
    }

    /// The primitive that was in the slot before attaching.
    #[must_use]
    pub fn original(&self) -> &Arc<dyn Fetch> {
        &self.original
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{Response, fetch_fn};

    fn ok_slot() -> Arc<FetchSlot> {
        Arc::new(FetchSlot::new(fetch_fn(|_args: FetchArgs| async {
            Ok(Response::new(200, HashMap::new(), "original"))
        })))
    }

    #[test]
    fn attach_installs_wrapper() {
        let slot = ok_slot();
        let before = slot.current();

        let attachment = attach(&slot);

        assert!(!Arc::ptr_eq(&slot.current(), &before));
        assert!(Arc::ptr_eq(attachment.original(), &before));
        assert!(!attachment.is_detached());
    }

    #[test]
    fn detach_restores_original_and_is_idempotent() {
        let slot = ok_slot();
        let before = slot.current();
        let attachment = attach(&slot);
        attachment.register(Interceptor::new());

        attachment.detach();
        attachment.detach();

        assert!(Arc::ptr_eq(&slot.current(), &before));
        assert!(attachment.registry().is_empty());
        assert!(attachment.is_detached());
    }

    #[test]
    fn attachment_is_debug() {
        let attachment = attach(&ok_slot());
        let debug = format!("{attachment:?}");
        assert!(debug.contains("Attachment"));
        assert!(debug.contains("detached: false"));

        attachment.detach();
        assert!(format!("{attachment:?}").contains("detached: true"));
    }

    #[test]
    fn clear_without_registrations() {
        let slot = ok_slot();
        let attachment = attach(&slot);
        attachment.clear();
        assert!(attachment.registry().is_empty());
    }

    #[tokio::test]
    async fn slot_fetch_runs_through_installed_chain() {
        let slot = ok_slot();
        let attachment = attach(&slot);
        attachment.register(
            Interceptor::new().map_response(|response| Ok(response.with_body("intercepted"))),
        );

        let response = slot.fetch("https://example.com/").await.expect("response");

        assert_eq!(response.text().expect("text"), "intercepted");
    }

    #[tokio::test]
    async fn nested_attachments_unwind_in_order() {
        let slot = ok_slot();
        let outer = attach(&slot);
        outer.register(Interceptor::new().map_response(|response| {
            let body = format!("{}+outer", response.text().unwrap_or_default());
            Ok(response.with_body(body))
        }));
        let inner = attach(&slot);
        inner.register(Interceptor::new().map_response(|response| {
            let body = format!("{}+inner", response.text().unwrap_or_default());
            Ok(response.with_body(body))
        }));

        let response = slot.fetch("https://example.com/").await.expect("response");
        assert_eq!(response.text().expect("text"), "original+outer+inner");

        inner.detach();
        let response = slot.fetch("https://example.com/").await.expect("response");
        assert_eq!(response.text().expect("text"), "original+outer");

        outer.detach();
        let response = slot.fetch("https://example.com/").await.expect("response");
        assert_eq!(response.text().expect("text"), "original");
    }
}
