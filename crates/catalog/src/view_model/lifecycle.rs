//! Request generations and teardown gating for view-models.
//!
//! Every suspending load takes a [`RequestToken`] before its first await and
//! checks it after the last one. A token is honored only while it is the
//! newest for its resource and the view-model is still attached, so a slow
//! response can never overwrite a newer one or touch a torn-down view.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::api::ResourceKind;

/// Proof of which request a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    resource: ResourceKind,
    generation: u64,
}

impl RequestToken {
    #[must_use]
    pub const fn resource(&self) -> ResourceKind {
        self.resource
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Attached flag plus one generation counter per resource kind.
#[derive(Debug)]
pub struct Lifecycle {
    attached: AtomicBool,
    products: AtomicU64,
    categories: AtomicU64,
    favorites: AtomicU64,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            attached: AtomicBool::new(true),
            products: AtomicU64::new(0),
            categories: AtomicU64::new(0),
            favorites: AtomicU64::new(0),
        }
    }
}

impl Lifecycle {
    const fn counter(&self, resource: ResourceKind) -> &AtomicU64 {
        match resource {
            ResourceKind::Products => &self.products,
            ResourceKind::Categories => &self.categories,
            ResourceKind::Favorites => &self.favorites,
        }
    }

    /// Start a request, superseding any outstanding one for `resource`.
    pub fn begin(&self, resource: ResourceKind) -> RequestToken {
        let generation = self.counter(resource).fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken {
            resource,
            generation,
        }
    }

    /// Whether a result for `token` may still be applied.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.is_attached() && self.counter(token.resource).load(Ordering::SeqCst) == token.generation
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Tear down: no token is honored afterwards.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}
