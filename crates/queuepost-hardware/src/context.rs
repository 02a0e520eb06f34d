//! Process-wide hardware context.
//!
//! The station touches a handful of shared resources (GPIO lines, the SPI
//! bus of the segment display) that must be configured once and torn down
//! once. [`HardwareContext`] is the single owner of that lifecycle:
//!
//! - devices claim their resources through `&HardwareContext` at
//!   construction, so a pin can never be driven by two devices;
//! - backends register release hooks that close their handles;
//! - [`release`](HardwareContext::release) runs every hook exactly once, no
//!   matter how many times it is called, and `Drop` calls it as a last
//!   resort.
//!
//! # Examples
//!
//! ```
//! use queuepost_hardware::{HardwareContext, Resource};
//!
//! let context = HardwareContext::new();
//! context.claim(Resource::Pin(26), "status lamp").unwrap();
//! assert!(context.claim(Resource::Pin(26), "other").is_err());
//!
//! assert!(context.release());
//! assert!(!context.release());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::error::{HardwareError, Result};
use crate::types::Resource;

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Owner of all hardware resources for the lifetime of the process.
pub struct HardwareContext {
    /// Claimed resources and the role that owns each.
    claims: Mutex<BTreeMap<Resource, String>>,

    /// Teardown actions registered by backends, run in reverse order.
    hooks: Mutex<Vec<ReleaseHook>>,

    released: AtomicBool,
}

impl HardwareContext {
    pub fn new() -> Self {
        Self {
            claims: Mutex::new(BTreeMap::new()),
            hooks: Mutex::new(Vec::new()),
            released: AtomicBool::new(false),
        }
    }

    /// Take exclusive ownership of `resource` for `owner`.
    ///
    /// # Errors
    ///
    /// - `HardwareError::ResourceInUse` if another owner holds the resource
    /// - `HardwareError::Released` if the context has already been torn down
    pub fn claim(&self, resource: Resource, owner: impl Into<String>) -> Result<()> {
        let owner = owner.into();
        if self.is_released() {
            return Err(HardwareError::released(owner));
        }

        let mut claims = self.claims.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = claims.get(&resource) {
            return Err(HardwareError::resource_in_use(resource, existing.clone()));
        }

        debug!(%resource, %owner, "Resource claimed");
        claims.insert(resource, owner);
        Ok(())
    }

    /// Whether `resource` is currently owned.
    pub fn is_claimed(&self, resource: &Resource) -> bool {
        self.claims
            .lock()
            .map(|claims| claims.contains_key(resource))
            .unwrap_or(false)
    }

    /// Snapshot of current claims.
    pub fn claims(&self) -> Vec<(Resource, String)> {
        self.claims
            .lock()
            .map(|claims| claims.iter().map(|(r, o)| (r.clone(), o.clone())).collect())
            .unwrap_or_default()
    }

    /// Register a teardown action to run on release.
    ///
    /// Hooks registered after release run immediately.
    pub fn on_release(&self, hook: impl FnOnce() + Send + 'static) {
        if self.is_released() {
            hook();
            return;
        }
        let mut hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
        hooks.push(Box::new(hook));
    }

    /// Release every claimed resource and run the teardown hooks.
    ///
    /// Returns `true` on the call that performed the release and `false` on
    /// every later call.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }

        let hooks = {
            let mut hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *hooks)
        };
        for hook in hooks.into_iter().rev() {
            hook();
        }

        let count = {
            let mut claims = self.claims.lock().unwrap_or_else(|e| e.into_inner());
            let count = claims.len();
            claims.clear();
            count
        };

        info!(resources = count, "Hardware released");
        true
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Default for HardwareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HardwareContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HardwareContext")
            .field("claims", &self.claims())
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for HardwareContext {
    fn drop(&mut self) {
        if self.release() {
            warn!("Hardware context dropped without explicit release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_claim_and_conflict() {
        let context = HardwareContext::new();
        context.claim(Resource::Pin(21), "start button").unwrap();

        let err = context.claim(Resource::Pin(21), "lamp").unwrap_err();
        assert!(matches!(err, HardwareError::ResourceInUse { .. }));
        assert_eq!(err.to_string(), "GPIO21 already claimed by start button");
    }

    #[test]
    fn test_distinct_resources() {
        let context = HardwareContext::new();
        context.claim(Resource::Pin(21), "start button").unwrap();
        context.claim(Resource::Pin(20), "end button").unwrap();
        context
            .claim(Resource::Bus("spi0.0".into()), "display")
            .unwrap();

        assert_eq!(context.claims().len(), 3);
    }

    #[test]
    fn test_release_runs_hooks_once() {
        let context = HardwareContext::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            context.on_release(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(context.release());
        assert!(!context.release());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_release_runs_hooks_in_reverse_order() {
        let context = HardwareContext::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = Arc::clone(&order);
            context.on_release(move || order.lock().unwrap().push(i));
        }
        context.release();

        assert_eq!(*order.lock().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_release_clears_claims() {
        let context = HardwareContext::new();
        context.claim(Resource::Pin(26), "lamp").unwrap();
        context.release();

        assert!(!context.is_claimed(&Resource::Pin(26)));
        assert!(context.is_released());
    }

    #[test]
    fn test_claim_after_release_fails() {
        let context = HardwareContext::new();
        context.release();

        let err = context.claim(Resource::Pin(26), "lamp").unwrap_err();
        assert!(matches!(err, HardwareError::Released { .. }));
    }

    #[test]
    fn test_drop_releases() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let context = HardwareContext::new();
            let counter = Arc::clone(&counter);
            context.on_release(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_after_release_does_not_repeat() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let context = HardwareContext::new();
            let hook_counter = Arc::clone(&counter);
            context.on_release(move || {
                hook_counter.fetch_add(1, Ordering::SeqCst);
            });
            context.release();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
