use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;

/// Storage-write permission on platforms with scoped storage
#[async_trait]
pub trait StoragePermission: Send + Sync {
    /// Ask for (or query) the permission. `true` means granted.
    async fn request(&self) -> Result<bool>;
}

/// Caches the storage permission answer for the session.
///
/// Without a [`StoragePermission`] collaborator the platform has no scoped
/// storage and writes are always allowed. A denial is never retried on its
/// own: the next export the user triggers asks again.
#[derive(Clone, Default)]
pub struct PermissionGate {
    permission: Option<Arc<dyn StoragePermission>>,
    granted: Arc<RwLock<Option<bool>>>,
}

impl PermissionGate {
    pub fn new(permission: Arc<dyn StoragePermission>) -> Self {
        Self {
            permission: Some(permission),
            granted: Arc::new(RwLock::new(None)),
        }
    }

    /// Gate for platforms without scoped storage
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Probe once when the timetable screen becomes active.
    pub async fn activate(&self) -> bool {
        if let Some(granted) = *self.granted.read().await {
            return granted;
        }
        self.probe().await
    }

    /// Cached grant, or a fresh probe if nothing was granted yet.
    pub async fn ensure_granted(&self) -> bool {
        if *self.granted.read().await == Some(true) {
            return true;
        }
        self.probe().await
    }

    pub async fn cached(&self) -> Option<bool> {
        if self.permission.is_none() {
            return Some(true);
        }
        *self.granted.read().await
    }

    async fn probe(&self) -> bool {
        let Some(permission) = &self.permission else {
            return true;
        };

        let granted = match permission.request().await {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!("Storage permission request failed: {}", e);
                false
            }
        };

        if !granted {
            tracing::info!("Storage permission denied, file exports are blocked");
        }
        *self.granted.write().await = Some(granted);
        granted
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Counting {
        grant: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StoragePermission for Counting {
        async fn request(&self) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.grant)
        }
    }

    fn counting(grant: bool) -> Arc<Counting> {
        Arc::new(Counting {
            grant,
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn unrestricted_gate_always_grants() {
        let gate = PermissionGate::unrestricted();
        assert!(tokio_test::block_on(gate.activate()));
        assert!(tokio_test::block_on(gate.ensure_granted()));
        assert_eq!(tokio_test::block_on(gate.cached()), Some(true));
    }

    #[test]
    fn grant_is_cached() {
        let permission = counting(true);
        let gate = PermissionGate::new(permission.clone());

        tokio_test::block_on(async {
            assert!(gate.activate().await);
            assert!(gate.activate().await);
            assert!(gate.ensure_granted().await);
        });
        assert_eq!(permission.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn denial_is_asked_again_on_next_export() {
        let permission = counting(false);
        let gate = PermissionGate::new(permission.clone());

        tokio_test::block_on(async {
            assert!(!gate.activate().await);
            // activation reuses the cached answer
            assert!(!gate.activate().await);
            assert_eq!(gate.cached().await, Some(false));
            assert!(!gate.ensure_granted().await);
        });
        assert_eq!(permission.calls.load(Ordering::SeqCst), 2);
    }
}
