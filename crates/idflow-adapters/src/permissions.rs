use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use idflow_core::PermissionProvider;
use log::debug;

/// Subsistema de permisos con respuesta fija.
///
/// `granted` es el estado actual; `grant_on_request` decide qué pasa cuando
/// el core solicita el permiso (el usuario acepta o rechaza el diálogo).
pub struct StaticPermissionProvider {
    granted: AtomicBool,
    grant_on_request: bool,
    request_calls: AtomicUsize,
    settings_calls: AtomicUsize,
}

impl StaticPermissionProvider {
    pub fn new(granted: bool, grant_on_request: bool) -> Self {
        Self { granted: AtomicBool::new(granted),
               grant_on_request,
               request_calls: AtomicUsize::new(0),
               settings_calls: AtomicUsize::new(0) }
    }

    pub fn granted() -> Self {
        Self::new(true, true)
    }

    /// Permiso ausente y el usuario rechaza la solicitud.
    pub fn denied() -> Self {
        Self::new(false, false)
    }

    pub fn request_calls(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    pub fn settings_calls(&self) -> usize {
        self.settings_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissionProvider {
    async fn check_camera_permission(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request_camera_permission(&self) -> bool {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        if self.grant_on_request {
            self.granted.store(true, Ordering::SeqCst);
        }
        debug!("permissions:request granted={}", self.grant_on_request);
        self.grant_on_request
    }

    async fn open_settings(&self) {
        self.settings_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_grants_when_user_accepts() {
        let p = StaticPermissionProvider::new(false, true);
        assert!(!p.check_camera_permission().await);
        assert!(p.request_camera_permission().await);
        assert!(p.check_camera_permission().await);
        assert_eq!(p.request_calls(), 1);
    }

    #[test]
    fn denied_stays_denied() {
        let p = StaticPermissionProvider::denied();
        tokio_test::block_on(async {
            assert!(!p.request_camera_permission().await);
            assert!(!p.check_camera_permission().await);
            p.open_settings().await;
        });
        assert_eq!(p.settings_calls(), 1);
    }
}
