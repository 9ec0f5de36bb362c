//! SDK de captura simulado.
//!
//! Genera artifacts sintéticos deterministas: los bytes "crudos" se codifican
//! en base64 y el payload "cifrado" es el SHA-256 hex de esos bytes. Los
//! fallos se programan en una cola: cada captura consume el siguiente fallo
//! pendiente, y con la cola vacía la captura tiene éxito.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose;
use base64::Engine as _;
use idflow_core::{CaptureFailure, CaptureProvider};
use idflow_domain::{CaptureArtifact, DocumentType, ItemIdentity};
use log::debug;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

pub struct SimulatedCaptureProvider {
    name: String,
    version: String,
    latency: Duration,
    failures: Mutex<VecDeque<CaptureFailure>>,
    capture_calls: AtomicUsize,
}

impl SimulatedCaptureProvider {
    pub fn new() -> Self {
        Self { name: "simulated-capture".to_string(),
               version: "1.0.0".to_string(),
               latency: Duration::ZERO,
               failures: Mutex::new(VecDeque::new()),
               capture_calls: AtomicUsize::new(0) }
    }

    /// Latencia de cada captura (simula la cámara abierta).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Programa un fallo para la próxima captura sin fallo asignado.
    pub fn fail_next(self, failure: CaptureFailure) -> Self {
        self.failures.lock().push_back(failure);
        self
    }

    pub fn push_failure(&self, failure: CaptureFailure) {
        self.failures.lock().push_back(failure);
    }

    pub fn capture_calls(&self) -> usize {
        self.capture_calls.load(Ordering::SeqCst)
    }

    async fn run(&self, identity: ItemIdentity) -> Result<CaptureArtifact, CaptureFailure> {
        let seq = self.capture_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(failure) = self.failures.lock().pop_front() {
            debug!("sim-capture:fail identity={identity} seq={seq} failure={failure}");
            return Err(failure);
        }
        Ok(synthetic_artifact(identity, seq))
    }
}

impl Default for SimulatedCaptureProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn synthetic_artifact(identity: ItemIdentity, seq: usize) -> CaptureArtifact {
    let raw = format!("{}:{seq}", identity.key());
    let encrypted = format!("{:x}", Sha256::digest(raw.as_bytes()));
    let mut artifact = CaptureArtifact::new(general_purpose::STANDARD.encode(raw.as_bytes()), encrypted);
    match identity {
        ItemIdentity::Selfie => {
            artifact.confidence = Some(0.98);
            artifact.liveness = Some(true);
        }
        ItemIdentity::Document(_) => artifact.confidence = Some(0.95),
    }
    artifact
}

#[async_trait]
impl CaptureProvider for SimulatedCaptureProvider {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_version(&self) -> &str {
        &self.version
    }

    async fn test_connection(&self) -> Result<String, CaptureFailure> {
        Ok(format!("{} {} ready", self.name, self.version))
    }

    async fn capture_selfie(&self) -> Result<CaptureArtifact, CaptureFailure> {
        self.run(ItemIdentity::Selfie).await
    }

    async fn capture_document(&self, document_type: DocumentType) -> Result<CaptureArtifact, CaptureFailure> {
        self.run(ItemIdentity::Document(document_type)).await
    }
}
