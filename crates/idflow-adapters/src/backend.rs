//! Backend de verificación simulado.
//!
//! Arma el payload neutro (`BatchSubmission`) igual que lo haría un backend
//! HTTP, lo guarda para inspección y responde según el `BackendMode`.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use idflow_core::{BackendError, BatchProvider};
use idflow_domain::{BatchResponse, BatchStatusReport, BatchSubmission, CapturedItem, ProcessedItem, UserProfile};
use indexmap::IndexMap;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde_json::json;
use uuid::Uuid;

/// Comportamiento del backend ante un envío.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    Accept,
    /// El servicio responde `success = false` con este mensaje.
    Reject(String),
    /// Fallo de transporte: la llamada no obtiene respuesta.
    Unreachable(String),
}

pub struct SimulatedBatchProvider {
    user: UserProfile,
    platform: String,
    device_info: String,
    mode: Mutex<BackendMode>,
    submit_latency: Duration,
    status_latency: Duration,
    submissions: Mutex<Vec<BatchSubmission>>,
    batches: Mutex<IndexMap<String, IndexMap<String, ProcessedItem>>>,
    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl SimulatedBatchProvider {
    pub fn new(user: UserProfile) -> Self {
        Self { user,
               platform: "simulated".to_string(),
               device_info: "simulated device".to_string(),
               mode: Mutex::new(BackendMode::Accept),
               submit_latency: Duration::ZERO,
               status_latency: Duration::ZERO,
               submissions: Mutex::new(Vec::new()),
               batches: Mutex::new(IndexMap::new()),
               submit_calls: AtomicUsize::new(0),
               status_calls: AtomicUsize::new(0) }
    }

    pub fn with_device(mut self, platform: impl Into<String>, device_info: impl Into<String>) -> Self {
        self.platform = platform.into();
        self.device_info = device_info.into();
        self
    }

    pub fn with_latency(mut self, submit: Duration, status: Duration) -> Self {
        self.submit_latency = submit;
        self.status_latency = status;
        self
    }

    pub fn with_mode(self, mode: BackendMode) -> Self {
        *self.mode.lock() = mode;
        self
    }

    /// Cambia el comportamiento en caliente (p. ej. el backend "vuelve").
    pub fn set_mode(&self, mode: BackendMode) {
        *self.mode.lock() = mode;
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Payloads recibidos, en orden de llegada.
    pub fn submissions(&self) -> Vec<BatchSubmission> {
        self.submissions.lock().clone()
    }
}

#[async_trait]
impl BatchProvider for SimulatedBatchProvider {
    async fn submit_batch(&self, items: &[CapturedItem]) -> Result<BatchResponse, BackendError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if !self.submit_latency.is_zero() {
            tokio::time::sleep(self.submit_latency).await;
        }
        let mode = self.mode.lock().clone();
        match mode {
            BackendMode::Unreachable(reason) => {
                warn!("sim-backend:unreachable reason={reason}");
                return Err(BackendError(reason));
            }
            BackendMode::Reject(message) => {
                warn!("sim-backend:rejected message={message}");
                return Ok(BatchResponse::failure(message, None));
            }
            BackendMode::Accept => {}
        }

        let submission = match BatchSubmission::from_items(self.user.clone(), items, &self.platform, &self.device_info) {
            Ok(s) => s,
            Err(e) => return Ok(BatchResponse::failure("invalid submission", Some(e.to_string()))),
        };
        debug!("sim-backend:payload total_items={} documents={}",
               submission.metadata.total_items,
               submission.captures.documents.len());
        self.submissions.lock().push(submission);

        let batch_id = format!("batch_{}", Uuid::new_v4().simple());
        let per_item: IndexMap<String, ProcessedItem> = items.iter()
                                                             .map(|i| {
                                                                 (i.identity.key().to_string(),
                                                                  ProcessedItem { process_id: format!("proc_{}", Uuid::new_v4().simple()),
                                                                                  status: "processing".to_string() })
                                                             })
                                                             .collect();
        self.batches.lock().insert(batch_id.clone(), per_item.clone());
        info!("sim-backend:accepted batch={batch_id} items={}", items.len());
        Ok(BatchResponse::accepted(batch_id, "batch received", per_item))
    }

    async fn check_batch_status(&self, batch_id: &str) -> Result<Option<BatchStatusReport>, BackendError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status_latency.is_zero() {
            tokio::time::sleep(self.status_latency).await;
        }
        if let BackendMode::Unreachable(reason) = &*self.mode.lock() {
            return Err(BackendError(reason.clone()));
        }
        let batches = self.batches.lock();
        let Some(per_item) = batches.get(batch_id) else {
            return Ok(None);
        };
        let details: serde_json::Map<String, serde_json::Value> =
            per_item.iter()
                    .map(|(key, p)| (key.clone(), json!({ "process_id": p.process_id, "status": p.status })))
                    .collect();
        Ok(Some(BatchStatusReport { batch_id: batch_id.to_string(),
                                    overall_status: "processing".to_string(),
                                    details: serde_json::Value::Object(details),
                                    checked_at: Utc::now() }))
    }
}
