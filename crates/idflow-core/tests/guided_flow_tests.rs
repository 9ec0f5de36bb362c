use std::sync::Arc;

use idflow_adapters::{BackendMode, SimulatedBatchProvider, SimulatedCaptureProvider, StaticPermissionProvider};
use idflow_core::{ErrorKind, FlowEventKind, GuidedFlow, StepId, StepOutcome, VerificationController};
use idflow_domain::{DocumentType, ItemIdentity, ItemStatus, UserProfile};

struct Harness {
    controller: VerificationController,
    capture: Arc<SimulatedCaptureProvider>,
    backend: Arc<SimulatedBatchProvider>,
}

fn user() -> UserProfile {
    UserProfile { cpf: "12345678900".into(),
                  name: "Ana Souza".into(),
                  email: "ana@example.com".into(),
                  phone: "+55 11 90000-0000".into() }
}

fn harness_with(permissions: StaticPermissionProvider, capture: SimulatedCaptureProvider) -> Harness {
    let capture = Arc::new(capture);
    let backend = Arc::new(SimulatedBatchProvider::new(user()));
    let controller = VerificationController::new(Arc::new(permissions), capture.clone(), backend.clone());
    Harness { controller, capture, backend }
}

fn harness() -> Harness {
    harness_with(StaticPermissionProvider::granted(), SimulatedCaptureProvider::new())
}

fn current_index(c: &VerificationController) -> Option<usize> {
    c.snapshot().flow.map(|f| f.current_index())
}

#[tokio::test]
async fn guided_scenario_walks_every_step() {
    let h = harness();
    let c = &h.controller;
    tokio_test::assert_ok!(c.start_flow());
    assert_eq!(current_index(c), Some(0));

    c.capture_selfie().await.unwrap();
    assert_eq!(current_index(c), Some(1));
    c.capture_document(DocumentType::IdFront).await.unwrap();
    assert_eq!(current_index(c), Some(2));
    assert!(!c.snapshot().is_flow_completed);
    c.capture_document(DocumentType::IdBack).await.unwrap();
    assert_eq!(current_index(c), Some(3));
    assert!(c.can_execute_current_step());
    assert!(!c.is_current_step_completed());

    let outcome = c.execute_current_step().await.unwrap();
    let StepOutcome::Submitted(resp) = outcome else {
        panic!("submit step must submit");
    };
    assert!(resp.success);

    let snap = c.snapshot();
    assert_eq!(current_index(c), Some(3));
    assert!(snap.is_flow_completed);
    assert!(c.is_current_step_completed());
    assert!(snap.items.iter().all(|i| i.status == ItemStatus::Sent));
    assert_eq!(h.backend.submit_calls(), 1);

    c.acknowledge_completion().unwrap();
    let snap = c.snapshot();
    assert!(snap.items.is_empty());
    assert!(!snap.is_guided_flow_active);
    assert_eq!(snap.last_batch_response, Some(resp));
}

#[tokio::test]
async fn execute_current_step_captures_for_capture_steps() {
    let h = harness();
    let c = &h.controller;
    c.start_flow().unwrap();
    let StepOutcome::Captured(item) = c.execute_current_step().await.unwrap() else {
        panic!("selfie step must capture");
    };
    assert_eq!(item.identity, ItemIdentity::Selfie);
    assert_eq!(c.snapshot().flow.unwrap().current_step_id(), Some(StepId::DocumentFront));
}

#[tokio::test]
async fn execute_without_flow_is_a_validation_error() {
    let h = harness();
    let err = h.controller.execute_current_step().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(h.capture.capture_calls(), 0);
}

#[tokio::test]
async fn submit_step_requires_all_three_items() {
    let h = harness();
    let c = &h.controller;
    c.start_flow().unwrap();
    c.capture_selfie().await.unwrap();
    c.capture_document(DocumentType::IdFront).await.unwrap();
    let back = c.capture_document(DocumentType::IdBack).await.unwrap();
    c.remove_item(&back.id).unwrap();

    assert_eq!(current_index(c), Some(3));
    assert!(!c.can_execute_current_step());
    let err = c.execute_current_step().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert!(err.to_string().contains("document_back"));
    assert_eq!(h.backend.submit_calls(), 0);
}

#[tokio::test]
async fn backend_down_marks_items_error_and_keeps_step() {
    let h = harness();
    let c = &h.controller;
    c.start_flow().unwrap();
    c.capture_selfie().await.unwrap();
    c.capture_document(DocumentType::IdFront).await.unwrap();
    c.capture_document(DocumentType::IdBack).await.unwrap();

    h.backend.set_mode(BackendMode::Reject("backend down".into()));
    let err = c.submit_batch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BackendFailure);

    let snap = c.snapshot();
    assert_eq!(current_index(c), Some(3));
    assert_eq!(snap.items.len(), 3);
    assert!(snap.items.iter().all(|i| i.status == ItemStatus::Error));
    let last = snap.last_batch_response.unwrap();
    assert!(!last.success);
    assert_eq!(last.message, "backend down");
    assert!(!snap.is_flow_completed);
    assert!(!snap.busy);

    // Reintento tras recuperar el backend: Error -> Sending -> Sent.
    h.backend.set_mode(BackendMode::Accept);
    let resp = c.submit_batch().await.unwrap();
    assert!(resp.success);
    assert!(c.snapshot().items.iter().all(|i| i.status == ItemStatus::Sent));
    assert!(c.snapshot().is_flow_completed);
}

#[tokio::test]
async fn transport_error_synthesizes_failed_response() {
    let h = harness();
    let c = &h.controller;
    c.capture_selfie().await.unwrap();
    h.backend.set_mode(BackendMode::Unreachable("connection refused".into()));
    let err = c.submit_batch().await.unwrap_err();
    assert_eq!(err, idflow_core::FlowError::BackendFailure("connection refused".into()));
    let last = c.snapshot().last_batch_response.unwrap();
    assert!(!last.success);
    assert_eq!(last.error.as_deref(), Some("connection refused"));
    assert_eq!(c.snapshot().items[0].status, ItemStatus::Error);
}

#[tokio::test]
async fn submit_without_items_never_reaches_backend() {
    let h = harness();
    let err = h.controller.submit_batch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(h.backend.submit_calls(), 0);
}

#[tokio::test]
async fn submit_without_selfie_never_reaches_backend() {
    let h = harness();
    h.controller.capture_document(DocumentType::IdFront).await.unwrap();
    let err = h.controller.submit_batch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(h.backend.submit_calls(), 0);
    assert_eq!(h.controller.snapshot().items[0].status, ItemStatus::Captured);
}

#[tokio::test]
async fn free_form_submit_outside_flow() {
    let h = harness();
    let c = &h.controller;
    c.capture_selfie().await.unwrap();
    c.capture_document(DocumentType::Cpf).await.unwrap();
    let resp = c.submit_batch().await.unwrap();
    assert!(resp.item_status(&ItemIdentity::Document(DocumentType::Cpf)).is_some());
    assert!(!c.snapshot().is_flow_completed);
    assert!(c.acknowledge_completion().is_err());
}

#[tokio::test]
async fn clear_all_then_start_flow_resets_everything() {
    let h = harness();
    let c = &h.controller;
    c.start_flow().unwrap();
    c.capture_selfie().await.unwrap();
    c.capture_document(DocumentType::IdFront).await.unwrap();

    c.clear_all().unwrap();
    let snap = c.snapshot();
    assert!(snap.items.is_empty());
    assert!(!snap.is_guided_flow_active);

    c.start_flow().unwrap();
    let snap = c.snapshot();
    assert!(snap.items.is_empty());
    assert!(snap.is_guided_flow_active);
    assert_eq!(snap.flow, Some(GuidedFlow::with_default_steps()));
}

#[tokio::test]
async fn start_flow_discards_previous_items() {
    let h = harness();
    let c = &h.controller;
    c.capture_selfie().await.unwrap();
    c.start_flow().unwrap();
    assert!(c.snapshot().items.is_empty());
    assert!(c.snapshot().last_batch_response.is_none());
}

#[tokio::test]
async fn out_of_order_capture_does_not_skip_steps() {
    let h = harness();
    let c = &h.controller;
    c.start_flow().unwrap();
    c.capture_document(DocumentType::IdBack).await.unwrap();
    assert_eq!(current_index(c), Some(0));

    c.capture_selfie().await.unwrap();
    // Sólo avanza el paso de selfie; el frente sigue pendiente.
    assert_eq!(current_index(c), Some(1));
    c.capture_document(DocumentType::IdFront).await.unwrap();
    assert_eq!(current_index(c), Some(2));
    // El reverso ya existe: re-capturarlo reemplaza y avanza.
    c.capture_document(DocumentType::IdBack).await.unwrap();
    assert_eq!(current_index(c), Some(3));
    assert_eq!(c.snapshot().items.len(), 3);
}

#[tokio::test]
async fn recapture_replaces_item_of_same_identity() {
    let h = harness();
    let c = &h.controller;
    let first = c.capture_selfie().await.unwrap();
    c.capture_document(DocumentType::IdFront).await.unwrap();
    let second = c.capture_selfie().await.unwrap();

    let items = c.snapshot().items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].id, second.id);
    let replaced = c.events_since(0).into_iter().find_map(|e| match e.kind {
                                                    FlowEventKind::ItemCaptured { replaced: Some(old), .. } => Some(old),
                                                    _ => None,
                                                });
    assert_eq!(replaced, Some(first.id));
}

#[tokio::test]
async fn user_cancel_leaves_state_untouched() {
    let h = harness_with(StaticPermissionProvider::granted(),
                         SimulatedCaptureProvider::new().fail_next(idflow_core::CaptureFailure::UserCancelled));
    let c = &h.controller;
    c.start_flow().unwrap();
    let before = c.events_since(0).len() as u64;

    let err = c.capture_selfie().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserCancelled);
    let snap = c.snapshot();
    assert!(!snap.busy);
    assert!(snap.current_operation_label.is_none());
    assert!(snap.items.is_empty());
    assert_eq!(current_index(c), Some(0));
    let new_events = c.events_since(before);
    assert!(matches!(new_events.as_slice(), [e] if matches!(e.kind, FlowEventKind::CaptureFailed { .. })));
}

#[tokio::test]
async fn sdk_error_keeps_code_and_description() {
    let failure = idflow_core::CaptureFailure::SdkError { code: "73".into(), description: "face not found".into() };
    let h = harness_with(StaticPermissionProvider::granted(), SimulatedCaptureProvider::new().fail_next(failure));
    let err = h.controller.capture_selfie().await.unwrap_err();
    assert_eq!(err.to_string(), "capture sdk error 73: face not found");
}

#[tokio::test]
async fn permission_denied_never_opens_camera() {
    let h = harness_with(StaticPermissionProvider::denied(), SimulatedCaptureProvider::new());
    let err = h.controller.capture_selfie().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(h.capture.capture_calls(), 0);
    assert!(h.controller.snapshot().items.is_empty());
}

#[tokio::test]
async fn permission_granted_on_request_allows_capture() {
    let h = harness_with(StaticPermissionProvider::new(false, true), SimulatedCaptureProvider::new());
    h.controller.capture_selfie().await.unwrap();
    assert_eq!(h.capture.capture_calls(), 1);
}

#[tokio::test]
async fn check_status_validates_batch_id() {
    let h = harness();
    let c = &h.controller;
    assert_eq!(c.check_batch_status("  ").await.unwrap_err().kind(), ErrorKind::ValidationError);
    assert_eq!(h.backend.status_calls(), 0);

    c.capture_selfie().await.unwrap();
    let id = c.submit_batch().await.unwrap().batch_id.unwrap();
    let report = c.check_batch_status(&id).await.unwrap().unwrap();
    assert_eq!(report.batch_id, id);
    assert_eq!(c.check_batch_status("batch_unknown").await.unwrap(), None);
}

#[tokio::test]
async fn diagnostics_reports_bridge_and_permission() {
    let h = harness();
    let d = h.controller.diagnostics().await.unwrap();
    assert!(d.bridge.contains("ready"));
    assert!(d.camera_permission);
    assert_eq!(d.provider, "simulated-capture 1.0.0");
}
