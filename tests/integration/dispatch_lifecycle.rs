//! Dispatcher lifecycle: slot claiming, synchronous outcomes, and the
//! one-active-job-per-kind rule across kinds.

use adloom::dispatch::GenerationDispatcher;
use adloom::error::{BackendError, OrchestratorError};
use adloom::job::JobStatus;
use adloom::provider::mock::ScriptedBackend;
use adloom::types::{AspectRatio, GenerationKind, GenerationRequest};
use std::collections::HashMap;
use std::sync::Arc;

fn request(prompt: &str) -> GenerationRequest {
    GenerationRequest {
        prompt: prompt.to_string(),
        model: "model-x".to_string(),
        aspect_ratio: AspectRatio::Square,
        reference_images: vec!["https://img.test/logo.png".to_string()],
        metadata: HashMap::from([("brand_id".to_string(), "brand-acme".to_string())]),
    }
}

#[tokio::test]
async fn image_and_video_slots_are_independent() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .submit_accepted("remote-img")
            .submit_accepted("remote-vid"),
    );
    let dispatcher = GenerationDispatcher::new(Arc::clone(&backend) as Arc<_>);

    let image = dispatcher
        .dispatch(GenerationKind::Image, request("image"))
        .await
        .unwrap();
    let video = dispatcher
        .dispatch(GenerationKind::Video, request("video"))
        .await
        .unwrap();

    assert_eq!(image.read().status, JobStatus::Processing);
    assert_eq!(video.read().status, JobStatus::Processing);
    assert!(dispatcher.active_jobs().is_busy(GenerationKind::Image));
    assert!(dispatcher.active_jobs().is_busy(GenerationKind::Video));

    // Same-kind dispatch is refused while the first is active.
    let err = dispatcher
        .dispatch(GenerationKind::Image, request("again"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::ConcurrentDispatch {
            kind: GenerationKind::Image
        }
    ));
    assert_eq!(backend.submit_calls(), 2);
}

#[tokio::test]
async fn terminal_job_frees_slot_for_redispatch() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .submit_error(BackendError::Rejected("nsfw".to_string()))
            .submit_accepted("remote-2"),
    );
    let dispatcher = GenerationDispatcher::new(backend);

    let first = dispatcher
        .dispatch(GenerationKind::Image, request("first"))
        .await
        .unwrap();
    assert_eq!(first.read().status, JobStatus::Failed);

    let second = dispatcher
        .dispatch(GenerationKind::Image, request("second"))
        .await
        .unwrap();
    assert_eq!(second.read().status, JobStatus::Processing);
}

#[tokio::test]
async fn synchronous_completion_needs_no_poll() {
    let backend = Arc::new(
        ScriptedBackend::new().submit_completed("remote-1", "https://cdn.test/instant.png"),
    );
    let dispatcher = GenerationDispatcher::new(Arc::clone(&backend) as Arc<_>);

    let job = dispatcher
        .dispatch(GenerationKind::Image, request("quick"))
        .await
        .unwrap();
    let job = job.read();
    assert_eq!(job.status, JobStatus::Succeeded);
    assert_eq!(job.result_url.as_deref(), Some("https://cdn.test/instant.png"));
    assert_eq!(backend.poll_calls(), 0);
}

#[tokio::test]
async fn job_record_carries_prompt_and_model() {
    let backend = Arc::new(ScriptedBackend::new().submit_accepted("remote-1"));
    let dispatcher = GenerationDispatcher::new(backend);
    let job = dispatcher
        .dispatch(GenerationKind::Image, request("a distinctive prompt"))
        .await
        .unwrap();
    let job = job.read();
    assert_eq!(job.prompt, "a distinctive prompt");
    assert_eq!(job.model, "model-x");
    assert_eq!(job.kind, GenerationKind::Image);
    assert!(job.id.starts_with("job-image-"));
}
