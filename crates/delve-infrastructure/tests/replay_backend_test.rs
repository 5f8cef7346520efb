use delve_core::session::{Message, ResearchBackend, StreamUpdate, SubmitRequest};
use delve_infrastructure::{TranscriptBackend, TranscriptFrame};
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn request(text: &str) -> SubmitRequest {
    SubmitRequest::prepare(&[], text, "medium", "gemini-2.0-flash").unwrap()
}

fn transcript() -> Vec<TranscriptFrame> {
    vec![
        TranscriptFrame::Update(json!({"generate_query": {"query_list": ["rust"]}})),
        TranscriptFrame::Update(json!({"finalize_answer": {}})),
        TranscriptFrame::Message(Message::assistant(None, "Rust is a language.")),
    ]
}

async fn collect(mut rx: tokio::sync::mpsc::Receiver<StreamUpdate>) -> Vec<StreamUpdate> {
    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn test_replay_emits_frames_in_order_then_finished() {
    let backend = TranscriptBackend::new(transcript(), Duration::ZERO);
    let request = request("what is rust?");
    let history = request.messages.clone();

    let updates = collect(backend.submit(request).await.unwrap()).await;

    assert_eq!(updates.len(), 4);
    assert!(matches!(&updates[0], StreamUpdate::Update(raw) if raw.get("generate_query").is_some()));
    assert!(matches!(&updates[1], StreamUpdate::Update(raw) if raw.get("finalize_answer").is_some()));
    match &updates[2] {
        StreamUpdate::Messages(messages) => {
            assert_eq!(messages.len(), 2);
            assert_eq!(messages[0], history[0]);
            assert!(messages[1].is_assistant());
            assert!(messages[1].id.as_deref().is_some_and(|id| id.starts_with("run-")));
        }
        other => panic!("expected messages, got {:?}", other),
    }
    assert_eq!(updates[3], StreamUpdate::Finished);
}

#[tokio::test]
async fn test_each_turn_gets_fresh_assistant_ids() {
    let backend = TranscriptBackend::new(transcript(), Duration::ZERO);

    let first = collect(backend.submit(request("one")).await.unwrap()).await;
    let second = collect(backend.submit(request("two")).await.unwrap()).await;

    let last_id = |updates: &[StreamUpdate]| -> Option<String> {
        updates.iter().rev().find_map(|update| match update {
            StreamUpdate::Messages(messages) => messages.last().and_then(|m| m.id.clone()),
            _ => None,
        })
    };
    assert_ne!(last_id(&first), last_id(&second));
}

#[tokio::test]
async fn test_error_frame_ends_replay() {
    let frames = vec![
        TranscriptFrame::Update(json!({"web_research": {"sources_gathered": []}})),
        TranscriptFrame::Error("quota exceeded".to_string()),
        TranscriptFrame::Update(json!({"finalize_answer": {}})),
    ];
    let backend = TranscriptBackend::new(frames, Duration::ZERO);

    let updates = collect(backend.submit(request("q")).await.unwrap()).await;

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1], StreamUpdate::Error("quota exceeded".to_string()));
}

#[tokio::test]
async fn test_stop_cancels_replay() {
    let backend = TranscriptBackend::new(transcript(), Duration::from_secs(30));
    let rx = backend.submit(request("q")).await.unwrap();

    backend.stop().await;

    assert!(collect(rx).await.is_empty());
}

#[tokio::test]
async fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"kind":"update","data":{{"reflection":{{"is_sufficient":true}}}}}}"#).unwrap();
    writeln!(file, r#"{{"kind":"message","data":{{"type":"ai","id":"fixed","content":"ok"}}}}"#).unwrap();

    let backend = TranscriptBackend::from_file(file.path(), Duration::ZERO).await.unwrap();
    assert_eq!(backend.frame_count(), 2);

    let updates = collect(backend.submit(request("q")).await.unwrap()).await;
    match &updates[1] {
        StreamUpdate::Messages(messages) => assert_eq!(messages[1].id.as_deref(), Some("fixed")),
        other => panic!("expected messages, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_file_is_backend_error() {
    let result = TranscriptBackend::from_file(
        std::path::Path::new("/definitely/not/here.jsonl"),
        Duration::ZERO,
    )
    .await;

    assert!(matches!(result, Err(delve_core::DelveError::Backend(_))));
}
