// Tests for the client recording / payment-gating flow
//
// The flow is driven against an in-memory store and a stub analysis API so
// every transition and re-entry path can be observed, including how many
// upstream calls each path issues.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use voxlens::session::{
    AnalysisApi, AudioBlob, ClientError, FlowState, MemoryStore, RecordingFlow, ResumeOutcome,
    SessionStore,
};
use voxlens::{AgentKind, PaymentState, SessionRecord};

const PAYMENT_URL: &str = "https://pay.example/checkout";

#[derive(Default)]
struct StubApi {
    transcript: String,
    transcribe_calls: AtomicUsize,
    free_calls: AtomicUsize,
    mood_calls: AtomicUsize,
    fail_transcribe: bool,
    fail_free: bool,
    fail_mood: bool,
}

impl StubApi {
    fn with_transcript(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl AnalysisApi for StubApi {
    async fn transcribe(&self, _audio: &AudioBlob) -> Result<String, ClientError> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transcribe {
            return Err(ClientError::Server("Failed to transcribe audio".into()));
        }
        Ok(self.transcript.clone())
    }

    async fn analyze(&self, kind: AgentKind, _transcript: &str) -> Result<String, ClientError> {
        match kind {
            AgentKind::Mood => {
                self.mood_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_mood {
                    return Err(ClientError::Server("Failed to analyze mood".into()));
                }
                Ok("Calm and quietly enthusiastic throughout.".to_string())
            }
            AgentKind::Sentiment => {
                self.free_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_free {
                    return Err(ClientError::Server("Failed to analyze sentiment".into()));
                }
                Ok("The speaker sounds confident.".to_string())
            }
            AgentKind::Summary => {
                self.free_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_free {
                    return Err(ClientError::Server("Failed to generate summary".into()));
                }
                Ok("A brief greeting.".to_string())
            }
        }
    }
}

fn flow_with(
    store: Arc<MemoryStore>,
    api: Arc<StubApi>,
) -> RecordingFlow<Arc<MemoryStore>, Arc<StubApi>> {
    RecordingFlow::new(store, api, PAYMENT_URL)
}

#[tokio::test]
async fn test_record_transcribe_free_analysis_happy_path() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi::with_transcript("Hello world"));
    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let handle = flow.start_recording("audio/webm")?;
    assert_eq!(flow.state(), FlowState::Recording);

    let monitor = handle.capture_monitor();
    let sender = handle.chunk_sender();
    sender.send(vec![1u8, 2, 3]).await?;
    sender.send(vec![4u8]).await?;
    drop(sender);

    let blob = flow.stop_recording(handle).await?;
    assert_eq!(flow.state(), FlowState::Recorded);
    assert_eq!(blob.bytes, vec![1, 2, 3, 4]);
    assert!(monitor.is_released(), "capture must be released on stop");

    flow.process_recording(blob).await?;
    assert_eq!(flow.state(), FlowState::FreeAnalysis);

    let results = flow.results();
    assert_eq!(results.transcript.as_deref(), Some("Hello world"));
    assert_eq!(
        results.sentiment.as_deref(),
        Some("The speaker sounds confident.")
    );
    assert_eq!(results.summary.as_deref(), Some("A brief greeting."));
    assert!(results.mood.is_none(), "mood stays locked before payment");

    // The transcript is durable; the pending flag is not yet set.
    let stored = store.load().await?;
    assert_eq!(stored.transcript.as_deref(), Some("Hello world"));
    assert_eq!(stored.payment, PaymentState::None);

    assert_eq!(api.free_calls.load(Ordering::SeqCst), 2);
    assert_eq!(api.mood_calls.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn test_zero_chunk_recording_still_proceeds_to_transcription() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi::with_transcript(""));
    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let handle = flow.start_recording("audio/webm")?;
    let blob = flow.stop_recording(handle).await?;
    assert_eq!(blob.size(), 0);

    flow.process_recording(blob).await?;
    assert_eq!(api.transcribe_calls.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_free_batch_failure_keeps_transcript_visible() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi {
        fail_free: true,
        ..StubApi::with_transcript("Hello world")
    });
    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let blob = AudioBlob {
        bytes: vec![1, 2, 3],
        mime: "audio/webm".to_string(),
    };
    let result = flow.process_recording(blob).await;

    assert!(result.is_err());
    assert!(flow.last_error().is_some());

    // The transcript already obtained stays rendered and stays durable.
    assert_eq!(flow.results().transcript.as_deref(), Some("Hello world"));
    assert!(flow.results().sentiment.is_none());
    assert_eq!(
        store.load().await?.transcript.as_deref(),
        Some("Hello world")
    );

    Ok(())
}

#[tokio::test]
async fn test_transcription_failure_is_inline_and_recoverable() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi {
        fail_transcribe: true,
        ..StubApi::default()
    });
    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let blob = AudioBlob {
        bytes: vec![1],
        mime: "audio/webm".to_string(),
    };
    assert!(flow.process_recording(blob).await.is_err());

    assert_eq!(flow.state(), FlowState::Recorded);
    assert_eq!(flow.last_error(), Some("Failed to transcribe audio"));
    assert!(store.load().await?.is_empty(), "nothing was persisted");

    Ok(())
}

#[tokio::test]
async fn test_new_recording_clears_previous_results_and_error() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi::with_transcript("Hello world"));
    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let blob = AudioBlob {
        bytes: vec![1],
        mime: "audio/webm".to_string(),
    };
    flow.process_recording(blob).await?;
    assert!(flow.results().summary.is_some());

    let handle = flow.start_recording("audio/webm")?;
    assert_eq!(flow.results(), &voxlens::AnalysisResults::default());
    assert!(flow.last_error().is_none());
    drop(handle);

    Ok(())
}

#[tokio::test]
async fn test_request_unlock_persists_pending_flag() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi::with_transcript("Hello world"));
    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let blob = AudioBlob {
        bytes: vec![1],
        mime: "audio/webm".to_string(),
    };
    flow.process_recording(blob).await?;

    let url = flow.request_unlock().await?;
    assert_eq!(url, PAYMENT_URL);
    assert_eq!(flow.state(), FlowState::AwaitingPayment);

    let stored = store.load().await?;
    assert_eq!(stored.transcript.as_deref(), Some("Hello world"));
    assert_eq!(stored.payment, PaymentState::Pending);

    Ok(())
}

#[tokio::test]
async fn test_unlock_without_recording_fails() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi::default());
    let mut flow = flow_with(store, api);

    let result = flow.request_unlock().await;
    assert!(result.is_err());
    assert_eq!(
        flow.last_error(),
        Some("No recording found. Please record audio first.")
    );

    Ok(())
}

#[tokio::test]
async fn test_payment_return_unlocks_mood_exactly_once() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi::default());

    // What a previous page lifetime left behind before navigating away.
    store
        .save(&SessionRecord {
            transcript: Some("Hello world".to_string()),
            payment: PaymentState::Pending,
        })
        .await?;

    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let outcome = flow
        .resume("http://localhost:3000/result?session_id=cs_test_123")
        .await?;

    let ResumeOutcome::Unlocked { stripped_url } = outcome else {
        panic!("expected unlock, got {:?}", outcome);
    };
    assert_eq!(stripped_url, "http://localhost:3000/result");

    assert_eq!(flow.state(), FlowState::Unlocked);
    assert_eq!(api.mood_calls.load(Ordering::SeqCst), 1);
    assert!(flow.results().mood.is_some());
    assert_eq!(flow.results().transcript.as_deref(), Some("Hello world"));
    assert!(store.load().await?.is_empty(), "storage cleared after unlock");

    // Reloading the stripped URL issues nothing and charges nothing.
    let outcome = flow.resume(&stripped_url).await?;
    assert_eq!(outcome, ResumeOutcome::NotAPaymentReturn);
    assert_eq!(api.mood_calls.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_payment_return_with_empty_storage_stays_locked() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi::default());
    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let outcome = flow
        .resume("http://localhost:3000/result?session_id=cs_test_123")
        .await?;

    assert_eq!(outcome, ResumeOutcome::MissingSession);
    assert_eq!(api.mood_calls.load(Ordering::SeqCst), 0, "no analysis call");
    assert!(flow.results().mood.is_none(), "mood remains locked");

    Ok(())
}

#[tokio::test]
async fn test_ordinary_load_without_marker_is_a_no_op() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi::default());

    store
        .save(&SessionRecord {
            transcript: Some("Hello world".to_string()),
            payment: PaymentState::Pending,
        })
        .await?;

    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let outcome = flow.resume("http://localhost:3000/result").await?;
    assert_eq!(outcome, ResumeOutcome::NotAPaymentReturn);
    assert_eq!(api.mood_calls.load(Ordering::SeqCst), 0);

    // The pending session is untouched; the user may still return later.
    assert_eq!(store.load().await?.payment, PaymentState::Pending);

    Ok(())
}

#[tokio::test]
async fn test_stripping_keeps_unrelated_query_parameters() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi::default());

    store
        .save(&SessionRecord {
            transcript: Some("Hello world".to_string()),
            payment: PaymentState::Pending,
        })
        .await?;

    let mut flow = flow_with(store, api);

    let outcome = flow
        .resume("http://localhost:3000/result?lang=en&session_id=cs_test_123")
        .await?;

    let ResumeOutcome::Unlocked { stripped_url } = outcome else {
        panic!("expected unlock, got {:?}", outcome);
    };
    assert_eq!(stripped_url, "http://localhost:3000/result?lang=en");

    Ok(())
}

#[tokio::test]
async fn test_mood_failure_keeps_session_for_manual_retry() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let api = Arc::new(StubApi {
        fail_mood: true,
        ..StubApi::default()
    });

    store
        .save(&SessionRecord {
            transcript: Some("Hello world".to_string()),
            payment: PaymentState::Pending,
        })
        .await?;

    let mut flow = flow_with(Arc::clone(&store), Arc::clone(&api));

    let result = flow
        .resume("http://localhost:3000/result?session_id=cs_test_123")
        .await;

    assert!(result.is_err());
    assert!(flow.results().mood.is_none());
    assert_eq!(flow.last_error(), Some("Failed to analyze mood"));

    // The return was observed, so the record moves to Confirmed and is
    // kept; reloading the same URL retries the single mood call.
    let stored = store.load().await?;
    assert_eq!(stored.payment, PaymentState::Confirmed);
    assert_eq!(api.mood_calls.load(Ordering::SeqCst), 1);

    Ok(())
}
