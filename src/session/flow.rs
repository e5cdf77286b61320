use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;

use crate::agents::AgentKind;

use super::api::AnalysisApi;
use super::record::{PaymentState, SessionRecord};
use super::recorder::{AudioBlob, CaptureHandle, CaptureMonitor, Recorder};
use super::store::SessionStore;

/// Query parameter the payment origin appends on successful return.
pub const PAYMENT_SUCCESS_PARAM: &str = "session_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Recording,
    Recorded,
    Transcribing,
    FreeAnalysis,
    AwaitingPayment,
    PendingUnlock,
    Unlocked,
}

/// What the page renders. `mood: None` means locked, not failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResults {
    pub transcript: Option<String>,
    pub sentiment: Option<String>,
    pub summary: Option<String>,
    pub mood: Option<String>,
}

/// Live recording: the chunk channel feeding the collector task plus the
/// scoped capture resource. Dropping the handle without stopping still
/// releases the capture stream.
pub struct RecordingHandle {
    chunks: mpsc::Sender<Vec<u8>>,
    capture: CaptureHandle,
    collector: JoinHandle<AudioBlob>,
}

impl RecordingHandle {
    pub fn chunk_sender(&self) -> mpsc::Sender<Vec<u8>> {
        self.chunks.clone()
    }

    pub fn capture_monitor(&self) -> CaptureMonitor {
        self.capture.monitor()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// No success marker in the launch URL; an ordinary load or a reload
    /// after the marker was stripped. Nothing runs.
    NotAPaymentReturn,
    /// Marker present but durable storage held no pending session (cleared
    /// storage, or another tab finished the flow). Mood stays locked and
    /// no results are fabricated.
    MissingSession,
    /// Mood unlocked and storage cleared; the caller should install the
    /// stripped URL so a reload is inert.
    Unlocked { stripped_url: String },
}

/// The page state machine. One instance per page lifetime; only the store
/// survives the navigation to the payment origin.
pub struct RecordingFlow<S, A> {
    store: S,
    api: A,
    payment_url: String,
    state: FlowState,
    results: AnalysisResults,
    last_error: Option<String>,
}

impl<S: SessionStore, A: AnalysisApi> RecordingFlow<S, A> {
    pub fn new(store: S, api: A, payment_url: impl Into<String>) -> Self {
        Self {
            store,
            api,
            payment_url: payment_url.into(),
            state: FlowState::Idle,
            results: AnalysisResults::default(),
            last_error: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn results(&self) -> &AnalysisResults {
        &self.results
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// idle → recording. Starting over clears previously displayed results
    /// and any inline error.
    pub fn start_recording(&mut self, mime: &str) -> Result<RecordingHandle> {
        if matches!(self.state, FlowState::Recording | FlowState::Transcribing) {
            return Err(self.fail(anyhow!("Recording already in progress")));
        }

        self.results = AnalysisResults::default();
        self.last_error = None;
        self.state = FlowState::Recording;

        let (chunks, chunk_rx) = mpsc::channel(64);
        let capture = CaptureHandle::acquire();
        let collector = tokio::spawn(Recorder::new(mime).record(chunk_rx));

        info!("Recording started ({})", mime);

        Ok(RecordingHandle {
            chunks,
            capture,
            collector,
        })
    }

    /// recording → recorded. Finalizes whatever was captured (zero chunks
    /// included) and releases the capture stream immediately.
    pub async fn stop_recording(&mut self, handle: RecordingHandle) -> Result<AudioBlob> {
        let RecordingHandle {
            chunks,
            capture,
            collector,
        } = handle;

        // Closing the channel lets the collector drain and finish.
        drop(chunks);
        capture.release();

        let blob = match collector.await {
            Ok(blob) => blob,
            Err(e) => return Err(self.fail(anyhow!("Recording task failed: {}", e))),
        };

        self.state = FlowState::Recorded;
        info!("Recording stopped: {:.2} KB", blob.size() as f64 / 1024.0);
        Ok(blob)
    }

    /// recorded → transcribing → free-analysis. Persists the transcript,
    /// then runs the two free analyses as one joined batch; mood stays
    /// locked. A failure is surfaced inline and leaves every result
    /// obtained so far in place.
    pub async fn process_recording(&mut self, audio: AudioBlob) -> Result<()> {
        self.state = FlowState::Transcribing;
        self.last_error = None;

        let transcript = match self.api.transcribe(&audio).await {
            Ok(t) => t,
            Err(e) => {
                self.state = FlowState::Recorded;
                return Err(self.fail(e.into()));
            }
        };

        info!("Transcription succeeded ({} chars)", transcript.len());
        self.results.transcript = Some(transcript.clone());

        let record = SessionRecord {
            transcript: Some(transcript.clone()),
            payment: PaymentState::None,
        };
        if let Err(e) = self.store.save(&record).await {
            return Err(self.fail(e));
        }

        self.state = FlowState::FreeAnalysis;

        let free_batch = tokio::try_join!(
            self.api.analyze(AgentKind::Sentiment, &transcript),
            self.api.analyze(AgentKind::Summary, &transcript),
        );

        match free_batch {
            Ok((sentiment, summary)) => {
                self.results.sentiment = Some(sentiment);
                self.results.summary = Some(summary);
                Ok(())
            }
            // The free pair fails as one batch; the transcript already on
            // screen stays there.
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// free-analysis → awaiting-payment. Persists the pending flag and
    /// returns the external checkout URL; the caller performs the
    /// full-page navigation, after which only the store survives.
    pub async fn request_unlock(&mut self) -> Result<String> {
        let mut record = self.store.load().await.unwrap_or_default();
        if record.transcript.is_none() {
            record.transcript = self.results.transcript.clone();
        }
        if record.transcript.is_none() {
            return Err(self.fail(anyhow!("No recording found. Please record audio first.")));
        }

        record.payment = PaymentState::Pending;
        if let Err(e) = self.store.save(&record).await {
            return Err(self.fail(e));
        }

        self.state = FlowState::AwaitingPayment;
        info!("Pending payment flag set; redirecting to {}", self.payment_url);
        Ok(self.payment_url.clone())
    }

    /// Fresh-load re-entry. Inspects the launch URL for the payment
    /// success marker and, when the stored session is pending, issues the
    /// mood analysis alone, clears storage, and hands back the stripped
    /// URL. A reload without the marker is a no-op.
    pub async fn resume(&mut self, launch_url: &str) -> Result<ResumeOutcome> {
        let url = Url::parse(launch_url).context("Invalid launch URL")?;

        let Some(marker) = payment_marker(&url) else {
            return Ok(ResumeOutcome::NotAPaymentReturn);
        };

        info!("Payment return detected (checkout session {})", marker);
        self.state = FlowState::PendingUnlock;

        let record = self.store.load().await.unwrap_or_default();
        let transcript = match (record.transcript, record.payment) {
            (Some(t), PaymentState::Pending | PaymentState::Confirmed) => t,
            _ => {
                warn!("Payment return with no pending session; leaving mood locked");
                self.state = FlowState::Idle;
                return Ok(ResumeOutcome::MissingSession);
            }
        };

        // The return itself is what confirms payment. Recording that
        // before the analysis call means a failed call can be retried
        // manually without the marker being treated as stale.
        let confirmed = SessionRecord {
            transcript: Some(transcript.clone()),
            payment: PaymentState::Confirmed,
        };
        if let Err(e) = self.store.save(&confirmed).await {
            return Err(self.fail(e));
        }

        self.results.transcript = Some(transcript.clone());

        let mood = match self.api.analyze(AgentKind::Mood, &transcript).await {
            Ok(m) => m,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.results.mood = Some(mood);
        if let Err(e) = self.store.clear().await {
            return Err(self.fail(e));
        }

        self.state = FlowState::Unlocked;
        info!("Mood analysis unlocked; session storage cleared");

        Ok(ResumeOutcome::Unlocked {
            stripped_url: strip_payment_marker(&url),
        })
    }

    fn fail(&mut self, error: anyhow::Error) -> anyhow::Error {
        self.last_error = Some(error.to_string());
        error
    }
}

fn payment_marker(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == PAYMENT_SUCCESS_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// The same URL with the success marker removed; other parameters survive.
fn strip_payment_marker(url: &Url) -> String {
    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != PAYMENT_SUCCESS_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut stripped = url.clone();
    stripped.set_query(None);
    if !remaining.is_empty() {
        let mut pairs = stripped.query_pairs_mut();
        for (key, value) in &remaining {
            pairs.append_pair(key, value);
        }
    }
    stripped.to_string()
}
