//! Client-side recording and payment-gating flow
//!
//! This module is the browser page's control flow expressed as a library:
//! - `Recorder`/`CaptureHandle` - scoped audio capture into one blob
//! - `SessionRecord` + `SessionStore` - the durable state that survives the
//!   full-page navigation to the external payment origin
//! - `AnalysisApi` - the server endpoints the flow calls
//! - `RecordingFlow` - the state machine driving
//!   idle → recording → recorded → transcribing → free-analysis →
//!   awaiting-payment → pending-unlock → unlocked

mod api;
mod flow;
mod record;
mod recorder;
mod store;

pub use api::{AnalysisApi, ClientError, HttpAnalysisApi};
pub use flow::{
    AnalysisResults, FlowState, RecordingFlow, RecordingHandle, ResumeOutcome,
    PAYMENT_SUCCESS_PARAM,
};
pub use record::{PaymentState, SessionRecord};
pub use recorder::{AudioBlob, CaptureHandle, CaptureMonitor, Recorder};
pub use store::{JsonFileStore, MemoryStore, SessionStore};
