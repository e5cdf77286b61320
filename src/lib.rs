pub mod agents;
pub mod config;
pub mod error;
pub mod http;
pub mod logsink;
pub mod openai;
pub mod session;

pub use agents::{analyze, AgentKind, AgentOutcome};
pub use config::Config;
pub use error::{ApiError, ErrorResponse};
pub use http::{create_router, AppState};
pub use logsink::LogSink;
pub use openai::{OpenAiClient, OpenAiError};
pub use session::{
    AnalysisApi, AnalysisResults, AudioBlob, ClientError, FlowState, HttpAnalysisApi,
    JsonFileStore, MemoryStore, PaymentState, RecordingFlow, ResumeOutcome, SessionRecord,
    SessionStore,
};
