//! Thin client for the upstream OpenAI HTTP APIs.
//!
//! Two calls are proxied: audio transcription (multipart upload) and chat
//! completions. The service adds nothing on top; requests are forwarded
//! and the interesting field of the response is extracted.

mod client;
mod types;

pub use client::{OpenAiClient, OpenAiError};
pub use types::{
    ChatChoice, ChatChoiceMessage, ChatCompletion, ChatMessage, ChatRequest, Transcription, Usage,
};
