//! HTTP proxy surface for the browser client
//!
//! - POST /api/transcribe - forward an audio upload to the speech API
//! - POST /api/agents/mood - paid mood analysis
//! - POST /api/agents/sentiment - free sentiment analysis
//! - POST /api/agents/summary - free summary
//! - POST /api/stripe/create-checkout - payment placeholder
//! - POST /api/stripe/webhook - payment placeholder
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
