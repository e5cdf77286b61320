use crate::openai::{ChatMessage, ChatRequest, OpenAiClient, OpenAiError};

use super::kind::AgentKind;

#[derive(Debug)]
pub struct AgentOutcome {
    pub text: String,
    pub tokens_used: Option<u32>,
}

/// Run one agent over a transcript: a single completion call with the
/// kind's fixed prompt and sampling parameters. An empty choice list is
/// not an error; the kind's fallback text is returned instead.
pub async fn analyze(
    client: &OpenAiClient,
    model: &str,
    kind: AgentKind,
    transcript: &str,
) -> Result<AgentOutcome, OpenAiError> {
    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(kind.system_prompt()),
            ChatMessage::user(transcript),
        ],
        temperature: kind.temperature(),
        max_tokens: Some(kind.max_tokens()),
    };

    let completion = client.chat(&request).await?;

    let text = completion
        .first_text()
        .map(str::to_string)
        .unwrap_or_else(|| kind.fallback().to_string());

    Ok(AgentOutcome {
        text,
        tokens_used: completion.usage.map(|u| u.total_tokens),
    })
}
