const MOOD_PROMPT: &str = "You are a mood analysis expert. Analyze the following transcription and determine the overall mood of the speaker.
Consider factors like: tone, word choice, energy level, and emotional indicators.
Provide a detailed mood analysis in 2-3 sentences. Be specific about the mood (e.g., enthusiastic, contemplative, frustrated, excited, calm, anxious, etc.).";

const SENTIMENT_PROMPT: &str = "You are a sentiment analysis expert specializing in emotional state detection.
Analyze the following transcription and determine the speaker's emotional state.
Focus on detecting if the speaker is: nervous, happy, sad, angry, fearful, confident, uncertain, or other emotional states.
Provide a detailed sentiment analysis in 2-3 sentences with specific emotional indicators you detected.";

const SUMMARY_PROMPT: &str = "You are an expert at summarizing spoken content.
Create a concise, clear summary of the following transcription.
Capture the main points, key ideas, and important details.
Keep the summary to 2-4 sentences and maintain the speaker's intent.";

/// One category of text analysis. Carries everything that differs between
/// the three otherwise identical endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Mood,
    Sentiment,
    Summary,
}

impl AgentKind {
    /// Source tag used in log entries.
    pub fn tag(self) -> &'static str {
        match self {
            AgentKind::Mood => "MoodAgent",
            AgentKind::Sentiment => "SentimentAgent",
            AgentKind::Summary => "SummaryAgent",
        }
    }

    /// JSON field the result is returned under.
    pub fn field(self) -> &'static str {
        match self {
            AgentKind::Mood => "mood",
            AgentKind::Sentiment => "sentiment",
            AgentKind::Summary => "summary",
        }
    }

    /// Human name of the operation, for log messages.
    pub fn action(self) -> &'static str {
        match self {
            AgentKind::Mood => "mood analysis",
            AgentKind::Sentiment => "sentiment analysis",
            AgentKind::Summary => "summary generation",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            AgentKind::Mood => MOOD_PROMPT,
            AgentKind::Sentiment => SENTIMENT_PROMPT,
            AgentKind::Summary => SUMMARY_PROMPT,
        }
    }

    pub fn temperature(self) -> f32 {
        match self {
            AgentKind::Mood | AgentKind::Sentiment => 0.7,
            AgentKind::Summary => 0.5,
        }
    }

    pub fn max_tokens(self) -> u32 {
        match self {
            AgentKind::Mood | AgentKind::Sentiment => 200,
            AgentKind::Summary => 250,
        }
    }

    /// Returned when the model produces no choice at all.
    pub fn fallback(self) -> &'static str {
        match self {
            AgentKind::Mood => "Unable to determine mood",
            AgentKind::Sentiment => "Unable to determine sentiment",
            AgentKind::Summary => "Unable to generate summary",
        }
    }
}
