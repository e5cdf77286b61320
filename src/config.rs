use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub openai: OpenAiConfig,
    pub stripe: StripeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Credential for both the transcription and completion APIs.
    /// `OPENAI_API_KEY` overrides whatever the config file says.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API origin; overridable so tests can point the client at a stub.
    pub base_url: String,

    pub transcription_model: String,
    pub chat_model: String,

    /// Language hint passed to the transcription API.
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Fixed external checkout link the client navigates to.
    pub payment_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub dir: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "voxlens")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 3000)?
            .set_default("openai.base_url", "https://api.openai.com")?
            .set_default("openai.transcription_model", "whisper-1")?
            .set_default("openai.chat_model", "gpt-4")?
            .set_default("openai.language", "en")?
            .set_default(
                "stripe.payment_url",
                "https://buy.stripe.com/test_3cI3cwc7Rasl18U4ToeAg00",
            )?
            .set_default("logging.dir", "logs")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("VOXLENS").separator("__"))
            .set_override_option("openai.api_key", std::env::var("OPENAI_API_KEY").ok())?
            .set_override_option("stripe.secret_key", std::env::var("STRIPE_SECRET_KEY").ok())?
            .set_override_option(
                "stripe.webhook_secret",
                std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
            )?
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
