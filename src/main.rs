use anyhow::Result;
use clap::Parser;
use tracing::info;
use voxlens::{create_router, AppState, Config, LogSink};

#[derive(Parser, Debug)]
#[command(name = "voxlens", about = "Voice transcription and analysis proxy server")]
struct Args {
    /// Path to the configuration file (extension optional)
    #[arg(long, default_value = "config/voxlens")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v0.1.0", cfg.service.name);
    info!(
        "HTTP server will bind to {}:{}",
        cfg.service.http.bind, cfg.service.http.port
    );
    if cfg.openai.api_key.is_none() {
        info!("OPENAI_API_KEY not set; proxy endpoints will report misconfiguration");
    }

    let log = LogSink::new(&cfg.logging.dir);
    if let Some(path) = log.path() {
        info!("Request log: {}", path.display());
    }

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg, log);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
