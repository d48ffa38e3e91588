//! skein-api server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! file-backed record store, and serves the JSON API over HTTP.
//!
//! Configuration may also come from the environment with the `SKEIN`
//! prefix, e.g. `SKEIN_PORT=8080` or `SKEIN_SUMMARIZER__API_KEY=…`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use skein_api::{
  AppState, ServerConfig, SummarizerConfig, SummarizerKind,
};
use skein_compile::DialogManager;
use skein_store_fs::FsStore;
use skein_summarize::{
  AnySummarizer, MockSummarizer, OpenAiConfig, OpenAiSummarizer,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Skein thread archive server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "threads")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("SKEIN").separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Fail-fast construction of the configured summarizer.
  let summarizer = build_summarizer(&server_cfg.summarizer)?;

  // Open the file-backed store.
  let store = FsStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  let state = AppState {
    dialog:     Arc::new(DialogManager::new(Arc::new(store))),
    summarizer: Arc::new(summarizer),
  };

  let app = Router::new()
    .nest("/api", skein_api::router(state))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Construct the summarizer named by the config, validating required
/// fields at startup rather than on first use.
fn build_summarizer(cfg: &SummarizerConfig) -> anyhow::Result<AnySummarizer> {
  match cfg.kind {
    SummarizerKind::Mock => Ok(AnySummarizer::Mock(MockSummarizer)),
    SummarizerKind::OpenAi => {
      let api_key = cfg
        .api_key
        .clone()
        .context("summarizer.api_key is required when kind = \"openai\"")?;
      let mut openai_cfg = OpenAiConfig::new(api_key);
      if let Some(model) = &cfg.model {
        openai_cfg.model = model.clone();
      }
      if let Some(base_url) = &cfg.base_url {
        openai_cfg.base_url = base_url.clone();
      }
      openai_cfg.log_dir = cfg.log_dir.clone();
      Ok(AnySummarizer::OpenAi(OpenAiSummarizer::new(openai_cfg)?))
    }
  }
}
