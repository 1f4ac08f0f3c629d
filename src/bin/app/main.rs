// src/bin/app/main.rs

mod auth;
mod errors;
mod handlers;
#[cfg(test)]
mod test_support;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use clap::Parser;
use scribe::config::{self, Config};
use scribe::identity::MemoryDirectory;
use scribe::model::HttpNoteModel;
use scribe::speech::DeepgramClient;
use scribe::store::MemoryStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use handlers::{admin, generate, health, notes, patients, search, templates, transcribe};
use types::AppState;

// Recordings are sent inline as base64
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Dental scribe API server
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "SCRIBE_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Comma separated list of origins allowed by CORS
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "")]
    allowed_origins: String,

    #[arg(long, env = "MODEL_ID", default_value = config::DEFAULT_MODEL_ID)]
    model_id: String,

    #[arg(long, env = "MODEL_ENDPOINT", default_value = config::DEFAULT_MODEL_ENDPOINT)]
    model_endpoint: String,

    #[arg(long, env = "MODEL_API_KEY", hide_env_values = true)]
    model_api_key: Option<String>,

    #[arg(long, env = "DEEPGRAM_URL", default_value = scribe::speech::DEFAULT_DEEPGRAM_URL)]
    deepgram_url: String,

    #[arg(long, env = "DEEPGRAM_API_KEY", hide_env_values = true)]
    deepgram_api_key: Option<String>,

    /// JSON file holding {"api_key": "..."}
    #[arg(long, env = "DEEPGRAM_SECRET_FILE")]
    deepgram_secret_file: Option<PathBuf>,

    /// Rows fetched per page when scanning patients
    #[arg(long, env = "SEARCH_PAGE_SIZE", default_value_t = scribe::store::DEFAULT_PAGE_SIZE)]
    search_page_size: usize,

    /// Used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            addr: args.addr,
            allowed_origins: config::parse_origins(&args.allowed_origins),
            model_id: args.model_id,
            model_endpoint: args.model_endpoint,
            model_api_key: args.model_api_key,
            deepgram_url: args.deepgram_url,
            deepgram_api_key: args.deepgram_api_key,
            deepgram_secret_file: args.deepgram_secret_file,
            search_page_size: args.search_page_size,
            log_level: args.log_level,
        }
    }
}

fn build_state(config: Config) -> anyhow::Result<AppState> {
    let deepgram_key = config
        .resolve_deepgram_key()
        .context("failed to load the speech API key")?;
    if deepgram_key.is_none() {
        warn!("no speech API key configured, /transcribe will fail");
    }

    Ok(AppState {
        store: Arc::new(MemoryStore::with_page_size(config.search_page_size)),
        directory: Arc::new(MemoryDirectory::default()),
        model: Arc::new(HttpNoteModel::new(
            &config.model_endpoint,
            &config.model_id,
            config.model_api_key.clone(),
        )),
        speech: Arc::new(DeepgramClient::new(&config.deepgram_url, deepgram_key)),
        config: Arc::new(config),
    })
}

fn cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn router(state: AppState) -> Router {
    let cors = cors(&state.config.allowed_origins);
    Router::new()
        .route("/health", get(health::health))
        .route("/patients", post(patients::create_patient))
        .route("/patients/search", get(search::search_patients))
        .route("/patients/:patient_id", get(patients::get_patient))
        .route("/notes", get(notes::note_history))
        .route("/generate", post(generate::generate_note))
        .route("/transcribe", post(transcribe::transcribe))
        .route(
            "/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/templates/:template_id",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/admin/invite", post(admin::invite_user))
        .route("/admin/users", get(admin::list_users))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", args.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from(args);
    let addr = config.addr;
    let app = router(build_state(config)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
