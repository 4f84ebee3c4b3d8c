//! Syncache Server
//!
//! The trigger surface for the cache/store consistency coordinator: one
//! HTTP route per policy, backed by an embedded SQLite store, an
//! in-memory TTL cache, and an in-process partitioned update channel.

mod channel;
mod handlers;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use syncache_core::consumer::UpdateApplier;
use syncache_core::{
    AsyncQueuePolicy, CacheAsidePolicy, DelayedDoubleDeletePolicy, DoubleWritePolicy,
    WriteInvalidatePolicy, DEFAULT_CACHE_TTL,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use channel::InProcessChannel;
use storage::{Database, MemoryCache};

/// Topic carrying asynchronous record updates.
const UPDATE_TOPIC: &str = "record-updates";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub cache_aside: Arc<CacheAsidePolicy>,
    pub write_invalidate: Arc<WriteInvalidatePolicy>,
    pub double_write: Arc<DoubleWritePolicy>,
    pub delayed_double_delete: Arc<DelayedDoubleDeletePolicy>,
    pub async_queue: Arc<AsyncQueuePolicy>,
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Syncache Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, db={}, ttl={:?}, delay={:?}, partitions={}",
        config.bind_address,
        config.database_path,
        config.cache_ttl,
        config.double_delete_delay,
        config.channel_partitions
    );

    let db = Arc::new(
        Database::new(&config.database_path, config.store_timeout)
            .await
            .context("Failed to initialize database")?,
    );

    let cache = Arc::new(MemoryCache::new());
    info!("In-memory cache initialized");

    // Update channel plus one consumer worker per partition.
    let (channel, receivers) = InProcessChannel::new(UPDATE_TOPIC, config.channel_partitions);
    let channel = Arc::new(channel);
    let applier = Arc::new(UpdateApplier::new(db.clone()));
    let workers = channel.spawn_consumers(receivers, applier);
    info!("Update channel running with {} partition workers", workers.len());

    let cache_aside = Arc::new(CacheAsidePolicy::new(
        db.clone(),
        cache.clone(),
        config.cache_ttl,
    ));
    let write_invalidate = Arc::new(WriteInvalidatePolicy::new(db.clone(), cache.clone()));
    let double_write = Arc::new(DoubleWritePolicy::new(
        db.clone(),
        cache.clone(),
        config.cache_ttl,
    ));
    let delayed_double_delete = Arc::new(DelayedDoubleDeletePolicy::new(
        db.clone(),
        cache.clone(),
        config.double_delete_delay,
    ));
    let async_queue = Arc::new(AsyncQueuePolicy::new(
        channel.clone(),
        cache.clone(),
        UPDATE_TOPIC,
        config.cache_ttl,
    ));
    info!("Consistency policies initialized");

    let state = AppState {
        db,
        cache_aside,
        write_invalidate,
        double_write,
        delayed_double_delete,
        async_queue,
    };

    let app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/records", post(handlers::records::create))
        .route("/records/:id", get(handlers::records::read))
        .route("/records/:id/raw", get(handlers::records::read_raw))
        .route(
            "/records/:id/invalidate",
            post(handlers::records::write_invalidate),
        )
        .route(
            "/records/:id/double-write",
            post(handlers::records::double_write),
        )
        .route(
            "/records/:id/delayed-delete",
            post(handlers::records::delayed_double_delete),
        )
        .route("/records/:id/async", post(handlers::records::async_update))
}

#[derive(Debug, Clone)]
struct Config {
    bind_address: String,
    database_path: String,
    cache_ttl: Duration,
    double_delete_delay: Duration,
    channel_partitions: usize,
    store_timeout: Duration,
}

fn load_config() -> Result<Config> {
    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/syncache.db".to_string());

    let cache_ttl = env_u64("CACHE_TTL_SECS", DEFAULT_CACHE_TTL.as_secs())
        .map(Duration::from_secs)?;

    // Must exceed the tail latency of a concurrent read-miss-refill cycle.
    let double_delete_delay =
        env_u64("DOUBLE_DELETE_DELAY_MS", 500).map(Duration::from_millis)?;

    let channel_partitions = env_u64("CHANNEL_PARTITIONS", 4)? as usize;
    if channel_partitions == 0 {
        anyhow::bail!("CHANNEL_PARTITIONS must be at least 1");
    }

    let store_timeout = env_u64("STORE_TIMEOUT_MS", 3000).map(Duration::from_millis)?;

    Ok(Config {
        bind_address,
        database_path,
        cache_ttl,
        double_delete_delay,
        channel_partitions,
        store_timeout,
    })
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
