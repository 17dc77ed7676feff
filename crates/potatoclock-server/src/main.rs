use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use potatoclock_core::storage::data_dir;
use potatoclock_core::{
    Clock, Config, Database, SessionHandle, SqliteSessionStore, SystemClock,
};
use potatoclock_server::{build_router, shutdown_signal, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "potatoclock-server",
    version,
    about = "Potato Clock state holder"
)]
struct Args {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    host: Option<String>,
    /// Port to bind (overrides server.port)
    #[arg(long)]
    port: Option<u16>,
    /// Config file (defaults to the data directory's config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// SQLite file for the saved session
    #[arg(long)]
    db: Option<PathBuf>,
    /// Keep the session in memory only
    #[arg(long)]
    no_persist: bool,
}

fn open_store(path: Option<PathBuf>) -> Result<SqliteSessionStore, Box<dyn std::error::Error>> {
    let path = match path {
        Some(path) => path,
        None => data_dir()?.join("potatoclock.db"),
    };
    let db = Database::open_at(&path)?;
    info!(path = %path.display(), "session database opened");
    Ok(SqliteSessionStore::new(db))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let session = if config.server.persist && !args.no_persist {
        match open_store(args.db) {
            Ok(store) => SessionHandle::restore(config.durations(), clock, Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "persistence unavailable, keeping session in memory");
                SessionHandle::fresh(config.durations(), clock)
            }
        }
    } else {
        SessionHandle::fresh(config.durations(), clock)
    };

    let app = build_router(AppState::new(session));
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}
