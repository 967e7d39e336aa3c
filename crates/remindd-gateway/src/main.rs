use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

mod app;
mod http;

/// Scheduled email reminder service.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to remindd.toml (overrides REMINDD_CONFIG).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remindd_gateway=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config flag > REMINDD_CONFIG env > ~/.remindd/remindd.toml
    let config_path = cli.config.or_else(|| std::env::var("REMINDD_CONFIG").ok());
    let config = remindd_core::RemindConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        remindd_core::RemindConfig::default()
    });

    let bind = config.server.bind.clone();
    let port = config.server.port;

    // initialize SQLite database
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    remindd_store::db::init_db(&db)?;
    info!("database migrations complete");

    // handler store and engine store each get their own connection so
    // form submissions never contend with the polling query
    let store = remindd_store::ReminderStore::new(db);
    let engine_store = Arc::new(remindd_store::ReminderStore::new(rusqlite::Connection::open(
        db_path,
    )?));

    // SMTP transport — built once, reused across every cycle
    let smtp = remindd_mailer::SmtpMailer::new(&config.smtp)?;
    smtp.verify().await;
    let mailer: Arc<dyn remindd_mailer::Mailer> = Arc::new(smtp);

    let engine = remindd_delivery::DeliveryEngine::new(
        engine_store,
        mailer,
        std::time::Duration::from_secs(config.delivery.interval_secs),
        config.delivery.batch_limit,
    );

    // spawn delivery loop in background
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move { engine.run(shutdown_rx).await });

    let state = Arc::new(app::AppState::new(config, store));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("remindd gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // signal the delivery loop to stop
    let _ = shutdown_tx.send(true);
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received: closing HTTP server"),
        _ = terminate => info!("SIGTERM received: closing HTTP server"),
    }
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
