//! Calendar server with cookie sessions and free-text events.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Error};
use pico_args::Arguments;
use tc_server::{
    api::{self, cookies::CookieSettings},
    config::{ServerConfig, StorageConfig},
    logging, metrics,
};
use textcal::{
    AuthManager, PasswordHasher, SessionStore,
    auth::{CredentialStore, MemoryCredentialStore, PgCredentialStore},
    db::Database,
    events::{EventManager, EventStore, MemoryEventStore, PgEventStore, ProcessDateExtractor},
    session::{MemorySessionStore, PgSessionStore},
};
use tracing::info;

const HELP: &str = "\
Run the textcal calendar server

USAGE:
  tc_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/textcal]

FLAGS:
  --memory                 Keep all data in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  PASSWORD_PEPPER          Password hashing pepper (required, 16+ characters)
  SESSION_COOKIE_NAME      Session cookie name [default: tc_session]
  SESSION_TTL_SECS         Session lifetime [default: 86400]
  SESSION_COOKIE_SECURE    Mark the cookie Secure [default: false]
  EXTRACTOR_PROGRAM        Date extractor interpreter [default: python3]
  EXTRACTOR_SCRIPT         Date extractor script [default: ./main.py]
  METRICS_BIND             Prometheus listener address (optional)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        memory: pargs.contains("--memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.memory)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Metrics available at http://{}/metrics", addr);
    }

    let hasher = PasswordHasher::with_cost(
        config.security.password_pepper.clone(),
        config.security.argon2_memory_kib,
        config.security.argon2_iterations,
        config.security.argon2_parallelism,
    )
    .context("Invalid Argon2 parameters")?;

    let session_ttl = chrono::Duration::seconds(config.session.ttl_secs);

    let (database, credentials, sessions, events): (
        Option<Database>,
        Arc<dyn CredentialStore>,
        Arc<dyn SessionStore>,
        Arc<dyn EventStore>,
    ) = match &config.storage {
        StorageConfig::Postgres(db_config) => {
            info!("Connecting to database");
            let db = Database::new(db_config)
                .await
                .context("Failed to connect to database")?;
            info!("Database connected successfully");

            let pool = db.pool().clone();
            (
                Some(db),
                Arc::new(PgCredentialStore::new(pool.clone())),
                Arc::new(PgSessionStore::new(pool.clone(), session_ttl)),
                Arc::new(PgEventStore::new(pool)),
            )
        }
        StorageConfig::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            (
                None,
                Arc::new(MemoryCredentialStore::new()),
                Arc::new(MemorySessionStore::new(session_ttl)),
                Arc::new(MemoryEventStore::new()),
            )
        }
    };

    let extractor = ProcessDateExtractor::new(
        config.extractor.program.clone(),
        config.extractor.args.clone(),
        Duration::from_secs(config.extractor.timeout_secs),
    );

    let api_state = api::AppState {
        auth_manager: Arc::new(AuthManager::new(credentials, hasher)),
        sessions: sessions.clone(),
        event_manager: Arc::new(EventManager::new(Arc::new(extractor), events)),
        cookies: CookieSettings {
            name: config.session.cookie_name.clone(),
            secure: config.session.secure_cookie,
            max_age_secs: config.session.ttl_secs,
        },
        database: database.clone(),
    };

    let purge_task = tokio::spawn(purge_sessions(
        sessions,
        Duration::from_secs(config.session.purge_interval_secs),
    ));

    let app = api::create_router(api_state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    purge_task.abort();
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Periodically remove expired sessions.
async fn purge_sessions(sessions: Arc<dyn SessionStore>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        match sessions.purge_expired().await {
            Ok(0) => {}
            Ok(count) => {
                metrics::sessions_purged(count);
                tracing::debug!(count, "Purged expired sessions");
            }
            Err(e) => tracing::warn!(error = %e, "Session purge failed"),
        }
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
