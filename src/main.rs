//! Bestiary Server
//! Mission: Serve the witcher portal behind rank and school gated sessions

use anyhow::{Context, Result};
use bestiary_backend::{
    api::{build_router, AppState},
    auth::{AuthState, IdentityStore, JwtHandler, SessionManager},
    config::{load_env, Config},
    store::ReviewCollection,
};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, time::interval};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    info!("🐺 Bestiary server starting");

    let config = Config::from_env()?;

    let identities = match &config.identity_table_path {
        Some(path) => IdentityStore::from_toml_file(path)
            .with_context(|| format!("Failed to load identity table {}", path.display()))?,
        None => {
            warn!("⚠️  IDENTITY_TABLE_PATH not set, using the built-in identity table");
            IdentityStore::seeded()
        }
    };
    info!("🔐 {} principals loaded", identities.len());

    let sessions = Arc::new(SessionManager::new(
        Arc::new(identities),
        config.session_ttl,
    ));
    let jwt_handler = Arc::new(JwtHandler::new(config.session_secret.clone()));
    let auth_state = AuthState::new(sessions.clone(), jwt_handler);

    // Refuse to start on a corrupt reviews file rather than serve an empty list
    let reviews = ReviewCollection::new(&config.reviews_path);
    let existing = reviews.list_all().with_context(|| {
        format!(
            "Failed to read reviews file {}",
            config.reviews_path.display()
        )
    })?;
    info!(
        "📝 Reviews file {} ({} entries)",
        config.reviews_path.display(),
        existing.len()
    );

    tokio::spawn(session_pruning(
        sessions,
        Duration::from_secs(config.session_prune_interval_secs),
    ));

    let app = build_router(AppState::new(auth_state, reviews));

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bestiary_backend=debug,bestiary_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Periodically drop expired sessions so the table does not grow unbounded.
async fn session_pruning(sessions: Arc<SessionManager>, every: Duration) {
    let mut ticker = interval(every);
    loop {
        ticker.tick().await;
        let pruned = sessions.prune_expired();
        if pruned > 0 {
            info!("🧹 Pruned {} expired sessions", pruned);
        } else {
            debug!("No expired sessions to prune");
        }
    }
}
