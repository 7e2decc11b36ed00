use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ap_prep::{auth, config, db, handlers, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ap_prep=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = config::load();
  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  {
    let conn = pool.lock().expect("Database lock failed during startup");
    db::catalog::seed_catalog(&conn).expect("Failed to seed course catalog");

    // Drop stale sessions left over from previous runs
    match auth::db::cleanup_expired_sessions(&conn, Utc::now()) {
      Ok(removed) if removed > 0 => tracing::info!("removed {} expired sessions", removed),
      Ok(_) => {}
      Err(e) => tracing::warn!("failed to clean up expired sessions: {}", e),
    }
  }

  let app = handlers::router(AppState::new(pool, config.scheduler));

  let listener = tokio::net::TcpListener::bind(&config.bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", config.bind_addr));

  tracing::info!("Server running on http://{}", config.bind_addr);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
