//! Launchpad Auth server
//!
//! Serves registration, login, token refresh, email verification, and
//! permission administration over HTTP.

use launchpad_auth::config::Settings;
use launchpad_auth::mailer::LogMailer;
use launchpad_auth::routes::create_router;
use launchpad_auth::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Launchpad Auth...");

    // Load configuration
    let settings = Settings::load()?;
    info!(auth = ?settings.auth, "📋 Configuration loaded successfully");

    let state = Arc::new(AppState::new(settings.auth.clone(), Arc::new(LogMailer)));

    if let Some(admin) = &settings.admin {
        state
            .users
            .seed_admin(&admin.email, &admin.password)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed administrator: {}", e))?;
    }

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Authentication ───");
    info!("   POST /api/auth/register             - Register new account");
    info!("   POST /api/auth/login                - Login with email/password");
    info!("   POST /api/auth/refresh              - Exchange refresh token for a new pair");
    info!("   POST /api/auth/verify-email         - Confirm email address");
    info!("   POST /api/auth/verify-email/resend  - Resend verification email");
    info!("   POST /api/auth/logout-all           - Invalidate every session");
    info!("   GET  /api/auth/me                   - Get current user");
    info!("");
    info!("   ─── Administration ───");
    info!("   GET  /api/users                     - List users (manage_users)");
    info!("   PUT  /api/users/{{id}}/permissions    - Edit permissions (manage_permissions)");
    info!("   GET  /api/permissions               - Capability catalogue");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,launchpad_auth=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
