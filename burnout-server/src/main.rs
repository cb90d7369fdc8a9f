//! Burnout Score Checker API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use burnout_server::{
    routes, AppState, ChatConfig, ChatReportGenerator, Config, ConsoleEmailSender,
    ConsoleSmsSender, EmailSender, InMemoryStore, ReportGenerator, SmtpConfig, SmtpEmailSender,
    SqliteStore, Store, TemplateReportGenerator,
};

/// How often expired sessions are purged
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "burnout_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    match config.database_path.clone() {
        Some(path) => {
            let store = SqliteStore::open(&path)?;
            tracing::info!(path = %path, "Using SQLite storage");
            serve(config, store).await
        }
        None => {
            tracing::warn!("DATABASE_PATH not set, sessions are kept in memory");
            serve(config, InMemoryStore::new()).await
        }
    }
}

async fn serve<S: Store + 'static>(config: Config, store: S) -> Result<()> {
    let email_sender: Box<dyn EmailSender> = match SmtpConfig::from_env() {
        Some(smtp) => Box::new(
            SmtpEmailSender::new(smtp, config.otp_expiry_minutes).map_err(anyhow::Error::msg)?,
        ),
        None => {
            tracing::warn!("SMTP not configured, emails are printed to the console");
            Box::new(ConsoleEmailSender::new())
        }
    };

    let report_generator: Arc<dyn ReportGenerator> = match ChatConfig::from_env() {
        Some(chat) => {
            tracing::info!(model = %chat.model, "Reports generated by chat completions");
            Arc::new(ChatReportGenerator::new(chat).map_err(anyhow::Error::msg)?)
        }
        None => {
            tracing::info!("REPORT_API_KEY not set, using template reports");
            Arc::new(TemplateReportGenerator::new())
        }
    };

    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        email_sender,
        Box::new(ConsoleSmsSender::new()),
        report_generator,
    ));

    spawn_cleanup(Arc::clone(&state));

    let app = routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically delete sessions older than the configured expiry
fn spawn_cleanup<S, E>(state: Arc<AppState<S, E>>)
where
    S: Store + 'static,
    E: EmailSender + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match state
                .store
                .cleanup_expired_sessions(state.config.session_expiry_hours)
            {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Expired sessions purged"),
                Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
            }
        }
    });
}
