//! digitask-agent: headless realtime client.
//!
//! Logs in with a bearer token, keeps the tracking and notification streams
//! open, optionally publishes locations and follows one chat group, and
//! prints every reconciled update as a log line until Ctrl-C.

mod provider;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use digitask_api::HttpBackend;
use digitask_common::{AuthSession, DigitaskError, GroupId, RealtimeError};
use digitask_config::DigitaskConfig;
use digitask_realtime::{
    LocationProvider, RealtimeSession, RealtimeUpdate, SessionOptions, TungsteniteConnector,
};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::provider::{LineProvider, LineSource};

#[derive(Parser)]
#[command(name = "digitask-agent", about = "Headless Digitask realtime client")]
struct Args {
    /// Config file. Defaults to `<config_dir>/digitask/config.toml`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bearer token for the REST API and WebSocket streams.
    #[arg(long, env = "DIGITASK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Publish locations read as `lat,lng` lines from a file, or `-` for stdin.
    #[arg(long, value_name = "FILE|-")]
    locations: Option<String>,

    /// Seconds between samples replayed from a locations file.
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,

    /// Chat group to open after start.
    #[arg(long)]
    group: Option<i64>,

    /// Tracing filter directive, e.g. `debug` or `digitask_realtime=trace`.
    #[arg(long)]
    log_level: Option<String>,

    /// Print the resolved configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match digitask_config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("digitask-agent: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.print_config {
        println!("{}", digitask_config::config_to_json(&config));
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&args, &config))
        .init();

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "digitask-agent failed");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins, then `--log-level`, then `[logging] level`.
fn env_filter(args: &Args, config: &DigitaskConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match &args.log_level {
        Some(directive) => directive.into(),
        None => format!("digitask={}", config.logging.level.as_directive()).into(),
    })
}

async fn run(args: Args, config: DigitaskConfig) -> Result<(), DigitaskError> {
    let token = args
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or(RealtimeError::NotAuthenticated)?;
    let auth = AuthSession::with_token(token);

    let backend = HttpBackend::new(
        &config.server.api_base_url,
        auth.clone(),
        Duration::from_secs(config.server.request_timeout_secs),
    )?;
    info!(api = %backend.base_url(), "Backend configured");

    let options = SessionOptions::from_config(&config)?;
    let mut session = RealtimeSession::new(
        auth,
        Arc::new(backend),
        Arc::new(TungsteniteConnector),
        options,
    );
    let mut updates = session.subscribe();

    let provider = args.locations.as_deref().map(|arg| {
        LineProvider::new(
            LineSource::parse(arg),
            Duration::from_secs(args.interval_secs),
        )
    });
    session
        .start(provider.as_ref().map(|p| p as &dyn LocationProvider))
        .await?;

    if let Some(group) = args.group.map(GroupId) {
        if let Err(e) = session.chat().select_group(group).await {
            warn!(%group, error = %e, "Could not open chat group");
        }
    }

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Ctrl-C handler failed");
                }
                info!("Shutting down");
                break;
            }
            update = updates.recv() => match update {
                Ok(update) => log_update(&update),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Update log lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
        log_notices(&session);
    }

    session.logout().await;
    Ok(())
}

fn log_update(update: &RealtimeUpdate) {
    match update {
        RealtimeUpdate::StreamStatus { stream, status } => {
            info!(%stream, ?status, "Stream status");
        }
        RealtimeUpdate::Notification(item) => {
            info!(id = %item.id, title = %item.title, message = %item.message, "Notification");
        }
        RealtimeUpdate::UnreadCount(count) => info!(count, "Unread notifications"),
        RealtimeUpdate::ChatUnreadCount(count) => info!(count, "Unread chat messages"),
        RealtimeUpdate::ChatNotification(n) => {
            info!(
                group = %n.group_id,
                sender = %n.sender_name,
                content = %n.message_content,
                "Chat notification"
            );
        }
        RealtimeUpdate::ChatMessage { group, message } => {
            info!(
                %group,
                sender = %message.sender.display_name,
                mine = message.is_mine,
                content = %message.content,
                "Chat message"
            );
        }
        RealtimeUpdate::Location(location) => {
            info!(
                user = %location.user_id,
                latitude = location.latitude,
                longitude = location.longitude,
                online = location.is_online,
                "Location"
            );
        }
    }
}

fn log_notices(session: &RealtimeSession) {
    for notice in session.notices().drain() {
        error!(title = %notice.title, detail = %notice.detail, "Notice");
    }
}
