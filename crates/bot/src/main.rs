//! esa gatekeeper server.
//!
//! # Security
//!
//! - Only accepts interactions from the configured channel
//! - Every Slack request carries the verification token; the HMAC signature
//!   is checked as well when `SLACK_SIGNING_SECRET` is set
//! - Holds the esa token, which can invite and delete members

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use esa_gatekeeper::commands::{CommandInterpreter, CommandSettings};
use esa_gatekeeper::config::{BotConfig, LogFormat};
use esa_gatekeeper::esa::{AccountDirectory, EsaClient};
use esa_gatekeeper::listener;
use esa_gatekeeper::routes;
use esa_gatekeeper::slack::{ChatTransport, SlackClient};
use esa_gatekeeper::state::AppState;
use esa_gatekeeper::workflow::{
    Approvers, Executor, PendingStore, Renderer, WorkflowEngine, system_clock,
};
use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tokio::sync::mpsc;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired requests are swept in the background.
const SWEEP_PERIOD: std::time::Duration = std::time::Duration::from_secs(60 * 60);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &BotConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = BotConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "esa_gatekeeper=info,tower_http=debug".into());

    let is_json = config.log_format == LogFormat::Json;
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let chat: Arc<dyn ChatTransport> = Arc::new(SlackClient::new(config.slack.bot_token.clone()));
    let directory: Arc<dyn AccountDirectory> = Arc::new(EsaClient::new(
        config.esa.team_name.clone(),
        config.esa.token.clone(),
    ));

    let bot = chat
        .user_info(&config.slack.bot_id)
        .await
        .expect("Failed to get bot user profile");
    let approvers = Approvers::resolve(
        chat.as_ref(),
        &config.admin_ids,
        config.admin_group_id.clone(),
    )
    .await
    .expect("Failed to resolve administrators");

    let clock = system_clock();
    let store = PendingStore::new(config.request_retention, clock.clone());
    let renderer = Renderer::new(config.time_zone, clock);
    let executor = Executor::new(chat.clone(), directory.clone(), renderer.clone());
    let engine = Arc::new(WorkflowEngine::new(
        store.clone(),
        approvers.clone(),
        config.organizations.clone(),
        renderer.clone(),
        executor,
    ));

    let interpreter = Arc::new(CommandInterpreter::new(
        chat,
        directory,
        store.clone(),
        approvers,
        renderer,
        CommandSettings {
            bot_id: config.slack.bot_id.clone(),
            bot_name: bot.name,
            channel_id: config.slack.channel_id.clone(),
            usage_url: config.slack.usage_url.clone(),
            allowed_email_domains: config.allowed_email_domains.clone(),
            min_expire_months: config.account_expire_months,
            organizations: config.organizations.clone(),
        },
    ));

    let (events_tx, events_rx) = mpsc::channel(listener::EVENT_QUEUE_CAPACITY);
    let _listener = listener::spawn(interpreter, events_rx);
    let _sweeper = store.spawn_sweeper(SWEEP_PERIOD);

    let state = AppState::new(&config.slack, engine, events_tx);

    let app = routes::routes()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();

    if let Some(tls_config) = &config.tls {
        let rustls_config = RustlsConfig::from_pem(
            tls_config.cert_pem.as_bytes().to_vec(),
            tls_config.key_pem.expose_secret().as_bytes().to_vec(),
        )
        .await
        .expect("Failed to load TLS certificates");

        tracing::info!("esa-gatekeeper listening on https://{}", addr);

        let handle = Handle::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
        });

        axum_server::bind_rustls(addr, rustls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .expect("Server error");
    } else {
        tracing::info!("esa-gatekeeper listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind to address");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .expect("Server error");
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
