//! AEGIS-OS — Well-being Alerting and Recommendation Engine.
//!
//! Runs the posture and emotion dispatchers, the chronic monitor, a one-shot
//! (and optionally periodic) training pass, and the admin HTTP API as a
//! single supervised process.
//!
//! ```bash
//! STORE_URL=https://example.supabase.co STORE_KEY=... cargo run --bin aegis
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use aegis_os::chronic::{self, ChronicMonitor};
use aegis_os::cooldown::CooldownTable;
use aegis_os::dispatcher::{self, DispatcherContext};
use aegis_os::gateway::HttpRowStoreGateway;
use aegis_os::model::ThreeClassScorer;
use aegis_os::transport::{LoggingTransport, SubscriberStore};
use aegis_os::{api, config, Settings};

#[derive(Parser, Debug)]
#[command(name = "aegis")]
#[command(about = "AEGIS-OS well-being alerting and recommendation engine")]
struct CliArgs {
    /// Row store base URL (e.g. a Supabase project URL).
    #[arg(long, env = "STORE_URL")]
    store_url: String,

    /// Row store API key.
    #[arg(long, env = "STORE_KEY")]
    store_key: String,

    /// Path to the persisted subscriber list.
    #[arg(long, env = "SUBSCRIBERS_PATH", default_value = "./data/subscribers.json")]
    subscribers_path: String,

    /// Admin API bind address.
    #[arg(long, env = "AEGIS_BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: String,
}

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    PostureDispatcher,
    EmotionDispatcher,
    ChronicMonitor,
    Training,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpServer => write!(f, "HttpServer"),
            Self::PostureDispatcher => write!(f, "PostureDispatcher"),
            Self::EmotionDispatcher => write!(f, "EmotionDispatcher"),
            Self::ChronicMonitor => write!(f, "ChronicMonitor"),
            Self::Training => write!(f, "Training"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    config::init(Settings::load());

    info!("starting AEGIS-OS well-being engine");

    let gateway: Arc<dyn aegis_os::RowStoreGateway> = Arc::new(HttpRowStoreGateway::new(&args.store_url, &args.store_key));
    let scorer = Arc::new(ThreeClassScorer::new());
    let cooldown = Arc::new(CooldownTable::new());
    let transport = Arc::new(LoggingTransport);
    let subscribers = Arc::new(SubscriberStore::load(&args.subscribers_path).context("failed to load subscriber list")?);
    let chronic_monitor = Arc::new(ChronicMonitor::new());

    let dispatcher_ctx = Arc::new(DispatcherContext {
        gateway: gateway.clone(),
        scorer: scorer.clone(),
        cooldown: cooldown.clone(),
        transport: transport.clone(),
        subscribers: subscribers.clone(),
    });

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
        shutdown.cancel();
    });

    let mut tasks: JoinSet<(TaskName, Result<()>)> = JoinSet::new();

    {
        let ctx = dispatcher_ctx.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            dispatcher::run_posture_loop(ctx, cancel).await;
            (TaskName::PostureDispatcher, Ok(()))
        });
    }
    {
        let ctx = dispatcher_ctx.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            dispatcher::run_emotion_loop(ctx, cancel).await;
            (TaskName::EmotionDispatcher, Ok(()))
        });
    }
    {
        let monitor = chronic_monitor.clone();
        let gateway = gateway.clone();
        let transport = transport.clone();
        let subscribers = subscribers.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            chronic::run_chronic_loop(monitor, gateway, transport, subscribers, cancel).await;
            (TaskName::ChronicMonitor, Ok(()))
        });
    }
    {
        let gateway = gateway.clone();
        let scorer = scorer.clone();
        tasks.spawn(async move {
            let settings = &config::get().model;
            match aegis_os::model::run_training(gateway.as_ref(), settings, &scorer).await {
                Ok(outcome) => info!(?outcome, "startup training pass complete"),
                Err(e) => warn!(error = %e, "startup training pass failed, serving via Cold fallback"),
            }
            (TaskName::Training, Ok(()))
        });
    }
    {
        let app = api::create_app(dispatcher_ctx.clone());
        let bind_addr = args.bind_addr.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
                Ok(l) => l,
                Err(e) => return (TaskName::HttpServer, Err(anyhow::anyhow!("failed to bind {bind_addr}: {e}"))),
            };
            info!(addr = %bind_addr, "admin API listening");
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { cancel.cancelled().await })
                .await;
            (TaskName::HttpServer, result.map_err(anyhow::Error::from))
        });
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("supervisor: shutdown in progress, waiting for tasks to finish");
                let grace = std::time::Duration::from_secs(config::get().dispatcher.shutdown_grace_secs);
                let _ = tokio::time::timeout(grace, async {
                    while tasks.join_next().await.is_some() {}
                }).await;
                break;
            }
            result = tasks.join_next() => {
                match result {
                    Some(Ok((name, Ok(())))) => info!(%name, "task completed"),
                    Some(Ok((name, Err(e)))) => {
                        error!(%name, error = %e, "task failed, shutting down");
                        cancel.cancel();
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "task panicked, shutting down");
                        cancel.cancel();
                    }
                    None => {
                        info!("all tasks exited");
                        break;
                    }
                }
            }
        }
    }

    info!("AEGIS-OS shutdown complete");
    Ok(())
}
