//! One-off training CLI — runs a single training pass against the row store
//! and reports the outcome, without standing up the dispatcher or API.
//!
//! ```bash
//! STORE_URL=https://example.supabase.co STORE_KEY=... cargo run --bin aegis-train
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use aegis_os::gateway::HttpRowStoreGateway;
use aegis_os::model::{self, ThreeClassScorer};
use aegis_os::{config, Settings};

#[derive(Parser, Debug)]
#[command(name = "aegis-train")]
#[command(about = "Runs a single AEGIS-OS personalisation model training pass")]
struct CliArgs {
    #[arg(long, env = "STORE_URL")]
    store_url: String,

    #[arg(long, env = "STORE_KEY")]
    store_key: String,
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

    let gateway = HttpRowStoreGateway::new(&args.store_url, &args.store_key);
    let scorer = ThreeClassScorer::new();

    let outcome = model::run_training(&gateway, &config::get().model, &scorer).await?;
    info!(?outcome, "training pass finished");

    match outcome {
        model::TrainingOutcome::Trained { rows, final_epoch_loss, warm_started } => {
            println!("trained on {rows} rows, final epoch loss {final_epoch_loss:.4}, warm_started={warm_started}");
        }
        model::TrainingOutcome::NotReady { rows } => {
            println!("not enough rows to train ({rows} available)");
        }
    }

    Ok(())
}
