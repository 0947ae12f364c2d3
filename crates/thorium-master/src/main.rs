//! Runs a Thorium master with an in-memory identity store.

use std::time::Duration;

use clap::Parser;
use thorium::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "thorium-master")]
#[command(about = "Master service for sessions, characters, the machine fleet, and games")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "THORIUM_LISTEN", default_value = "0.0.0.0:6960")]
    listen: String,

    /// Seconds between the heartbeats machines are expected to send.
    #[arg(long, env = "THORIUM_HEARTBEAT_INTERVAL_SECS", default_value_t = 10)]
    heartbeat_interval_secs: u64,

    /// Heartbeats a machine may miss before it is dropped from the fleet.
    #[arg(long, env = "THORIUM_MISSED_HEARTBEATS", default_value_t = 3)]
    missed_heartbeats: u32,

    /// Seconds between liveness sweeps.
    #[arg(long, env = "THORIUM_SWEEP_INTERVAL_SECS", default_value_t = 5)]
    sweep_interval_secs: u64,

    /// What lost machines do to their games: mark-unavailable or keep-stale.
    #[arg(long, env = "THORIUM_MACHINE_LOSS_POLICY", default_value_t = MachineLossPolicy::MarkUnavailable)]
    machine_loss_policy: MachineLossPolicy,
}

impl Args {
    fn fleet_config(&self) -> FleetConfig {
        FleetConfig {
            heartbeat_interval: Duration::from_secs(self.heartbeat_interval_secs),
            missed_heartbeats: self.missed_heartbeats,
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
        }
    }

    fn game_config(&self) -> GameConfig {
        GameConfig {
            loss_policy: self.machine_loss_policy,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let fleet_config = args.fleet_config();
    tracing::info!(
        listen = %args.listen,
        liveness_window = ?fleet_config.liveness_window(),
        loss_policy = %args.machine_loss_policy,
        "starting thorium master"
    );

    let server = ThoriumServerBuilder::new()
        .bind(&args.listen)
        .fleet_config(fleet_config)
        .game_config(args.game_config())
        .build(MemoryStore::new())
        .await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown requested");
        })
        .await?;
    Ok(())
}
