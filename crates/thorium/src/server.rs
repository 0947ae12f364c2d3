//! `ThoriumServer` builder and server loop.
//!
//! This is the entry point for running a master. It ties together the
//! identity store, the registries, the HTTP router, and the liveness
//! sweeper.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thorium_fleet::FleetConfig;
use thorium_game::GameConfig;
use thorium_session::IdentityStore;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;

use crate::{Master, ThoriumError, routes};

/// Builder for configuring and starting a Thorium master.
///
/// # Example
///
/// ```rust,ignore
/// use thorium::prelude::*;
///
/// let server = ThoriumServerBuilder::new()
///     .bind("0.0.0.0:6960")
///     .build(MemoryStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct ThoriumServerBuilder {
    bind_addr: String,
    fleet_config: FleetConfig,
    game_config: GameConfig,
}

impl ThoriumServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:6960".to_string(),
            fleet_config: FleetConfig::default(),
            game_config: GameConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets heartbeat and liveness settings.
    pub fn fleet_config(mut self, config: FleetConfig) -> Self {
        self.fleet_config = config;
        self
    }

    /// Sets what happens to games whose host is lost.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Binds the listener and assembles the master over `store`.
    ///
    /// # Errors
    /// [`ThoriumError::Io`] if the address can't be bound.
    pub async fn build<S: IdentityStore>(self, store: S) -> Result<ThoriumServer<S>, ThoriumError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let master = Arc::new(Master::new(
            Arc::new(store),
            self.fleet_config,
            self.game_config,
        ));
        Ok(ThoriumServer { listener, master })
    }
}

impl Default for ThoriumServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, not yet running Thorium master.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// serving requests.
pub struct ThoriumServer<S: IdentityStore> {
    listener: TcpListener,
    master: Arc<Master<S>>,
}

impl<S: IdentityStore> ThoriumServer<S> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The registries this server serves.
    pub fn master(&self) -> &Arc<Master<S>> {
        &self.master
    }

    /// Serves requests until the process is terminated.
    pub async fn run(self) -> Result<(), ThoriumError> {
        self.run_until(std::future::pending()).await
    }

    /// Serves requests until `shutdown` resolves, then drains in-flight
    /// requests and stops the sweeper.
    pub async fn run_until(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ThoriumError> {
        let addr = self.listener.local_addr()?;
        let sweeper = tokio::spawn(sweep_loop(Arc::clone(&self.master)));
        let app = routes::router(self.master);

        tracing::info!(%addr, "Thorium master running");
        let served = axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await;

        sweeper.abort();
        tracing::info!("Thorium master stopped");
        served.map_err(ThoriumError::from)
    }
}

/// Periodically expires machines that stopped sending heartbeats.
async fn sweep_loop<S: IdentityStore>(master: Arc<Master<S>>) {
    let period = master
        .fleet()
        .config()
        .sweep_interval
        .max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let expired = master.sweep().await;
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "liveness sweep removed machines");
        }
    }
}
