//! The machine registry: who is in the fleet and who is still alive.
//!
//! Machines are indexed twice, by id and by token. The token is the only
//! credential a machine has, so every mutating call takes a token rather
//! than an id.
//!
//! Liveness is a timestamp per machine, written only by that machine's
//! heartbeats. Heartbeats share a read lock on the index, so they never
//! wait on each other; only registration, unregistration, and the sweep
//! take the write lock.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use thorium_protocol::{MachineEntry, MachineId};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::{FleetConfig, FleetError, LoadSample};

/// A registered machine.
struct Machine {
    address: IpAddr,
    port: u16,
    token: String,
    /// Milliseconds since the registry epoch of the last sign of life.
    last_seen_ms: AtomicU64,
    load: Mutex<LoadSample>,
}

#[derive(Default)]
struct Index {
    by_id: HashMap<MachineId, Arc<Machine>>,
    by_token: HashMap<String, MachineId>,
}

/// A point-in-time view of one Active machine.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineInfo {
    pub machine_id: MachineId,
    pub address: IpAddr,
    pub port: u16,
    pub load: LoadSample,
    /// Time since the last heartbeat (or registration).
    pub last_seen: Duration,
}

impl From<MachineInfo> for MachineEntry {
    fn from(info: MachineInfo) -> Self {
        Self {
            machine_id: info.machine_id,
            address: info.address.to_string(),
            port: info.port,
            usage_cpu: info.load.cpu,
            usage_network: info.load.network,
            player_capacity: info.load.player_capacity,
            last_seen_secs: info.last_seen.as_secs(),
        }
    }
}

/// Tracks fleet machines, their load, and their liveness.
pub struct MachineRegistry {
    config: FleetConfig,
    epoch: Instant,
    next_id: AtomicU64,
    index: RwLock<Index>,
}

impl MachineRegistry {
    pub fn new(config: FleetConfig) -> Self {
        Self {
            config,
            epoch: Instant::now(),
            next_id: AtomicU64::new(1),
            index: RwLock::new(Index::default()),
        }
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Adds a machine to the fleet and issues its token.
    ///
    /// `address` must come from the connection the request arrived on,
    /// never from the request body. The machine starts Active with an
    /// empty load sample.
    ///
    /// # Errors
    /// [`FleetError::MissingPort`] if `port` is `0`. Nothing is allocated.
    pub async fn register(
        &self,
        address: IpAddr,
        port: u16,
    ) -> Result<(MachineId, String), FleetError> {
        if port == 0 {
            tracing::debug!(%address, "machine registration without a port");
            return Err(FleetError::MissingPort);
        }

        let machine_id = MachineId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let token = generate_token();
        let machine = Arc::new(Machine {
            address,
            port,
            token: token.clone(),
            last_seen_ms: AtomicU64::new(self.now_ms()),
            load: Mutex::new(LoadSample::default()),
        });

        let mut index = self.index.write().await;
        index.by_token.insert(token.clone(), machine_id);
        index.by_id.insert(machine_id, machine);
        drop(index);

        tracing::info!(%machine_id, %address, port, "machine registered");
        Ok((machine_id, token))
    }

    /// Records a heartbeat: replaces the load sample and refreshes liveness.
    ///
    /// # Errors
    /// [`FleetError::InvalidToken`] if the token is unknown. Nothing changes.
    pub async fn heartbeat(&self, token: &str, load: LoadSample) -> Result<MachineId, FleetError> {
        let index = self.index.read().await;
        let machine_id = *index.by_token.get(token).ok_or(FleetError::InvalidToken)?;
        let machine = index.by_id.get(&machine_id).ok_or(FleetError::InvalidToken)?;

        *machine.load.lock().await = load;
        machine.last_seen_ms.fetch_max(self.now_ms(), Ordering::AcqRel);

        tracing::trace!(%machine_id, cpu = load.cpu, capacity = load.player_capacity, "heartbeat");
        Ok(machine_id)
    }

    /// Removes the machine owning `token` from the fleet.
    ///
    /// # Errors
    /// [`FleetError::InvalidToken`] if the token is unknown.
    pub async fn unregister(&self, token: &str) -> Result<MachineId, FleetError> {
        let mut index = self.index.write().await;
        let machine_id = index.by_token.remove(token).ok_or(FleetError::InvalidToken)?;
        index.by_id.remove(&machine_id);
        drop(index);

        tracing::info!(%machine_id, "machine unregistered");
        Ok(machine_id)
    }

    /// Returns the machine a token was issued to, live or not.
    ///
    /// # Errors
    /// [`FleetError::InvalidToken`] if the token is unknown.
    pub async fn authenticate(&self, token: &str) -> Result<MachineId, FleetError> {
        self.index
            .read()
            .await
            .by_token
            .get(token)
            .copied()
            .ok_or(FleetError::InvalidToken)
    }

    /// Returns `true` if the machine is registered and inside the window.
    pub async fn is_active(&self, machine_id: MachineId) -> bool {
        self.active_address(machine_id).await.is_some()
    }

    /// The address of an Active machine, or `None` if it is unknown or
    /// has gone quiet for longer than the liveness window.
    pub async fn active_address(&self, machine_id: MachineId) -> Option<IpAddr> {
        let now = self.now_ms();
        let index = self.index.read().await;
        index
            .by_id
            .get(&machine_id)
            .filter(|machine| self.is_live(machine, now))
            .map(|machine| machine.address)
    }

    /// Removes every machine outside the liveness window.
    ///
    /// Returns the removed ids in ascending order.
    pub async fn expire_stale(&self) -> Vec<MachineId> {
        let now = self.now_ms();
        let mut index = self.index.write().await;

        let mut expired: Vec<MachineId> = index
            .by_id
            .iter()
            .filter(|(_, machine)| !self.is_live(machine, now))
            .map(|(id, _)| *id)
            .collect();
        expired.sort_unstable();

        for machine_id in &expired {
            if let Some(machine) = index.by_id.remove(machine_id) {
                index.by_token.remove(&machine.token);
            }
            tracing::warn!(%machine_id, "machine missed its heartbeats, removed from fleet");
        }
        expired
    }

    /// Snapshots every Active machine, ordered by id.
    pub async fn list(&self) -> Vec<MachineInfo> {
        let now = self.now_ms();
        let index = self.index.read().await;

        let mut infos = Vec::with_capacity(index.by_id.len());
        for (machine_id, machine) in &index.by_id {
            if !self.is_live(machine, now) {
                continue;
            }
            let load = *machine.load.lock().await;
            let age = now.saturating_sub(machine.last_seen_ms.load(Ordering::Acquire));
            infos.push(MachineInfo {
                machine_id: *machine_id,
                address: machine.address,
                port: machine.port,
                load,
                last_seen: Duration::from_millis(age),
            });
        }
        infos.sort_unstable_by_key(|info| info.machine_id);
        infos
    }

    /// Number of registered machines, including any awaiting the sweep.
    pub async fn len(&self) -> usize {
        self.index.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn is_live(&self, machine: &Machine, now_ms: u64) -> bool {
        let window = u64::try_from(self.config.liveness_window().as_millis()).unwrap_or(u64::MAX);
        now_ms.saturating_sub(machine.last_seen_ms.load(Ordering::Acquire)) <= window
    }
}

impl Default for MachineRegistry {
    fn default() -> Self {
        Self::new(FleetConfig::default())
    }
}

/// Generates a random 64-character hex machine token (256 bits).
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
