//! Session controller: owns the engine state and both listener tasks.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use log::{info, warn};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use crate::common::PlaceError;
use crate::game::{GameEngine, GameSnapshot, PlacementReceipt};
use crate::observer::ObserverHub;
use crate::server::{run_attack_listener, run_observer_listener};

/// Bound on waiting for listener tasks to exit during `stop`.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Everything mutable shared between connection tasks and the control
/// API. One mutex, held only for short CPU-only operations.
pub struct SharedState {
    pub engine: GameEngine,
    pub observers: ObserverHub,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            engine: GameEngine::new(),
            observers: ObserverHub::new(),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        SharedState::new()
    }
}

pub type Shared = Arc<Mutex<SharedState>>;

/// Lock the shared state, recovering from a poisoned mutex: the engine
/// never holds partial writes across a panic point, so the inner state
/// is safe to keep using.
pub fn lock_state(shared: &Shared) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

/// Outcome of a `start` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    Started,
    AlreadyRunning,
}

struct Listeners {
    shutdown: watch::Sender<bool>,
    attack_task: JoinHandle<()>,
    observer_task: JoinHandle<()>,
    attack_addr: std::net::SocketAddr,
    observer_addr: std::net::SocketAddr,
}

/// Bind addresses for the two transports.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub attack_bind: String,
    pub observer_bind: String,
}

/// Owns one game session: the shared engine state, the attacker
/// listener and the observer listener. `stop` tears the listeners down
/// and resets all game state atomically.
pub struct SessionController {
    cfg: SessionConfig,
    shared: Shared,
    listeners: Option<Listeners>,
}

impl SessionController {
    pub fn new(cfg: SessionConfig) -> Self {
        Self {
            cfg,
            shared: Arc::new(Mutex::new(SharedState::new())),
            listeners: None,
        }
    }

    /// Spawn both listeners. Idempotent: a second call while running
    /// reports `AlreadyRunning` instead of spawning duplicates. A bind
    /// failure surfaces to the caller and leaves nothing running.
    pub async fn start(&mut self) -> anyhow::Result<StartStatus> {
        if self.listeners.is_some() {
            info!("start requested, but the session is already running");
            return Ok(StartStatus::AlreadyRunning);
        }

        let attack_listener = TcpListener::bind(&self.cfg.attack_bind)
            .await
            .with_context(|| format!("binding attack listener on {}", self.cfg.attack_bind))?;
        let observer_listener = TcpListener::bind(&self.cfg.observer_bind)
            .await
            .with_context(|| format!("binding observer listener on {}", self.cfg.observer_bind))?;
        let attack_addr = attack_listener.local_addr()?;
        let observer_addr = observer_listener.local_addr()?;

        let (shutdown, _) = watch::channel(false);
        let attack_task = tokio::spawn(run_attack_listener(
            attack_listener,
            self.shared.clone(),
            shutdown.subscribe(),
        ));
        let observer_task = tokio::spawn(run_observer_listener(
            observer_listener,
            self.shared.clone(),
            shutdown.subscribe(),
        ));

        info!(
            "session started: attacks on {}, observer on {}",
            attack_addr, observer_addr
        );
        self.listeners = Some(Listeners {
            shutdown,
            attack_task,
            observer_task,
            attack_addr,
            observer_addr,
        });
        Ok(StartStatus::Started)
    }

    /// Signal the listeners to stop, wait for them with a bounded
    /// timeout, then reinitialize all game state. In-flight connection
    /// tasks are abandoned once their sockets close.
    pub async fn stop(&mut self) {
        if let Some(listeners) = self.listeners.take() {
            let _ = listeners.shutdown.send(true);
            for (name, task) in [
                ("attack", listeners.attack_task),
                ("observer", listeners.observer_task),
            ] {
                match timeout(STOP_TIMEOUT, task).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("{} listener task failed: {}", name, e),
                    Err(_) => warn!("{} listener did not stop within {:?}", name, STOP_TIMEOUT),
                }
            }
        }
        // Atomic reset: new board, clear history, phase back to Setup,
        // both observer slots dropped.
        let mut state = lock_state(&self.shared);
        *state = SharedState::new();
        info!("session state reset");
    }

    /// `stop` followed by `start`.
    pub async fn reset(&mut self) -> anyhow::Result<()> {
        self.stop().await;
        self.start().await?;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.listeners.is_some()
    }

    /// Actual bound address of the attack listener, when running.
    pub fn attack_addr(&self) -> Option<std::net::SocketAddr> {
        self.listeners.as_ref().map(|l| l.attack_addr)
    }

    /// Actual bound address of the observer listener, when running.
    pub fn observer_addr(&self) -> Option<std::net::SocketAddr> {
        self.listeners.as_ref().map(|l| l.observer_addr)
    }

    /// Place one ship; on fleet completion the pending observer is
    /// promoted with a fresh snapshot.
    pub fn place(
        &self,
        ship_type: &str,
        coords: &[String],
    ) -> Result<PlacementReceipt, PlaceError> {
        let mut state = lock_state(&self.shared);
        let receipt = state.engine.place(ship_type, coords)?;
        if receipt.fleet_complete {
            let snapshot = state.engine.snapshot();
            state.observers.promote_pending(snapshot);
        }
        Ok(receipt)
    }

    /// Read-only snapshot for display layers.
    pub fn snapshot(&self) -> GameSnapshot {
        lock_state(&self.shared).engine.snapshot()
    }

    /// Shared handle for tests and embedding layers.
    pub fn shared(&self) -> Shared {
        self.shared.clone()
    }
}
