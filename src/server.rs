//! TCP transports: attacker listener and observer listener.
//!
//! The attacker side is one-shot: read a single coordinate token, answer
//! `"<code>:<tag>"`, close. The observer side is a persistent connection
//! fed JSON lines from the observer hub; inbound bytes are read only as
//! a liveness signal.

use anyhow::Context;
use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};

use crate::game::{AttackOutcome, Phase};
use crate::protocol::{ObserverEvent, INTERNAL_ERROR_REPLY};
use crate::session::{lock_state, Shared};

/// Bound on waiting for an attacker's payload.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Accept attacker connections until shutdown. Each connection gets its
/// own task; one client's failure never touches the listener or other
/// connections in flight. Connection tasks live in a `JoinSet` so that
/// shutdown closes every in-flight socket before the listener exits,
/// and no stale connection can reach the state a reset rebuilds.
pub async fn run_attack_listener(
    listener: TcpListener,
    shared: Shared,
    shutdown: watch::Receiver<bool>,
) {
    let mut connections = JoinSet::new();
    let mut accept_shutdown = shutdown.clone();
    loop {
        tokio::select! {
            _ = accept_shutdown.changed() => {
                debug!("attack listener shutting down");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    debug!("attacker connected from {}", addr);
                    let shared = shared.clone();
                    let conn_shutdown = shutdown.clone();
                    connections.spawn(async move {
                        let mut stream = stream;
                        if let Err(e) = handle_attacker(&mut stream, &shared, conn_shutdown).await {
                            warn!("attacker connection {} failed: {:#}", addr, e);
                            // Best-effort internal-error reply; the peer
                            // may already be gone.
                            let _ = stream.write_all(INTERNAL_ERROR_REPLY.as_bytes()).await;
                        }
                    });
                }
                Err(e) => warn!("attack listener accept error: {}", e),
            }
        }
        // Reap finished connection tasks so the set stays small.
        while connections.try_join_next().is_some() {}
    }
    // Abort whatever is still in flight, which drops and closes the
    // remaining sockets before the session resets its state.
    connections.shutdown().await;
}

/// One attack per connection: read the coordinate token, resolve it
/// under the engine lock, push the verdict to the observer, reply. The
/// payload read races the shutdown signal; once the payload is in, the
/// attack always completes and responds.
async fn handle_attacker(
    stream: &mut TcpStream,
    shared: &Shared,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let mut buf = [0u8; 64];
    let n = tokio::select! {
        _ = shutdown.changed() => {
            debug!("closing attacker connection on shutdown");
            return Ok(());
        }
        read = timeout(READ_TIMEOUT, stream.read(&mut buf)) => read
            .context("timed out waiting for attack payload")?
            .context("reading attack payload")?,
    };
    if n == 0 {
        // Connection closed without sending anything: no response.
        return Ok(());
    }
    let token = String::from_utf8_lossy(&buf[..n]).trim().to_string();
    if token.is_empty() {
        return Ok(());
    }

    let outcome = resolve_attack(shared, &token);
    let reply = outcome.encode_reply();
    stream
        .write_all(reply.as_bytes())
        .await
        .context("writing attack reply")?;
    info!("attack {} -> {}", token, reply);
    Ok(())
}

/// Resolve an attack token against the shared engine. The observer push
/// is an unbounded-channel send, so it never delays the reply; delivery
/// failure only clears the dead slot.
fn resolve_attack(shared: &Shared, token: &str) -> AttackOutcome {
    let mut state = lock_state(shared);
    let outcome = state.engine.attack(token);
    if outcome.is_state_affecting() {
        state.observers.notify_impact(token.trim(), outcome);
        debug!("board after attack:\n{}", state.engine.snapshot());
    }
    outcome
}

/// Accept observer connections until shutdown. Each connection registers
/// with the hub (active slot when the fleet is ready, pending otherwise)
/// and gets a forwarder task writing events as JSON lines.
pub async fn run_observer_listener(
    listener: TcpListener,
    shared: Shared,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("observer listener shutting down");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!("observer connected from {}", addr);
                    let (tx, rx) = mpsc::unbounded_channel();
                    // Weak handle: identifies this observer's slot on
                    // disconnect without holding the channel open.
                    let handle = tx.downgrade();
                    {
                        let mut state = lock_state(&shared);
                        let fleet_active = state.engine.phase() == Phase::Active;
                        let snapshot = state.engine.snapshot();
                        state.observers.attach(tx, fleet_active, snapshot);
                    }
                    let shared = shared.clone();
                    tokio::spawn(async move {
                        if let Err(e) = forward_observer(stream, rx).await {
                            debug!("observer {} dropped: {:#}", addr, e);
                        }
                        // An upgrade succeeds only while the hub still
                        // holds this observer's sender.
                        if let Some(sender) = handle.upgrade() {
                            lock_state(&shared).observers.detach(&sender);
                        }
                    });
                }
                Err(e) => warn!("observer listener accept error: {}", e),
            }
        }
    }
}

/// Pump hub events out as JSON lines while draining inbound bytes as a
/// liveness signal. Exits when the hub drops the channel (reset or
/// replacement) or the peer goes away.
async fn forward_observer(
    stream: TcpStream,
    mut events: mpsc::UnboundedReceiver<ObserverEvent>,
) -> anyhow::Result<()> {
    let (mut reader, mut writer) = stream.into_split();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    let mut line = serde_json::to_vec(&event)
                        .context("encoding observer event")?;
                    line.push(b'\n');
                    writer
                        .write_all(&line)
                        .await
                        .context("writing observer event")?;
                }
                None => return Ok(()),
            },
            closed = peer_closed(&mut reader) => {
                if closed {
                    return Err(anyhow::anyhow!("observer closed the connection"));
                }
            }
        }
    }
}

/// Read and discard inbound traffic. Returns `true` once the peer
/// half-closes or errors out.
async fn peer_closed(reader: &mut OwnedReadHalf) -> bool {
    let mut scratch = [0u8; 256];
    match reader.read(&mut scratch).await {
        Ok(0) | Err(_) => true,
        Ok(_) => false,
    }
}
