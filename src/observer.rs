//! Two-slot observer hub: one active observer, one pending observer.
//!
//! Delivery goes through an unbounded sender per observer, so pushing an
//! event never blocks the engine; the socket I/O happens in a forwarder
//! task owned by the observer listener. A failed send means the observer
//! is gone and clears its slot.

use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::game::{AttackOutcome, GameSnapshot};
use crate::protocol::ObserverEvent;

pub type ObserverSender = UnboundedSender<ObserverEvent>;

/// Holds the active and pending observer slots. The pending slot is
/// promoted exactly when the fleet completes.
pub struct ObserverHub {
    active: Option<ObserverSender>,
    pending: Option<ObserverSender>,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self {
            active: None,
            pending: None,
        }
    }

    /// Register a freshly connected observer. During `Active` it takes
    /// the active slot (last observer wins) and immediately receives the
    /// snapshot; otherwise it parks in the pending slot and gets a
    /// fleet-not-ready notice.
    pub fn attach(&mut self, sender: ObserverSender, fleet_active: bool, snapshot: GameSnapshot) {
        if fleet_active {
            if sender
                .send(ObserverEvent::InitialState { state: snapshot })
                .is_ok()
            {
                self.active = Some(sender);
            }
        } else {
            let _ = sender.send(ObserverEvent::fleet_not_ready());
            self.pending = Some(sender);
        }
    }

    /// Move the pending observer into the active slot and send it the
    /// snapshot. Called once, by the fleet-complete trigger.
    pub fn promote_pending(&mut self, snapshot: GameSnapshot) {
        if let Some(sender) = self.pending.take() {
            if sender
                .send(ObserverEvent::InitialState { state: snapshot })
                .is_ok()
            {
                self.active = Some(sender);
            } else {
                warn!("pending observer dropped before promotion");
            }
        }
    }

    /// Push one resolved attack to the active observer. No-op when no
    /// observer is attached; a dead observer is detached, never an error.
    pub fn notify_impact(&mut self, coordinate: &str, outcome: AttackOutcome) {
        if let Some(sender) = &self.active {
            let event = ObserverEvent::impact(coordinate.to_string(), outcome);
            if sender.send(event).is_err() {
                debug!("active observer gone, clearing slot");
                self.active = None;
            }
        }
    }

    /// Clear the active slot after a disconnect.
    pub fn detach_active(&mut self) {
        self.active = None;
    }

    /// Remove the observer owning `handle` from whichever slot it
    /// holds. Called by the connection task when its socket goes away;
    /// a handle that was already replaced or promoted away is a no-op,
    /// so a late disconnect never evicts a newer observer.
    pub fn detach(&mut self, handle: &ObserverSender) {
        if self.active.as_ref().is_some_and(|s| s.same_channel(handle)) {
            debug!("active observer disconnected");
            self.detach_active();
        } else if self.pending.as_ref().is_some_and(|s| s.same_channel(handle)) {
            debug!("pending observer disconnected");
            self.pending = None;
        }
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }
}

impl Default for ObserverHub {
    fn default() -> Self {
        ObserverHub::new()
    }
}
