//! Wire shapes: attacker replies and observer events.

use serde::Serialize;

use crate::game::{AttackOutcome, GameSnapshot};

/// Reply written to a failing connection when attack handling itself
/// errors out.
pub const INTERNAL_ERROR_REPLY: &str = "500:Error_Interno";

impl AttackOutcome {
    /// HTTP-flavored status code carried in the reply.
    pub fn status_code(&self) -> u16 {
        match self {
            AttackOutcome::Sunk => 200,
            AttackOutcome::Hit => 202,
            AttackOutcome::Miss => 404,
            AttackOutcome::InvalidCoordinate => 404,
            AttackOutcome::AlreadyAttacked => 409,
            AttackOutcome::FleetNotPlaced => 400,
            AttackOutcome::FleetAlreadySunk => 404,
        }
    }

    /// Outcome tag carried after the status code.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            AttackOutcome::Sunk => "Hundido",
            AttackOutcome::Hit => "Impactado",
            AttackOutcome::Miss => "Fallido",
            AttackOutcome::InvalidCoordinate => "Coordenada_Invalida",
            AttackOutcome::AlreadyAttacked => "Atacado_Previamente",
            AttackOutcome::FleetNotPlaced => "Flota_No_Colocada",
            AttackOutcome::FleetAlreadySunk => "Flota_Ya_Hundida",
        }
    }

    /// Full `<code>:<tag>` reply line for the attacker connection.
    pub fn encode_reply(&self) -> String {
        format!("{}:{}", self.status_code(), self.wire_tag())
    }

    /// Whether this verdict changed game state (hit, miss or sunk).
    /// Only these are pushed to the observer.
    pub fn is_state_affecting(&self) -> bool {
        matches!(
            self,
            AttackOutcome::Sunk | AttackOutcome::Hit | AttackOutcome::Miss
        )
    }
}

/// Events pushed to the observer connection as one JSON object per line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObserverEvent {
    /// Full state snapshot, sent on attach (when `Active`) and on
    /// promotion from the pending slot.
    InitialState { state: GameSnapshot },
    /// One resolved attack.
    Impact {
        coordinate: String,
        outcome: &'static str,
    },
    /// Fleet-not-ready notice for an observer attaching during `Setup`.
    Error { message: String },
}

impl ObserverEvent {
    pub fn impact(coordinate: String, outcome: AttackOutcome) -> Self {
        ObserverEvent::Impact {
            coordinate,
            outcome: outcome.wire_tag(),
        }
    }

    pub fn fleet_not_ready() -> Self {
        ObserverEvent::Error {
            message: "The fleet is not ready. Complete the placement of all \
                      ships to start the game."
                .to_string(),
        }
    }
}
