//! Session state aggregation
//!
//! One live encounter: the initiative tracker plus the in-game clock,
//! with snapshot export/import. Import validates the blob's structure in
//! one pass; any violation resets the whole session to a fresh default
//! rather than leaving partially-applied state behind.

use tracing::warn;

use super::clock::GameTime;
use super::initiative::InitiativeTracker;
use super::snapshot::SessionSnapshot;
use super::SessionError;

/// The single live session an engine instance manages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub initiative: InitiativeTracker,
    pub clock: GameTime,
}

impl Session {
    /// Create a fresh session: no combatants, round 0, default calendar
    pub fn new() -> Self {
        Self::default()
    }

    /// Export the full session state by value
    pub fn export(&self) -> SessionSnapshot {
        SessionSnapshot {
            initiative_order: self.initiative.combatants().to_vec(),
            current_turn_idx: self.initiative.turn_index(),
            combat_round: self.initiative.round(),
            game_time: self.clock.clone(),
        }
    }

    /// Import session state from an untrusted JSON blob
    ///
    /// Structural validation happens once, here: `initiative_order` must be
    /// a sequence of combatant records, `current_turn_idx` and
    /// `combat_round` integers, `game_time` a mapping with all four fields.
    /// On any violation the session resets to the fresh default and the
    /// call reports `InvalidSnapshotShape`; on success the turn pointer is
    /// re-clamped for the restored order.
    pub fn import(&mut self, value: serde_json::Value) -> Result<(), SessionError> {
        match serde_json::from_value::<SessionSnapshot>(value) {
            Ok(snapshot) => {
                self.restore(snapshot);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "snapshot import failed, resetting session");
                self.reset();
                Err(SessionError::InvalidSnapshotShape(err.to_string()))
            }
        }
    }

    /// Restore from an already-validated snapshot
    ///
    /// Re-clamps the turn pointer, clamps every combatant's HP so the
    /// 0..=max_hp invariant holds even for hand-edited blobs, and drops
    /// repeated combatant names keeping the first occurrence.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        let mut order = snapshot.initiative_order;
        let mut seen = std::collections::HashSet::new();
        order.retain(|c| seen.insert(c.name.clone()));
        for combatant in &mut order {
            combatant.max_hp = combatant.max_hp.max(0);
            combatant.current_hp = combatant.current_hp.clamp(0, combatant.max_hp);
        }
        self.initiative =
            InitiativeTracker::from_parts(order, snapshot.current_turn_idx, snapshot.combat_round);
        self.clock = snapshot.game_time;
    }

    /// Discard everything and return to the fresh default state
    pub fn reset(&mut self) {
        *self = Session::new();
    }
}
