//! Encounter session engine
//!
//! The synchronous core: dice evaluation, initiative order and turn
//! cycling, status-effect lifecycle, the in-game calendar, and session
//! snapshot/restore. Nothing in here performs I/O, awaits, or locks; the
//! hosting layer serializes access to one session.

mod clock;
mod dice;
mod effects;
mod initiative;
mod session;
mod snapshot;

use thiserror::Error;

pub use clock::GameTime;
pub use dice::{
    parse_expr, roll, DiceError, DiceExpr, RollMode, RollResult, ALLOWED_DICE, MAX_DICE_COUNT,
};
pub use effects::{EffectLedger, StatusEffect};
pub use initiative::{Combatant, ExpiredEffect, InitiativeTracker, TurnAdvance};
pub use session::Session;
pub use snapshot::SessionSnapshot;

/// Session command errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("combatant '{0}' already exists")]
    DuplicateName(String),

    #[error("no combatant named '{0}'")]
    NotFound(String),

    #[error("invalid combatant name '{0}': letters, digits, spaces, dashes, and underscores only")]
    InvalidName(String),

    #[error("invalid snapshot shape: {0}")]
    InvalidSnapshotShape(String),
}
