//! Session snapshot format
//!
//! The full exportable state of one session, and the only shape the
//! persistence collaborator ever sees. Anything `export` produces feeds
//! back through `import`/`restore` to an equivalent state.

use serde::{Deserialize, Serialize};

use super::clock::GameTime;
use super::initiative::Combatant;

/// Complete serializable session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub initiative_order: Vec<Combatant>,
    pub current_turn_idx: usize,
    pub combat_round: u32,
    pub game_time: GameTime,
}
