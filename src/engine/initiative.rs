//! Initiative tracking
//!
//! Maintains one encounter's combatant sequence: a list kept sorted by
//! initiative (descending, stable on ties), the current-turn pointer, and
//! the round counter. Round wraps drive status-effect decay for every
//! combatant.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::effects::{EffectLedger, StatusEffect};
use super::SessionError;

/// Letters, digits, spaces, dashes, and underscores
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 _-]+$").unwrap());

/// A participant in the encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Unique name within the session
    pub name: String,
    /// Initiative score; higher acts first
    pub initiative: i32,
    /// Maximum hit points, never negative
    pub max_hp: i32,
    /// Current hit points, always within 0..=max_hp
    pub current_hp: i32,
    /// Active status effects in application order
    #[serde(default)]
    pub status_effects: EffectLedger,
    /// Informational only
    #[serde(default)]
    pub npc: bool,
    /// Informational only
    #[serde(default)]
    pub player_controlled: bool,
}

impl Combatant {
    /// Create a combatant at full health
    pub fn new(name: impl Into<String>, initiative: i32, max_hp: i32) -> Self {
        let max_hp = max_hp.max(0);
        Self {
            name: name.into(),
            initiative,
            max_hp,
            current_hp: max_hp,
            status_effects: EffectLedger::new(),
            npc: false,
            player_controlled: false,
        }
    }

    /// Set current HP at construction, clamped into range
    pub fn with_current_hp(mut self, hp: i32) -> Self {
        self.current_hp = hp.clamp(0, self.max_hp);
        self
    }

    /// Whether the combatant is at zero hit points
    pub fn is_down(&self) -> bool {
        self.current_hp == 0
    }

    /// Deal damage; negative amounts are treated as zero
    ///
    /// Returns the new current HP.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        self.current_hp = self.current_hp.saturating_sub(amount).clamp(0, self.max_hp);
        self.current_hp
    }

    /// Heal; negative amounts are treated as zero, cannot exceed max HP
    ///
    /// Returns the new current HP.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        self.current_hp = self.current_hp.saturating_add(amount).clamp(0, self.max_hp);
        self.current_hp
    }

    /// Set current HP directly, optionally raising max HP to match first
    pub fn set_hp(&mut self, hp: i32, set_max_too: bool) -> i32 {
        if set_max_too {
            self.max_hp = hp.max(0);
        }
        self.current_hp = hp.clamp(0, self.max_hp);
        self.current_hp
    }

    /// Set max HP, optionally re-clamping current HP under the new cap
    pub fn set_max_hp(&mut self, max_hp: i32, adjust_current: bool) -> i32 {
        self.max_hp = max_hp.max(0);
        if adjust_current {
            self.current_hp = self.current_hp.clamp(0, self.max_hp);
        }
        self.current_hp
    }
}

/// An effect dropped by the round-boundary decay pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiredEffect {
    pub combatant: String,
    pub effect: String,
}

/// Outcome of advancing the turn pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnAdvance {
    /// Name of the new current combatant
    pub combatant: String,
    /// Whether the pointer wrapped and a new round began
    pub new_round: bool,
    /// Round number after the advance
    pub round: u32,
    /// Effects that expired during the wrap, if any
    pub expired_effects: Vec<ExpiredEffect>,
}

/// One session's combatant sequence and turn state machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitiativeTracker {
    order: Vec<Combatant>,
    current_turn_idx: usize,
    combat_round: u32,
}

impl InitiativeTracker {
    /// Create an empty tracker (round 0, no combatants)
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tracker from snapshot parts, re-clamping the turn pointer
    pub(crate) fn from_parts(order: Vec<Combatant>, current_turn_idx: usize, combat_round: u32) -> Self {
        let mut tracker = Self { order, current_turn_idx, combat_round };
        tracker.clamp_turn_idx();
        tracker
    }

    /// Combatants in initiative order
    pub fn combatants(&self) -> &[Combatant] {
        &self.order
    }

    /// Index of the combatant whose turn it is
    pub fn turn_index(&self) -> usize {
        self.current_turn_idx
    }

    /// Current combat round; 0 until the first combatant is added
    pub fn round(&self) -> u32 {
        self.combat_round
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add a combatant and re-sort the order
    ///
    /// The full sequence is re-sorted descending by initiative; the sort is
    /// stable, so ties keep insertion-relative order. The first combatant
    /// added to an empty tracker starts round 1.
    pub fn add(&mut self, combatant: Combatant) -> Result<(), SessionError> {
        let name = combatant.name.trim();
        if name.is_empty() || !NAME_REGEX.is_match(&combatant.name) {
            return Err(SessionError::InvalidName(combatant.name.clone()));
        }
        if self.order.iter().any(|c| c.name == combatant.name) {
            return Err(SessionError::DuplicateName(combatant.name.clone()));
        }

        debug!(name = %combatant.name, initiative = combatant.initiative, "adding combatant");
        self.order.push(combatant);
        self.order.sort_by(|a, b| b.initiative.cmp(&a.initiative));

        if self.order.len() == 1 {
            self.current_turn_idx = 0;
            self.combat_round = 1;
        }
        Ok(())
    }

    /// Remove a combatant by name, returning it
    ///
    /// Adjusts the turn pointer so it keeps pointing at the same combatant
    /// where possible, wraps to 0 if it would run past the end, and resets
    /// the round to 0 when the sequence empties.
    pub fn remove(&mut self, name: &str) -> Result<Combatant, SessionError> {
        let pos = self
            .index_of(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;
        let removed = self.order.remove(pos);
        debug!(name = %removed.name, "removed combatant");

        if self.order.is_empty() {
            self.current_turn_idx = 0;
            self.combat_round = 0;
            return Ok(removed);
        }

        if pos < self.current_turn_idx {
            self.current_turn_idx -= 1;
        } else if pos == self.current_turn_idx && self.current_turn_idx >= self.order.len() {
            self.current_turn_idx = 0;
        }
        self.clamp_turn_idx();

        Ok(removed)
    }

    /// Advance to the next combatant's turn
    ///
    /// Returns `None` when there are no combatants. When the pointer wraps
    /// from the last combatant back to the first, the round counter
    /// increments and every combatant's effects go through one decay pass.
    pub fn advance_turn(&mut self) -> Option<TurnAdvance> {
        if self.order.is_empty() {
            return None;
        }

        self.current_turn_idx += 1;
        let mut new_round = false;
        let mut expired_effects = Vec::new();

        if self.current_turn_idx >= self.order.len() {
            self.current_turn_idx = 0;
            self.combat_round += 1;
            new_round = true;

            for combatant in &mut self.order {
                for effect in combatant.status_effects.decay_round() {
                    expired_effects.push(ExpiredEffect {
                        combatant: combatant.name.clone(),
                        effect: effect.name,
                    });
                }
            }
            debug!(round = self.combat_round, expired = expired_effects.len(), "round wrapped");
        }

        Some(TurnAdvance {
            combatant: self.order[self.current_turn_idx].name.clone(),
            new_round,
            round: self.combat_round,
            expired_effects,
        })
    }

    /// The combatant whose turn it is
    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.order.get(self.current_turn_idx)
    }

    /// Look up a combatant by name
    pub fn combatant(&self, name: &str) -> Option<&Combatant> {
        self.order.iter().find(|c| c.name == name)
    }

    /// Deal damage to a named combatant, clamped to 0..=max_hp
    pub fn deal_damage(&mut self, name: &str, amount: i32) -> Result<&Combatant, SessionError> {
        let pos = self
            .index_of(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;
        self.order[pos].apply_damage(amount);
        Ok(&self.order[pos])
    }

    /// Heal a named combatant, clamped to 0..=max_hp
    pub fn heal(&mut self, name: &str, amount: i32) -> Result<&Combatant, SessionError> {
        let pos = self
            .index_of(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;
        self.order[pos].heal(amount);
        Ok(&self.order[pos])
    }

    /// Set a named combatant's current HP, optionally its max too
    pub fn set_hp(&mut self, name: &str, hp: i32, set_max_too: bool) -> Result<&Combatant, SessionError> {
        let pos = self
            .index_of(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;
        self.order[pos].set_hp(hp, set_max_too);
        Ok(&self.order[pos])
    }

    /// Set a named combatant's max HP, optionally re-clamping current HP
    pub fn set_max_hp(&mut self, name: &str, max_hp: i32, adjust_current: bool) -> Result<&Combatant, SessionError> {
        let pos = self
            .index_of(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;
        self.order[pos].set_max_hp(max_hp, adjust_current);
        Ok(&self.order[pos])
    }

    /// Apply a status effect to a named combatant
    ///
    /// Stamps the effect with the current round. Returns whether the effect
    /// was added; re-applying an existing effect name is a no-op success.
    pub fn apply_effect(
        &mut self,
        name: &str,
        effect_name: &str,
        duration_rounds: Option<u32>,
        notes: &str,
    ) -> Result<bool, SessionError> {
        let round = self.combat_round;
        let pos = self
            .index_of(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;
        let effect = StatusEffect::new(effect_name, duration_rounds, notes, round);
        Ok(self.order[pos].status_effects.apply(effect))
    }

    /// Remove a status effect from a named combatant
    ///
    /// Returns whether an effect was actually removed.
    pub fn clear_effect(&mut self, name: &str, effect_name: &str) -> Result<bool, SessionError> {
        let pos = self
            .index_of(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;
        Ok(self.order[pos].status_effects.clear(effect_name))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|c| c.name == name)
    }

    fn clamp_turn_idx(&mut self) {
        if self.current_turn_idx >= self.order.len() {
            self.current_turn_idx = 0;
        }
    }
}
