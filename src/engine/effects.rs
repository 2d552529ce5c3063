//! Status effect bookkeeping
//!
//! Named, optionally time-limited conditions attached to a combatant.
//! Finite durations count down once per completed combat round; indefinite
//! effects stay until explicitly cleared.

use serde::{Deserialize, Serialize};

/// A status effect instance on a combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Effect name, unique per combatant
    pub name: String,
    /// Remaining rounds; `None` means indefinite
    pub duration_rounds: Option<u32>,
    /// Free-form notes for display
    #[serde(default)]
    pub notes: String,
    /// Combat round at which the effect was applied
    pub applied_round: u32,
}

impl StatusEffect {
    /// Create a new status effect
    pub fn new(
        name: impl Into<String>,
        duration_rounds: Option<u32>,
        notes: impl Into<String>,
        applied_round: u32,
    ) -> Self {
        Self {
            name: name.into(),
            duration_rounds,
            notes: notes.into(),
            applied_round,
        }
    }

    /// Whether this effect lasts until explicitly removed
    pub fn is_indefinite(&self) -> bool {
        self.duration_rounds.is_none()
    }
}

/// Effects on a single combatant, in application order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectLedger {
    effects: Vec<StatusEffect>,
}

impl EffectLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect
    ///
    /// Re-applying an effect name that is already present is a no-op; the
    /// existing duration is NOT refreshed. Returns whether the effect was
    /// actually added.
    pub fn apply(&mut self, effect: StatusEffect) -> bool {
        if self.has(&effect.name) {
            return false;
        }
        self.effects.push(effect);
        true
    }

    /// Remove an effect by name, returning whether one was removed
    pub fn clear(&mut self, name: &str) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.name != name);
        self.effects.len() < before
    }

    /// Check whether an effect with this name is present
    pub fn has(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.name == name)
    }

    /// Get an effect by name
    pub fn get(&self, name: &str) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.name == name)
    }

    /// Iterate effects in application order
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Round-boundary decay pass
    ///
    /// Decrements every finite duration by one and drops effects that reach
    /// zero, returning the dropped effects. Indefinite effects are untouched.
    /// This is the only mutation path for durations; the initiative tracker
    /// invokes it exactly once per round wrap.
    pub fn decay_round(&mut self) -> Vec<StatusEffect> {
        let mut expired = Vec::new();
        self.effects.retain_mut(|effect| match effect.duration_rounds {
            Some(remaining) if remaining <= 1 => {
                expired.push(effect.clone());
                false
            }
            Some(remaining) => {
                effect.duration_rounds = Some(remaining - 1);
                true
            }
            None => true,
        });
        expired
    }
}
