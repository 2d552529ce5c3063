//! Dice rolling engine
//!
//! Parses and rolls tabletop dice notation like "2d6+3", "d20-1".
//! Only the standard die sizes (d4, d6, d8, d10, d12, d20, d100) are
//! accepted, and advantage/disadvantage applies to a single d20 only.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Die sizes accepted by the roller
pub const ALLOWED_DICE: [u32; 7] = [4, 6, 8, 10, 12, 20, 100];

/// Most dice a single expression may roll
pub const MAX_DICE_COUNT: u32 = 100;

/// `[count]d<size>[+|-modifier]`, e.g. "2d6+3", "d20", "1d100-10"
static DICE_EXPR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)d(\d+)([+-]\d+)?$").unwrap());

/// Dice evaluation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("invalid dice expression: {0}")]
    InvalidExpression(String),

    #[error("cannot roll with both advantage and disadvantage")]
    ConflictingModifiers,

    #[error("advantage/disadvantage applies only to a single d20 roll")]
    UnsupportedModifierContext,
}

/// Which selection rule was applied to a two-die d20 roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    Advantage,
    Disadvantage,
}

/// A parsed dice expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceExpr {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub size: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl std::fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.size, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.size, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.size)
        }
    }
}

/// Outcome of a roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollResult {
    /// Individual die results (for advantage/disadvantage, the one kept die)
    pub rolls: Vec<u32>,
    /// Flat modifier applied to the sum
    pub modifier: i32,
    /// Sum of rolls plus modifier
    pub total: i64,
    /// Both raw d20 outcomes, sorted ascending (advantage/disadvantage only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d20_outcomes: Option<[u32; 2]>,
    /// Selection rule applied (advantage/disadvantage only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RollMode>,
}

/// Parse a dice expression string like "2d6+3"
///
/// Whitespace is stripped and the expression is case-insensitive. A missing
/// count means one die; a missing modifier means zero. The count must be
/// within `1..=MAX_DICE_COUNT`.
pub fn parse_expr(expr: &str) -> Result<DiceExpr, DiceError> {
    let normalized = expr.replace(' ', "").to_lowercase();

    let caps = DICE_EXPR_REGEX
        .captures(&normalized)
        .ok_or_else(|| invalid(&normalized, "expected NdM[+/-X] (e.g. '2d6+3', 'd20-1')"))?;

    let count: u32 = match caps.get(1).map(|m| m.as_str()) {
        Some("") | None => 1,
        Some(s) => s
            .parse()
            .map_err(|_| invalid(&normalized, "dice count out of range"))?,
    };
    if count == 0 {
        return Err(invalid(&normalized, "dice count must be at least 1"));
    }
    if count > MAX_DICE_COUNT {
        return Err(invalid(
            &normalized,
            &format!("dice count must be at most {}", MAX_DICE_COUNT),
        ));
    }

    let size: u32 = caps[2]
        .parse()
        .map_err(|_| invalid(&normalized, "die size out of range"))?;
    if !ALLOWED_DICE.contains(&size) {
        return Err(invalid(
            &normalized,
            &format!("die size must be one of {:?}", ALLOWED_DICE),
        ));
    }

    let modifier: i32 = match caps.get(3) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| invalid(&normalized, "modifier out of range"))?,
        None => 0,
    };

    Ok(DiceExpr { count, size, modifier })
}

fn invalid(expr: &str, reason: &str) -> DiceError {
    DiceError::InvalidExpression(format!("'{}': {}", expr, reason))
}

/// Evaluate a dice expression
///
/// Advantage and disadvantage roll two d20s and keep the higher or lower
/// die respectively; both are rejected together, and either is rejected
/// for anything other than exactly `1d20`.
pub fn roll(expr: &str, advantage: bool, disadvantage: bool) -> Result<RollResult, DiceError> {
    let parsed = parse_expr(expr)?;

    if advantage && disadvantage {
        return Err(DiceError::ConflictingModifiers);
    }

    let mut rng = rand::rng();

    if advantage || disadvantage {
        if parsed.count != 1 || parsed.size != 20 {
            return Err(DiceError::UnsupportedModifierContext);
        }

        let first = rng.random_range(1..=20);
        let second = rng.random_range(1..=20);
        let (kept, mode) = if advantage {
            (first.max(second), RollMode::Advantage)
        } else {
            (first.min(second), RollMode::Disadvantage)
        };

        let mut outcomes = [first, second];
        outcomes.sort_unstable();

        return Ok(RollResult {
            rolls: vec![kept],
            modifier: parsed.modifier,
            total: kept as i64 + parsed.modifier as i64,
            d20_outcomes: Some(outcomes),
            mode: Some(mode),
        });
    }

    let mut rolls = Vec::with_capacity(parsed.count as usize);
    for _ in 0..parsed.count {
        rolls.push(rng.random_range(1..=parsed.size));
    }
    let sum: i64 = rolls.iter().map(|&r| r as i64).sum();

    Ok(RollResult {
        rolls,
        modifier: parsed.modifier,
        total: sum + parsed.modifier as i64,
        d20_outcomes: None,
        mode: None,
    })
}
