//! Dice notation parsing and evaluation.
//!
//! Grammar (case-insensitive, whitespace ignored):
//!
//! ```text
//! expr     := [count] "d" sides [("+" | "-") modifier]
//! count    := digits            (default 1, at most 1000)
//! sides    := digits            (at least 1)
//! modifier := digits ["." digits]
//! ```
//!
//! A bare number such as `"3"` or `"2.5"` is a fixed value: it evaluates to
//! itself with no rolls. Randomness always comes from a [`RollSource`], so the
//! same source yields the same outcome.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{MapError, Result};
use crate::math::Fixed;

/// Largest accepted dice count.
pub const MAX_DICE: u32 = 1000;

/// A parsed `NdS±M` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceExpr {
    /// Number of dice rolled.
    pub count: u32,
    /// Faces per die.
    pub sides: u32,
    /// Flat amount added to the sum.
    pub modifier: Fixed,
}

impl DiceExpr {
    /// Create an expression.
    #[must_use]
    pub const fn new(count: u32, sides: u32, modifier: Fixed) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Parse dice notation. Returns `None` when the text does not match the grammar.
    #[must_use]
    pub fn parse(expr: &str) -> Option<Self> {
        let text = normalize(expr);
        let (count_text, rest) = text.split_once('d')?;

        let count = if count_text.is_empty() {
            1
        } else {
            parse_digits(count_text)?
        };

        let sign_at = rest.find(['+', '-']);
        let (sides_text, modifier) = match sign_at {
            Some(at) => {
                let (sides_text, signed) = rest.split_at(at);
                let magnitude = parse_decimal(&signed[1..])?;
                let modifier = if signed.starts_with('-') {
                    -magnitude
                } else {
                    magnitude
                };
                (sides_text, modifier)
            }
            None => (rest, Fixed::ZERO),
        };
        let sides = parse_digits(sides_text)?;

        if sides == 0 || count > MAX_DICE {
            return None;
        }
        Some(Self::new(count, sides, modifier))
    }

    /// Roll every die once and add the modifier.
    pub fn evaluate<S: RollSource + ?Sized>(&self, source: &mut S) -> RollOutcome {
        let rolls: Vec<u32> = (0..self.count).map(|_| source.roll_die(self.sides)).collect();
        let total = rolls.iter().fold(self.modifier, |acc, &roll| {
            acc.saturating_add(Fixed::saturating_from_num(roll))
        });
        RollOutcome {
            rolls,
            modifier: self.modifier,
            total,
            fixed: false,
        }
    }

    /// Highest total this expression can produce.
    #[must_use]
    pub fn max_total(&self) -> Fixed {
        let top = u64::from(self.count) * u64::from(self.sides);
        Fixed::saturating_from_num(top).saturating_add(self.modifier)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier > Fixed::ZERO {
            write!(f, "+{}", self.modifier)?;
        } else if self.modifier < Fixed::ZERO {
            write!(f, "{}", self.modifier)?;
        }
        Ok(())
    }
}

/// Either a dice expression or a fixed number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceSpec {
    /// Random roll.
    Roll(DiceExpr),
    /// Non-random value.
    Fixed(Fixed),
}

impl DiceSpec {
    /// Parse a damage or roll expression.
    ///
    /// A bare number wins over dice notation.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidDice`] if the text is neither a number nor dice notation.
    pub fn parse(expr: &str) -> Result<Self> {
        let text = normalize(expr);
        if let Ok(value) = text.parse::<Fixed>() {
            return Ok(Self::Fixed(value));
        }
        DiceExpr::parse(&text)
            .map(Self::Roll)
            .ok_or_else(|| MapError::InvalidDice(expr.trim().to_string()))
    }

    /// Evaluate once. Fixed values consume no rolls.
    pub fn evaluate<S: RollSource + ?Sized>(&self, source: &mut S) -> RollOutcome {
        match self {
            Self::Roll(dice) => dice.evaluate(source),
            Self::Fixed(value) => RollOutcome::fixed(*value),
        }
    }

    /// Whether evaluation is random.
    #[must_use]
    pub const fn is_random(&self) -> bool {
        matches!(self, Self::Roll(_))
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    /// Individual die results, in roll order. Empty for fixed values.
    pub rolls: Vec<u32>,
    /// Modifier added to the sum.
    pub modifier: Fixed,
    /// Sum of rolls plus modifier.
    pub total: Fixed,
    /// Whether this came from a bare number.
    pub fixed: bool,
}

impl RollOutcome {
    /// Outcome of a fixed value.
    #[must_use]
    pub fn fixed(value: Fixed) -> Self {
        Self {
            rolls: Vec::new(),
            modifier: Fixed::ZERO,
            total: value,
            fixed: true,
        }
    }

    /// Rolls formatted as `[4, 5]`.
    #[must_use]
    pub fn rolls_label(&self) -> String {
        let parts: Vec<String> = self.rolls.iter().map(ToString::to_string).collect();
        format!("[{}]", parts.join(", "))
    }

    /// Modifier formatted as `+3`, `-1.5`, or empty when zero.
    #[must_use]
    pub fn modifier_label(&self) -> String {
        if self.modifier > Fixed::ZERO {
            format!("+{}", self.modifier)
        } else if self.modifier < Fixed::ZERO {
            self.modifier.to_string()
        } else {
            String::new()
        }
    }
}

/// Source of die results.
pub trait RollSource {
    /// Roll one die with `sides` faces, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;
}

/// Roll source backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngRolls<R> {
    rng: R,
}

impl<R: Rng> RngRolls<R> {
    /// Wrap a generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngRolls<StdRng> {
    /// Reproducible source from a seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> RollSource for RngRolls<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.random_range(1..=sides.max(1))
    }
}

/// Roll source replaying a fixed sequence.
///
/// Values are clamped into `1..=sides`. Once the script runs out every die
/// shows 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedRolls {
    values: VecDeque<u32>,
}

impl ScriptedRolls {
    /// Source that yields `values` in order.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Queue more values.
    pub fn push(&mut self, value: u32) {
        self.values.push_back(value);
    }

    /// Values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RollSource for ScriptedRolls {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.values.pop_front().unwrap_or(1).clamp(1, sides.max(1))
    }
}

fn normalize(expr: &str) -> String {
    expr.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_decimal(text: &str) -> Option<Fixed> {
    let (whole, frac) = match text.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (text, None),
    };
    let digits_only = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(whole) || frac.is_some_and(|f| !digits_only(f)) {
        return None;
    }
    text.parse().ok()
}
