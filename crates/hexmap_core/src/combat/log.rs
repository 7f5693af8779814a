//! Narrated combat events.
//!
//! Every combat operation records what happened as a [`CombatEvent`]. The
//! `Display` impl renders the line shown in the combat terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dice::RollOutcome;
use crate::item::Faction;
use crate::math::Fixed;

use super::structure::{DirectHit, StructureEffect, TraumaLoss};

/// Which defense an attack is rolled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseKind {
    /// Physical attacks.
    #[default]
    Evasion,
    /// Electronic attacks.
    EDefense,
}

impl DefenseKind {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Evasion => "Evasion",
            Self::EDefense => "E-Defense",
        }
    }
}

/// Outcome of an attack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackOutcome {
    /// Total below defense.
    Miss,
    /// Total met defense.
    Hit,
    /// Natural 20.
    Critical,
}

impl AttackOutcome {
    /// Whether damage is applied.
    #[must_use]
    pub const fn lands(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// Action economy spend that can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// One half-action unit.
    Quick,
    /// Two half-action units.
    Full,
}

impl ActionKind {
    /// Units this action costs.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Quick => 1,
            Self::Full => 2,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Quick => "Quick Action",
            Self::Full => "Full Action",
        }
    }
}

/// One narrated line of the combat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    /// A combatant began acting.
    TurnStarted {
        /// Display name.
        name: String,
    },
    /// A combatant finished acting.
    TurnEnded {
        /// Display name.
        name: String,
    },
    /// A new round began.
    RoundStarted {
        /// Round number.
        round: u32,
    },
    /// Initiative pick.
    FirstFaction {
        /// Faction chosen, or `None` if nobody can act.
        faction: Option<Faction>,
    },
    /// Movement deducted after a drag.
    Moved {
        /// Display name.
        name: String,
        /// Hexes moved.
        spaces: u32,
        /// Movement left.
        remaining: u32,
    },
    /// A drag asked for more movement than remained.
    MoveRejected {
        /// Hexes requested.
        needed: u32,
        /// Movement left.
        available: u32,
    },
    /// Manual movement change.
    MovementAdjusted {
        /// True when movement was gained.
        gained: bool,
        /// Movement left.
        remaining: u32,
    },
    /// A quick or full action was spent.
    ActionUsed {
        /// Which action.
        kind: ActionKind,
        /// Units left.
        remaining: u32,
    },
    /// Not enough units for an action.
    ActionRejected {
        /// Which action.
        kind: ActionKind,
    },
    /// A free action was recorded.
    FreeActionUsed {
        /// Free actions this turn.
        taken: u32,
    },
    /// Overcharge granted an extra unit.
    Overcharged,
    /// Dice roll from the roller.
    Rolled {
        /// Expression as typed.
        expr: String,
        /// Result.
        outcome: RollOutcome,
    },
    /// An expression failed to parse.
    InvalidDice {
        /// Expression as typed.
        expr: String,
    },
    /// An attack could not be made.
    AttackRejected {
        /// Why.
        reason: String,
    },
    /// Attack roll against a defense.
    AttackRolled {
        /// Attacker name.
        attacker: String,
        /// Target name.
        target: String,
        /// Natural d20.
        d20: u32,
        /// Flat bonus.
        bonus: i32,
        /// d20 plus bonus.
        total: i32,
        /// Defense rolled against.
        defense: DefenseKind,
        /// Defense score.
        defense_value: i32,
        /// Miss, hit or critical.
        outcome: AttackOutcome,
    },
    /// Single damage roll.
    DamageRolled {
        /// Roll.
        outcome: RollOutcome,
    },
    /// Both critical damage rolls and the total kept.
    CriticalDamageRolled {
        /// First roll.
        first: RollOutcome,
        /// Second roll.
        second: RollOutcome,
        /// Higher total.
        chosen: Fixed,
    },
    /// Damage halved by resistance.
    Resisted {
        /// Before halving.
        before: Fixed,
        /// After halving, rounded up.
        after: Fixed,
    },
    /// Damage subtracted from HP.
    DamageTaken {
        /// Target name.
        name: String,
        /// Damage applied.
        amount: i32,
        /// HP afterwards.
        hp: i32,
    },
    /// Target has no HP to reduce.
    NoHitPoints {
        /// Target name.
        name: String,
    },
    /// HP reached zero.
    HpDepleted {
        /// Target name.
        name: String,
    },
    /// A structure box was consumed.
    StructureLost {
        /// Target name.
        name: String,
        /// Structure left.
        structure: i32,
        /// Overflow carried into the new HP pool.
        excess: i32,
        /// New HP.
        hp: i32,
    },
    /// Custom paint job save.
    PaintJobRolled {
        /// Target name.
        name: String,
        /// d6 result.
        roll: u32,
    },
    /// Structure damage table result.
    StructureDamage {
        /// Target name.
        name: String,
        /// Table result.
        effect: StructureEffect,
    },
    /// A condition marker was attached.
    MarkerApplied {
        /// Target name.
        name: String,
        /// Marker reference.
        marker: String,
    },
    /// Target destroyed.
    Destroyed {
        /// Target name.
        name: String,
    },
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnStarted { name } => write!(f, "=== {name}'s Turn Begins ==="),
            Self::TurnEnded { name } => write!(f, "=== {name}'s Turn Ends ==="),
            Self::RoundStarted { round } => write!(f, "=== ROUND {round} BEGINS ==="),
            Self::FirstFaction { faction: Some(faction) } => {
                write!(f, "=== {} GOES FIRST ===", faction.label().to_uppercase())
            }
            Self::FirstFaction { faction: None } => write!(f, "> No combatants found."),
            Self::Moved {
                name,
                spaces,
                remaining,
            } => write!(f, "> {name} moved {spaces} spaces. ({remaining} left)"),
            Self::MoveRejected { needed, available } => write!(
                f,
                "> Movement failed: Need {needed} spaces, but only {available} left!"
            ),
            Self::MovementAdjusted {
                gained: true,
                remaining,
            } => write!(f, "> Gained 1 movement. ({remaining} left)"),
            Self::MovementAdjusted {
                gained: false,
                remaining,
            } => write!(f, "> Used 1 movement. ({remaining} left)"),
            Self::ActionUsed { kind, remaining } => {
                write!(f, "> Used a {}. ({remaining} acts left)", kind.label())
            }
            Self::ActionRejected { kind } => {
                write!(f, "> Not enough actions for a {}!", kind.label())
            }
            Self::FreeActionUsed { taken } => {
                write!(f, "> A free action was used. ({taken} total taken)")
            }
            Self::Overcharged => write!(f, "> OVERCHARGE! Gained 1 Quick Action."),
            Self::Rolled { expr, outcome } if outcome.fixed => {
                write!(f, "> Fixed Value {expr}: = {}", outcome.total)
            }
            Self::Rolled { expr, outcome } => write!(
                f,
                "> Rolled {expr}: {}{} = {}",
                outcome.rolls_label(),
                outcome.modifier_label(),
                outcome.total
            ),
            Self::InvalidDice { expr } => write!(f, "> Invalid dice format: {expr}"),
            Self::AttackRejected { reason } => write!(f, "> Attack Error: {reason}"),
            Self::AttackRolled {
                attacker,
                target,
                d20,
                bonus,
                total,
                defense,
                defense_value,
                outcome,
            } => {
                let defense = defense.label();
                match outcome {
                    AttackOutcome::Critical => {
                        writeln!(f, "### {attacker} violently attacks {target} ###")?;
                        write!(
                            f,
                            "> Attack: [CRIT 20] + {bonus} = {total} vs {defense} {defense_value}"
                        )
                    }
                    AttackOutcome::Hit | AttackOutcome::Miss => {
                        let verdict = if *outcome == AttackOutcome::Hit {
                            "HIT"
                        } else {
                            "MISS"
                        };
                        writeln!(f, "### {attacker} attacks {target} ###")?;
                        write!(
                            f,
                            "> Attack: {d20} + {bonus} = {total} vs {defense} {defense_value} ({verdict})"
                        )
                    }
                }
            }
            Self::DamageRolled { outcome } => write!(
                f,
                "> Initial Damage Roll: {} = {}",
                outcome.rolls_label(),
                outcome.total
            ),
            Self::CriticalDamageRolled {
                first,
                second,
                chosen,
            } => {
                writeln!(
                    f,
                    "> Crit Damage Roll 1: {} = {}",
                    first.rolls_label(),
                    first.total
                )?;
                writeln!(
                    f,
                    "> Crit Damage Roll 2: {} = {}",
                    second.rolls_label(),
                    second.total
                )?;
                write!(f, "> Choice (Highest Total): {chosen}")
            }
            Self::Resisted { before, after } => {
                write!(f, "> Resisted! ({before} / 2) -> {after} dmg")
            }
            Self::DamageTaken { name, amount, hp } => {
                write!(f, "> {name} takes {amount} dmg. HP: {hp}")
            }
            Self::NoHitPoints { name } => write!(f, "> {name} has no HP stats to reduce."),
            Self::HpDepleted { name } => write!(f, "> {name} HP DEPLETED!"),
            Self::StructureLost {
                name,
                structure,
                excess,
                hp,
            } => write!(
                f,
                "> {name} loses 1 Structure. Struct: {structure}. HP Reset with OVERFLOW -{excess} dmg. New HP: {hp}"
            ),
            Self::PaintJobRolled { name, roll } if *roll == 6 => write!(
                f,
                "> Custom Paint Job Roll = {roll}\n> {name}'s Custom Paint Job saved them! No continued structure damage effects."
            ),
            Self::PaintJobRolled { roll, .. } => write!(
                f,
                "> Custom Paint Job Roll = {roll}\n> Custom Paint Job failed. Taking structure damage."
            ),
            Self::StructureDamage { name, effect } => fmt_structure(f, name, effect),
            Self::MarkerApplied { name, marker } => {
                write!(f, "> {name} is marked with {}.", crate::item::file_label(marker))
            }
            Self::Destroyed { name } => write!(f, "> {name} HAS BEEN DESTROYED!"),
        }
    }
}

fn fmt_structure(f: &mut fmt::Formatter<'_>, name: &str, effect: &StructureEffect) -> fmt::Result {
    match effect {
        StructureEffect::GlancingBlow { roll } => write!(
            f,
            "> Structure Roll: {roll} (GLANCING BLOW)\n> {name} is IMPAIRED."
        ),
        StructureEffect::SystemTrauma {
            roll,
            trauma_roll,
            loss,
        } => {
            let lost = match loss {
                TraumaLoss::Weapon => "WEAPON",
                TraumaLoss::System => "SYSTEM",
            };
            write!(
                f,
                "> Structure Roll: {roll} (SYSTEM TRAUMA)\n> System Trauma Roll: {trauma_roll}. A {lost} is destroyed!"
            )
        }
        StructureEffect::DirectHit {
            roll,
            structure_left,
            outcome,
        } => {
            writeln!(f, "> Structure Roll: {roll} (DIRECT HIT!)")?;
            match outcome {
                DirectHit::Stunned => write!(
                    f,
                    "> DIRECT HIT! {structure_left} structure left! You're stunned!"
                ),
                DirectHit::HullCheck => write!(
                    f,
                    "> DIRECT HIT! 2 structure left! Roll a HULL check!\nSuccess: Stunned. Failure: Destroyed."
                ),
                DirectHit::Destroyed => {
                    write!(f, "> DIRECT HIT! 1 or less structure left! DESTROYED!")
                }
            }
        }
    }
}
