//! Structure damage table, rolled once per structure box lost.
//!
//! | d6 | result |
//! |---|---|
//! | 5-6 | Glancing blow: impaired |
//! | 2-4 | System trauma: d6, 1-3 weapon destroyed, 4-6 system destroyed |
//! | 1 | Direct hit: 3+ structure stunned, 2 hull check, 1 or less destroyed |
//!
//! A custom paint job is checked first: a 6 on its d6 cancels the table.

use serde::{Deserialize, Serialize};

use crate::dice::RollSource;

/// Which component system trauma destroys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraumaLoss {
    /// A weapon.
    Weapon,
    /// A system.
    System,
}

/// Direct hit result by remaining structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectHit {
    /// 3+ structure left.
    Stunned,
    /// Exactly 2 left; the table leaves the check to the players.
    HullCheck,
    /// 1 or less left.
    Destroyed,
}

/// One table result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureEffect {
    /// 5-6.
    GlancingBlow {
        /// Table d6.
        roll: u32,
    },
    /// 2-4.
    SystemTrauma {
        /// Table d6.
        roll: u32,
        /// Secondary d6.
        trauma_roll: u32,
        /// What was lost.
        loss: TraumaLoss,
    },
    /// 1.
    DirectHit {
        /// Table d6.
        roll: u32,
        /// Structure remaining when the table was rolled.
        structure_left: i32,
        /// Result.
        outcome: DirectHit,
    },
}

/// Result of one structure damage check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureCheck {
    /// Custom paint job d6, if the target has one.
    pub paint_job_roll: Option<u32>,
    /// Table result, or `None` when the paint job saved.
    pub effect: Option<StructureEffect>,
}

impl StructureCheck {
    /// Whether a paint job cancelled the table.
    #[must_use]
    pub fn saved(&self) -> bool {
        self.effect.is_none()
    }
}

/// Roll the structure damage table.
///
/// `structure_left` is the target's structure after the box was removed.
pub fn roll_structure_damage<S: RollSource + ?Sized>(
    source: &mut S,
    structure_left: i32,
    custom_paint_job: bool,
) -> StructureCheck {
    let paint_job_roll = custom_paint_job.then(|| source.roll_die(6));
    if paint_job_roll == Some(6) {
        return StructureCheck {
            paint_job_roll,
            effect: None,
        };
    }

    let roll = source.roll_die(6);
    let effect = match roll {
        5.. => StructureEffect::GlancingBlow { roll },
        2..=4 => {
            let trauma_roll = source.roll_die(6);
            let loss = if trauma_roll <= 3 {
                TraumaLoss::Weapon
            } else {
                TraumaLoss::System
            };
            StructureEffect::SystemTrauma {
                roll,
                trauma_roll,
                loss,
            }
        }
        _ => {
            let outcome = match structure_left {
                3.. => DirectHit::Stunned,
                2 => DirectHit::HullCheck,
                _ => DirectHit::Destroyed,
            };
            StructureEffect::DirectHit {
                roll,
                structure_left,
                outcome,
            }
        }
    };
    StructureCheck {
        paint_job_roll,
        effect: Some(effect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedRolls;

    #[test]
    fn test_glancing_blow() {
        let check = roll_structure_damage(&mut ScriptedRolls::new([5]), 3, false);
        assert_eq!(check.paint_job_roll, None);
        assert_eq!(check.effect, Some(StructureEffect::GlancingBlow { roll: 5 }));
    }

    #[test]
    fn test_system_trauma_rolls_secondary() {
        let mut rolls = ScriptedRolls::new([3, 2]);
        let check = roll_structure_damage(&mut rolls, 3, false);
        assert_eq!(
            check.effect,
            Some(StructureEffect::SystemTrauma {
                roll: 3,
                trauma_roll: 2,
                loss: TraumaLoss::Weapon
            })
        );

        let check = roll_structure_damage(&mut ScriptedRolls::new([4, 4]), 3, false);
        assert!(matches!(
            check.effect,
            Some(StructureEffect::SystemTrauma { loss: TraumaLoss::System, .. })
        ));
    }

    #[test]
    fn test_direct_hit_by_structure_left() {
        let outcome = |left| match roll_structure_damage(&mut ScriptedRolls::new([1]), left, false).effect {
            Some(StructureEffect::DirectHit { outcome, .. }) => Some(outcome),
            _ => None,
        };
        assert_eq!(outcome(4), Some(DirectHit::Stunned));
        assert_eq!(outcome(3), Some(DirectHit::Stunned));
        assert_eq!(outcome(2), Some(DirectHit::HullCheck));
        assert_eq!(outcome(1), Some(DirectHit::Destroyed));
        assert_eq!(outcome(0), Some(DirectHit::Destroyed));
    }

    #[test]
    fn test_paint_job_save() {
        let mut rolls = ScriptedRolls::new([6, 1]);
        let check = roll_structure_damage(&mut rolls, 3, true);
        assert!(check.saved());
        assert_eq!(check.paint_job_roll, Some(6));
        assert_eq!(rolls.remaining(), 1);
    }

    #[test]
    fn test_paint_job_failure_rolls_table() {
        let check = roll_structure_damage(&mut ScriptedRolls::new([2, 6]), 3, true);
        assert_eq!(check.paint_job_roll, Some(2));
        assert_eq!(check.effect, Some(StructureEffect::GlancingBlow { roll: 6 }));
    }
}
