//! Attack rolls and damage application.

use serde::{Deserialize, Serialize};

use crate::dice::{DiceSpec, RollSource};
use crate::error::{MapError, Result};
use crate::item::ItemId;
use crate::map_state::MapState;
use crate::markers::{MarkerCatalog, IMPAIRED_MARKER, STUNNED_MARKER};
use crate::math::{ceil_to_int, Fixed};

use super::log::{AttackOutcome, CombatEvent, DefenseKind};
use super::structure::{roll_structure_damage, DirectHit, StructureEffect};
use super::CombatController;

/// Parameters of one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRequest {
    /// Attacking item.
    pub attacker: Option<ItemId>,
    /// Target item.
    pub target: Option<ItemId>,
    /// Flat bonus added to the d20.
    #[serde(default)]
    pub bonus: i32,
    /// Damage expression, dice or a bare number.
    pub damage: String,
    /// Defense rolled against.
    #[serde(default)]
    pub defense: DefenseKind,
    /// Halve damage, rounding up.
    #[serde(default)]
    pub resist: bool,
    /// The target may save structure damage with a custom paint job.
    #[serde(default)]
    pub custom_paint_job: bool,
}

impl AttackRequest {
    /// Attack from `attacker` on `target` for `damage`.
    #[must_use]
    pub fn new(attacker: ItemId, target: ItemId, damage: impl Into<String>) -> Self {
        Self {
            attacker: Some(attacker),
            target: Some(target),
            bonus: 0,
            damage: damage.into(),
            defense: DefenseKind::Evasion,
            resist: false,
            custom_paint_job: false,
        }
    }

    /// Builder method to set the attack bonus.
    #[must_use]
    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    /// Builder method to choose the defense.
    #[must_use]
    pub fn with_defense(mut self, defense: DefenseKind) -> Self {
        self.defense = defense;
        self
    }

    /// Builder method to halve damage.
    #[must_use]
    pub fn with_resist(mut self, resist: bool) -> Self {
        self.resist = resist;
        self
    }

    /// Builder method to allow the paint job save.
    #[must_use]
    pub fn with_custom_paint_job(mut self, custom_paint_job: bool) -> Self {
        self.custom_paint_job = custom_paint_job;
        self
    }
}

/// What an attack did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    /// Natural d20.
    pub d20: u32,
    /// d20 plus bonus.
    pub total: i32,
    /// Defense score compared against.
    pub defense_value: i32,
    /// Miss, hit or critical.
    pub outcome: AttackOutcome,
    /// Damage applied on a hit.
    pub damage: Option<DamageReport>,
}

/// What one damage application did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DamageReport {
    /// Whole damage applied to HP.
    pub applied: i32,
    /// Structure boxes consumed.
    pub structure_lost: u32,
    /// Whether the target ended destroyed.
    pub destroyed: bool,
    /// Structure table results, one per box lost.
    pub structure_effects: Vec<StructureEffect>,
}

impl CombatController {
    /// Roll an attack from the request's attacker on its target.
    ///
    /// The damage expression is validated before anything is rolled. A
    /// natural 20 is a critical and always lands; otherwise the attack lands
    /// when `d20 + bonus >= defense`.
    ///
    /// # Errors
    ///
    /// [`MapError::NoActiveTurn`] if nobody is acting,
    /// [`MapError::MissingSelection`] without both participants,
    /// [`MapError::NoSuchItem`] for stale ids and
    /// [`MapError::InvalidDice`] for a malformed damage expression.
    pub fn perform_attack(
        &mut self,
        map: &mut MapState,
        markers: &dyn MarkerCatalog,
        source: &mut dyn RollSource,
        request: &AttackRequest,
    ) -> Result<AttackReport> {
        if self.session.active.is_none() {
            return Err(self.reject_attack(
                "A Turn must be active to perform an attack.",
                MapError::NoActiveTurn,
            ));
        }
        let (Some(attacker), Some(target)) = (request.attacker, request.target) else {
            return Err(self.reject_attack(
                "Select Attacker and Target",
                MapError::MissingSelection("attacker and target"),
            ));
        };
        let attacker_name = map.require(attacker)?.display_name();
        let target_item = map.require(target)?;
        let target_name = target_item.display_name();
        let score = match request.defense {
            DefenseKind::Evasion => target_item.evasion,
            DefenseKind::EDefense => target_item.e_defense,
        };
        let defense_value = score.unwrap_or(self.default_defense);

        let damage = match DiceSpec::parse(&request.damage) {
            Ok(spec) => spec,
            Err(error) => {
                return Err(self.reject(
                    CombatEvent::InvalidDice {
                        expr: request.damage.clone(),
                    },
                    error,
                ))
            }
        };

        let d20 = source.roll_die(20);
        let total = i32::try_from(d20).unwrap_or(i32::MAX).saturating_add(request.bonus);
        let outcome = if d20 == 20 {
            AttackOutcome::Critical
        } else if total >= defense_value {
            AttackOutcome::Hit
        } else {
            AttackOutcome::Miss
        };
        self.emit(CombatEvent::AttackRolled {
            attacker: attacker_name,
            target: target_name,
            d20,
            bonus: request.bonus,
            total,
            defense: request.defense,
            defense_value,
            outcome,
        });

        let damage = if outcome.lands() {
            Some(self.apply_damage(
                map,
                markers,
                source,
                target,
                &damage,
                outcome == AttackOutcome::Critical,
                request.resist,
                request.custom_paint_job,
            )?)
        } else {
            None
        };

        Ok(AttackReport {
            d20,
            total,
            defense_value,
            outcome,
            damage,
        })
    }

    /// Roll damage and apply it to `target`, cascading through structure.
    ///
    /// A critical rolls twice and keeps the higher total. Resistance halves
    /// the total rounding up. The result is rounded up to whole HP and
    /// negative totals apply as zero. Items without HP are unaffected.
    ///
    /// While HP is at or below zero: with structure left, one box is lost,
    /// HP resets to `max_hp` minus the overflow and the structure table is
    /// rolled; the target is destroyed (HP clamped to 0) when structure runs
    /// out with HP still at or below zero.
    ///
    /// # Errors
    ///
    /// [`MapError::NoSuchItem`] for a stale target.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_damage(
        &mut self,
        map: &mut MapState,
        markers: &dyn MarkerCatalog,
        source: &mut dyn RollSource,
        target: ItemId,
        damage: &DiceSpec,
        critical: bool,
        resist: bool,
        custom_paint_job: bool,
    ) -> Result<DamageReport> {
        let name = map.require(target)?.display_name();

        let first = damage.evaluate(source);
        let mut total = if critical {
            let second = damage.evaluate(source);
            let chosen = first.total.max(second.total);
            self.emit(CombatEvent::CriticalDamageRolled {
                first,
                second,
                chosen,
            });
            chosen
        } else {
            let total = first.total;
            self.emit(CombatEvent::DamageRolled { outcome: first });
            total
        };

        if resist {
            let before = total;
            total = (total / Fixed::from_num(2)).saturating_ceil();
            self.emit(CombatEvent::Resisted {
                before,
                after: total,
            });
        }

        let applied = ceil_to_int(total).max(0);
        let mut report = DamageReport {
            applied,
            ..DamageReport::default()
        };

        let item = map.require_mut(target)?;
        let Some(hp) = item.hp else {
            self.emit(CombatEvent::NoHitPoints { name });
            return Ok(report);
        };
        let mut hp = hp.saturating_sub(applied);
        item.hp = Some(hp);
        self.emit(CombatEvent::DamageTaken {
            name: name.clone(),
            amount: applied,
            hp,
        });

        while hp <= 0 {
            self.emit(CombatEvent::HpDepleted { name: name.clone() });
            let item = map.require_mut(target)?;
            let structure = item.structure.unwrap_or(0);
            if structure <= 0 {
                item.hp = Some(0);
                report.destroyed = true;
                self.emit(CombatEvent::Destroyed { name: name.clone() });
                break;
            }

            let excess = hp.saturating_neg();
            let structure = structure - 1;
            hp = item.max_hp.unwrap_or(0).saturating_sub(excess);
            item.structure = Some(structure);
            item.hp = Some(hp);
            report.structure_lost += 1;
            self.emit(CombatEvent::StructureLost {
                name: name.clone(),
                structure,
                excess,
                hp,
            });

            let check = roll_structure_damage(source, structure, custom_paint_job);
            if let Some(roll) = check.paint_job_roll {
                self.emit(CombatEvent::PaintJobRolled {
                    name: name.clone(),
                    roll,
                });
            }
            if let Some(effect) = check.effect {
                report.structure_effects.push(effect);
                self.emit(CombatEvent::StructureDamage {
                    name: name.clone(),
                    effect,
                });
                let condition = match effect {
                    StructureEffect::GlancingBlow { .. } => Some(IMPAIRED_MARKER),
                    StructureEffect::DirectHit {
                        outcome: DirectHit::Stunned,
                        ..
                    } => Some(STUNNED_MARKER),
                    _ => None,
                };
                if let Some(marker) = condition.and_then(|keyword| markers.find_marker(keyword)) {
                    if map.require_mut(target)?.add_marker(&marker) {
                        self.emit(CombatEvent::MarkerApplied {
                            name: name.clone(),
                            marker,
                        });
                    }
                }
            }

            if structure <= 0 && hp <= 0 {
                map.require_mut(target)?.hp = Some(0);
                report.destroyed = true;
                self.emit(CombatEvent::Destroyed { name: name.clone() });
                break;
            }
        }
        Ok(report)
    }

    fn reject_attack(&mut self, reason: &str, error: MapError) -> MapError {
        self.reject(
            CombatEvent::AttackRejected {
                reason: reason.to_string(),
            },
            error,
        )
    }
}
