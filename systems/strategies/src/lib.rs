#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ready-made strategies for both sides of a Lane Defence game.

use lane_defence_core::{
    DefenderAction, InvaderAction, LanePosition, SpawnRequest, TowerKind, TowerStat, LANE_LENGTH,
};
use lane_defence_system_turn::{DefenderStrategy, InvaderStrategy};
use lane_defence_world::{query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const TURRET_LINE_START: usize = 10;

/// Defender that lines the lane with point towers, one per affordable turn,
/// starting at position 10 and wrapping around. After a full lap of build
/// attempts it walks the lane again upgrading power instead.
#[derive(Clone, Debug)]
pub struct TurretLine {
    cursor: usize,
    built: usize,
}

impl TurretLine {
    /// Creates a turret line that has not built anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cursor: TURRET_LINE_START,
            built: 0,
        }
    }

    fn advance(&mut self) -> LanePosition {
        let position = LanePosition::from_index(self.cursor);
        self.cursor = (self.cursor + 1) % LANE_LENGTH;
        position
    }
}

impl Default for TurretLine {
    fn default() -> Self {
        Self::new()
    }
}

impl DefenderStrategy for TurretLine {
    fn decide(&mut self, world: &World) -> Option<DefenderAction> {
        let rules = query::rules(world);
        let gold = query::defender_gold(world);

        if self.built < LANE_LENGTH {
            if gold < rules.build_cost {
                return None;
            }
            let position = self.advance();
            self.built += 1;
            if self.built == LANE_LENGTH {
                self.cursor = 0;
            }
            return Some(DefenderAction::Build {
                kind: TowerKind::Point,
                position,
            });
        }

        if gold < rules.upgrade_cost {
            return None;
        }
        Some(DefenderAction::Upgrade {
            position: self.advance(),
            stat: TowerStat::Power,
        })
    }
}

/// Invader that spends on randomly composed invaders whenever the spawn
/// position is free. Seeded, so a given seed always plays the same game.
#[derive(Clone, Debug)]
pub struct Raider {
    rng: ChaCha8Rng,
}

impl Raider {
    /// Creates a raider driven by the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl InvaderStrategy for Raider {
    fn decide(&mut self, world: &World) -> Option<InvaderAction> {
        if query::invader_at(world, LanePosition::SPAWN).is_some() {
            return None;
        }

        let rules = query::rules(world);
        let gold = query::invader_gold(world);
        let mut budget = gold.checked_sub(rules.base_cost)?;
        let mut request = SpawnRequest::BASE;

        for _ in 0..query::invader_boost_max(world) {
            let (stat, price) = match self.rng.gen_range(0..3) {
                0 => (&mut request.hp, rules.hp_cost),
                1 => (&mut request.defense, rules.defense_cost),
                _ => (&mut request.stun_resistance, rules.stun_resistance_cost),
            };
            if price > budget {
                continue;
            }
            budget -= price;
            *stat += 1;
        }

        Some(InvaderAction::Spawn(request))
    }
}

/// Invader that saves up to raise the boost cap to `boost_target`, then
/// spawns invaders carrying as much extra health as it can afford.
#[derive(Clone, Copy, Debug)]
pub struct Saver {
    boost_target: u64,
}

impl Saver {
    /// Creates a saver aiming for the provided boost cap.
    #[must_use]
    pub const fn new(boost_target: u64) -> Self {
        Self { boost_target }
    }
}

impl InvaderStrategy for Saver {
    fn decide(&mut self, world: &World) -> Option<InvaderAction> {
        let rules = query::rules(world);
        let gold = query::invader_gold(world);
        let boost_max = query::invader_boost_max(world);

        if boost_max < self.boost_target {
            return (gold >= rules.boost_upgrade_cost).then_some(InvaderAction::Boost);
        }

        if query::invader_at(world, LanePosition::SPAWN).is_some() {
            return None;
        }
        let budget = gold.checked_sub(rules.base_cost)?;
        let affordable = budget.checked_div(rules.hp_cost).unwrap_or(boost_max);
        let hp = u32::try_from(affordable.min(boost_max)).unwrap_or(u32::MAX);
        Some(InvaderAction::Spawn(SpawnRequest::new(hp, 0, 0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turret_line_starts_at_position_ten() {
        let mut strategy = TurretLine::new();
        let world = World::new();

        assert_eq!(
            strategy.decide(&world),
            Some(DefenderAction::Build {
                kind: TowerKind::Point,
                position: LanePosition::new(10),
            })
        );
        assert_eq!(strategy.cursor, 11);
    }

    #[test]
    fn turret_line_switches_to_upgrades_after_a_full_lap() {
        let mut strategy = TurretLine {
            cursor: 9,
            built: LANE_LENGTH - 1,
        };
        let world = World::new();

        assert_eq!(
            strategy.decide(&world),
            Some(DefenderAction::Build {
                kind: TowerKind::Point,
                position: LanePosition::new(9),
            })
        );
        assert_eq!(
            strategy.decide(&world),
            Some(DefenderAction::Upgrade {
                position: LanePosition::new(0),
                stat: TowerStat::Power,
            })
        );
    }
}
