#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defence.
//!
//! The world owns the lane, every invader and tower on it, and the economy
//! counters of a single game. It changes only through [`apply`] or the
//! validated entry points that `apply` dispatches to; adapters and strategies
//! observe it through the [`query`] module.

mod economy;
mod invader;
mod lane;
mod towers;

use lane_defence_core::{
    BoostError, BuildError, Command, DestroyError, Event, InvaderSnapshot, LanePosition, Rules,
    SpawnError, SpawnRequest, TowerKind, TowerSnapshot, TowerStat, UpgradeError, LANE_LENGTH,
};

use crate::{economy::Economy, invader::Invader, lane::Lane, towers::Tower};

/// Represents the authoritative Lane Defence world state.
#[derive(Clone, Debug)]
pub struct World {
    rules: Rules,
    invaders: Lane<Invader>,
    towers: Lane<Tower>,
    economy: Economy,
    kills: Vec<usize>,
}

impl World {
    /// Creates a new world governed by the default rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Creates a new world governed by the provided rules.
    #[must_use]
    pub fn with_rules(rules: Rules) -> Self {
        Self {
            economy: Economy::new(&rules),
            invaders: Lane::new(),
            towers: Lane::new(),
            kills: Vec::new(),
            rules,
        }
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.resolve_attacks(out_events);
        self.advance_invaders(out_events);

        if let Some(amount) = self.economy.charge_hoarding(&self.rules) {
            out_events.push(Event::HoardingPenaltyApplied {
                amount,
                turns_since_last_spawn: self.economy.turns_since_last_spawn,
            });
        }

        self.economy.advance_turn(&self.rules, out_events);
        log::trace!(
            "turn {} resolved: invader gold {}, defender gold {}, life {}",
            self.economy.turn,
            self.economy.invader_gold,
            self.economy.defender_gold,
            self.economy.defender_life
        );
    }

    /// Lets every tower act, far end first, crediting the bounty per kill.
    fn resolve_attacks(&mut self, out_events: &mut Vec<Event>) {
        for index in (0..LANE_LENGTH).rev() {
            let Some(tower) = self.towers.get_mut(index) else {
                continue;
            };

            tower.take_turn(&mut self.invaders, &self.rules, &mut self.kills, out_events);

            for position in self.kills.drain(..) {
                self.economy.defender_gold =
                    self.economy.defender_gold.saturating_add(self.rules.bounty);
                out_events.push(Event::InvaderKilled {
                    position: LanePosition::from_index(position),
                    bounty: self.rules.bounty,
                });
            }
        }
    }

    /// Moves every unstunned invader one step unless another invader blocks it.
    fn advance_invaders(&mut self, out_events: &mut Vec<Event>) {
        for index in (0..LANE_LENGTH).rev() {
            let blocked = self.invaders.is_occupied(index + 1);
            match self.invaders.get_mut(index) {
                None => continue,
                Some(invader) if invader.is_stunned() => {
                    invader.stun_time -= 1;
                    continue;
                }
                Some(_) if blocked => continue,
                Some(_) => {}
            }

            let Some(mut invader) = self.invaders.clear(index) else {
                continue;
            };

            if index == LANE_LENGTH - 1 {
                self.economy.defender_life = self.economy.defender_life.saturating_sub(1);
                log::info!(
                    "invader breached the lane on turn {}, defender life {}",
                    self.economy.turn,
                    self.economy.defender_life
                );
                out_events.push(Event::DefenderBreached {
                    remaining_life: self.economy.defender_life,
                });
                continue;
            }

            invader.position = index + 1;
            self.invaders.set(invader.position, invader);
            out_events.push(Event::InvaderAdvanced {
                from: LanePosition::from_index(index),
                to: LanePosition::from_index(index + 1),
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected mutations leave the world untouched and are reported through the
/// matching `*Rejected` event.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.tick(out_events),
        Command::SpawnInvader { request } => match spawn_invader(world, request) {
            Ok(invader) => out_events.push(Event::InvaderSpawned {
                invader,
                cost: spawn_cost(&world.rules, request),
            }),
            Err(reason) => {
                log::debug!("spawn {request:?} rejected: {reason}");
                out_events.push(Event::SpawnRejected { request, reason });
            }
        },
        Command::UpgradeInvaderBoost => match upgrade_invader_boost(world) {
            Ok(boost_max) => out_events.push(Event::InvaderBoostUpgraded { boost_max }),
            Err(reason) => {
                log::debug!("boost upgrade rejected: {reason}");
                out_events.push(Event::BoostUpgradeRejected { reason });
            }
        },
        Command::BuildTower { kind, position } => match build_tower(world, kind, position) {
            Ok(tower) => out_events.push(Event::TowerBuilt { tower }),
            Err(reason) => {
                log::debug!("{kind} tower at {position} rejected: {reason}");
                out_events.push(Event::BuildRejected {
                    kind,
                    position,
                    reason,
                });
            }
        },
        Command::UpgradeTower { position, stat } => match upgrade_tower(world, position, stat) {
            Ok(tower) => out_events.push(Event::TowerUpgraded { tower, stat }),
            Err(reason) => {
                log::debug!("{stat} upgrade at {position} rejected: {reason}");
                out_events.push(Event::UpgradeRejected {
                    position,
                    stat,
                    reason,
                });
            }
        },
        Command::DestroyTower { position } => match destroy_tower(world, position) {
            Ok((tower, refund)) => out_events.push(Event::TowerDestroyed { tower, refund }),
            Err(reason) => {
                log::debug!("destroying tower at {position} rejected: {reason}");
                out_events.push(Event::DestroyRejected { position, reason });
            }
        },
    }
}

/// Places a new invader on the spawn position and charges its price.
pub fn spawn_invader(
    world: &mut World,
    request: SpawnRequest,
) -> Result<InvaderSnapshot, SpawnError> {
    let spawn = LanePosition::SPAWN.get() as usize;
    if world.invaders.is_occupied(spawn) {
        return Err(SpawnError::SpawnOccupied);
    }

    let requested = request.total_boost();
    let cap = world.economy.invader_boost_max;
    if requested > cap {
        return Err(SpawnError::BoostCapExceeded { requested, cap });
    }

    let cost = spawn_cost(&world.rules, request);
    let available = world.economy.invader_gold;
    if available < cost {
        return Err(SpawnError::InsufficientGold { cost, available });
    }

    let hp = world.economy.spawn_health(&world.rules, request.hp);
    let invader = Invader::spawn(hp, request.defense, request.stun_resistance);
    let snapshot = invader.snapshot();
    world.invaders.set(spawn, invader);
    world.economy.invader_gold = available - cost;
    world.economy.turns_since_last_spawn = 0;
    Ok(snapshot)
}

/// Raises the invader boost cap, returning the new cap.
pub fn upgrade_invader_boost(world: &mut World) -> Result<u64, BoostError> {
    let cost = world.rules.boost_upgrade_cost;
    let available = world.economy.invader_gold;
    if available < cost {
        return Err(BoostError::InsufficientGold { cost, available });
    }

    world.economy.invader_gold = available - cost;
    world.economy.invader_boost_max = world
        .economy
        .invader_boost_max
        .saturating_add(world.rules.boost_upgrade_increment);
    Ok(world.economy.invader_boost_max)
}

/// Constructs a tower on an empty position and charges its price.
pub fn build_tower(
    world: &mut World,
    kind: TowerKind,
    position: LanePosition,
) -> Result<TowerSnapshot, BuildError> {
    let Some(index) = position.index() else {
        return Err(BuildError::OutOfBounds);
    };
    if world.towers.is_occupied(index) {
        return Err(BuildError::Occupied);
    }

    let cost = world.rules.build_cost;
    let available = world.economy.defender_gold;
    if available < cost {
        return Err(BuildError::InsufficientGold { cost, available });
    }

    let tower = Tower::new(kind, index, world.rules.build_time);
    let snapshot = tower.snapshot();
    world.towers.set(index, tower);
    world.economy.defender_gold = available - cost;
    Ok(snapshot)
}

/// Raises one statistic of an existing tower and charges the upgrade price.
pub fn upgrade_tower(
    world: &mut World,
    position: LanePosition,
    stat: TowerStat,
) -> Result<TowerSnapshot, UpgradeError> {
    let cost = world.rules.upgrade_cost;
    let available = world.economy.defender_gold;
    let upgrade_time = world.rules.upgrade_time;
    let Some(tower) = position.index().and_then(|index| world.towers.get_mut(index)) else {
        return Err(UpgradeError::MissingTower);
    };
    if available < cost {
        return Err(UpgradeError::InsufficientGold { cost, available });
    }

    tower.upgrade(stat, upgrade_time);
    let snapshot = tower.snapshot();
    world.economy.defender_gold = available - cost;
    Ok(snapshot)
}

/// Removes a tower, refunding half of its appraisal rounded down. Returns the
/// removed tower together with the refund.
pub fn destroy_tower(
    world: &mut World,
    position: LanePosition,
) -> Result<(TowerSnapshot, u64), DestroyError> {
    let Some(tower) = position.index().and_then(|index| world.towers.clear(index)) else {
        return Err(DestroyError::MissingTower);
    };

    let refund = tower.appraise(&world.rules) / 2;
    world.economy.defender_gold = world.economy.defender_gold.saturating_add(refund);
    Ok((tower.snapshot(), refund))
}

fn spawn_cost(rules: &Rules, request: SpawnRequest) -> u64 {
    rules.spawn_cost(request.hp, request.defense, request.stun_resistance)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lane_defence_core::{
        EconomySnapshot, InvaderSnapshot, InvaderView, LanePosition, Rules, TowerSnapshot,
        TowerView,
    };

    use super::World;

    /// Rules governing the world.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Snapshot of the invader standing at `position`, if any.
    #[must_use]
    pub fn invader_at(world: &World, position: LanePosition) -> Option<InvaderSnapshot> {
        position
            .index()
            .and_then(|index| world.invaders.get(index))
            .map(|invader| invader.snapshot())
    }

    /// Snapshot of the tower standing at `position`, if any.
    #[must_use]
    pub fn tower_at(world: &World, position: LanePosition) -> Option<TowerSnapshot> {
        position
            .index()
            .and_then(|index| world.towers.get(index))
            .map(|tower| tower.snapshot())
    }

    /// Captures a read-only view of the invaders on the lane.
    #[must_use]
    pub fn invader_view(world: &World) -> InvaderView {
        InvaderView::from_snapshots(
            world
                .invaders
                .iter()
                .map(|invader| invader.snapshot())
                .collect(),
        )
    }

    /// Captures a read-only view of the towers on the lane.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures every economy and progression counter at once.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        world.economy.snapshot()
    }

    /// Number of completed turns.
    #[must_use]
    pub fn turn_number(world: &World) -> u64 {
        world.economy.turn
    }

    /// Spendable invader gold.
    #[must_use]
    pub fn invader_gold(world: &World) -> u64 {
        world.economy.invader_gold
    }

    /// Gold the invader receives every income interval.
    #[must_use]
    pub fn invader_income(world: &World) -> u64 {
        world.economy.invader_income
    }

    /// Cap on the total boost of a single invader.
    #[must_use]
    pub fn invader_boost_max(world: &World) -> u64 {
        world.economy.invader_boost_max
    }

    /// Multiplier applied to the base health of newly spawned invaders.
    #[must_use]
    pub fn invader_hp_multiplier(world: &World) -> f64 {
        world.economy.invader_hp_multiplier
    }

    /// Turns since the invader last spawned successfully.
    #[must_use]
    pub fn turns_since_last_spawn(world: &World) -> u64 {
        world.economy.turns_since_last_spawn
    }

    /// Spendable defender gold.
    #[must_use]
    pub fn defender_gold(world: &World) -> u64 {
        world.economy.defender_gold
    }

    /// Remaining defender life.
    #[must_use]
    pub fn defender_life(world: &World) -> u32 {
        world.economy.defender_life
    }

    /// Reports whether the defender can keep playing.
    #[must_use]
    pub fn defender_alive(world: &World) -> bool {
        world.economy.defender_life > 0
    }
}
