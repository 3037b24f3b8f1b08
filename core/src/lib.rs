#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the turn orchestrator. Callers submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then reports [`Event`] values describing what
//! actually happened. Strategies inspect immutable snapshots and answer with
//! at most one [`InvaderAction`] or [`DefenderAction`] per turn.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod rules;

pub use rules::{Rules, RulesError};

/// Number of positions along the lane. Position 0 is the spawn end.
pub const LANE_LENGTH: usize = 100;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resolves tower attacks, invader movement and the economy for one turn.
    Tick,
    /// Requests that a new invader enter the lane at the spawn position.
    SpawnInvader {
        /// Stat boosts purchased on top of the base invader.
        request: SpawnRequest,
    },
    /// Requests that the invader boost cap be raised.
    UpgradeInvaderBoost,
    /// Requests construction of a tower at the provided position.
    BuildTower {
        /// Attack variant of the tower.
        kind: TowerKind,
        /// Lane position the tower should occupy.
        position: LanePosition,
    },
    /// Requests an upgrade of the tower standing at the provided position.
    UpgradeTower {
        /// Lane position of the tower to upgrade.
        position: LanePosition,
        /// Statistic that should be raised by one.
        stat: TowerStat,
    },
    /// Requests removal of the tower standing at the provided position.
    DestroyTower {
        /// Lane position of the tower to destroy.
        position: LanePosition,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A tower hit an invader.
    InvaderDamaged {
        /// Position of the tower that attacked.
        tower: LanePosition,
        /// Position of the invader that was hit.
        position: LanePosition,
        /// Health removed by the hit.
        amount: i64,
        /// Health left after the hit; zero or below means the invader died.
        remaining: i64,
    },
    /// An invader died and the defender collected the bounty.
    InvaderKilled {
        /// Position the invader occupied when it died.
        position: LanePosition,
        /// Gold credited to the defender.
        bounty: u64,
    },
    /// A disable tower stunned an invader.
    InvaderStunned {
        /// Position of the tower that attacked.
        tower: LanePosition,
        /// Position of the stunned invader.
        position: LanePosition,
        /// Turns the invader is unable to move.
        duration: u32,
    },
    /// An invader stepped one position forward.
    InvaderAdvanced {
        /// Position before the step.
        from: LanePosition,
        /// Position after the step.
        to: LanePosition,
    },
    /// An invader walked off the far end of the lane.
    DefenderBreached {
        /// Defender life left after the breach.
        remaining_life: u32,
    },
    /// Invader gold decayed because no invader was spawned for too long.
    HoardingPenaltyApplied {
        /// Gold actually removed after clamping at zero.
        amount: u64,
        /// Turns elapsed since the last successful spawn.
        turns_since_last_spawn: u64,
    },
    /// The turn counter advanced.
    TurnAdvanced {
        /// Turn number after advancing.
        turn: u64,
    },
    /// Both sides received their periodic income.
    IncomeGranted {
        /// Gold granted to the invader.
        invader: u64,
        /// Gold granted to the defender.
        defender: u64,
    },
    /// Invader income and boost cap escalated.
    ProgressionEscalated {
        /// Invader income after escalation.
        income: u64,
        /// Invader boost cap after escalation.
        boost_max: u64,
    },
    /// Health of newly spawned invaders was scaled up.
    HealthScaled {
        /// Multiplier applied to the base health of future invaders.
        multiplier: f64,
    },
    /// An invader entered the lane.
    InvaderSpawned {
        /// State of the freshly spawned invader.
        invader: InvaderSnapshot,
        /// Gold paid for the spawn.
        cost: u64,
    },
    /// A spawn request was rejected.
    SpawnRejected {
        /// Stats that were requested.
        request: SpawnRequest,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// The invader boost cap was raised.
    InvaderBoostUpgraded {
        /// Boost cap after the upgrade.
        boost_max: u64,
    },
    /// A boost cap upgrade was rejected.
    BoostUpgradeRejected {
        /// Specific reason the upgrade failed.
        reason: BoostError,
    },
    /// A tower was constructed.
    TowerBuilt {
        /// State of the new tower.
        tower: TowerSnapshot,
    },
    /// A build request was rejected.
    BuildRejected {
        /// Kind of tower requested.
        kind: TowerKind,
        /// Position requested.
        position: LanePosition,
        /// Specific reason the build failed.
        reason: BuildError,
    },
    /// A tower was upgraded.
    TowerUpgraded {
        /// State of the tower after the upgrade.
        tower: TowerSnapshot,
        /// Statistic that was raised.
        stat: TowerStat,
    },
    /// A tower upgrade request was rejected.
    UpgradeRejected {
        /// Position requested.
        position: LanePosition,
        /// Statistic requested.
        stat: TowerStat,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// A tower was removed and partially refunded.
    TowerDestroyed {
        /// State of the tower right before removal.
        tower: TowerSnapshot,
        /// Gold credited to the defender.
        refund: u64,
    },
    /// A destroy request was rejected.
    DestroyRejected {
        /// Position requested.
        position: LanePosition,
        /// Specific reason the removal failed.
        reason: DestroyError,
    },
}

/// Index of a position along the lane.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LanePosition(u32);

impl LanePosition {
    /// Spawn end of the lane.
    pub const SPAWN: Self = Self(0);
    /// Last position; invaders stepping beyond it damage the defender.
    pub const LAST: Self = Self(LANE_LENGTH as u32 - 1);

    /// Creates a new lane position. Values beyond the lane are representable
    /// so that requests can be validated and rejected by the world.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the position.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the position lies on the lane.
    #[must_use]
    pub const fn is_on_lane(&self) -> bool {
        (self.0 as usize) < LANE_LENGTH
    }

    /// Converts the position into a slot index, if it lies on the lane.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        let index = usize::try_from(self.0).ok()?;
        (index < LANE_LENGTH).then_some(index)
    }

    /// Position for a slot index produced by iterating the lane.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

impl fmt::Display for LanePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stat boosts requested for a new invader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// Extra health on top of the base health.
    pub hp: u32,
    /// Flat damage reduction.
    pub defense: u32,
    /// Flat stun reduction.
    pub stun_resistance: u32,
}

impl SpawnRequest {
    /// Request for an invader without any boosts.
    pub const BASE: Self = Self::new(0, 0, 0);

    /// Creates a new spawn request.
    #[must_use]
    pub const fn new(hp: u32, defense: u32, stun_resistance: u32) -> Self {
        Self {
            hp,
            defense,
            stun_resistance,
        }
    }

    /// Sum of all boosts, compared against the invader boost cap.
    #[must_use]
    pub fn total_boost(&self) -> u64 {
        u64::from(self.hp) + u64::from(self.defense) + u64::from(self.stun_resistance)
    }
}

/// Attack variants a tower can be built as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Damages the farthest invader in range, one hit per turn.
    Point,
    /// Damages every invader around it once an invader stands on it.
    Area,
    /// Stuns the farthest invader in range that is not stunned yet.
    Disable,
}

impl TowerKind {
    /// All tower kinds in declaration order.
    pub const ALL: [Self; 3] = [Self::Point, Self::Area, Self::Disable];

    /// Range assigned to a freshly built tower of this kind.
    #[must_use]
    pub const fn default_range(self) -> u32 {
        match self {
            Self::Point => 1,
            Self::Area => 2,
            Self::Disable => 0,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Area => "area",
            Self::Disable => "disable",
        }
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when text does not name a tower kind.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown tower kind `{0}`")]
pub struct ParseTowerKindError(pub String);

impl FromStr for TowerKind {
    type Err = ParseTowerKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "point" | "turret" => Ok(Self::Point),
            "area" | "bomb" => Ok(Self::Area),
            "disable" | "stunner" => Ok(Self::Disable),
            other => Err(ParseTowerKindError(other.to_owned())),
        }
    }
}

/// Tower statistics that can be upgraded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerStat {
    /// Attack strength.
    Power,
    /// Reach on either side of the tower.
    Range,
}

impl fmt::Display for TowerStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power => f.write_str("power"),
            Self::Range => f.write_str("range"),
        }
    }
}

/// Error returned when text does not name a tower statistic.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown tower stat `{0}`")]
pub struct ParseTowerStatError(pub String);

impl FromStr for TowerStat {
    type Err = ParseTowerStatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "power" => Ok(Self::Power),
            "range" => Ok(Self::Range),
            other => Err(ParseTowerStatError(other.to_owned())),
        }
    }
}

/// Decision returned by the invader strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvaderAction {
    /// Spawn an invader with the requested boosts.
    Spawn(SpawnRequest),
    /// Raise the invader boost cap.
    Boost,
}

impl InvaderAction {
    /// Translates the decision into the world command that carries it out.
    #[must_use]
    pub const fn into_command(self) -> Command {
        match self {
            Self::Spawn(request) => Command::SpawnInvader { request },
            Self::Boost => Command::UpgradeInvaderBoost,
        }
    }
}

/// Decision returned by the defender strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefenderAction {
    /// Build a tower.
    Build {
        /// Attack variant of the tower.
        kind: TowerKind,
        /// Target position.
        position: LanePosition,
    },
    /// Upgrade the tower at a position.
    Upgrade {
        /// Position of the tower.
        position: LanePosition,
        /// Statistic to raise.
        stat: TowerStat,
    },
    /// Destroy the tower at a position.
    Destroy {
        /// Position of the tower.
        position: LanePosition,
    },
}

impl DefenderAction {
    /// Translates the decision into the world command that carries it out.
    #[must_use]
    pub const fn into_command(self) -> Command {
        match self {
            Self::Build { kind, position } => Command::BuildTower { kind, position },
            Self::Upgrade { position, stat } => Command::UpgradeTower { position, stat },
            Self::Destroy { position } => Command::DestroyTower { position },
        }
    }
}

/// Immutable representation of a single invader used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvaderSnapshot {
    /// Lane position currently occupied.
    pub position: LanePosition,
    /// Current health.
    pub hp: i64,
    /// Health at spawn.
    pub max_hp: i64,
    /// Flat damage reduction.
    pub defense: u32,
    /// Flat stun reduction.
    pub stun_resistance: u32,
    /// Remaining turns unable to move.
    pub stun_time: u32,
}

/// Immutable representation of a single tower used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    /// Lane position the tower stands on.
    pub position: LanePosition,
    /// Attack variant.
    pub kind: TowerKind,
    /// Attack strength.
    pub power: u32,
    /// Reach on either side of the tower.
    pub range: u32,
    /// Turns remaining before the tower may act.
    pub cooldown: u32,
    /// Number of upgrades applied.
    pub level: u32,
}

/// Economy and progression counters of a game.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    /// Number of completed turns.
    pub turn: u64,
    /// Spendable invader gold.
    pub invader_gold: u64,
    /// Gold the invader receives every income interval.
    pub invader_income: u64,
    /// Cap on the total boost of a single invader.
    pub invader_boost_max: u64,
    /// Multiplier applied to the base health of new invaders.
    pub invader_hp_multiplier: f64,
    /// Turns since the invader last spawned successfully.
    pub turns_since_last_spawn: u64,
    /// Spendable defender gold.
    pub defender_gold: u64,
    /// Remaining defender life.
    pub defender_life: u32,
}

/// Read-only snapshot describing all invaders on the lane.
#[derive(Clone, Debug, Default)]
pub struct InvaderView {
    snapshots: Vec<InvaderSnapshot>,
}

impl InvaderView {
    /// Creates a new invader view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<InvaderSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.position);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots ordered from spawn to far end.
    pub fn iter(&self) -> impl Iterator<Item = &InvaderSnapshot> {
        self.snapshots.iter()
    }

    /// Number of invaders on the lane.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the lane holds no invaders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<InvaderSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all towers on the lane.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.position);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots ordered by position.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers on the lane.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the lane holds no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SpawnError {
    /// Another invader still stands on the spawn position.
    #[error("spawn position is occupied")]
    SpawnOccupied,
    /// The requested boosts exceed the current cap.
    #[error("requested boost {requested} exceeds cap {cap}")]
    BoostCapExceeded {
        /// Sum of the requested boosts.
        requested: u64,
        /// Current boost cap.
        cap: u64,
    },
    /// The invader cannot afford the spawn.
    #[error("spawn costs {cost} gold but only {available} is available")]
    InsufficientGold {
        /// Price of the request.
        cost: u64,
        /// Gold held by the invader.
        available: u64,
    },
}

/// Reasons a boost cap upgrade may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum BoostError {
    /// The invader cannot afford the upgrade.
    #[error("boost upgrade costs {cost} gold but only {available} is available")]
    InsufficientGold {
        /// Price of the upgrade.
        cost: u64,
        /// Gold held by the invader.
        available: u64,
    },
}

/// Reasons a build request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum BuildError {
    /// The requested position lies beyond the lane.
    #[error("position is outside the lane")]
    OutOfBounds,
    /// A tower already stands on the requested position.
    #[error("position already holds a tower")]
    Occupied,
    /// The defender cannot afford the tower.
    #[error("tower costs {cost} gold but only {available} is available")]
    InsufficientGold {
        /// Price of the tower.
        cost: u64,
        /// Gold held by the defender.
        available: u64,
    },
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No tower stands on the requested position.
    #[error("no tower at the requested position")]
    MissingTower,
    /// The defender cannot afford the upgrade.
    #[error("upgrade costs {cost} gold but only {available} is available")]
    InsufficientGold {
        /// Price of the upgrade.
        cost: u64,
        /// Gold held by the defender.
        available: u64,
    },
}

/// Reasons a destroy request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum DestroyError {
    /// No tower stands on the requested position.
    #[error("no tower at the requested position")]
    MissingTower,
}

#[cfg(test)]
mod tests {
    use super::{
        DefenderAction, InvaderAction, LanePosition, SpawnError, SpawnRequest, TowerKind,
        TowerStat, LANE_LENGTH,
    };
    use crate::Command;

    #[test]
    fn lane_position_index_rejects_positions_beyond_the_lane() {
        assert_eq!(LanePosition::new(0).index(), Some(0));
        assert_eq!(LanePosition::LAST.index(), Some(LANE_LENGTH - 1));
        assert_eq!(LanePosition::new(100).index(), None);
        assert!(!LanePosition::new(u32::MAX).is_on_lane());
    }

    #[test]
    fn tower_kinds_carry_default_ranges() {
        assert_eq!(TowerKind::Point.default_range(), 1);
        assert_eq!(TowerKind::Area.default_range(), 2);
        assert_eq!(TowerKind::Disable.default_range(), 0);
    }

    #[test]
    fn tower_kind_parses_canonical_and_legacy_names() {
        for kind in TowerKind::ALL {
            assert_eq!(kind.name().parse::<TowerKind>(), Ok(kind));
        }
        assert_eq!("turret".parse::<TowerKind>(), Ok(TowerKind::Point));
        assert_eq!("bomb".parse::<TowerKind>(), Ok(TowerKind::Area));
        assert_eq!("stunner".parse::<TowerKind>(), Ok(TowerKind::Disable));
        assert!("cannon".parse::<TowerKind>().is_err());
    }

    #[test]
    fn tower_stat_rejects_unknown_names() {
        assert_eq!("power".parse::<TowerStat>(), Ok(TowerStat::Power));
        assert_eq!("range".parse::<TowerStat>(), Ok(TowerStat::Range));
        let error = "cooldown".parse::<TowerStat>().unwrap_err();
        assert_eq!(error.to_string(), "unknown tower stat `cooldown`");
    }

    #[test]
    fn total_boost_sums_every_stat() {
        assert_eq!(SpawnRequest::new(3, 1, 2).total_boost(), 6);
        assert_eq!(SpawnRequest::BASE.total_boost(), 0);
    }

    #[test]
    fn actions_translate_into_commands() {
        let request = SpawnRequest::new(1, 0, 0);
        assert_eq!(
            InvaderAction::Spawn(request).into_command(),
            Command::SpawnInvader { request }
        );
        assert_eq!(
            InvaderAction::Boost.into_command(),
            Command::UpgradeInvaderBoost
        );
        let position = LanePosition::new(12);
        assert_eq!(
            DefenderAction::Destroy { position }.into_command(),
            Command::DestroyTower { position }
        );
    }

    #[test]
    fn spawn_error_round_trips_through_bincode() {
        let error = SpawnError::BoostCapExceeded {
            requested: 7,
            cap: 5,
        };
        let bytes = bincode::serialize(&error).expect("serialize");
        let restored: SpawnError = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, error);
    }
}
