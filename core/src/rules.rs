//! Tunable constants governing costs, timings and progression.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Complete rule set of a game. Every field has a default so partial rule
/// files only override what they name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rules {
    /// Health of an unboosted invader before scaling.
    pub base_hp: u32,
    /// Price of an unboosted invader.
    pub base_cost: u64,
    /// Price per point of extra health.
    pub hp_cost: u64,
    /// Price per point of defense.
    pub defense_cost: u64,
    /// Price per point of stun resistance.
    pub stun_resistance_cost: u64,
    /// Invader gold at game start.
    pub invader_initial_gold: u64,
    /// Invader income at game start.
    pub invader_initial_income: u64,
    /// Invader boost cap at game start.
    pub invader_initial_boost_max: u64,
    /// Price of raising the boost cap.
    pub boost_upgrade_cost: u64,
    /// Amount the boost cap rises per upgrade.
    pub boost_upgrade_increment: u64,
    /// Price of a new tower.
    pub build_cost: u64,
    /// Cooldown of a freshly built tower.
    pub build_time: u32,
    /// Price of a single tower upgrade.
    pub upgrade_cost: u64,
    /// Cooldown applied after a tower upgrade.
    pub upgrade_time: u32,
    /// Cooldown applied after an area tower detonates.
    pub area_cooldown: u32,
    /// Defender gold at game start.
    pub defender_initial_gold: u64,
    /// Defender life at game start.
    pub defender_initial_life: u32,
    /// Defender gold credited per kill.
    pub bounty: u64,
    /// Turns between income grants.
    pub income_interval: u64,
    /// Defender gold granted per income interval.
    pub defender_income: u64,
    /// Turns between income and boost cap escalations.
    pub escalation_interval: u64,
    /// Turns between health multiplier increases.
    pub hp_scaling_interval: u64,
    /// Factor the health multiplier grows by.
    pub hp_growth_factor: f64,
    /// Turns without a spawn per hoarding penalty step.
    pub hoarding_interval: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            base_hp: 10,
            base_cost: 10,
            hp_cost: 1,
            defense_cost: 10,
            stun_resistance_cost: 10,
            invader_initial_gold: 0,
            invader_initial_income: 10,
            invader_initial_boost_max: 5,
            boost_upgrade_cost: 50,
            boost_upgrade_increment: 5,
            build_cost: 10,
            build_time: 10,
            upgrade_cost: 10,
            upgrade_time: 10,
            area_cooldown: 5,
            defender_initial_gold: 50,
            defender_initial_life: 10,
            bounty: 1,
            income_interval: 10,
            defender_income: 1,
            escalation_interval: 100,
            hp_scaling_interval: 1000,
            hp_growth_factor: 1.2,
            hoarding_interval: 10,
        }
    }
}

impl Rules {
    /// Parses a rule set from TOML, filling omitted fields with defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, RulesError> {
        let rules: Self = toml::from_str(contents)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Checks that the rule set describes a playable game.
    pub fn validate(&self) -> Result<(), RulesError> {
        if !self.hp_growth_factor.is_finite() || self.hp_growth_factor < 1.0 {
            return Err(RulesError::HealthGrowth(self.hp_growth_factor));
        }
        if self.defender_initial_life == 0 {
            return Err(RulesError::NoDefenderLife);
        }
        Ok(())
    }

    /// Price of spawning an invader with the provided boosts.
    #[must_use]
    pub fn spawn_cost(&self, hp: u32, defense: u32, stun_resistance: u32) -> u64 {
        self.base_cost
            .saturating_add(u64::from(hp).saturating_mul(self.hp_cost))
            .saturating_add(u64::from(defense).saturating_mul(self.defense_cost))
            .saturating_add(u64::from(stun_resistance).saturating_mul(self.stun_resistance_cost))
    }
}

/// Errors raised while loading a rule set.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The TOML document could not be parsed.
    #[error("invalid rules document")]
    Parse(#[from] toml::de::Error),
    /// The health growth factor would shrink or break invader health.
    #[error("health growth factor must be a finite value of at least 1, got {0}")]
    HealthGrowth(f64),
    /// The defender would start out already defeated.
    #[error("defender must start with at least one life")]
    NoDefenderLife,
}
