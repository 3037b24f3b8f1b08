//! Gold balances, income and the progression schedule.

use lane_defence_core::{EconomySnapshot, Event, Rules};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Economy {
    pub(crate) turn: u64,
    pub(crate) invader_gold: u64,
    pub(crate) invader_income: u64,
    pub(crate) invader_boost_max: u64,
    pub(crate) invader_hp_multiplier: f64,
    pub(crate) turns_since_last_spawn: u64,
    pub(crate) defender_gold: u64,
    pub(crate) defender_life: u32,
}

impl Economy {
    pub(crate) fn new(rules: &Rules) -> Self {
        Self {
            turn: 0,
            invader_gold: rules.invader_initial_gold,
            invader_income: rules.invader_initial_income,
            invader_boost_max: rules.invader_initial_boost_max,
            invader_hp_multiplier: 1.0,
            turns_since_last_spawn: 0,
            defender_gold: rules.defender_initial_gold,
            defender_life: rules.defender_initial_life,
        }
    }

    /// Health of a new invader: the scaled base health plus its boost.
    pub(crate) fn spawn_health(&self, rules: &Rules, hp_boost: u32) -> i64 {
        let scaled = (f64::from(rules.base_hp) * self.invader_hp_multiplier).floor();
        // `as` saturates, so runaway multipliers cap at i64::MAX.
        (scaled as i64).saturating_add(i64::from(hp_boost))
    }

    /// Decay rate of hoarded invader gold.
    pub(crate) fn penalty_multiplier(&self, rules: &Rules) -> f64 {
        let surplus = self.invader_income.saturating_sub(rules.base_cost);
        (surplus as f64).sqrt().max(1.0)
    }

    /// Counts another turn without a spawn and charges the hoarding penalty
    /// whenever a further full interval elapsed. Returns the gold removed.
    pub(crate) fn charge_hoarding(&mut self, rules: &Rules) -> Option<u64> {
        self.turns_since_last_spawn = self.turns_since_last_spawn.saturating_add(1);
        if !fires_on(self.turns_since_last_spawn, rules.hoarding_interval) {
            return None;
        }

        let intervals = self.turns_since_last_spawn / rules.hoarding_interval;
        if intervals <= 1 {
            return None;
        }

        let penalty = ((intervals - 1) as f64 * self.penalty_multiplier(rules)).floor() as u64;
        let before = self.invader_gold;
        self.invader_gold = before.saturating_sub(penalty);
        Some(before - self.invader_gold)
    }

    /// Advances the turn counter and runs every schedule due on the new turn.
    pub(crate) fn advance_turn(&mut self, rules: &Rules, out_events: &mut Vec<Event>) {
        self.turn = self.turn.saturating_add(1);
        out_events.push(Event::TurnAdvanced { turn: self.turn });

        if fires_on(self.turn, rules.income_interval) {
            self.invader_gold = self.invader_gold.saturating_add(self.invader_income);
            self.defender_gold = self.defender_gold.saturating_add(rules.defender_income);
            out_events.push(Event::IncomeGranted {
                invader: self.invader_income,
                defender: rules.defender_income,
            });
        }

        if fires_on(self.turn, rules.escalation_interval) {
            let step = u64::from(self.turn.ilog10());
            self.invader_income = self.invader_income.saturating_add(step);
            self.invader_boost_max = self.invader_boost_max.saturating_add(step);
            log::info!(
                "turn {}: invader income escalated to {}, boost cap to {}",
                self.turn,
                self.invader_income,
                self.invader_boost_max
            );
            out_events.push(Event::ProgressionEscalated {
                income: self.invader_income,
                boost_max: self.invader_boost_max,
            });
        }

        if fires_on(self.turn, rules.hp_scaling_interval) {
            self.invader_hp_multiplier *= rules.hp_growth_factor;
            log::info!(
                "turn {}: invader health multiplier now {:.3}",
                self.turn,
                self.invader_hp_multiplier
            );
            out_events.push(Event::HealthScaled {
                multiplier: self.invader_hp_multiplier,
            });
        }
    }

    pub(crate) fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            turn: self.turn,
            invader_gold: self.invader_gold,
            invader_income: self.invader_income,
            invader_boost_max: self.invader_boost_max,
            invader_hp_multiplier: self.invader_hp_multiplier,
            turns_since_last_spawn: self.turns_since_last_spawn,
            defender_gold: self.defender_gold,
            defender_life: self.defender_life,
        }
    }
}

/// Reports whether a schedule with the provided period fires on `turn`.
/// A zero period never fires.
fn fires_on(turn: u64, period: u64) -> bool {
    period != 0 && turn % period == 0
}
