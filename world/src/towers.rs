//! Tower state, upgrades and the three attack variants.

use std::ops::RangeInclusive;

use lane_defence_core::{
    Event, LanePosition, Rules, TowerKind, TowerSnapshot, TowerStat, LANE_LENGTH,
};

use crate::{invader::Invader, lane::Lane};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Tower {
    pub(crate) position: usize,
    pub(crate) kind: TowerKind,
    pub(crate) power: u32,
    pub(crate) range: u32,
    pub(crate) cooldown: u32,
    pub(crate) level: u32,
}

impl Tower {
    /// Creates a tower that stays idle for `build_time` turns.
    pub(crate) fn new(kind: TowerKind, position: usize, build_time: u32) -> Self {
        Self {
            position,
            kind,
            power: 1,
            range: kind.default_range(),
            cooldown: build_time,
            level: 0,
        }
    }

    pub(crate) fn upgrade(&mut self, stat: TowerStat, upgrade_time: u32) {
        match stat {
            TowerStat::Power => self.power = self.power.saturating_add(1),
            TowerStat::Range => self.range = self.range.saturating_add(1),
        }
        self.level = self.level.saturating_add(1);
        self.cooldown = upgrade_time;
    }

    /// Gold invested in the tower, used as the basis of refunds.
    pub(crate) fn appraise(&self, rules: &Rules) -> u64 {
        rules
            .build_cost
            .saturating_add(rules.upgrade_cost.saturating_mul(u64::from(self.level)))
    }

    /// Cools down or attacks. Killed invaders are removed from the lane and
    /// their former positions pushed onto `kills`; crediting the bounty is up
    /// to the caller.
    pub(crate) fn take_turn(
        &mut self,
        invaders: &mut Lane<Invader>,
        rules: &Rules,
        kills: &mut Vec<usize>,
        out_events: &mut Vec<Event>,
    ) {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return;
        }

        match self.kind {
            TowerKind::Point => self.fire(invaders, kills, out_events),
            TowerKind::Area => self.detonate(invaders, rules, kills, out_events),
            TowerKind::Disable => self.disable(invaders, out_events),
        }
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            position: LanePosition::from_index(self.position),
            kind: self.kind,
            power: self.power,
            range: self.range,
            cooldown: self.cooldown,
            level: self.level,
        }
    }

    /// Hits the farthest invader in reach.
    fn fire(
        &self,
        invaders: &mut Lane<Invader>,
        kills: &mut Vec<usize>,
        out_events: &mut Vec<Event>,
    ) {
        let target = self
            .reach()
            .rev()
            .find(|&index| invaders.is_occupied(index));
        if let Some(index) = target {
            self.strike(invaders, index, kills, out_events);
        }
    }

    /// Hits every invader in reach, but only while one stands on the tower.
    fn detonate(
        &mut self,
        invaders: &mut Lane<Invader>,
        rules: &Rules,
        kills: &mut Vec<usize>,
        out_events: &mut Vec<Event>,
    ) {
        if !invaders.is_occupied(self.position) {
            return;
        }

        for index in self.reach() {
            if invaders.is_occupied(index) {
                self.strike(invaders, index, kills, out_events);
            }
        }
        self.cooldown = rules.area_cooldown;
    }

    /// Stuns the farthest invader in reach that is not already stunned.
    fn disable(&mut self, invaders: &mut Lane<Invader>, out_events: &mut Vec<Event>) {
        let target = self.reach().rev().find(|&index| {
            invaders
                .get(index)
                .is_some_and(|invader| !invader.is_stunned())
        });
        let Some(index) = target else {
            return;
        };
        let Some(invader) = invaders.get_mut(index) else {
            return;
        };

        invader.stun(self.power);
        out_events.push(Event::InvaderStunned {
            tower: LanePosition::from_index(self.position),
            position: LanePosition::from_index(index),
            duration: invader.stun_time,
        });
        self.cooldown = self.power.saturating_add(1);
    }

    fn strike(
        &self,
        invaders: &mut Lane<Invader>,
        index: usize,
        kills: &mut Vec<usize>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(invader) = invaders.get_mut(index) else {
            return;
        };

        let before = invader.hp;
        let dead = invader.damage(self.power);
        out_events.push(Event::InvaderDamaged {
            tower: LanePosition::from_index(self.position),
            position: LanePosition::from_index(index),
            amount: before - invader.hp,
            remaining: invader.hp,
        });

        if dead {
            let _ = invaders.clear(index);
            kills.push(index);
        }
    }

    /// Lane indices within range, clipped to the lane, nearest end first.
    fn reach(&self) -> RangeInclusive<usize> {
        let range = usize::try_from(self.range).unwrap_or(usize::MAX);
        let low = self.position.saturating_sub(range);
        let high = self.position.saturating_add(range).min(LANE_LENGTH - 1);
        low..=high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane_with(invaders: &[Invader]) -> Lane<Invader> {
        let mut lane = Lane::new();
        for invader in invaders {
            lane.set(invader.position, invader.clone());
        }
        lane
    }

    fn invader_at(position: usize, hp: i64) -> Invader {
        let mut invader = Invader::spawn(hp, 0, 0);
        invader.position = position;
        invader
    }

    fn ready(kind: TowerKind, position: usize) -> Tower {
        Tower::new(kind, position, 0)
    }

    #[test]
    fn new_towers_take_defaults_from_their_kind() {
        let tower = Tower::new(TowerKind::Area, 30, 10);
        assert_eq!(tower.power, 1);
        assert_eq!(tower.range, 2);
        assert_eq!(tower.cooldown, 10);
        assert_eq!(tower.level, 0);
    }

    #[test]
    fn cooling_tower_only_counts_down() {
        let rules = Rules::default();
        let mut tower = Tower::new(TowerKind::Point, 10, 3);
        let mut invaders = lane_with(&[invader_at(10, 5)]);
        let mut kills = Vec::new();
        let mut events = Vec::new();

        tower.take_turn(&mut invaders, &rules, &mut kills, &mut events);

        assert_eq!(tower.cooldown, 2);
        assert!(events.is_empty());
        assert_eq!(invaders.get(10).map(|invader| invader.hp), Some(5));
    }

    #[test]
    fn upgrade_raises_stat_level_and_cooldown() {
        let mut tower = ready(TowerKind::Point, 5);
        tower.upgrade(TowerStat::Range, 10);
        tower.upgrade(TowerStat::Power, 10);
        assert_eq!((tower.power, tower.range, tower.level), (2, 2, 2));
        assert_eq!(tower.cooldown, 10);
    }

    #[test]
    fn appraisal_counts_build_and_upgrades() {
        let rules = Rules::default();
        let mut tower = ready(TowerKind::Disable, 5);
        assert_eq!(tower.appraise(&rules), 10);
        tower.upgrade(TowerStat::Power, 0);
        tower.upgrade(TowerStat::Power, 0);
        assert_eq!(tower.appraise(&rules), 30);
    }

    #[test]
    fn point_tower_hits_only_the_farthest_invader() {
        let rules = Rules::default();
        let mut tower = ready(TowerKind::Point, 20);
        let mut invaders = lane_with(&[invader_at(19, 5), invader_at(21, 5)]);
        let mut kills = Vec::new();
        let mut events = Vec::new();

        tower.take_turn(&mut invaders, &rules, &mut kills, &mut events);

        assert_eq!(invaders.get(21).map(|invader| invader.hp), Some(4));
        assert_eq!(invaders.get(19).map(|invader| invader.hp), Some(5));
        assert_eq!(events.len(), 1);
        assert_eq!(tower.cooldown, 0, "point towers fire every turn");
    }

    #[test]
    fn point_tower_removes_killed_invaders() {
        let rules = Rules::default();
        let mut tower = ready(TowerKind::Point, 0);
        let mut invaders = lane_with(&[invader_at(1, 1)]);
        let mut kills = Vec::new();
        let mut events = Vec::new();

        tower.take_turn(&mut invaders, &rules, &mut kills, &mut events);

        assert!(!invaders.is_occupied(1));
        assert_eq!(kills, vec![1]);
    }

    #[test]
    fn area_tower_ignores_invaders_not_standing_on_it() {
        let rules = Rules::default();
        let mut tower = ready(TowerKind::Area, 50);
        let mut invaders = lane_with(&[invader_at(49, 5), invader_at(52, 5)]);
        let mut kills = Vec::new();
        let mut events = Vec::new();

        tower.take_turn(&mut invaders, &rules, &mut kills, &mut events);

        assert!(events.is_empty());
        assert_eq!(tower.cooldown, 0);
    }

    #[test]
    fn area_tower_hits_everything_in_reach_then_cools_down() {
        let rules = Rules::default();
        let mut tower = ready(TowerKind::Area, 50);
        let mut invaders = lane_with(&[
            invader_at(47, 5),
            invader_at(48, 5),
            invader_at(50, 1),
            invader_at(52, 5),
            invader_at(53, 5),
        ]);
        let mut kills = Vec::new();
        let mut events = Vec::new();

        tower.take_turn(&mut invaders, &rules, &mut kills, &mut events);

        assert_eq!(invaders.get(47).map(|invader| invader.hp), Some(5));
        assert_eq!(invaders.get(48).map(|invader| invader.hp), Some(4));
        assert_eq!(invaders.get(52).map(|invader| invader.hp), Some(4));
        assert_eq!(invaders.get(53).map(|invader| invader.hp), Some(5));
        assert_eq!(kills, vec![50]);
        assert_eq!(tower.cooldown, rules.area_cooldown);
    }

    #[test]
    fn disable_tower_skips_stunned_invaders() {
        let rules = Rules::default();
        let mut tower = ready(TowerKind::Disable, 30);
        tower.range = 2;
        tower.power = 3;
        let mut stunned = invader_at(32, 5);
        stunned.stun_time = 1;
        let mut invaders = lane_with(&[stunned, invader_at(29, 5)]);
        let mut kills = Vec::new();
        let mut events = Vec::new();

        tower.take_turn(&mut invaders, &rules, &mut kills, &mut events);

        assert_eq!(invaders.get(32).map(|invader| invader.stun_time), Some(1));
        assert_eq!(invaders.get(29).map(|invader| invader.stun_time), Some(3));
        assert_eq!(tower.cooldown, 4);
        assert!(kills.is_empty());
    }

    #[test]
    fn disable_tower_without_target_stays_ready() {
        let rules = Rules::default();
        let mut tower = ready(TowerKind::Disable, 30);
        let mut invaders = lane_with(&[invader_at(31, 5)]);
        let mut kills = Vec::new();
        let mut events = Vec::new();

        tower.take_turn(&mut invaders, &rules, &mut kills, &mut events);

        assert!(events.is_empty());
        assert_eq!(tower.cooldown, 0);
    }

    #[test]
    fn reach_is_clipped_to_the_lane() {
        let mut tower = ready(TowerKind::Point, 1);
        tower.range = 5;
        assert_eq!(tower.reach(), 0..=6);
        tower.position = LANE_LENGTH - 2;
        assert_eq!(tower.reach(), LANE_LENGTH - 7..=LANE_LENGTH - 1);
    }
}
