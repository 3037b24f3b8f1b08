//! Invader state and the damage and stun formulas.

use lane_defence_core::{InvaderSnapshot, LanePosition};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Invader {
    pub(crate) position: usize,
    pub(crate) hp: i64,
    pub(crate) max_hp: i64,
    pub(crate) defense: u32,
    pub(crate) stun_resistance: u32,
    pub(crate) stun_time: u32,
}

impl Invader {
    /// Creates an invader standing on the spawn position.
    pub(crate) fn spawn(hp: i64, defense: u32, stun_resistance: u32) -> Self {
        Self {
            position: 0,
            hp,
            max_hp: hp,
            defense,
            stun_resistance,
            stun_time: 0,
        }
    }

    /// Applies a hit and reports whether the invader died. Every hit removes
    /// at least one point of health.
    pub(crate) fn damage(&mut self, power: u32) -> bool {
        self.hp -= hit_strength(power, self.defense);
        self.is_dead()
    }

    /// Overwrites the remaining stun time.
    pub(crate) fn stun(&mut self, power: u32) {
        self.stun_time = power.saturating_sub(self.stun_resistance);
    }

    pub(crate) fn is_stunned(&self) -> bool {
        self.stun_time > 0
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub(crate) fn snapshot(&self) -> InvaderSnapshot {
        InvaderSnapshot {
            position: LanePosition::from_index(self.position),
            hp: self.hp,
            max_hp: self.max_hp,
            defense: self.defense,
            stun_resistance: self.stun_resistance,
            stun_time: self.stun_time,
        }
    }
}

fn hit_strength(power: u32, defense: u32) -> i64 {
    (i64::from(power) - i64::from(defense)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn spawned_invader_starts_at_full_health_and_unstunned() {
        let invader = Invader::spawn(12, 1, 2);
        assert_eq!(invader.position, 0);
        assert_eq!(invader.hp, invader.max_hp);
        assert!(!invader.is_stunned());
    }

    #[test]
    fn damage_reports_death_at_zero_health() {
        let mut invader = Invader::spawn(2, 0, 0);
        assert!(!invader.damage(1));
        assert!(invader.damage(1));
        assert_eq!(invader.hp, 0);
    }

    #[test]
    fn defense_never_blocks_the_minimum_hit() {
        let mut invader = Invader::spawn(10, 50, 0);
        assert!(!invader.damage(3));
        assert_eq!(invader.hp, 9);
    }

    #[test]
    fn stun_overwrites_rather_than_adds() {
        let mut invader = Invader::spawn(10, 0, 1);
        invader.stun(5);
        assert_eq!(invader.stun_time, 4);
        invader.stun(2);
        assert_eq!(invader.stun_time, 1);
        invader.stun(1);
        assert_eq!(invader.stun_time, 0);
    }

    proptest! {
        #[test]
        fn damage_removes_power_minus_defense_with_floor_of_one(
            hp in 1i64..10_000,
            defense in 0u32..200,
            power in 0u32..200,
        ) {
            let mut invader = Invader::spawn(hp, defense, 0);
            let dead = invader.damage(power);
            let expected = (i64::from(power) - i64::from(defense)).max(1);
            prop_assert_eq!(hp - invader.hp, expected);
            prop_assert_eq!(dead, invader.hp <= 0);
        }

        #[test]
        fn stun_time_never_underflows(power in 0u32..500, resistance in 0u32..500) {
            let mut invader = Invader::spawn(10, 0, resistance);
            invader.stun(power);
            prop_assert_eq!(invader.stun_time, power.saturating_sub(resistance));
        }
    }
}
