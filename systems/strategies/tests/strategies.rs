use lane_defence_core::{Event, TowerKind};
use lane_defence_system_strategies::{Raider, Saver, TurretLine};
use lane_defence_system_turn::Game;
use lane_defence_world::{query, World};

fn play(game: &mut Game, turns: u64) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..turns {
        if !game.take_turn(&mut events) {
            break;
        }
    }
    events
}

#[test]
fn turret_line_spends_starting_gold_on_consecutive_point_towers() {
    let mut game = Game::new(World::new()).with_defender(TurretLine::new());

    let _ = play(&mut game, 6);

    let towers = query::tower_view(game.world()).into_vec();
    let positions: Vec<u32> = towers.iter().map(|tower| tower.position.get()).collect();
    assert_eq!(positions, vec![10, 11, 12, 13, 14]);
    assert!(towers.iter().all(|tower| tower.kind == TowerKind::Point));
    assert_eq!(query::defender_gold(game.world()), 0);
}

#[test]
fn turret_line_holds_off_base_invaders_for_a_while() {
    let mut game = Game::new(World::new()).with_defender(TurretLine::new());

    let events = play(&mut game, 300);

    let kills = events
        .iter()
        .filter(|event| matches!(event, Event::InvaderKilled { .. }))
        .count();
    assert!(kills > 0, "point towers should kill some base invaders");
}

#[test]
fn raider_replays_identically_for_the_same_seed() {
    let mut first = Game::new(World::new()).with_invader(Raider::new(0x5eed));
    let mut second = Game::new(World::new()).with_invader(Raider::new(0x5eed));

    let first_events = play(&mut first, 400);
    let second_events = play(&mut second, 400);

    assert_eq!(first_events, second_events);
    assert_eq!(
        query::invader_view(first.world()).into_vec(),
        query::invader_view(second.world()).into_vec()
    );
}

#[test]
fn raider_never_requests_unaffordable_invaders() {
    let mut game = Game::new(World::new()).with_invader(Raider::new(7));

    let events = play(&mut game, 500);

    assert!(events.iter().any(|event| matches!(event, Event::InvaderSpawned { .. })));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SpawnRejected { .. })));
}

#[test]
fn saver_buys_boost_cap_before_spawning() {
    let mut game = Game::new(World::new()).with_invader(Saver::new(10));

    // Hoarding penalties slow the saving down; the cap is bought on turn 80.
    let events = play(&mut game, 120);

    let first_boost = events
        .iter()
        .position(|event| matches!(event, Event::InvaderBoostUpgraded { boost_max: 10 }))
        .expect("saver should raise the boost cap");
    let first_spawn = events
        .iter()
        .position(|event| matches!(event, Event::InvaderSpawned { .. }))
        .expect("saver should spawn once the cap is reached");
    assert!(first_boost < first_spawn);
    assert!(query::invader_boost_max(game.world()) >= 10);
}
