#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn orchestrator that drives a Lane Defence game one tick at a time.
//!
//! Each call to [`Game::take_turn`] resolves the world tick, asks both
//! strategies for a decision against the same post-tick state, and applies the
//! decisions through the world's validated commands, invader first.

use lane_defence_core::{Command, DefenderAction, Event, InvaderAction, SpawnRequest};
use lane_defence_world::{self as world, query, World};

/// Decision-maker for the invading side.
///
/// Strategies only ever see the world immutably; any memory they need lives
/// in the strategy value itself.
pub trait InvaderStrategy {
    /// Chooses at most one action for the current turn.
    fn decide(&mut self, world: &World) -> Option<InvaderAction>;
}

/// Decision-maker for the defending side.
pub trait DefenderStrategy {
    /// Chooses at most one action for the current turn.
    fn decide(&mut self, world: &World) -> Option<DefenderAction>;
}

impl<F> InvaderStrategy for F
where
    F: FnMut(&World) -> Option<InvaderAction>,
{
    fn decide(&mut self, world: &World) -> Option<InvaderAction> {
        self(world)
    }
}

impl<F> DefenderStrategy for F
where
    F: FnMut(&World) -> Option<DefenderAction>,
{
    fn decide(&mut self, world: &World) -> Option<DefenderAction> {
        self(world)
    }
}

/// Invader strategy that requests an unboosted invader every turn.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpawnBase;

impl InvaderStrategy for SpawnBase {
    fn decide(&mut self, _world: &World) -> Option<InvaderAction> {
        Some(InvaderAction::Spawn(SpawnRequest::BASE))
    }
}

/// Strategy that never acts. Usable for either side.
#[derive(Clone, Copy, Debug, Default)]
pub struct Idle;

impl InvaderStrategy for Idle {
    fn decide(&mut self, _world: &World) -> Option<InvaderAction> {
        None
    }
}

impl DefenderStrategy for Idle {
    fn decide(&mut self, _world: &World) -> Option<DefenderAction> {
        None
    }
}

/// A single game: the world plus one strategy per side.
pub struct Game {
    world: World,
    invader: Box<dyn InvaderStrategy>,
    defender: Box<dyn DefenderStrategy>,
}

impl Game {
    /// Creates a game around `world` with the default strategies: the
    /// invader spawns a base invader every turn, the defender does nothing.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            world,
            invader: Box::new(SpawnBase),
            defender: Box::new(Idle),
        }
    }

    /// Replaces the invader strategy.
    #[must_use]
    pub fn with_invader(mut self, strategy: impl InvaderStrategy + 'static) -> Self {
        self.invader = Box::new(strategy);
        self
    }

    /// Replaces the defender strategy.
    #[must_use]
    pub fn with_defender(mut self, strategy: impl DefenderStrategy + 'static) -> Self {
        self.defender = Box::new(strategy);
        self
    }

    /// Read-only access to the world for presentation and queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Consumes the game, yielding the world.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }

    /// Plays one turn, appending everything that happened to `out_events`.
    ///
    /// Returns whether the defender is still alive, i.e. whether the caller
    /// should keep ticking.
    pub fn take_turn(&mut self, out_events: &mut Vec<Event>) -> bool {
        world::apply(&mut self.world, Command::Tick, out_events);

        let invader_action = self.invader.decide(&self.world);
        let defender_action = self.defender.decide(&self.world);
        log::trace!(
            "turn {} decisions: invader {:?}, defender {:?}",
            query::turn_number(&self.world),
            invader_action,
            defender_action
        );

        if let Some(action) = invader_action {
            world::apply(&mut self.world, action.into_command(), out_events);
        }
        if let Some(action) = defender_action {
            world::apply(&mut self.world, action.into_command(), out_events);
        }

        let alive = query::defender_alive(&self.world);
        if !alive {
            log::info!(
                "defender eliminated after {} turns",
                query::turn_number(&self.world)
            );
        }
        alive
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("world", &self.world)
            .finish_non_exhaustive()
    }
}
