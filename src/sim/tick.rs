//! Fixed timestep simulation tick
//!
//! The session counters are only ever changed by the transition functions
//! in this module: `tick`, `advance_level`, `game_over` and `restart`.

use super::level::{Level, LevelSource};
use super::state::{GameEvent, GamePhase, GameState, Player, Session};
use crate::consts::MAX_LEVEL;

/// Advance the game state by one fixed timestep
///
/// Order: player, rangers, then at most one collision outcome.
/// A basket pickup takes precedence over a ranger hit in the same tick.
pub fn tick(state: &mut GameState, levels: &dyn LevelSource) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase == GamePhase::GameOver {
        return events;
    }

    state.time_ticks += 1;
    state.session.level_ticks += 1;

    state.player.update(&state.level);
    state.level.update();

    let player_bounds = state.player.bounds;
    if state.level.check_basket_collision(&player_bounds) {
        state.player.baskets_collected += 1;
        state.session.total_baskets += 1;
        events.push(GameEvent::BasketCollected {
            total: state.session.total_baskets,
        });

        if state.level.all_baskets_collected() {
            events.extend(advance_level(state, levels));
        }
    } else if state.level.check_enemy_collision(&player_bounds) {
        state.session.lives = state.session.lives.saturating_sub(1);
        events.push(GameEvent::LifeLost {
            remaining: state.session.lives,
        });

        if state.session.lives > 0 {
            state.player.respawn();
        } else {
            events.push(game_over(state));
        }
    }

    events
}

/// Move on to the next level, or end the run after the last one
pub fn advance_level(state: &mut GameState, levels: &dyn LevelSource) -> Vec<GameEvent> {
    state.session.level_number += 1;
    if state.session.level_number > MAX_LEVEL {
        return vec![game_over(state)];
    }

    let mut events = load_level(state, levels);
    state.player.respawn();
    events.push(GameEvent::LevelLoaded {
        level: state.session.level_number,
    });
    events
}

/// Enter the terminal phase; further ticks are no-ops until `restart`
pub fn game_over(state: &mut GameState) -> GameEvent {
    state.phase = GamePhase::GameOver;
    let event = GameEvent::GameOver {
        baskets: state.session.total_baskets,
        levels_cleared: state.session.levels_cleared(),
    };
    log::info!(
        "Game over: {} baskets, {} levels cleared",
        state.session.total_baskets,
        state.session.levels_cleared()
    );
    event
}

/// Start a fresh run on level 1 (3 lives, no baskets)
pub fn restart(state: &mut GameState, levels: &dyn LevelSource) -> Vec<GameEvent> {
    log::info!("Restarting game");
    state.session = Session::default();
    state.player = Player::default();
    state.phase = GamePhase::Playing;

    let mut events = vec![GameEvent::Restarted];
    events.extend(load_level(state, levels));
    events.push(GameEvent::LevelLoaded {
        level: state.session.level_number,
    });
    events
}

/// Replace the current level; a failed load leaves an empty level in place
fn load_level(state: &mut GameState, levels: &dyn LevelSource) -> Vec<GameEvent> {
    let number = state.session.level_number;
    state.session.level_ticks = 0;

    match Level::load(levels, number) {
        Ok(level) => {
            log::info!(
                "Loaded level {}: {} obstacles, {} baskets, {} rangers",
                number,
                level.obstacles.len(),
                level.items.len(),
                level.rangers.len()
            );
            state.level = level;
            Vec::new()
        }
        Err(e) => {
            log::error!("Failed to load level {number}: {e}; continuing with an empty level");
            state.level = Level::default();
            vec![GameEvent::LevelLoadFailed {
                level: number,
                reason: e.to_string(),
            }]
        }
    }
}
