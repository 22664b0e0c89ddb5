//! Session controller
//!
//! Owns the simulation state and drives it from the fixed-timestep driver.
//! Everything that reaches outside the simulation (redraw requests, the
//! game-over name prompt, the score ledger) goes through here.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::highscores::{ScoreLedger, ScoreRecord, format_table};
use crate::platform::{FixedStep, Key};
use crate::renderer::{self, Canvas};
use crate::sim::{self, GameEvent, GameState, Level, LevelSource};

/// What the game needs from the user interface shell
pub trait GameUi {
    /// The scene changed and should be drawn again
    fn request_redraw(&mut self);

    /// Ask for the player's name once a run ends; `None` or blank skips the ledger
    fn prompt_for_name(&mut self, baskets: u32, levels_cleared: u32) -> Option<String>;
}

/// A running game session
pub struct Game {
    state: GameState,
    levels: Box<dyn LevelSource>,
    ledger: Box<dyn ScoreLedger>,
    driver: FixedStep,
}

impl Game {
    /// Start a new session on level 1
    pub fn new(
        levels: impl LevelSource + 'static,
        ledger: impl ScoreLedger + 'static,
        driver: FixedStep,
    ) -> Self {
        let mut game = Self {
            state: GameState::new(Level::default()),
            levels: Box::new(levels),
            ledger: Box::new(ledger),
            driver,
        };
        game.restart();
        game
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Time until the driver wants the next tick
    pub fn until_next_tick(&self) -> Duration {
        self.driver.until_next()
    }

    /// `"Lives: {n} | Baskets Collected: {n} | Time Elapsed: {n}s"`
    pub fn status(&self) -> String {
        self.state.status()
    }

    pub fn on_key_down(&mut self, key: Key) {
        self.state.player.key_down(key);
    }

    pub fn on_key_up(&mut self, key: Key) {
        self.state.player.key_up(key);
    }

    /// Feed elapsed wall-clock time and run every tick that is due
    pub fn update(&mut self, elapsed: Duration, ui: &mut dyn GameUi) -> Vec<GameEvent> {
        let due = self.driver.advance(elapsed);
        let mut events = Vec::new();
        for _ in 0..due {
            let step = self.step(ui);
            let restarted = step.iter().any(|e| matches!(e, GameEvent::Restarted));
            events.extend(step);
            // A finished run restarted the driver; the rest of this batch is stale
            if restarted {
                break;
            }
        }
        events
    }

    /// Run exactly one tick, then handle game over and request a redraw
    ///
    /// A tick that panics is logged and skipped; the session keeps going.
    pub fn step(&mut self, ui: &mut dyn GameUi) -> Vec<GameEvent> {
        let state = &mut self.state;
        let levels = self.levels.as_ref();
        let mut events = match panic::catch_unwind(AssertUnwindSafe(|| sim::tick(state, levels))) {
            Ok(events) => events,
            Err(payload) => {
                log::error!(
                    "Tick {} failed: {}; skipping",
                    self.state.time_ticks,
                    panic_message(payload.as_ref())
                );
                Vec::new()
            }
        };

        for event in &events {
            log::debug!("{event:?}");
        }

        let finished = events.iter().find_map(|e| match e {
            GameEvent::GameOver {
                baskets,
                levels_cleared,
            } => Some((*baskets, *levels_cleared)),
            _ => None,
        });
        if let Some((baskets, levels_cleared)) = finished {
            events.extend(self.finish_run(ui, baskets, levels_cleared));
        }

        ui.request_redraw();
        events
    }

    /// Throw away the current run and start over on level 1
    pub fn restart(&mut self) -> Vec<GameEvent> {
        let events = sim::restart(&mut self.state, self.levels.as_ref());
        self.driver.restart();
        events
    }

    /// Stop the driver, offer the ledger, then start a fresh run
    fn finish_run(&mut self, ui: &mut dyn GameUi, baskets: u32, levels_cleared: u32) -> Vec<GameEvent> {
        self.driver.stop();

        match ui.prompt_for_name(baskets, levels_cleared) {
            Some(name) if !name.trim().is_empty() => {
                self.record_score(name.trim(), baskets, levels_cleared);
            }
            _ => log::info!("No name entered; score not recorded"),
        }

        self.restart()
    }

    fn record_score(&mut self, name: &str, baskets: u32, levels_cleared: u32) {
        match self.ledger.add_score(name, baskets, levels_cleared) {
            Ok(()) => log::info!("Recorded score for {name}: {baskets} baskets, {levels_cleared} levels"),
            Err(e) => log::warn!("Could not record score for {name}: {e}"),
        }
    }

    /// Ranked records; an unreadable ledger shows as empty
    pub fn high_scores(&self) -> Vec<ScoreRecord> {
        self.ledger.list_scores().unwrap_or_else(|e| {
            log::warn!("Could not read high scores: {e}");
            Vec::new()
        })
    }

    pub fn high_score_table(&self) -> String {
        format_table(&self.high_scores())
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        renderer::render(canvas, &self.state);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
