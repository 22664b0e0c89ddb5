//! Ranger Run - a real-time 2D arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, levels, collisions, game state)
//! - `game`: Session controller driving the simulation at a fixed cadence
//! - `renderer`: Canvas abstraction, draw order and the terminal canvas
//! - `platform`: Input mapping and the fixed-timestep driver
//! - `highscores`: Ranked score ledger
//! - `settings`: File-backed configuration

pub mod game;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::{Game, GameUi};
pub use highscores::{HighScores, JsonFileLedger, ScoreLedger, ScoreRecord};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (~60 Hz)
    pub const TICK_MS: u64 = 16;

    /// Arena dimensions
    pub const ARENA_WIDTH: i32 = 800;
    pub const ARENA_HEIGHT: i32 = 600;

    /// Number of levels in a campaign
    pub const MAX_LEVEL: u32 = 10;
    /// Lives at the start of a session
    pub const STARTING_LIVES: u32 = 3;

    /// Where the player spawns on every level load and after losing a life
    pub const PLAYER_START_X: i32 = 50;
    pub const PLAYER_START_Y: i32 = 50;
    pub const PLAYER_SIZE: i32 = 50;
    pub const PLAYER_SPEED: i32 = 5;

    pub const RANGER_SIZE: i32 = 40;
    pub const RANGER_SPEED: i32 = 2;

    pub const BASKET_SIZE: i32 = 30;

    pub const TREE_SIZE: i32 = 50;
    pub const MOUNTAIN_SIZE: i32 = 100;
}
