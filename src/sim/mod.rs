//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Integer arena coordinates
//! - Stable iteration order (insertion order of the level descriptor)
//! - No rendering or platform dependencies beyond key identities

pub mod collision;
pub mod level;
pub mod rect;
pub mod state;
pub mod tick;

pub use collision::{ARENA, NoObstacles, ObstacleQuery, within_arena};
pub use level::{
    DirLevelSource, Level, LevelDescriptor, LevelLoadError, LevelSource, MemoryLevelSource,
};
pub use rect::Rect;
pub use state::{
    GameEvent, GamePhase, GameState, Item, MovementPattern, Obstacle, ObstacleKind, Player,
    Ranger, Session,
};
pub use tick::{advance_level, game_over, restart, tick};
