//! Collision queries shared by every moving entity
//!
//! Moving entities never hold a reference to the level that owns them.
//! Instead the level hands them an `ObstacleQuery` for the duration of a
//! single update.

use super::rect::Rect;
use super::state::Obstacle;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// The playable area; every position the player commits lies inside it
pub const ARENA: Rect = Rect::new(0, 0, ARENA_WIDTH, ARENA_HEIGHT);

/// Answers "would these bounds hit an obstacle?"
pub trait ObstacleQuery {
    fn collides(&self, bounds: &Rect) -> bool;
}

impl ObstacleQuery for [Obstacle] {
    fn collides(&self, bounds: &Rect) -> bool {
        self.iter().any(|o| bounds.intersects(&o.bounds))
    }
}

impl ObstacleQuery for Vec<Obstacle> {
    fn collides(&self, bounds: &Rect) -> bool {
        self.as_slice().collides(bounds)
    }
}

/// An open field with nothing in the way
pub struct NoObstacles;

impl ObstacleQuery for NoObstacles {
    fn collides(&self, _bounds: &Rect) -> bool {
        false
    }
}

/// True if `bounds` fits entirely within the arena
#[inline]
pub fn within_arena(bounds: &Rect) -> bool {
    bounds.inside(&ARENA)
}
