//! Game state and core simulation types
//!
//! Entities, the cross-level session counters and the aggregate `GameState`
//! that the transition functions in `tick` operate on.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::collision::{ObstacleQuery, within_arena};
use super::level::Level;
use super::rect::Rect;
use crate::consts::*;
use crate::platform::input::{Axis, Key};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ticks are being applied
    Playing,
    /// Lives ran out or the last level was cleared; waiting for restart
    GameOver,
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Tree,
    Mountain,
}

impl ObstacleKind {
    /// Side length of the obstacle's square footprint
    pub fn size(&self) -> i32 {
        match self {
            ObstacleKind::Tree => TREE_SIZE,
            ObstacleKind::Mountain => MOUNTAIN_SIZE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Tree => "Tree",
            ObstacleKind::Mountain => "Mountain",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Tree" => Some(ObstacleKind::Tree),
            "Mountain" => Some(ObstacleKind::Mountain),
            _ => None,
        }
    }
}

/// A static obstacle; never moves, never removed during a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub bounds: Rect,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, pos: IVec2) -> Self {
        Self {
            kind,
            bounds: Rect::square(pos, kind.size()),
        }
    }
}

/// A collectible basket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub bounds: Rect,
}

impl Item {
    pub fn new(pos: IVec2) -> Self {
        Self {
            bounds: Rect::square(pos, BASKET_SIZE),
        }
    }
}

/// Axis a ranger patrols along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementPattern {
    Horizontal,
    Vertical,
}

impl MovementPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementPattern::Horizontal => "Horizontal",
            MovementPattern::Vertical => "Vertical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Horizontal" => Some(MovementPattern::Horizontal),
            "Vertical" => Some(MovementPattern::Vertical),
            _ => None,
        }
    }

    /// Arena extent along the patrol axis
    fn axis_limit(&self) -> i32 {
        match self {
            MovementPattern::Horizontal => ARENA_WIDTH,
            MovementPattern::Vertical => ARENA_HEIGHT,
        }
    }
}

/// A patrolling enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranger {
    pub bounds: Rect,
    pub pattern: MovementPattern,
    pub speed: i32,
    /// +1 or -1 along the patrol axis
    pub direction: i32,
}

impl Ranger {
    pub fn new(pos: IVec2, pattern: MovementPattern) -> Self {
        Self {
            bounds: Rect::square(pos, RANGER_SIZE),
            pattern,
            speed: RANGER_SPEED,
            direction: 1,
        }
    }

    #[inline]
    pub fn pos(&self) -> IVec2 {
        self.bounds.pos()
    }

    /// Advance one tick along the patrol axis
    ///
    /// Leaving the arena flips the direction and the clamped position is
    /// committed. Running into an obstacle flips the direction and the
    /// ranger stays where it is for this tick.
    pub fn update<Q: ObstacleQuery + ?Sized>(&mut self, obstacles: &Q) {
        let (current, size) = match self.pattern {
            MovementPattern::Horizontal => (self.bounds.x, self.bounds.width),
            MovementPattern::Vertical => (self.bounds.y, self.bounds.height),
        };
        let max = self.pattern.axis_limit() - size;

        let mut next = current + self.speed * self.direction;
        if next < 0 || next > max {
            self.direction = -self.direction;
            next = next.clamp(0, max);
        }

        let next_pos = match self.pattern {
            MovementPattern::Horizontal => IVec2::new(next, self.bounds.y),
            MovementPattern::Vertical => IVec2::new(self.bounds.x, next),
        };
        let next_bounds = self.bounds.at(next_pos);

        if obstacles.collides(&next_bounds) {
            self.direction = -self.direction;
        } else {
            self.bounds = next_bounds;
        }
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub bounds: Rect,
    /// Per-tick displacement requested by the held keys
    pub velocity: IVec2,
    pub speed: i32,
    pub baskets_collected: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            bounds: Rect::square(Self::start_position(), PLAYER_SIZE),
            velocity: IVec2::ZERO,
            speed: PLAYER_SPEED,
            baskets_collected: 0,
        }
    }
}

impl Player {
    pub const fn start_position() -> IVec2 {
        IVec2::new(PLAYER_START_X, PLAYER_START_Y)
    }

    #[inline]
    pub fn pos(&self) -> IVec2 {
        self.bounds.pos()
    }

    pub fn set_position(&mut self, pos: IVec2) {
        self.bounds = self.bounds.at(pos);
    }

    /// Back to the spawn point with no movement intent
    pub fn respawn(&mut self) {
        self.set_position(Self::start_position());
        self.velocity = IVec2::ZERO;
    }

    /// Move by the velocity intent unless that would hit an obstacle or
    /// leave the arena. A blocked move keeps the intent.
    pub fn update<Q: ObstacleQuery + ?Sized>(&mut self, obstacles: &Q) {
        let next_bounds = self.bounds.at(self.pos() + self.velocity);
        if !obstacles.collides(&next_bounds) && within_arena(&next_bounds) {
            self.bounds = next_bounds;
        }
    }

    pub fn key_down(&mut self, key: Key) {
        let step = key.sign() * self.speed;
        match key.axis() {
            Axis::Horizontal => self.velocity.x = step,
            Axis::Vertical => self.velocity.y = step,
        }
    }

    /// Releasing either key of a pair stops movement on that axis
    pub fn key_up(&mut self, key: Key) {
        match key.axis() {
            Axis::Horizontal => self.velocity.x = 0,
            Axis::Vertical => self.velocity.y = 0,
        }
    }
}

/// Cross-level counters for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub lives: u32,
    /// 1-based; one past `MAX_LEVEL` once the final level has been cleared
    pub level_number: u32,
    pub total_baskets: u32,
    /// Ticks since the current level was loaded
    pub level_ticks: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            lives: STARTING_LIVES,
            level_number: 1,
            total_baskets: 0,
            level_ticks: 0,
        }
    }
}

impl Session {
    /// Whole seconds of simulated time on the current level
    pub fn elapsed_secs(&self) -> u64 {
        self.level_ticks * TICK_MS / 1000
    }

    pub fn levels_cleared(&self) -> u32 {
        self.level_number.saturating_sub(1)
    }

    pub fn is_over(&self) -> bool {
        self.lives == 0
    }
}

/// Something that happened during a transition, for the controller and UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    BasketCollected { total: u32 },
    LifeLost { remaining: u32 },
    LevelLoaded { level: u32 },
    /// The level descriptor could not be loaded; play continues on an empty level
    LevelLoadFailed { level: u32, reason: String },
    GameOver { baskets: u32, levels_cleared: u32 },
    Restarted,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    pub session: Session,
    pub player: Player,
    pub level: Level,
    /// Simulation tick counter across the whole process
    pub time_ticks: u64,
}

impl GameState {
    /// A fresh run on the given level; use `tick::restart` to load level 1 from a source
    pub fn new(level: Level) -> Self {
        Self {
            phase: GamePhase::Playing,
            session: Session::default(),
            player: Player::default(),
            level,
            time_ticks: 0,
        }
    }

    /// `"Lives: {n} | Baskets Collected: {n} | Time Elapsed: {n}s"`
    pub fn status(&self) -> String {
        format!(
            "Lives: {} | Baskets Collected: {} | Time Elapsed: {}s",
            self.session.lives,
            self.session.total_baskets,
            self.session.elapsed_secs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::NoObstacles;
    use proptest::prelude::*;

    fn tree_at(x: i32, y: i32) -> Vec<Obstacle> {
        vec![Obstacle::new(ObstacleKind::Tree, IVec2::new(x, y))]
    }

    #[test]
    fn test_obstacle_sizes() {
        let tree = Obstacle::new(ObstacleKind::Tree, IVec2::new(10, 20));
        let mountain = Obstacle::new(ObstacleKind::Mountain, IVec2::new(10, 20));
        assert_eq!(tree.bounds, Rect::new(10, 20, 50, 50));
        assert_eq!(mountain.bounds, Rect::new(10, 20, 100, 100));
        assert_eq!(Item::new(IVec2::new(5, 5)).bounds, Rect::new(5, 5, 30, 30));
    }

    #[test]
    fn test_ranger_patrols_horizontally() {
        let mut ranger = Ranger::new(IVec2::new(100, 100), MovementPattern::Horizontal);
        ranger.update(&NoObstacles);
        assert_eq!(ranger.pos(), IVec2::new(102, 100));
        assert_eq!(ranger.direction, 1);
    }

    #[test]
    fn test_ranger_boundary_flip_clamps_and_moves() {
        let mut ranger = Ranger::new(IVec2::new(798, 100), MovementPattern::Horizontal);
        ranger.update(&NoObstacles);
        assert_eq!(ranger.direction, -1);
        assert_eq!(ranger.pos().x, 760);

        ranger.update(&NoObstacles);
        assert_eq!(ranger.pos().x, 758);
    }

    #[test]
    fn test_ranger_vertical_flip_at_top() {
        let mut ranger = Ranger::new(IVec2::new(300, 1), MovementPattern::Vertical);
        ranger.direction = -1;
        ranger.update(&NoObstacles);
        assert_eq!(ranger.direction, 1);
        assert_eq!(ranger.pos(), IVec2::new(300, 0));
    }

    #[test]
    fn test_ranger_obstacle_bounce_stays_put() {
        // Tree starts at x=141; one step right would overlap it
        let obstacles = tree_at(141, 100);
        let mut ranger = Ranger::new(IVec2::new(100, 100), MovementPattern::Horizontal);

        ranger.update(&obstacles);
        assert_eq!(ranger.pos(), IVec2::new(100, 100));
        assert_eq!(ranger.direction, -1);

        // Now heading away from the tree, so the move goes through
        ranger.update(&obstacles);
        assert_eq!(ranger.pos(), IVec2::new(98, 100));
    }

    #[test]
    fn test_player_blocked_by_wall_keeps_intent() {
        let mut player = Player::default();
        player.set_position(IVec2::new(0, 200));
        player.key_down(Key::Left);
        player.update(&NoObstacles);
        assert_eq!(player.pos(), IVec2::new(0, 200));
        assert_eq!(player.velocity.x, -5);

        player.key_up(Key::A);
        assert_eq!(player.velocity.x, 0);
    }

    #[test]
    fn test_player_blocked_by_obstacle() {
        let obstacles = tree_at(103, 50);
        let mut player = Player::default();
        player.key_down(Key::D);
        player.update(&obstacles);
        // 50 + 5 = 55, right edge 105 would overlap the tree at 103
        assert_eq!(player.pos(), IVec2::new(50, 50));
        assert_eq!(player.velocity, IVec2::new(5, 0));
    }

    #[test]
    fn test_player_diagonal_move() {
        let mut player = Player::default();
        player.key_down(Key::S);
        player.key_down(Key::Right);
        player.update(&NoObstacles);
        assert_eq!(player.pos(), IVec2::new(55, 55));

        // Releasing the other key of the pair still stops the axis
        player.key_up(Key::Down);
        assert_eq!(player.velocity, IVec2::new(5, 0));
    }

    #[test]
    fn test_player_respawn_clears_intent() {
        let mut player = Player::default();
        player.set_position(IVec2::new(300, 300));
        player.key_down(Key::W);
        player.respawn();
        assert_eq!(player.pos(), IVec2::new(50, 50));
        assert_eq!(player.velocity, IVec2::ZERO);
    }

    #[test]
    fn test_status_format() {
        let mut state = GameState::new(Level::default());
        state.session.total_baskets = 4;
        state.session.level_ticks = 130; // 2080 ms
        assert_eq!(
            state.status(),
            "Lives: 3 | Baskets Collected: 4 | Time Elapsed: 2s"
        );
    }

    fn any_key() -> impl Strategy<Value = Key> {
        prop::sample::select(vec![
            Key::W,
            Key::A,
            Key::S,
            Key::D,
            Key::Up,
            Key::Down,
            Key::Left,
            Key::Right,
        ])
    }

    proptest! {
        #[test]
        fn prop_player_never_leaves_arena(
            keys in prop::collection::vec((any_key(), any::<bool>()), 1..40),
            steps in 1..30usize,
        ) {
            let mut player = Player::default();
            for (key, down) in keys {
                if down { player.key_down(key) } else { player.key_up(key) }
                for _ in 0..steps {
                    player.update(&NoObstacles);
                    prop_assert!(within_arena(&player.bounds));
                }
            }
        }

        #[test]
        fn prop_ranger_stays_in_range(
            x in 0..=760i32,
            y in 0..=560i32,
            vertical in any::<bool>(),
            steps in 1..900usize,
        ) {
            let pattern = if vertical { MovementPattern::Vertical } else { MovementPattern::Horizontal };
            let mut ranger = Ranger::new(IVec2::new(x, y), pattern);
            for _ in 0..steps {
                ranger.update(&NoObstacles);
                prop_assert!(within_arena(&ranger.bounds));
                prop_assert!(ranger.direction == 1 || ranger.direction == -1);
            }
        }
    }
}
