//! Levels and level descriptors
//!
//! A descriptor is plain text, one record per line:
//!
//! ```text
//! O,<Tree|Mountain>,<x>,<y>
//! B,<x>,<y>
//! R,<x>,<y>,<Horizontal|Vertical>
//! ```
//!
//! Lines whose record type is not `O`, `B` or `R` (blank lines included) are
//! skipped. A known record type with bad fields fails the whole load, and so
//! does a coordinate more than one arena extent outside the arena.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use glam::IVec2;
use thiserror::Error;

use super::collision::ObstacleQuery;
use super::rect::Rect;
use super::state::{Item, MovementPattern, Obstacle, ObstacleKind, Ranger};
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// Why a level could not be loaded
#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("level {level}: no descriptor at {path}")]
    Missing { level: u32, path: PathBuf },
    #[error("level {level}: failed to read {path}: {source}")]
    Io {
        level: u32,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("level {level}, line {line}: {reason}")]
    Malformed {
        level: u32,
        line: usize,
        reason: String,
    },
}

/// Parsed contents of a level descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelDescriptor {
    pub obstacles: Vec<(ObstacleKind, IVec2)>,
    pub baskets: Vec<IVec2>,
    pub rangers: Vec<(IVec2, MovementPattern)>,
    /// Lines skipped because their record type is unknown
    pub ignored_lines: usize,
}

impl LevelDescriptor {
    pub fn parse(level: u32, text: &str) -> Result<Self, LevelLoadError> {
        let mut descriptor = Self::default();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let tokens: Vec<&str> = raw.split(',').map(str::trim).collect();
            let malformed = |reason: String| LevelLoadError::Malformed {
                level,
                line,
                reason,
            };

            match tokens[0] {
                "O" => {
                    expect_fields(&tokens, 4).map_err(malformed)?;
                    let kind = ObstacleKind::from_str(tokens[1])
                        .ok_or_else(|| malformed(format!("unknown obstacle kind '{}'", tokens[1])))?;
                    let pos = parse_pos(tokens[2], tokens[3]).map_err(malformed)?;
                    descriptor.obstacles.push((kind, pos));
                }
                "B" => {
                    expect_fields(&tokens, 3).map_err(malformed)?;
                    let pos = parse_pos(tokens[1], tokens[2]).map_err(malformed)?;
                    descriptor.baskets.push(pos);
                }
                "R" => {
                    expect_fields(&tokens, 4).map_err(malformed)?;
                    let pos = parse_pos(tokens[1], tokens[2]).map_err(malformed)?;
                    let pattern = MovementPattern::from_str(tokens[3]).ok_or_else(|| {
                        malformed(format!("unknown movement pattern '{}'", tokens[3]))
                    })?;
                    descriptor.rangers.push((pos, pattern));
                }
                other => {
                    log::debug!("level {level}, line {line}: ignoring record type '{other}'");
                    descriptor.ignored_lines += 1;
                }
            }
        }

        Ok(descriptor)
    }
}

fn expect_fields(tokens: &[&str], count: usize) -> Result<(), String> {
    if tokens.len() < count {
        return Err(format!(
            "expected {} fields, found {}",
            count,
            tokens.len()
        ));
    }
    Ok(())
}

fn parse_pos(x: &str, y: &str) -> Result<IVec2, String> {
    let x = parse_coord("x", x, ARENA_WIDTH)?;
    let y = parse_coord("y", y, ARENA_HEIGHT)?;
    Ok(IVec2::new(x, y))
}

/// Accepts `-extent..=2 * extent`; keeps every edge sum far from `i32` overflow
fn parse_coord(axis: &str, token: &str, extent: i32) -> Result<i32, String> {
    let value = token
        .parse::<i32>()
        .map_err(|e| format!("bad {axis} coordinate '{token}': {e}"))?;
    if !(-extent..=2 * extent).contains(&value) {
        return Err(format!(
            "{axis} coordinate {value} outside {}..={}",
            -extent,
            2 * extent
        ));
    }
    Ok(value)
}

/// Supplies level descriptors by level number
pub trait LevelSource {
    fn load(&self, level: u32) -> Result<LevelDescriptor, LevelLoadError>;
}

/// Reads `level<N>.txt` files from a directory
#[derive(Debug, Clone)]
pub struct DirLevelSource {
    dir: PathBuf,
}

impl DirLevelSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, level: u32) -> PathBuf {
        self.dir.join(format!("level{level}.txt"))
    }

}

impl LevelSource for DirLevelSource {
    fn load(&self, level: u32) -> Result<LevelDescriptor, LevelLoadError> {
        let path = self.path_for(level);
        let text = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LevelLoadError::Missing {
                    level,
                    path: path.clone(),
                }
            } else {
                LevelLoadError::Io {
                    level,
                    path: path.clone(),
                    source,
                }
            }
        })?;
        LevelDescriptor::parse(level, &text)
    }
}

/// Descriptor text held in memory, keyed by level number
#[derive(Debug, Clone, Default)]
pub struct MemoryLevelSource {
    levels: BTreeMap<u32, String>,
}

impl MemoryLevelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: u32, text: impl Into<String>) -> Self {
        self.levels.insert(level, text.into());
        self
    }
}

impl LevelSource for MemoryLevelSource {
    fn load(&self, level: u32) -> Result<LevelDescriptor, LevelLoadError> {
        let text = self
            .levels
            .get(&level)
            .ok_or_else(|| LevelLoadError::Missing {
                level,
                path: PathBuf::from(format!("<memory>/level{level}")),
            })?;
        LevelDescriptor::parse(level, text)
    }
}

/// One level's obstacles, baskets and rangers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Level {
    pub obstacles: Vec<Obstacle>,
    pub items: Vec<Item>,
    pub rangers: Vec<Ranger>,
}

impl Level {
    /// Load and build a level; nothing is constructed unless the whole descriptor is valid
    pub fn load(source: &dyn LevelSource, level: u32) -> Result<Self, LevelLoadError> {
        let descriptor = source.load(level)?;
        Ok(Self::from_descriptor(&descriptor))
    }

    pub fn from_descriptor(descriptor: &LevelDescriptor) -> Self {
        Self {
            obstacles: descriptor
                .obstacles
                .iter()
                .map(|&(kind, pos)| Obstacle::new(kind, pos))
                .collect(),
            items: descriptor.baskets.iter().map(|&pos| Item::new(pos)).collect(),
            rangers: descriptor
                .rangers
                .iter()
                .map(|&(pos, pattern)| Ranger::new(pos, pattern))
                .collect(),
        }
    }

    /// Advance every ranger by one tick
    pub fn update(&mut self) {
        let obstacles = self.obstacles.as_slice();
        for ranger in &mut self.rangers {
            ranger.update(obstacles);
        }
    }

    /// Remove the first basket (in insertion order) touching `player`
    ///
    /// At most one basket is removed per call. Returns whether one was.
    pub fn check_basket_collision(&mut self, player: &Rect) -> bool {
        match self.items.iter().position(|item| player.intersects(&item.bounds)) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn all_baskets_collected(&self) -> bool {
        self.items.is_empty()
    }

    pub fn check_enemy_collision(&self, player: &Rect) -> bool {
        self.rangers.iter().any(|r| player.intersects(&r.bounds))
    }

    pub fn check_obstacle_collision(&self, bounds: &Rect) -> bool {
        self.obstacles.collides(bounds)
    }
}

impl ObstacleQuery for Level {
    fn collides(&self, bounds: &Rect) -> bool {
        self.check_obstacle_collision(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
O,Tree,200,200
O,Mountain,400,300
B,100,100
B,600,500
R,300,50,Horizontal
R,700,100,Vertical
";

    #[test]
    fn test_parse_sample() {
        let d = LevelDescriptor::parse(1, SAMPLE).unwrap();
        assert_eq!(
            d.obstacles,
            vec![
                (ObstacleKind::Tree, IVec2::new(200, 200)),
                (ObstacleKind::Mountain, IVec2::new(400, 300)),
            ]
        );
        assert_eq!(d.baskets, vec![IVec2::new(100, 100), IVec2::new(600, 500)]);
        assert_eq!(
            d.rangers,
            vec![
                (IVec2::new(300, 50), MovementPattern::Horizontal),
                (IVec2::new(700, 100), MovementPattern::Vertical),
            ]
        );
        assert_eq!(d.ignored_lines, 0);
    }

    #[test]
    fn test_unknown_record_types_are_skipped() {
        let text = "# comment\n\nX,1,2\nB,10,10\nb,20,20\n";
        let d = LevelDescriptor::parse(3, text).unwrap();
        assert_eq!(d.baskets, vec![IVec2::new(10, 10)]);
        assert_eq!(d.ignored_lines, 4);
    }

    #[test]
    fn test_whitespace_and_crlf_tolerated() {
        let d = LevelDescriptor::parse(1, "R, 10 ,20, Vertical\r\nB,1,2\r\n").unwrap();
        assert_eq!(d.rangers, vec![(IVec2::new(10, 20), MovementPattern::Vertical)]);
        assert_eq!(d.baskets.len(), 1);
    }

    #[test]
    fn test_bad_fields_fail_the_load() {
        for text in [
            "B,10\n",
            "B,ten,10\n",
            "O,Bush,10,10\n",
            "R,10,10,Diagonal\n",
            "O,Tree,10\n",
            "B,2147483640,0\n",
            "R,10,-2147483648,Vertical\n",
            "O,Mountain,1601,0\n",
        ] {
            let err = LevelDescriptor::parse(2, &format!("B,1,1\n{text}")).unwrap_err();
            match err {
                LevelLoadError::Malformed { level, line, .. } => {
                    assert_eq!(level, 2);
                    assert_eq!(line, 2);
                }
                other => panic!("unexpected error for {text:?}: {other}"),
            }
        }
    }

    #[test]
    fn test_coordinates_near_the_arena_are_accepted() {
        let d = LevelDescriptor::parse(1, "B,-800,1200\nR,1600,-600,Horizontal\n").unwrap();
        assert_eq!(d.baskets, vec![IVec2::new(-800, 1200)]);
        assert_eq!(d.rangers[0].0, IVec2::new(1600, -600));
    }

    #[test]
    fn test_huge_coordinate_fails_the_load() {
        let source = MemoryLevelSource::new().with_level(1, "B,2147483640,0\nB,700,500\n");
        assert!(matches!(
            Level::load(&source, 1),
            Err(LevelLoadError::Malformed { level: 1, line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_level() {
        let source = MemoryLevelSource::new().with_level(1, SAMPLE);
        assert!(Level::load(&source, 1).is_ok());
        assert!(matches!(
            Level::load(&source, 2),
            Err(LevelLoadError::Missing { level: 2, .. })
        ));
    }

    #[test]
    fn test_dir_source_missing_file() {
        let source = DirLevelSource::new(std::env::temp_dir().join("ranger-run-no-such-dir"));
        assert!(matches!(
            source.load(1),
            Err(LevelLoadError::Missing { level: 1, .. })
        ));
    }

    #[test]
    fn test_dir_source_reads_file() {
        let dir = std::env::temp_dir().join(format!("ranger-run-levels-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("level4.txt"), SAMPLE).unwrap();

        let level = Level::load(&DirLevelSource::new(&dir), 4).unwrap();
        assert_eq!(level.obstacles.len(), 2);
        assert_eq!(level.items.len(), 2);
        assert_eq!(level.rangers.len(), 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_basket_removed_at_most_once_per_call() {
        let text = "B,50,50\nB,60,60\nB,70,70\n";
        let mut level = Level::from_descriptor(&LevelDescriptor::parse(1, text).unwrap());
        let player = Rect::new(50, 50, 50, 50);

        for remaining in (0..3).rev() {
            assert!(level.check_basket_collision(&player));
            assert_eq!(level.items.len(), remaining);
        }
        assert!(level.all_baskets_collected());
        assert!(!level.check_basket_collision(&player));
    }

    #[test]
    fn test_first_basket_in_order_is_taken() {
        let text = "B,90,90\nB,50,50\n";
        let mut level = Level::from_descriptor(&LevelDescriptor::parse(1, text).unwrap());
        assert!(level.check_basket_collision(&Rect::new(50, 50, 50, 50)));
        assert_eq!(level.items, vec![Item::new(IVec2::new(50, 50))]);
    }

    #[test]
    fn test_enemy_collision_is_pure() {
        let level = Level::from_descriptor(
            &LevelDescriptor::parse(1, "R,100,100,Horizontal\n").unwrap(),
        );
        assert!(level.check_enemy_collision(&Rect::new(100, 110, 50, 50)));
        assert!(!level.check_enemy_collision(&Rect::new(300, 300, 50, 50)));
        assert_eq!(level.rangers[0].pos(), IVec2::new(100, 100));
    }

    #[test]
    fn test_update_moves_rangers_around_obstacles() {
        let text = "O,Tree,141,100\nR,100,100,Horizontal\nR,100,300,Horizontal\n";
        let mut level = Level::from_descriptor(&LevelDescriptor::parse(1, text).unwrap());
        level.update();
        assert_eq!(level.rangers[0].pos(), IVec2::new(100, 100));
        assert_eq!(level.rangers[0].direction, -1);
        assert_eq!(level.rangers[1].pos(), IVec2::new(102, 300));
        assert_eq!(level.obstacles.len(), 1);
    }
}
