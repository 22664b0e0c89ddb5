//! Rendering module
//!
//! The game draws through the `Canvas` trait so the simulation never depends
//! on a particular display. Sprites are optional: when a canvas cannot draw
//! one, the entity is drawn as a solid rectangle in its fallback color.

pub mod terminal;

pub use terminal::TerminalCanvas;

use crate::sim::{ARENA, GameState, ObstacleKind, Rect};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const LIGHT_GREEN: Color = Color::rgb(144, 238, 144);
    pub const FOREST_GREEN: Color = Color::rgb(34, 139, 34);
    pub const GRAY: Color = Color::rgb(139, 137, 137);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const ORANGE: Color = Color::rgb(255, 200, 0);
}

/// Everything the game knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Background,
    Tree,
    Mountain,
    Basket,
    Ranger,
    Player,
}

impl Sprite {
    /// Solid color used when the sprite can't be drawn
    pub fn fallback_color(&self) -> Color {
        match self {
            Sprite::Background => Color::LIGHT_GREEN,
            Sprite::Tree => Color::FOREST_GREEN,
            Sprite::Mountain => Color::GRAY,
            Sprite::Basket => Color::YELLOW,
            Sprite::Ranger => Color::RED,
            Sprite::Player => Color::ORANGE,
        }
    }
}

impl From<ObstacleKind> for Sprite {
    fn from(kind: ObstacleKind) -> Self {
        match kind {
            ObstacleKind::Tree => Sprite::Tree,
            ObstacleKind::Mountain => Sprite::Mountain,
        }
    }
}

/// A drawing surface in arena coordinates
pub trait Canvas {
    /// Draw a sprite scaled to `bounds`; returns false if the sprite is unavailable
    fn draw_sprite(&mut self, sprite: Sprite, bounds: Rect) -> bool;

    fn fill_rect(&mut self, bounds: Rect, color: Color);
}

/// Draw a sprite, falling back to a solid rectangle
pub fn draw(canvas: &mut dyn Canvas, sprite: Sprite, bounds: Rect) {
    if !canvas.draw_sprite(sprite, bounds) {
        canvas.fill_rect(bounds, sprite.fallback_color());
    }
}

/// Draw the whole scene: background, obstacles, baskets, rangers, player
pub fn render(canvas: &mut dyn Canvas, state: &GameState) {
    draw(canvas, Sprite::Background, ARENA);

    let level = &state.level;
    for obstacle in &level.obstacles {
        draw(canvas, obstacle.kind.into(), obstacle.bounds);
    }
    for item in &level.items {
        draw(canvas, Sprite::Basket, item.bounds);
    }
    for ranger in &level.rangers {
        draw(canvas, Sprite::Ranger, ranger.bounds);
    }
    draw(canvas, Sprite::Player, state.player.bounds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Level, LevelDescriptor};
    use std::collections::HashSet;

    /// Records draw calls; sprites in `available` draw, the rest fall back
    #[derive(Default)]
    struct RecordingCanvas {
        available: HashSet<Sprite>,
        sprites: Vec<(Sprite, Rect)>,
        fills: Vec<(Rect, Color)>,
    }

    impl Canvas for RecordingCanvas {
        fn draw_sprite(&mut self, sprite: Sprite, bounds: Rect) -> bool {
            if self.available.contains(&sprite) {
                self.sprites.push((sprite, bounds));
                true
            } else {
                false
            }
        }

        fn fill_rect(&mut self, bounds: Rect, color: Color) {
            self.fills.push((bounds, color));
        }
    }

    fn sample_state() -> GameState {
        let text = "R,500,500,Vertical\nB,300,300\nO,Mountain,100,300\nO,Tree,600,100\n";
        GameState::new(Level::from_descriptor(
            &LevelDescriptor::parse(1, text).unwrap(),
        ))
    }

    #[test]
    fn test_draw_order() {
        let mut canvas = RecordingCanvas {
            available: [
                Sprite::Background,
                Sprite::Tree,
                Sprite::Mountain,
                Sprite::Basket,
                Sprite::Ranger,
                Sprite::Player,
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };
        render(&mut canvas, &sample_state());

        let order: Vec<Sprite> = canvas.sprites.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            order,
            vec![
                Sprite::Background,
                Sprite::Mountain,
                Sprite::Tree,
                Sprite::Basket,
                Sprite::Ranger,
                Sprite::Player,
            ]
        );
        assert!(canvas.fills.is_empty());
        assert_eq!(canvas.sprites[5].1, Rect::new(50, 50, 50, 50));
    }

    #[test]
    fn test_missing_sprites_fall_back_to_color() {
        let mut canvas = RecordingCanvas::default();
        render(&mut canvas, &sample_state());

        assert!(canvas.sprites.is_empty());
        assert_eq!(
            canvas.fills,
            vec![
                (ARENA, Color::LIGHT_GREEN),
                (Rect::new(100, 300, 100, 100), Color::GRAY),
                (Rect::new(600, 100, 50, 50), Color::FOREST_GREEN),
                (Rect::new(300, 300, 30, 30), Color::YELLOW),
                (Rect::new(500, 500, 40, 40), Color::RED),
                (Rect::new(50, 50, 50, 50), Color::ORANGE),
            ]
        );
    }
}
