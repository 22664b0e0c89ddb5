//! Terminal canvas
//!
//! Rasterises the 800×600 arena onto a grid of character cells. Each cell
//! keeps a glyph, a foreground and a background color; `present` writes the
//! grid with crossterm below a one-line header.

use std::io::{self, Write};

use crossterm::{
    QueueableCommand, cursor,
    style::{self, Print},
    terminal,
};

use super::{Canvas, Color, Sprite};
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::sim::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    glyph: char,
    fg: Color,
    bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            fg: Color::rgb(0, 0, 0),
            bg: Color::rgb(0, 0, 0),
        }
    }
}

/// A character-cell canvas sized to the terminal
#[derive(Debug, Clone)]
pub struct TerminalCanvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl TerminalCanvas {
    /// Canvas of `cols` × `rows` cells for the arena itself
    pub fn new(cols: u16, rows: u16) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols as usize * rows as usize],
        }
    }

    /// Canvas filling the current terminal, leaving room for the header line
    pub fn fit_terminal() -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::new(cols, rows.saturating_sub(1)))
    }

    /// Glyph at a cell, for inspection
    pub fn glyph_at(&self, col: u16, row: u16) -> Option<char> {
        self.index(col, row).map(|i| self.cells[i].glyph)
    }

    pub fn background_at(&self, col: u16, row: u16) -> Option<Color> {
        self.index(col, row).map(|i| self.cells[i].bg)
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| row as usize * self.cols as usize + col as usize)
    }

    /// Cell range covered by an arena span; never empty for a visible span
    fn span(start: i32, end: i32, extent: i32, cells: u16) -> (u16, u16) {
        let cells_i = cells as i64;
        let to_cell = |v: i32| -> i64 { (v.clamp(0, extent) as i64 * cells_i) / extent as i64 };
        let first = to_cell(start).min(cells_i - 1);
        let last = ((end.clamp(0, extent) as i64 * cells_i + extent as i64 - 1) / extent as i64)
            .max(first + 1)
            .min(cells_i);
        (first as u16, last as u16)
    }

    fn cover(&mut self, bounds: Rect, mut paint: impl FnMut(&mut Cell)) {
        if bounds.is_empty() {
            return;
        }
        let (c0, c1) = Self::span(bounds.x, bounds.right(), ARENA_WIDTH, self.cols);
        let (r0, r1) = Self::span(bounds.y, bounds.bottom(), ARENA_HEIGHT, self.rows);
        for row in r0..r1 {
            for col in c0..c1 {
                if let Some(i) = self.index(col, row) {
                    paint(&mut self.cells[i]);
                }
            }
        }
    }

    /// Write the header and the grid to `out`
    pub fn present<W: Write>(&self, out: &mut W, header: &str) -> io::Result<()> {
        out.queue(cursor::MoveTo(0, 0))?;
        out.queue(style::ResetColor)?;
        out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
        let header: String = header.chars().take(self.cols as usize).collect();
        out.queue(Print(header))?;

        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, row + 1))?;
            let mut current: Option<(Color, Color)> = None;
            for col in 0..self.cols {
                let cell = self.cells[row as usize * self.cols as usize + col as usize];
                if current != Some((cell.fg, cell.bg)) {
                    out.queue(style::SetForegroundColor(to_term(cell.fg)))?;
                    out.queue(style::SetBackgroundColor(to_term(cell.bg)))?;
                    current = Some((cell.fg, cell.bg));
                }
                out.queue(Print(cell.glyph))?;
            }
        }
        out.queue(style::ResetColor)?;
        out.flush()
    }
}

fn to_term(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

fn glyph(sprite: Sprite) -> Option<char> {
    match sprite {
        Sprite::Background => None,
        Sprite::Tree => Some('♣'),
        Sprite::Mountain => Some('▲'),
        Sprite::Basket => Some('u'),
        Sprite::Ranger => Some('R'),
        Sprite::Player => Some('Y'),
    }
}

impl Canvas for TerminalCanvas {
    fn draw_sprite(&mut self, sprite: Sprite, bounds: Rect) -> bool {
        let Some(glyph) = glyph(sprite) else {
            return false;
        };
        let fg = sprite.fallback_color();
        self.cover(bounds, |cell| {
            cell.glyph = glyph;
            cell.fg = fg;
        });
        true
    }

    fn fill_rect(&mut self, bounds: Rect, color: Color) {
        self.cover(bounds, |cell| {
            *cell = Cell {
                glyph: ' ',
                fg: color,
                bg: color,
            };
        });
    }
}
