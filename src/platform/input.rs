//! Movement keys
//!
//! WASD and the arrow keys both steer the player. Anything else maps to
//! `None` and is ignored by the game.

/// Axis a movement key acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A movement key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Map a typed character (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Key::W),
            'a' => Some(Key::A),
            's' => Some(Key::S),
            'd' => Some(Key::D),
            _ => None,
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Key::A | Key::D | Key::Left | Key::Right => Axis::Horizontal,
            Key::W | Key::S | Key::Up | Key::Down => Axis::Vertical,
        }
    }

    /// Direction along the axis in screen space (y grows downward)
    pub fn sign(&self) -> i32 {
        match self {
            Key::W | Key::Up | Key::A | Key::Left => -1,
            Key::S | Key::Down | Key::D | Key::Right => 1,
        }
    }
}
