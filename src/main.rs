//! Ranger Run entry point
//!
//! Terminal front end: raw mode on the alternate screen, an input thread
//! forwarding crossterm events over a channel, and a frame loop that feeds
//! wall-clock time to the game and redraws when asked.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write, stdout};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Print},
    terminal,
};

use ranger_run::platform::Key;
use ranger_run::renderer::TerminalCanvas;
use ranger_run::settings::DEFAULT_SETTINGS_FILE;
use ranger_run::sim::DirLevelSource;
use ranger_run::{Game, GameUi, JsonFileLedger, Settings};

/// Terminals without key-release reporting: a movement key counts as
/// released once no press/repeat has arrived for this long. Must exceed the
/// usual initial key-repeat delay (250-500 ms).
const HOLD_WINDOW: Duration = Duration::from_millis(500);

/// Upper bound on a single idle sleep so input stays responsive
const MAX_IDLE: Duration = Duration::from_millis(8);

const HELP: &str = "WASD/arrows move  R restart  H highscores  Q quit";

enum Command {
    Quit,
    Restart,
    ShowScores,
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Char(c) => Key::from_char(c),
        _ => None,
    }
}

fn map_command(code: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Command::ShowScores),
        _ => None,
    }
}

/// Held keys with no press/repeat inside `HOLD_WINDOW`
fn released_keys(held: &HashMap<Key, Instant>, now: Instant) -> Vec<Key> {
    held.iter()
        .filter(|(_, seen)| now.duration_since(**seen) > HOLD_WINDOW)
        .map(|(key, _)| *key)
        .collect()
}

/// Puts the terminal back however `main` exits
struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.keyboard_enhanced {
            let _ = out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = out.execute(style::ResetColor);
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Screen, input channel and redraw flag; the game's view of the UI shell
struct Terminal {
    out: BufWriter<Stdout>,
    rx: Receiver<Event>,
    canvas: TerminalCanvas,
    dirty: bool,
}

impl Terminal {
    fn draw(&mut self, game: &Game) -> io::Result<()> {
        game.render(&mut self.canvas);
        let header = format!("{}   {}", game.status(), HELP);
        self.canvas.present(&mut self.out, &header)?;
        self.dirty = false;
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> io::Result<()> {
        self.canvas = TerminalCanvas::new(cols, rows.saturating_sub(1));
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        self.dirty = true;
        Ok(())
    }

    /// Overwrite the header line with `text`
    fn show_line(&mut self, text: &str) -> io::Result<()> {
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.queue(style::ResetColor)?;
        self.out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
        self.out.queue(Print(text))?;
        self.out.flush()
    }

    /// Blocking line editor on the header line; `None` on Esc
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        loop {
            self.show_line(&format!("{prompt}{line}_"))?;
            let Ok(event) = self.rx.recv() else {
                return Ok(None);
            };
            let Event::Key(KeyEvent { code, kind, .. }) = event else {
                continue;
            };
            if kind == KeyEventKind::Release {
                continue;
            }
            match code {
                KeyCode::Enter => return Ok(Some(line)),
                KeyCode::Esc => return Ok(None),
                KeyCode::Backspace => {
                    line.pop();
                }
                KeyCode::Char(c) if line.chars().count() < 100 => line.push(c),
                _ => {}
            }
        }
    }

    /// Draw the highscore table over the arena until a key is pressed
    fn show_scores(&mut self, table: &str) -> io::Result<()> {
        self.out.queue(style::ResetColor)?;
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        for (row, line) in table.lines().chain(["", "Press any key"]).enumerate() {
            self.out.queue(cursor::MoveTo(2, row as u16 + 1))?;
            self.out.queue(Print(line))?;
        }
        self.out.flush()?;

        while let Ok(event) = self.rx.recv() {
            if let Event::Key(KeyEvent {
                kind: KeyEventKind::Press,
                ..
            }) = event
            {
                break;
            }
        }
        self.dirty = true;
        Ok(())
    }
}

impl GameUi for Terminal {
    fn request_redraw(&mut self) {
        self.dirty = true;
    }

    fn prompt_for_name(&mut self, baskets: u32, levels_cleared: u32) -> Option<String> {
        let prompt =
            format!("Game Over! {baskets} baskets, {levels_cleared} levels cleared. Enter your name: ");
        match self.read_line(&prompt) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("Name prompt failed: {e}");
                None
            }
        }
    }
}

fn init_logging(settings: &Settings) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = &settings.log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Cannot open log file {}: {e}", path.display()),
        }
    }
    builder.init();
}

fn load_settings() -> Settings {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    match Settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}; using default settings");
            Settings::default()
        }
    }
}

fn main() -> io::Result<()> {
    let settings = load_settings();
    init_logging(&settings);
    log::info!("Ranger Run starting: {settings:?}");

    // Tick panics are caught by the game; keep their reports off the screen
    std::panic::set_hook(Box::new(|info| log::error!("{info}")));

    let levels = DirLevelSource::new(&settings.levels_dir);
    let ledger = JsonFileLedger::open_or_empty(&settings.scores_path);
    let mut game = Game::new(levels, ledger, settings.driver());

    terminal::enable_raw_mode()?;
    let mut guard = TerminalGuard {
        keyboard_enhanced: false,
    };
    let mut out = BufWriter::new(stdout());
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for key-release events; terminals that can't do this fall back to HOLD_WINDOW
    let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
        && out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();
    guard.keyboard_enhanced = keyboard_enhanced;
    log::info!("Keyboard release events: {keyboard_enhanced}");

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Input thread stopped: {e}");
                    break;
                }
            }
        }
    });

    let mut term = Terminal {
        out,
        rx,
        canvas: TerminalCanvas::fit_terminal()?,
        dirty: true,
    };

    let result = run(&mut game, &mut term, keyboard_enhanced);
    drop(guard);
    log::info!("Ranger Run exiting");
    result
}

/// Frame loop; returns when the player quits
fn run(game: &mut Game, term: &mut Terminal, keyboard_enhanced: bool) -> io::Result<()> {
    // Last press/repeat per held movement key (release emulation)
    let mut held: HashMap<Key, Instant> = HashMap::new();
    let mut last_frame = Instant::now();

    loop {
        while let Ok(event) = term.rx.try_recv() {
            match event {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => {
                    if let Some(key) = map_key(code) {
                        match kind {
                            KeyEventKind::Press | KeyEventKind::Repeat => {
                                held.insert(key, Instant::now());
                                game.on_key_down(key);
                            }
                            KeyEventKind::Release => {
                                held.remove(&key);
                                game.on_key_up(key);
                            }
                        }
                        continue;
                    }
                    if kind != KeyEventKind::Press {
                        continue;
                    }
                    match map_command(code, modifiers) {
                        Some(Command::Quit) => return Ok(()),
                        Some(Command::Restart) => {
                            held.clear();
                            game.restart();
                            term.dirty = true;
                        }
                        Some(Command::ShowScores) => {
                            term.show_scores(&game.high_score_table())?;
                            last_frame = Instant::now();
                        }
                        None => {}
                    }
                }
                Event::Resize(cols, rows) => term.resize(cols, rows)?,
                _ => {}
            }
        }

        if !keyboard_enhanced {
            for key in released_keys(&held, Instant::now()) {
                held.remove(&key);
                game.on_key_up(key);
            }
        }

        let now = Instant::now();
        game.update(now.duration_since(last_frame), term);
        // The name prompt may have blocked inside update
        last_frame = Instant::now();

        if term.dirty {
            term.draw(game)?;
        }

        thread::sleep(game.until_next_tick().clamp(Duration::from_millis(1), MAX_IDLE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_key_survives_initial_repeat_delay() {
        let start = Instant::now();
        let held: HashMap<Key, Instant> = [(Key::D, start)].into_iter().collect();

        // Typical gap between the first press and the first auto-repeat
        assert!(released_keys(&held, start + Duration::from_millis(400)).is_empty());
        assert_eq!(
            released_keys(&held, start + Duration::from_millis(600)),
            vec![Key::D]
        );
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(KeyCode::Left), Some(Key::Left));
        assert_eq!(map_key(KeyCode::Char('W')), Some(Key::W));
        assert_eq!(map_key(KeyCode::Char('x')), None);
        assert!(matches!(
            map_command(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Command::Quit)
        ));
        assert!(matches!(
            map_command(KeyCode::Char('r'), KeyModifiers::NONE),
            Some(Command::Restart)
        ));
    }
}
