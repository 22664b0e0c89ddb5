//! High score ledger
//!
//! Append-only records ranked by baskets collected, then levels cleared.
//! Equal records keep their insertion order.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: u32,
    pub player_name: String,
    pub baskets_collected: u32,
    pub levels_cleared: u32,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("score file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable ranked store of completed runs
pub trait ScoreLedger {
    fn add_score(
        &mut self,
        player_name: &str,
        baskets_collected: u32,
        levels_cleared: u32,
    ) -> Result<(), LedgerError>;

    /// All records, best first
    fn list_scores(&self) -> Result<Vec<ScoreRecord>, LedgerError>;
}

/// In-memory ledger (insertion order; ranked on read)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<ScoreRecord>,
    #[serde(default)]
    next_id: u32,
}

impl HighScores {
    /// Create empty ledger
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a record and return its id
    pub fn push(&mut self, player_name: &str, baskets_collected: u32, levels_cleared: u32) -> u32 {
        // Files written by hand may lack `next_id`
        let max_id = self.entries.iter().map(|e| e.id).max().unwrap_or(0);
        let id = self.next_id.max(max_id + 1);
        self.next_id = id + 1;

        self.entries.push(ScoreRecord {
            id,
            player_name: player_name.to_string(),
            baskets_collected,
            levels_cleared,
        });
        id
    }

    /// Records sorted by (baskets desc, levels desc); stable for ties
    pub fn ranked(&self) -> Vec<ScoreRecord> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| {
            b.baskets_collected
                .cmp(&a.baskets_collected)
                .then(b.levels_cleared.cmp(&a.levels_cleared))
        });
        ranked
    }
}

impl ScoreLedger for HighScores {
    fn add_score(
        &mut self,
        player_name: &str,
        baskets_collected: u32,
        levels_cleared: u32,
    ) -> Result<(), LedgerError> {
        self.push(player_name, baskets_collected, levels_cleared);
        Ok(())
    }

    fn list_scores(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.ranked())
    }
}

/// Ledger persisted as a JSON file
///
/// Every write goes to `<path>.tmp` first and is then renamed over the file.
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
    scores: HighScores,
}

impl JsonFileLedger {
    /// Open the ledger at `path`; a missing file is an empty ledger
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let scores = match fs::read_to_string(&path) {
            Ok(json) => {
                let scores: HighScores = serde_json::from_str(&json)?;
                log::info!("Loaded {} high scores from {}", scores.entries.len(), path.display());
                scores
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No high scores at {}, starting fresh", path.display());
                HighScores::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, scores })
    }

    /// Open the ledger, or fall back to an unsaved empty one if the file is unusable
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(ledger) => ledger,
            Err(e) => {
                log::warn!("Ignoring high score file {}: {}", path.display(), e);
                Self {
                    path,
                    scores: HighScores::new(),
                }
            }
        }
    }

    fn save(&self) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(&self.scores)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("High scores saved ({} entries)", self.scores.entries.len());
        Ok(())
    }
}

impl ScoreLedger for JsonFileLedger {
    fn add_score(
        &mut self,
        player_name: &str,
        baskets_collected: u32,
        levels_cleared: u32,
    ) -> Result<(), LedgerError> {
        let mut updated = self.scores.clone();
        updated.push(player_name, baskets_collected, levels_cleared);
        let previous = std::mem::replace(&mut self.scores, updated);

        // Keep memory and disk in agreement when the write fails
        if let Err(e) = self.save() {
            self.scores = previous;
            return Err(e);
        }
        Ok(())
    }

    fn list_scores(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.scores.ranked())
    }
}

/// `"Highscores:"` followed by `"{rank}. {name} - {baskets}"` lines
pub fn format_table(records: &[ScoreRecord]) -> String {
    let mut table = String::from("Highscores:\n");
    for (i, record) in records.iter().enumerate() {
        table.push_str(&format!(
            "{}. {} - {}\n",
            i + 1,
            record.player_name,
            record.baskets_collected
        ));
    }
    table
}
