//! Top-10 leaderboard, persisted as a flat text file.
//!
//! One `name,score` record per line, sorted by score descending.  The
//! engine never sees this module; the driver loads it at startup and
//! appends on a qualifying game end.

use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

/// Maximum number of entries kept on the board.
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest player name accepted at entry time.
pub const MAX_NAME_LEN: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
}

/// The leaderboard: entries sorted by score descending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

/// Default storage location: a dotfile in the user's home directory.
pub fn default_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".centipede_scores")
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Read the board from `path`.  A missing or unreadable file is an
    /// empty board, not an error; malformed lines are skipped.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => return Self::new(),
        };

        let mut entries = Vec::new();
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            // Names may not contain commas; split from the right so the
            // score field is unambiguous.
            let Some((name, score)) = line.rsplit_once(',') else {
                warn!("skipping malformed high-score line: {line:?}");
                continue;
            };
            match score.trim().parse::<u32>() {
                Ok(score) => entries.push(HighScoreEntry {
                    name: name.to_string(),
                    score,
                }),
                Err(_) => warn!("skipping malformed high-score line: {line:?}"),
            }
        }

        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        info!("loaded {} high scores", entries.len());
        Self { entries }
    }

    /// Write the board to `path`, one `name,score` line per entry.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.name);
            out.push(',');
            out.push_str(&entry.score.to_string());
            out.push('\n');
        }
        std::fs::write(path, out)?;
        info!("saved {} high scores", self.entries.len());
        Ok(())
    }

    /// Whether `score` would earn a spot on the board.
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Insert a score, keeping the board sorted and capped.  Returns
    /// the 1-indexed rank achieved, or `None` if it did not qualify.
    pub fn add(&mut self, name: &str, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let mut name: String = name.chars().take(MAX_NAME_LEN).collect();
        name.retain(|c| c != ',' && c != '\n');

        let entry = HighScoreEntry { name, score };
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}
