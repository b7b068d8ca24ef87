//! Coin-flip session statistics and JSON export.
//!
//! The export document is the one durable artifact the games produce. Its
//! field names are fixed:
//!
//! ```text
//! {
//!   "exportedAt": "...",
//!   "sessionStats": {
//!     "totalFlips", "headsFlips", "tailsFlips",
//!     "longestHeadsStreak", "longestTailsStreak",
//!     "currentStreak": { "type", "count" },
//!     "flipTimes": [...]
//!   },
//!   "flipHistory": [ { "flipNumber", "result", "tick" } ],
//!   "computedStatistics": { "averageFlipTime", "headsPercentage", "tailsPercentage" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::coin_flip::Face;
use crate::error::ExportError;

/// The run of identical results ending with the latest flip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// Face of the streak; `None` before the first flip
    #[serde(rename = "type")]
    pub face: Option<Face>,
    /// Length of the streak
    pub count: u32,
}

/// Running totals for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Flips landed
    pub total_flips: u32,
    /// Flips that landed heads
    pub heads_flips: u32,
    /// Flips that landed tails
    pub tails_flips: u32,
    /// Longest heads run
    pub longest_heads_streak: u32,
    /// Longest tails run
    pub longest_tails_streak: u32,
    /// Run ending with the latest flip
    pub current_streak: Streak,
    /// Duration of every flip animation in seconds
    pub flip_times: Vec<f64>,
}

/// One landed flip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipRecord {
    /// One-based flip number
    pub flip_number: u32,
    /// Outcome
    pub result: Face,
    /// Tick on which the coin landed
    pub tick: u64,
}

/// Figures derived from the session totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStatistics {
    /// Mean of `flipTimes`, zero without flips
    pub average_flip_time: f64,
    /// Share of heads in percent
    pub heads_percentage: f64,
    /// Share of tails in percent
    pub tails_percentage: f64,
}

/// The export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsExport {
    /// RFC 3339 timestamp of the export
    pub exported_at: String,
    /// Running totals
    pub session_stats: SessionStats,
    /// Every flip in order
    pub flip_history: Vec<FlipRecord>,
    /// Derived figures
    pub computed_statistics: ComputedStatistics,
}

/// Statistics collector for a coin-flip session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlipStats {
    session: SessionStats,
    history: Vec<FlipRecord>,
}

impl FlipStats {
    /// Empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a landed flip.
    pub fn record(&mut self, result: Face, tick: u64, seconds: f64) {
        let s = &mut self.session;
        s.total_flips += 1;
        match result {
            Face::Heads => s.heads_flips += 1,
            Face::Tails => s.tails_flips += 1,
        }

        if s.current_streak.face == Some(result) {
            s.current_streak.count += 1;
        } else {
            s.current_streak = Streak {
                face: Some(result),
                count: 1,
            };
        }
        let longest = match result {
            Face::Heads => &mut s.longest_heads_streak,
            Face::Tails => &mut s.longest_tails_streak,
        };
        *longest = (*longest).max(s.current_streak.count);

        s.flip_times.push(seconds);
        self.history.push(FlipRecord {
            flip_number: s.total_flips,
            result,
            tick,
        });
    }

    /// Running totals.
    #[must_use]
    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    /// Every flip in order.
    #[must_use]
    pub fn history(&self) -> &[FlipRecord] {
        &self.history
    }

    /// Number of flips landed.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.session.total_flips
    }

    /// Derived figures.
    #[must_use]
    pub fn computed(&self) -> ComputedStatistics {
        let s = &self.session;
        if s.total_flips == 0 {
            return ComputedStatistics::default();
        }
        let total = f64::from(s.total_flips);
        #[allow(clippy::cast_precision_loss)]
        let average = s.flip_times.iter().sum::<f64>() / s.flip_times.len().max(1) as f64;
        ComputedStatistics {
            average_flip_time: average,
            heads_percentage: f64::from(s.heads_flips) / total * 100.0,
            tails_percentage: f64::from(s.tails_flips) / total * 100.0,
        }
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Builds the export document stamped with `now`.
    #[must_use]
    pub fn to_export(&self, now: DateTime<Local>) -> StatsExport {
        StatsExport {
            exported_at: now.to_rfc3339(),
            session_stats: self.session.clone(),
            flip_history: self.history.clone(),
            computed_statistics: self.computed(),
        }
    }

    /// Export file name for `now`: `coin-flip-stats-<YYYYmmdd_HHMMSS>.json`.
    #[must_use]
    pub fn file_name(now: DateTime<Local>) -> String {
        format!("coin-flip-stats-{}.json", now.format("%Y%m%d_%H%M%S"))
    }

    /// Pretty-printed export document.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Json`] if serialization fails.
    pub fn export_json(&self, now: DateTime<Local>) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(&self.to_export(now))?)
    }

    /// Writes the export into `dir` and returns the file path.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be written.
    pub fn write_export(&self, dir: &Path, now: DateTime<Local>) -> Result<PathBuf, ExportError> {
        let path = dir.join(Self::file_name(now));
        fs::write(&path, self.export_json(now)?)?;
        info!(path = %path.display(), flips = self.total(), "exported coin flip statistics");
        Ok(path)
    }

    /// [`write_export`](Self::write_export) stamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be written.
    pub fn export_now(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        self.write_export(dir, Local::now())
    }
}
