//! # Persistence
//!
//! Player progress kept between sessions and the port it is stored through.
//!
//! The core never touches storage directly; a [`ProgressStore`] is handed to
//! [`crate::GameSession::finish`] by whoever embeds the crate.

use crate::{TacoError, TacoResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Highest title progress level that can be stored.
pub const MAX_TITLE_PROGRESS: u32 = 10;

/// Progress carried across sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub high_score: u32,
    /// Best ending level reached so far, `0..=MAX_TITLE_PROGRESS`
    pub title_progress_level: u32,
}

impl Progress {
    /// Folds a finished session into the record.
    ///
    /// Returns whether `score` is a new high score.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::Progress;
    ///
    /// let mut progress = Progress::default();
    /// assert!(progress.record(1200, 2));
    /// assert!(!progress.record(900, 1));
    /// assert_eq!(progress.high_score, 1200);
    /// assert_eq!(progress.title_progress_level, 2);
    /// ```
    pub fn record(&mut self, score: u32, ending_level: u32) -> bool {
        let new_high = score > self.high_score;
        self.high_score = self.high_score.max(score);
        self.title_progress_level = self
            .title_progress_level
            .max(ending_level)
            .min(MAX_TITLE_PROGRESS);
        new_high
    }

    fn sanitized(self) -> Self {
        Self {
            title_progress_level: self.title_progress_level.min(MAX_TITLE_PROGRESS),
            ..self
        }
    }
}

/// Storage port for [`Progress`].
pub trait ProgressStore {
    fn load(&self) -> TacoResult<Progress>;
    fn save(&mut self, progress: &Progress) -> TacoResult<()>;
}

/// Keeps progress in memory; for tests and throwaway runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    progress: Progress,
}

impl MemoryStore {
    pub fn new(progress: Progress) -> Self {
        Self { progress }
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> TacoResult<Progress> {
        Ok(self.progress)
    }

    fn save(&mut self, progress: &Progress) -> TacoResult<()> {
        self.progress = progress.sanitized();
        Ok(())
    }
}

/// Stores progress as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonFileStore {
    /// Reads the file; a missing file is a fresh start.
    fn load(&self) -> TacoResult<Progress> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No progress file at {}, starting fresh", self.path.display());
                return Ok(Progress::default());
            }
            Err(err) => return Err(TacoError::from(err)),
        };
        let progress: Progress = serde_json::from_str(&text)?;
        if progress.title_progress_level > MAX_TITLE_PROGRESS {
            warn!(
                "Title progress {} in {} is out of range, clamping",
                progress.title_progress_level,
                self.path.display()
            );
        }
        Ok(progress.sanitized())
    }

    fn save(&mut self, progress: &Progress) -> TacoResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&progress.sanitized())?;
        std::fs::write(&self.path, json)?;
        debug!("Saved progress to {}", self.path.display());
        Ok(())
    }
}
