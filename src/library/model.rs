use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lyrics::TimingModel;

/// One playable song. Only `lyrics` drives the sync engine; everything else
/// is display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub audio: PathBuf,
    #[serde(default)]
    pub background: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub lyrics: TimingModel,
}

impl Track {
    /// `Artist - Title`, or just the title when the artist is blank.
    pub fn display(&self) -> String {
        match self.artist.trim() {
            "" => self.title.clone(),
            artist => format!("{} - {}", artist, self.title),
        }
    }
}
