//! Presentation port for the reveal sequence
//!
//! The game never touches audio, video or images itself. It calls into a
//! [`Presenter`], which decides what to play or show for the active
//! [`Presentation`] style. Playback is fire-and-forget: a presenter may fail
//! internally, but it never reports that failure back to the game.

pub mod player;

use serde::{Deserialize, Serialize};

use crate::config::MediaConfig;

/// Sound cue requested by the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Suspense,  // Right after a case is picked
    Victory,   // Picked case was the winner
    Miss,      // Picked case was not the winner
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Suspense => "suspense",
            Cue::Victory => "victory",
            Cue::Miss => "miss",
        }
    }
}

/// Final result of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Miss,
}

impl Outcome {
    pub fn headline(self) -> &'static str {
        match self {
            Outcome::Win => "You picked the winning case!",
            Outcome::Miss => "Rickrolled! Not this case.",
        }
    }
}

/// How the outcome is presented. Each style matches one revision of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    /// Images only, no sound
    Gif,
    /// Sound cues, miss shows a video embed after a short pause
    Video,
    /// Suspense, victory and miss clips
    #[default]
    Audio,
}

impl Presentation {
    pub fn label(self) -> &'static str {
        match self {
            Presentation::Gif => "gif",
            Presentation::Video => "video",
            Presentation::Audio => "audio",
        }
    }

    pub fn plays_audio(self) -> bool {
        !matches!(self, Presentation::Gif)
    }

    /// Pause between resolution and the result dialog when the config has none
    pub fn default_dialog_delay_ms(self) -> u64 {
        match self {
            Presentation::Video => 1000,
            Presentation::Gif | Presentation::Audio => 0,
        }
    }

    /// What the result dialog shows for an outcome
    pub fn result_content(self, outcome: Outcome, media: &MediaConfig) -> ResultContent {
        match (self, outcome) {
            (Presentation::Gif, Outcome::Win) => ResultContent::Image(media.win_image.clone()),
            (Presentation::Gif, Outcome::Miss) | (Presentation::Audio, Outcome::Miss) => {
                ResultContent::Image(media.miss_image.clone())
            }
            (Presentation::Video, Outcome::Miss) => ResultContent::Video(media.miss_video.clone()),
            (Presentation::Video, Outcome::Win) | (Presentation::Audio, Outcome::Win) => {
                ResultContent::Message(outcome.headline().to_string())
            }
        }
    }
}

/// Body of the result dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultContent {
    Message(String),
    Image(String),
    Video(String),
}

impl ResultContent {
    /// External asset reference, if the content points at one
    pub fn asset(&self) -> Option<&str> {
        match self {
            ResultContent::Message(_) => None,
            ResultContent::Image(url) | ResultContent::Video(url) => Some(url.as_str()),
        }
    }
}

/// Side effects the reveal sequence asks for
pub trait Presenter {
    /// Start a sound cue. Must not block and must not fail loudly.
    fn play(&mut self, cue: Cue);

    /// The result dialog just opened for `outcome`
    fn render_result(&mut self, outcome: Outcome);
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("no {0} configured")]
    NotConfigured(&'static str),

    #[error("no async runtime available to run {0}")]
    NoRuntime(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
    },

    #[error("notification failed: {0}")]
    Notify(#[from] notify_rust::error::Error),
}
