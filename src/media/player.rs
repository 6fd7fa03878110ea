use std::io::Write;
use std::process::Stdio;
use tokio::process::Command;

use super::{Cue, MediaError, Outcome, Presentation, Presenter};
use crate::config::{AppConfig, MediaConfig};

/// Presenter that plays clips and opens assets with external programs
pub struct MediaPresenter {
    style: Presentation,
    media: MediaConfig,
    notifications: bool,
    bell: bool,
}

impl MediaPresenter {
    pub fn new(config: &AppConfig, style: Presentation) -> Self {
        Self {
            style,
            media: config.media.clone(),
            notifications: config.notifications,
            bell: config.bell,
        }
    }

    /// Clip configured for a cue, if any
    fn clip_for(&self, cue: Cue) -> Option<&str> {
        let clip = match cue {
            Cue::Suspense => &self.media.suspense_clip,
            Cue::Victory => &self.media.victory_clip,
            Cue::Miss => &self.media.miss_clip,
        };
        clip.as_deref().filter(|c| !c.is_empty())
    }

    /// What playing `cue` amounts to for this style and config
    fn action_for(&self, cue: Cue) -> Option<CueAction> {
        if !self.style.plays_audio() {
            return None;
        }
        match self.clip_for(cue) {
            Some(clip) => Some(CueAction::Spawn(clip.to_string())),
            // Suspense has no meaningful bell equivalent
            None if self.bell && cue != Cue::Suspense => Some(CueAction::Bell),
            None => None,
        }
    }

    /// Asset handed to the opener when the result shows
    fn asset_to_open(&self, outcome: Outcome) -> Option<String> {
        if !self.media.open_assets {
            return None;
        }
        self.style
            .result_content(outcome, &self.media)
            .asset()
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CueAction {
    Spawn(String),
    Bell,
}

impl Presenter for MediaPresenter {
    fn play(&mut self, cue: Cue) {
        match self.action_for(cue) {
            Some(CueAction::Spawn(clip)) => {
                if let Err(e) = spawn_detached(&self.media.player, &clip) {
                    tracing::warn!("Could not play {} cue: {}", cue.name(), e);
                }
            }
            Some(CueAction::Bell) => ring_bell(),
            None => tracing::debug!("No {} cue for {} style", cue.name(), self.style.label()),
        }
    }

    fn render_result(&mut self, outcome: Outcome) {
        if let Some(asset) = self.asset_to_open(outcome) {
            if let Err(e) = spawn_detached(&self.media.opener, &asset) {
                tracing::warn!("Could not open {}: {}", asset, e);
            }
        }

        if self.notifications {
            if let Err(e) = notify(outcome) {
                tracing::warn!("{}", e);
            }
        }
    }
}

/// Start `command target` and reap it in the background.
/// Returns once the process is spawned; its exit status is only logged.
pub fn spawn_detached(command: &[String], target: &str) -> Result<(), MediaError> {
    let (program, args) = command
        .split_first()
        .ok_or(MediaError::NotConfigured("command"))?;

    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|_| MediaError::NoRuntime(program.clone()))?;

    let mut child = Command::new(program)
        .args(args)
        .arg(target)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| MediaError::Spawn {
            program: program.clone(),
            source,
        })?;

    let program = program.clone();
    runtime.spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => tracing::debug!("{} finished", program),
            Ok(status) => tracing::warn!("{}", MediaError::Exit { program, status }),
            Err(e) => tracing::warn!("Waiting on {} failed: {}", program, e),
        }
    });

    Ok(())
}

fn ring_bell() {
    let mut err = std::io::stderr();
    let _ = err.write_all(b"\x07").and_then(|_| err.flush());
}

fn notify(outcome: Outcome) -> Result<(), MediaError> {
    let icon = match outcome {
        Outcome::Win => "face-smile-big",
        Outcome::Miss => "face-sad",
    };
    notify_rust::Notification::new()
        .summary("casepick")
        .body(outcome.headline())
        .icon(icon)
        .show()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presenter(style: Presentation) -> MediaPresenter {
        let mut config = AppConfig::default();
        config.media.suspense_clip = Some("/tmp/drumroll.ogg".to_string());
        config.media.victory_clip = Some(String::new());
        MediaPresenter::new(&config, style)
    }

    #[test]
    fn test_clip_lookup() {
        let p = presenter(Presentation::Audio);
        assert_eq!(p.clip_for(Cue::Suspense), Some("/tmp/drumroll.ogg"));
        // Empty paths count as unset
        assert_eq!(p.clip_for(Cue::Victory), None);
        assert_eq!(p.clip_for(Cue::Miss), None);
    }

    #[test]
    fn test_spawn_without_command() {
        let err = spawn_detached(&[], "clip.ogg").unwrap_err();
        assert!(matches!(err, MediaError::NotConfigured(_)));
    }

    #[test]
    fn test_spawn_outside_runtime() {
        let err = spawn_detached(&["true".to_string()], "clip.ogg").unwrap_err();
        assert!(matches!(err, MediaError::NoRuntime(_)));
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        let command = vec!["casepick-no-such-player".to_string()];
        let err = spawn_detached(&command, "clip.ogg").unwrap_err();
        assert!(matches!(err, MediaError::Spawn { .. }));
    }

    #[test]
    fn test_gif_style_is_silent() {
        let p = presenter(Presentation::Gif);
        for cue in [Cue::Suspense, Cue::Victory, Cue::Miss] {
            assert_eq!(p.action_for(cue), None);
        }
    }

    #[test]
    fn test_cue_actions() {
        for style in [Presentation::Audio, Presentation::Video] {
            let p = presenter(style);
            assert_eq!(
                p.action_for(Cue::Suspense),
                Some(CueAction::Spawn("/tmp/drumroll.ogg".to_string()))
            );
            // No clip for these, so the bell stands in
            assert_eq!(p.action_for(Cue::Victory), Some(CueAction::Bell));
            assert_eq!(p.action_for(Cue::Miss), Some(CueAction::Bell));
        }
    }

    #[test]
    fn test_no_bell_for_suspense() {
        let mut config = AppConfig::default();
        config.bell = true;
        let p = MediaPresenter::new(&config, Presentation::Audio);
        assert_eq!(p.action_for(Cue::Suspense), None);
        assert_eq!(p.action_for(Cue::Miss), Some(CueAction::Bell));

        config.bell = false;
        let p = MediaPresenter::new(&config, Presentation::Audio);
        assert_eq!(p.action_for(Cue::Miss), None);
    }

    #[test]
    fn test_asset_to_open() {
        let mut config = AppConfig::default();
        let closed = MediaPresenter::new(&config, Presentation::Gif);
        assert_eq!(closed.asset_to_open(Outcome::Miss), None);

        config.media.open_assets = true;
        let gif = MediaPresenter::new(&config, Presentation::Gif);
        assert_eq!(gif.asset_to_open(Outcome::Win), Some(config.media.win_image.clone()));
        assert_eq!(gif.asset_to_open(Outcome::Miss), Some(config.media.miss_image.clone()));

        let video = MediaPresenter::new(&config, Presentation::Video);
        assert_eq!(video.asset_to_open(Outcome::Miss), Some(config.media.miss_video.clone()));
        // Plain win message has nothing to open
        assert_eq!(video.asset_to_open(Outcome::Win), None);
    }

    #[tokio::test]
    async fn test_failed_playback_is_swallowed() {
        let mut config = AppConfig::default();
        config.bell = false;
        config.notifications = false;
        config.media.player = vec!["casepick-no-such-player".to_string()];
        config.media.opener = vec!["casepick-no-such-opener".to_string()];
        config.media.open_assets = true;
        config.media.victory_clip = Some("/tmp/victory.ogg".to_string());
        let mut p = MediaPresenter::new(&config, Presentation::Audio);

        assert!(matches!(p.action_for(Cue::Victory), Some(CueAction::Spawn(_))));
        p.play(Cue::Victory);
        p.render_result(Outcome::Miss);
    }
}
