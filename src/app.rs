use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::game::{Event, Session, Timer, Timing, CASE_COUNT};
use crate::media::{player, Presentation, Presenter, ResultContent};

/// Cases per row on the board
pub const BOARD_COLUMNS: usize = 2;

/// Status messages clear after this long
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Timer handed out by the session, waiting for its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub event: Event,
    pub due: Instant,
}

pub struct App<P: Presenter> {
    pub session: Session,
    pub popup: Popup,
    pub cursor: usize,

    pub style: Presentation,
    pub timing: Timing,
    pub config: AppConfig,

    // Next step of the reveal sequence
    pub pending: Option<PendingTimer>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub presenter: P,
    rng: StdRng,
}

impl<P: Presenter> App<P> {
    pub fn new(config: AppConfig, style: Presentation, presenter: P) -> Self {
        Self::with_rng(config, style, presenter, StdRng::from_entropy())
    }

    pub fn with_rng(config: AppConfig, style: Presentation, presenter: P, mut rng: StdRng) -> Self {
        let session = Session::new(&mut rng);
        let timing = config.timing(style);
        tracing::debug!("New session, style {}, timing {:?}", style.label(), timing);

        Self {
            session,
            popup: Popup::None,
            cursor: 0,
            style,
            timing,
            config,
            pending: None,
            status_message: None,
            status_message_time: None,
            presenter,
            rng,
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>, now: Instant) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(now);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.handle_key_at(key, Instant::now());
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) {
        if self.popup == Popup::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')) {
                self.popup = Popup::None;
            }
            return;
        }

        if self.session.is_dialog_visible() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c') => {
                    self.send(Event::Dismiss, now);
                }
                KeyCode::Char('o') => self.open_result_asset(now),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.pick(index, now);
            }
            KeyCode::Left => {
                if self.cursor % BOARD_COLUMNS > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Right => {
                if self.cursor % BOARD_COLUMNS + 1 < BOARD_COLUMNS && self.cursor + 1 < CASE_COUNT {
                    self.cursor += 1;
                }
            }
            KeyCode::Up => {
                if self.cursor >= BOARD_COLUMNS {
                    self.cursor -= BOARD_COLUMNS;
                }
            }
            KeyCode::Down => {
                if self.cursor + BOARD_COLUMNS < CASE_COUNT {
                    self.cursor += BOARD_COLUMNS;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.pick(self.cursor, now),
            KeyCode::Char('?') => self.popup = Popup::Help,
            _ => {}
        }
    }

    fn pick(&mut self, index: usize, now: Instant) {
        if let Some(selected) = self.session.selected() {
            self.set_status(format!("Case {} is already picked", selected + 1), now);
            return;
        }
        if index >= CASE_COUNT {
            self.set_status(format!("There are only {} cases", CASE_COUNT), now);
            return;
        }

        self.cursor = index;
        self.send(Event::Pick(index), now);
    }

    /// Deliver an event to the session and remember the timer it asks for
    fn send(&mut self, event: Event, now: Instant) {
        let timer = self
            .session
            .dispatch(event, &self.timing, &mut self.presenter, &mut self.rng);
        self.schedule(timer, now);
    }

    fn schedule(&mut self, timer: Option<Timer>, now: Instant) {
        if let Some(timer) = timer {
            self.pending = Some(PendingTimer {
                event: timer.event,
                due: now + timer.after,
            });
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Fire every timer whose deadline has passed
    pub fn tick_at(&mut self, now: Instant) {
        while let Some(pending) = self.pending.filter(|p| p.due <= now) {
            self.pending = None;
            // Chain from the deadline, not from `now`, so poll jitter doesn't add up
            self.send(pending.event, pending.due);
        }

        if let Some(time) = self.status_message_time {
            if now.saturating_duration_since(time) >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Whole seconds left on the pending timer, rounded up
    pub fn countdown(&self, now: Instant) -> Option<(Event, u64)> {
        self.pending.map(|p| {
            let remaining = p.due.saturating_duration_since(now);
            let secs = (remaining.as_millis() as u64).div_ceil(1000);
            (p.event, secs)
        })
    }

    /// What the result dialog shows, once there is a result
    pub fn result_content(&self) -> Option<ResultContent> {
        self.session
            .outcome()
            .map(|outcome| self.style.result_content(outcome, &self.config.media))
    }

    fn open_result_asset(&mut self, now: Instant) {
        let Some(content) = self.result_content() else {
            return;
        };
        let Some(asset) = content.asset() else {
            self.set_status("Nothing to open", now);
            return;
        };

        match player::spawn_detached(&self.config.media.opener, asset) {
            Ok(()) => self.set_status(format!("Opening {}", asset), now),
            Err(e) => {
                tracing::warn!("Could not open {}: {}", asset, e);
                self.set_status(format!("Error: {}", e), now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Phase, Reveal};
    use crate::media::testing::{Call, RecordingPresenter};
    use crate::media::{Cue, Outcome};

    fn app(winner: usize) -> App<RecordingPresenter> {
        let mut app = App::with_rng(
            AppConfig::default(),
            Presentation::Audio,
            RecordingPresenter::default(),
            StdRng::seed_from_u64(21),
        );
        app.session = Session::with_winner(winner);
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn test_timers_fire_when_due() {
        let mut app = app(2);
        let t0 = Instant::now();

        app.handle_key_at(key(KeyCode::Char('3')), t0);
        assert_eq!(app.session.phase(), Phase::Committed);
        assert_eq!(app.countdown(t0), Some((Event::SuspenseElapsed, 3)));

        app.tick_at(t0 + Duration::from_millis(2999));
        assert_eq!(app.session.phase(), Phase::Committed);
        assert_eq!(app.countdown(t0 + Duration::from_millis(2999)), Some((Event::SuspenseElapsed, 1)));

        app.tick_at(t0 + Duration::from_millis(3000));
        assert_eq!(app.session.phase(), Phase::PartialReveal);
        assert_eq!(app.countdown(t0 + Duration::from_millis(3000)), Some((Event::RevealElapsed, 2)));

        app.tick_at(t0 + Duration::from_millis(5000));
        assert_eq!(app.session.phase(), Phase::DialogShown);
        assert_eq!(app.session.slot(2), Some(Reveal::Win));
        assert_eq!(app.pending, None);
        assert_eq!(app.presenter.calls.last(), Some(&Call::Render(Outcome::Win)));
    }

    #[test]
    fn test_late_tick_catches_up() {
        let mut app = app(0);
        let t0 = Instant::now();

        app.handle_key_at(key(KeyCode::Char('2')), t0);
        app.tick_at(t0 + Duration::from_secs(60));

        assert_eq!(app.session.phase(), Phase::DialogShown);
        assert_eq!(app.session.outcome(), Some(Outcome::Miss));
        assert!(app.presenter.calls.contains(&Call::Play(Cue::Miss)));
    }

    #[test]
    fn test_cursor_moves_on_grid() {
        let mut app = app(0);
        let t0 = Instant::now();

        app.handle_key_at(key(KeyCode::Left), t0);
        app.handle_key_at(key(KeyCode::Up), t0);
        assert_eq!(app.cursor, 0);

        app.handle_key_at(key(KeyCode::Right), t0);
        assert_eq!(app.cursor, 1);
        app.handle_key_at(key(KeyCode::Right), t0);
        assert_eq!(app.cursor, 1);
        app.handle_key_at(key(KeyCode::Down), t0);
        assert_eq!(app.cursor, 3);
        app.handle_key_at(key(KeyCode::Down), t0);
        assert_eq!(app.cursor, 3);
        app.handle_key_at(key(KeyCode::Left), t0);
        assert_eq!(app.cursor, 2);

        app.handle_key_at(key(KeyCode::Enter), t0);
        assert_eq!(app.session.selected(), Some(2));
    }

    #[test]
    fn test_keys_ignored_during_reveal() {
        let mut app = app(1);
        let t0 = Instant::now();

        app.handle_key_at(key(KeyCode::Char('1')), t0);
        let pending = app.pending;
        app.handle_key_at(key(KeyCode::Char('2')), t0);
        app.handle_key_at(key(KeyCode::Char(' ')), t0);

        assert_eq!(app.session.selected(), Some(0));
        assert_eq!(app.pending, pending);
        assert_eq!(app.status_message.as_deref(), Some("Case 1 is already picked"));
        assert_eq!(app.presenter.calls, vec![Call::Play(Cue::Suspense)]);
    }

    #[test]
    fn test_out_of_range_key() {
        let mut app = app(1);
        app.handle_key_at(key(KeyCode::Char('7')), Instant::now());

        assert_eq!(app.session.phase(), Phase::Idle);
        assert_eq!(app.pending, None);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_dismiss_dialog() {
        let mut app = app(3);
        let t0 = Instant::now();
        app.handle_key_at(key(KeyCode::Char('4')), t0);
        app.tick_at(t0 + Duration::from_secs(5));
        assert!(app.session.is_dialog_visible());

        // Digits do nothing while the dialog is up
        app.handle_key_at(key(KeyCode::Char('1')), t0);
        assert!(app.session.is_dialog_visible());

        app.handle_key_at(key(KeyCode::Esc), t0);
        assert!(!app.session.is_dialog_visible());
        assert_eq!(app.session.phase(), Phase::DialogShown);
        assert_eq!(app.session.selected(), Some(3));
    }

    #[test]
    fn test_help_popup_blocks_picks() {
        let mut app = app(0);
        let t0 = Instant::now();

        app.handle_key_at(key(KeyCode::Char('?')), t0);
        assert_eq!(app.popup, Popup::Help);
        app.handle_key_at(key(KeyCode::Char('1')), t0);
        assert_eq!(app.session.phase(), Phase::Idle);

        app.handle_key_at(key(KeyCode::Esc), t0);
        assert_eq!(app.popup, Popup::None);
    }

    #[test]
    fn test_video_style_waits_for_dialog() {
        let mut app = App::with_rng(
            AppConfig::default(),
            Presentation::Video,
            RecordingPresenter::default(),
            StdRng::seed_from_u64(1),
        );
        app.session = Session::with_winner(1);
        let t0 = Instant::now();

        app.handle_key_at(key(KeyCode::Char('1')), t0);
        app.tick_at(t0 + Duration::from_millis(5000));
        assert_eq!(app.session.phase(), Phase::Resolved);
        assert_eq!(app.countdown(t0 + Duration::from_millis(5000)), Some((Event::DialogElapsed, 1)));

        app.tick_at(t0 + Duration::from_millis(6000));
        assert!(app.session.is_dialog_visible());
        assert!(matches!(app.result_content(), Some(ResultContent::Video(_))));
    }

    #[test]
    fn test_status_message_expires() {
        let mut app = app(0);
        let t0 = Instant::now();

        app.handle_key_at(key(KeyCode::Char('9')), t0);
        assert_eq!(app.status_message.as_deref(), Some("There are only 4 cases"));

        app.tick_at(t0 + Duration::from_millis(2999));
        assert!(app.status_message.is_some());

        app.tick_at(t0 + STATUS_TIMEOUT);
        assert_eq!(app.status_message, None);
        assert_eq!(app.status_message_time, None);
    }
}
