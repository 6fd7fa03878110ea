//! Reveal state machine
//!
//! A session walks through one fixed sequence: a case is picked, the game
//! waits, the other cases open as misses, the game waits again, and the
//! picked case opens as a win or a miss. The machine never sleeps on its
//! own. Every [`Session::dispatch`] returns the [`Timer`] the caller has to
//! schedule next, so the same logic runs under the TUI loop, a headless
//! `tokio::time::sleep` driver, or a test that fires events by hand.

pub mod reveal;

use rand::Rng;
use serde::Serialize;
use std::time::Duration;

use crate::media::{Cue, Outcome, Presenter};

/// Number of cases on the board
pub const CASE_COUNT: usize = 4;

/// Cases opened as misses before the picked case resolves
pub const MISS_REVEALS: usize = CASE_COUNT - 1;

/// Board index for a 1-based case number. Numbers off the board map to
/// `CASE_COUNT`, which every pick rejects.
pub fn case_index(case: usize) -> usize {
    match case {
        1..=CASE_COUNT => case - 1,
        _ => CASE_COUNT,
    }
}

/// Value shown on a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reveal {
    #[default]
    Hidden,
    Miss,
    Win,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,           // Waiting for a pick
    Committed,      // Case picked, suspense running
    PartialReveal,  // Other cases opened
    Resolved,       // Picked case opened
    DialogShown,    // Result dialog opened; final
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Pick(usize),
    SuspenseElapsed,
    RevealElapsed,
    DialogElapsed,
    Dismiss,
}

/// Event the driver must deliver once `after` has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub after: Duration,
    pub event: Event,
}

/// Delays between the steps of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub suspense: Duration,
    pub reveal: Duration,
    pub dialog: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            suspense: Duration::from_millis(3000),
            reveal: Duration::from_millis(2000),
            dialog: Duration::ZERO,
        }
    }
}

impl Timing {
    /// Every step fires immediately
    pub fn instant() -> Self {
        Self {
            suspense: Duration::ZERO,
            reveal: Duration::ZERO,
            dialog: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    winning_index: usize,
    phase: Phase,
    selected: Option<usize>,
    slots: [Reveal; CASE_COUNT],
    game_over: bool,
    dialog_visible: bool,
}

/// Snapshot of a session for scripting output
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub phase: Phase,
    /// 1-based case number that was picked
    pub picked: Option<usize>,
    /// 1-based winning case number, only once resolved
    pub winner: Option<usize>,
    pub outcome: Option<Outcome>,
    pub cases: [Reveal; CASE_COUNT],
}

impl Session {
    /// Fresh session with a uniformly random winning case
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_winner(rng.gen_range(0..CASE_COUNT))
    }

    /// Fresh session with a fixed winning case (wrapped into range)
    pub fn with_winner(winning_index: usize) -> Self {
        Self {
            winning_index: winning_index % CASE_COUNT,
            phase: Phase::Idle,
            selected: None,
            slots: [Reveal::Hidden; CASE_COUNT],
            game_over: false,
            dialog_visible: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn slots(&self) -> &[Reveal; CASE_COUNT] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<Reveal> {
        self.slots.get(index).copied()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_dialog_visible(&self) -> bool {
        self.dialog_visible
    }

    /// Winning case, hidden until the picked case has resolved
    pub fn winning_index(&self) -> Option<usize> {
        (self.phase >= Phase::Resolved).then_some(self.winning_index)
    }

    /// Result of the picked case once it has been opened
    pub fn outcome(&self) -> Option<Outcome> {
        match self.selected.map(|i| self.slots[i]) {
            Some(Reveal::Win) => Some(Outcome::Win),
            Some(Reveal::Miss) => Some(Outcome::Miss),
            _ => None,
        }
    }

    pub fn can_pick(&self, index: usize) -> bool {
        !self.game_over && self.slot(index) == Some(Reveal::Hidden)
    }

    /// Apply one event and return the timer to schedule next, if any.
    /// Events that don't fit the current phase leave the session untouched.
    pub fn dispatch<P, R>(
        &mut self,
        event: Event,
        timing: &Timing,
        presenter: &mut P,
        rng: &mut R,
    ) -> Option<Timer>
    where
        P: Presenter + ?Sized,
        R: Rng + ?Sized,
    {
        match (event, self.phase) {
            (Event::Pick(index), Phase::Idle) if self.can_pick(index) => {
                Some(self.commit(index, timing, presenter))
            }
            (Event::SuspenseElapsed, Phase::Committed) => Some(self.reveal_others(timing, rng)),
            (Event::RevealElapsed, Phase::PartialReveal) => self.resolve(timing, presenter),
            (Event::DialogElapsed, Phase::Resolved) => {
                self.open_dialog(presenter);
                None
            }
            (Event::Dismiss, Phase::DialogShown) if self.dialog_visible => {
                self.dialog_visible = false;
                tracing::debug!("Result dialog dismissed");
                None
            }
            (event, phase) => {
                tracing::debug!("Ignoring {:?} in {:?}", event, phase);
                None
            }
        }
    }

    fn commit<P: Presenter + ?Sized>(&mut self, index: usize, timing: &Timing, presenter: &mut P) -> Timer {
        self.game_over = true;
        self.selected = Some(index);
        self.phase = Phase::Committed;
        tracing::info!("Case {} picked", index + 1);

        presenter.play(Cue::Suspense);

        Timer {
            after: timing.suspense,
            event: Event::SuspenseElapsed,
        }
    }

    fn reveal_others<R: Rng + ?Sized>(&mut self, timing: &Timing, rng: &mut R) -> Timer {
        // Only reachable from Committed, where selected is always set
        let selected = self.selected.unwrap_or_default();
        for i in reveal::sample_misses(&self.slots, selected, rng) {
            self.slots[i] = Reveal::Miss;
        }
        self.phase = Phase::PartialReveal;
        tracing::info!("Opened the other {} cases", MISS_REVEALS);

        Timer {
            after: timing.reveal,
            event: Event::RevealElapsed,
        }
    }

    fn resolve<P: Presenter + ?Sized>(&mut self, timing: &Timing, presenter: &mut P) -> Option<Timer> {
        let selected = self.selected.unwrap_or_default();
        let outcome = if selected == self.winning_index {
            Outcome::Win
        } else {
            Outcome::Miss
        };

        self.slots[selected] = match outcome {
            Outcome::Win => Reveal::Win,
            Outcome::Miss => Reveal::Miss,
        };
        self.phase = Phase::Resolved;
        tracing::info!("Case {} resolved: {:?}", selected + 1, outcome);

        presenter.play(match outcome {
            Outcome::Win => Cue::Victory,
            Outcome::Miss => Cue::Miss,
        });

        if timing.dialog.is_zero() {
            self.open_dialog(presenter);
            None
        } else {
            Some(Timer {
                after: timing.dialog,
                event: Event::DialogElapsed,
            })
        }
    }

    fn open_dialog<P: Presenter + ?Sized>(&mut self, presenter: &mut P) {
        self.dialog_visible = true;
        self.phase = Phase::DialogShown;
        if let Some(outcome) = self.outcome() {
            presenter.render_result(outcome);
        }
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            phase: self.phase,
            picked: self.selected.map(|i| i + 1),
            winner: self.winning_index().map(|i| i + 1),
            outcome: self.outcome(),
            cases: self.slots,
        }
    }
}
