//! Play session
//!
//! Owns one `GameState`, the timer queue that drives it, the held input and
//! the leaderboard storage. The host calls `advance` with wall-clock deltas
//! and forwards the returned events to its presentation collaborators.
//! A session ends at game over; restarting means building a new one.

use crate::consts::*;
use crate::highscores::{Leaderboard, clean_name};
use crate::persistence::Storage;
use crate::platform::{Direction, Gesture, InputState, classify_swipe};
use crate::settings::Settings;
use crate::sim::{
    Difficulty, FallOutcome, GameEvent, GameState, Scheduler, TimerKind, Track, activate_shield,
    fall_tick, heartbeat, motion_tick, spawn_delay_ms, spawn_obstacle, toggle_pause,
};

/// Terminal summary of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub score: u64,
    pub elapsed_seconds: u32,
    pub level: u32,
    pub difficulty: Difficulty,
    pub avoided: u32,
    /// Whether the score qualified for the leaderboard
    pub is_high_score: bool,
    /// 1-based leaderboard rank, if an entry was committed and survived the cut
    pub rank: Option<usize>,
}

/// Asks the player for a leaderboard name. Only called for qualifying scores.
pub trait NamePrompt {
    /// Raw entered name; None or blank skips the entry
    fn prompt_name(&mut self, summary: &RunSummary) -> Option<String>;
}

impl<F> NamePrompt for F
where
    F: FnMut(&RunSummary) -> Option<String>,
{
    fn prompt_name(&mut self, summary: &RunSummary) -> Option<String> {
        self(summary)
    }
}

/// One play session
pub struct Session<S: Storage> {
    state: GameState,
    scheduler: Scheduler,
    input: InputState,
    storage: S,
    prompt: Box<dyn NamePrompt>,
    leaderboard: Leaderboard,
    /// Delay used for the pending spawn timer (re-used while paused)
    spawn_delay: u64,
    events: Vec<GameEvent>,
    summary: Option<RunSummary>,
}

impl<S: Storage> Session<S> {
    /// Start a session: arms the periodic activities and the first spawn
    pub fn new(settings: &Settings, storage: S, prompt: Box<dyn NamePrompt>, seed: u64) -> Self {
        let track = Track::new(settings.track_width);
        let mut state = GameState::new(seed, settings.difficulty, track);
        let leaderboard = Leaderboard::load(&storage);

        let mut scheduler = Scheduler::new();
        scheduler.every(TimerKind::Motion, MOTION_TICK_MS);
        scheduler.every(TimerKind::Fall, FALL_TICK_MS);
        scheduler.every(TimerKind::Heartbeat, HEARTBEAT_MS);
        let spawn_delay = spawn_delay_ms(0, state.difficulty, &mut state.rng);
        scheduler.after(TimerKind::Spawn, spawn_delay);

        log::info!(
            "Session started (seed {}, {}, track {}px)",
            seed,
            state.difficulty.as_str(),
            track.width
        );

        Self {
            state,
            scheduler,
            input: InputState::new(),
            storage,
            prompt,
            leaderboard,
            spawn_delay,
            events: Vec::new(),
            summary: None,
        }
    }

    /// Advance game time by `dt_ms` (clamped to `MAX_FRAME_MS`), firing every
    /// timer that comes due. Returns all events raised since the last call.
    pub fn advance(&mut self, dt_ms: u64) -> Vec<GameEvent> {
        let until = self.scheduler.now() + dt_ms.min(MAX_FRAME_MS);
        while let Some(firing) = self.scheduler.pop_due(until) {
            self.fire(firing.kind);
        }
        self.scheduler.settle(until);
        std::mem::take(&mut self.events)
    }

    /// Events raised by input calls, without advancing time
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Motion => motion_tick(&mut self.state, self.input.direction()),
            TimerKind::Fall => {
                if fall_tick(&mut self.state, &mut self.events) == FallOutcome::GameOver {
                    self.finish();
                }
            }
            TimerKind::Heartbeat => {
                heartbeat(&mut self.state, &mut self.events);
            }
            TimerKind::Spawn => self.spawn(),
            TimerKind::ShieldExpiry => {
                self.state.progression.expire_shield();
                self.events.push(GameEvent::ShieldExpired);
            }
            TimerKind::SwipeRelease => self.input.release_swipe(),
        }
    }

    /// Spawn timer payload. While paused the timer re-arms with the same
    /// delay and nothing spawns.
    fn spawn(&mut self) {
        if self.state.is_over {
            return;
        }
        if !self.state.is_paused {
            spawn_obstacle(&mut self.state, &mut self.events);
            self.spawn_delay = spawn_delay_ms(
                self.state.elapsed_seconds,
                self.state.difficulty,
                &mut self.state.rng,
            );
            log::debug!(
                "Next spawn in {} ms at t={}s",
                self.spawn_delay,
                self.state.elapsed_seconds
            );
        }
        self.scheduler.after(TimerKind::Spawn, self.spawn_delay);
    }

    /// Game-over sequence: halt timers, then commit a qualifying score
    fn finish(&mut self) {
        self.scheduler.halt();
        self.input.clear();

        let score = self.state.score;
        self.leaderboard = Leaderboard::load(&self.storage);
        let mut summary = RunSummary {
            score,
            elapsed_seconds: self.state.elapsed_seconds,
            level: self.state.progression.level,
            difficulty: self.state.difficulty,
            avoided: self.state.avoided,
            is_high_score: self.leaderboard.is_high_score(score),
            rank: None,
        };

        if summary.is_high_score {
            let name = self
                .prompt
                .prompt_name(&summary)
                .as_deref()
                .and_then(clean_name);
            match name {
                Some(name) => {
                    let (board, rank) = Leaderboard::commit(&mut self.storage, &name, score);
                    self.leaderboard = board;
                    summary.rank = rank;
                }
                None => log::info!("High score {} left unnamed", score),
            }
        }

        log::info!(
            "Game over: score {}, {}s, level {}, {} avoided, rank {:?}",
            summary.score,
            summary.elapsed_seconds,
            summary.level,
            summary.avoided,
            summary.rank
        );
        self.events.push(GameEvent::GameOver {
            score: summary.score,
            elapsed_seconds: summary.elapsed_seconds,
            level: summary.level,
            rank: summary.rank,
        });
        self.summary = Some(summary);
    }

    // === Input ===

    pub fn press(&mut self, dir: Direction) {
        self.input.press(dir);
    }

    pub fn release(&mut self, dir: Direction) {
        self.input.release(dir);
    }

    /// Apply a completed swipe. Horizontal swipes hold a direction until the
    /// auto-release timer fires; vertical swipes trigger the shield.
    pub fn swipe(&mut self, dx: f32, dy: f32) -> Gesture {
        let gesture = classify_swipe(dx, dy);
        match gesture {
            Gesture::Move(dir) if !self.state.is_over => {
                self.input.hold_swipe(dir);
                self.scheduler.cancel(TimerKind::SwipeRelease);
                self.scheduler.after(TimerKind::SwipeRelease, SWIPE_RELEASE_MS);
            }
            Gesture::Shield => {
                self.activate_shield();
            }
            _ => {}
        }
        gesture
    }

    /// Spend a shield charge and arm its expiry
    pub fn activate_shield(&mut self) -> bool {
        if !activate_shield(&mut self.state, &mut self.events) {
            return false;
        }
        self.scheduler.cancel(TimerKind::ShieldExpiry);
        self.scheduler
            .after(TimerKind::ShieldExpiry, SHIELD_DURATION_MS);
        true
    }

    pub fn toggle_pause(&mut self) {
        toggle_pause(&mut self.state, &mut self.events);
    }

    /// Pause (if running) and drop held input, e.g. on focus loss
    pub fn suspend(&mut self) {
        self.input.clear();
        if self.state.is_running() {
            self.toggle_pause();
        }
    }

    /// Change tier for every later spawn, fall-speed and score evaluation
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if !self.state.select_difficulty(difficulty) {
            return false;
        }
        self.events.push(GameEvent::DifficultyChanged(difficulty));
        true
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over
    }

    /// Virtual time (ms) since the session started
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Set once the game is over
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
