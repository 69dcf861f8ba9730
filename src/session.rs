//! Game session
//!
//! Owns the simulation context and the frame clock, gates input, and routes
//! simulation events to the outside world: sounds, the local high score and
//! the leaderboard. Failures out there are logged and never reach the core.

use crate::audio::{AudioSink, NullAudio, SoundEffect};
use crate::highscores::{LEADERBOARD_SIZE, LocalBest};
use crate::persistence::{
    Leaderboard, LeaderboardEntry, PlayerId, ScoreSubmission, SubmitError, SubmitOutcome,
    ValidationError,
};
use crate::platform::{self, KeyValueStore};
use crate::settings::Settings;
use crate::sim::{
    FrameClock, GameEvent, GamePhase, GameState, Playfield, RunSummary, Snapshot, run_plan,
};
use crate::tuning::Tuning;

/// A running game plus its collaborators
pub struct GameSession {
    state: GameState,
    clock: FrameClock,
    settings: Settings,
    store: Box<dyn KeyValueStore>,
    local_best: LocalBest,
    audio: Box<dyn AudioSink>,
    leaderboard: Option<Box<dyn Leaderboard>>,
    player_id: Option<PlayerId>,
    accepting_input: bool,
    paused: bool,
    last_submission: Option<Result<SubmitOutcome, SubmitError>>,
}

impl GameSession {
    /// New session in `Idle`. The local best is read from `store`.
    pub fn new(
        seed: u64,
        mut tuning: Tuning,
        playfield: Playfield,
        settings: Settings,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        tuning.decor_enabled = tuning.decor_enabled && settings.decorations;
        let local_best = LocalBest::load(&*store);
        log::info!("Session ready (seed {}, best {})", seed, local_best.score);
        Self {
            state: GameState::new(seed, tuning, playfield),
            clock: FrameClock::new(settings.max_speed_multiplier),
            settings,
            store,
            local_best,
            audio: Box::new(NullAudio),
            leaderboard: None,
            player_id: None,
            accepting_input: true,
            paused: false,
            last_submission: None,
        }
    }

    pub fn with_audio(mut self, mut audio: Box<dyn AudioSink>) -> Self {
        audio.set_volume(self.settings.effective_volume());
        self.audio = audio;
        self
    }

    pub fn with_leaderboard(mut self, leaderboard: Box<dyn Leaderboard>) -> Self {
        self.leaderboard = Some(leaderboard);
        self
    }

    /// Set the id finished runs are submitted under
    pub fn set_player_id(&mut self, raw: &str) -> Result<(), ValidationError> {
        let id = PlayerId::parse(raw)?;
        log::info!("Player id set to {}", id);
        self.player_id = Some(id);
        Ok(())
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        self.player_id.as_ref()
    }

    /// Overlays (id entry, menus) close the gate while they are open
    pub fn set_accepting_input(&mut self, accepting: bool) {
        self.accepting_input = accepting;
    }

    pub fn is_accepting_input(&self) -> bool {
        self.accepting_input && !self.paused
    }

    /// Jump input; starts the run from `Idle`
    pub fn jump(&mut self) {
        if !self.is_accepting_input() {
            return;
        }
        self.audio.resume();
        self.state.jump();
        self.dispatch_events();
    }

    /// Return to `Idle` after a run ended. Returns false when ignored.
    pub fn reset(&mut self) -> bool {
        if !self.is_accepting_input() || self.state.phase != GamePhase::Ended {
            return false;
        }
        self.state.reset();
        self.dispatch_events();
        true
    }

    /// Single-button input: restart when ended, jump otherwise
    pub fn primary_action(&mut self) {
        if self.state.phase == GamePhase::Ended {
            self.reset();
        } else {
            self.jump();
        }
    }

    /// Display refresh callback: run the ticks this wake-up is due and snapshot
    pub fn on_frame(&mut self, now_ms: f64) -> Snapshot {
        if !self.paused {
            let plan = self.clock.advance(now_ms);
            run_plan(&mut self.state, plan);
            self.dispatch_events();
        }
        self.snapshot()
    }

    /// Stop the clock (hidden tab); the world freezes in place
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.clock.stop();
            log::info!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            log::info!("Resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(Playfield::new(width, height));
    }

    pub fn toggle_hitbox(&mut self) {
        self.settings.toggle_hitbox();
        self.settings.save(&mut *self.store);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.audio.set_volume(self.settings.effective_volume());
        self.settings.save(&mut *self.store);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            &self.state,
            self.local_best.score,
            self.settings.show_hitbox,
        )
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_score(&self) -> u32 {
        self.local_best.score
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        &*self.store
    }

    /// Top of the leaderboard for the overlay UI
    pub fn leaderboard_top(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard
            .as_ref()
            .map(|lb| lb.top(LEADERBOARD_SIZE))
            .unwrap_or_default()
    }

    /// Outcome of the most recent score submission
    pub fn last_submission(&self) -> Option<&Result<SubmitOutcome, SubmitError>> {
        self.last_submission.as_ref()
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            if let Some(effect) = SoundEffect::for_event(&event) {
                self.audio.play(effect);
            }
            match event {
                GameEvent::Scored { .. } => {
                    if self.local_best.offer(self.state.score, &mut *self.store) {
                        log::debug!("New local best {}", self.local_best.score);
                    }
                }
                GameEvent::RunEnded { summary } => self.submit(&summary),
                _ => {}
            }
        }
    }

    fn submit(&mut self, summary: &RunSummary) {
        let (Some(leaderboard), Some(player)) = (self.leaderboard.as_mut(), &self.player_id) else {
            return;
        };
        let submission = ScoreSubmission::from_run(player.as_str(), summary);
        let result = leaderboard.submit(&submission, platform::unix_time_ms());
        match &result {
            Ok(outcome) => log::info!("Score submitted: {:?}", outcome),
            Err(e) => log::warn!("Score submission failed: {}", e),
        }
        self.last_submission = Some(result);
    }
}
