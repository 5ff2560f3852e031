//! Game orchestrator
//!
//! Owns the current run, the optional preview sandbox and the persisted
//! settings, and drives both loops from scheduler callbacks. Each loop keeps
//! its own clock and pending frame handle; stopping a loop cancels its
//! pending frame.

use crate::consts::*;
use crate::platform::{FrameClock, FrameHandle, FrameScheduler, LoopTarget};
use crate::renderer::{self, Surface, Viewport};
use crate::settings::Settings;
use crate::sim::{
    Colour, GameEvent, GamePhase, GameState, PreviewState, TickInput, preview_tick, tick,
};

pub struct Game {
    settings: Settings,
    state: Option<GameState>,
    preview: Option<PreviewState>,
    game_clock: FrameClock,
    preview_clock: FrameClock,
    game_frame: Option<FrameHandle>,
    preview_frame: Option<FrameHandle>,
}

impl Game {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            state: None,
            preview: None,
            game_clock: FrameClock::default(),
            preview_clock: FrameClock::default(),
            game_frame: None,
            preview_frame: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewState> {
        self.preview.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.state
            .as_ref()
            .map_or(GamePhase::NotStarted, |s| s.phase)
    }

    pub fn has_ended(&self) -> bool {
        self.phase() == GamePhase::Ended
    }

    pub fn is_game_running(&self) -> bool {
        self.game_frame.is_some()
    }

    pub fn is_preview_running(&self) -> bool {
        self.preview_frame.is_some()
    }

    /// Final `(score, time_ms)` of an ended run
    pub fn results(&self) -> Option<(u32, u64)> {
        let state = self.state.as_ref()?;
        Some((state.score, state.time_taken_ms?))
    }

    /// Take notifications queued by the main loop
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state
            .as_mut()
            .map(GameState::drain_events)
            .unwrap_or_default()
    }

    // === Viewports ===

    /// Fit the main stage into `width` x `height` physical pixels
    pub fn resize_game(&self, width: f32, height: f32, surface: &mut impl Surface) -> Viewport {
        let viewport = Viewport::fit_game(width, height);
        surface.set_transform(&viewport);
        viewport
    }

    /// Fit the preview stage; `None` when the preview is not running
    pub fn resize_preview(
        &self,
        width: f32,
        height: f32,
        surface: &mut impl Surface,
    ) -> Option<Viewport> {
        self.preview.as_ref()?;
        let viewport = Viewport::fit_preview(width, height);
        surface.set_transform(&viewport);
        Some(viewport)
    }

    // === Main loop ===

    /// Begin a fresh run and schedule its first frame
    pub fn start_game(&mut self, seed: u64, scheduler: &mut impl FrameScheduler) {
        self.state = Some(GameState::new(seed, &self.settings.player_params()));
        self.game_clock.reset();
        self.game_frame = Some(scheduler.request_frame(LoopTarget::Game));
        log::info!("Game started (seed {})", seed);
    }

    /// Cancel the pending frame and black out the stage
    pub fn stop_game(&mut self, scheduler: &mut impl FrameScheduler, surface: &mut impl Surface) {
        if let Some(handle) = self.game_frame.take() {
            scheduler.cancel_frame(handle);
            log::info!("Game stopped");
        }
        self.game_clock.reset();
        renderer::clear(surface, GAME_REF_WIDTH, GAME_REF_HEIGHT);
    }

    pub fn restart_game(
        &mut self,
        seed: u64,
        scheduler: &mut impl FrameScheduler,
        surface: &mut impl Surface,
    ) {
        self.stop_preview(scheduler);
        self.stop_game(scheduler, surface);
        self.start_game(seed, scheduler);
    }

    /// Scheduler callback for the main loop. The first call after a start
    /// only records the timestamp.
    pub fn next_game_frame(
        &mut self,
        now_ms: f64,
        input: &TickInput,
        scheduler: &mut impl FrameScheduler,
        surface: &mut impl Surface,
    ) {
        if self.game_frame.take().is_none() {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if let Some(dt) = self.game_clock.advance(now_ms) {
            tick(state, input, dt);
            renderer::draw_game(surface, state);
        }

        self.game_frame = Some(scheduler.request_frame(LoopTarget::Game));
    }

    // === Preview loop ===

    pub fn start_preview(&mut self, seed: u64, scheduler: &mut impl FrameScheduler) {
        if let Some(handle) = self.preview_frame.take() {
            scheduler.cancel_frame(handle);
        }
        self.preview = Some(PreviewState::new(seed, &self.settings.player_params()));
        self.preview_clock.reset();
        self.preview_frame = Some(scheduler.request_frame(LoopTarget::Preview));
        log::info!("Preview started");
    }

    pub fn stop_preview(&mut self, scheduler: &mut impl FrameScheduler) {
        if let Some(handle) = self.preview_frame.take() {
            scheduler.cancel_frame(handle);
            log::info!("Preview stopped");
        }
        self.preview_clock.reset();
        self.preview = None;
    }

    /// Scheduler callback for the preview loop
    pub fn next_preview_frame(
        &mut self,
        now_ms: f64,
        input: &TickInput,
        scheduler: &mut impl FrameScheduler,
        surface: &mut impl Surface,
    ) {
        if self.preview_frame.take().is_none() {
            return;
        }
        let Some(preview) = self.preview.as_mut() else {
            return;
        };

        if let Some(dt) = self.preview_clock.advance(now_ms) {
            preview_tick(preview, input, dt);
            renderer::draw_preview(surface, preview);
        }

        self.preview_frame = Some(scheduler.request_frame(LoopTarget::Preview));
    }

    // === Player tuning ===
    //
    // Each change is persisted immediately and applied live to the preview
    // player. The main run picks it up on the next start.

    pub fn update_player_size(&mut self, percent: f32) {
        self.settings.player_size = percent;
        self.settings.save();
        if let Some(preview) = &mut self.preview {
            preview.player.set_size(percent);
        }
    }

    pub fn update_player_speed(&mut self, percent: f32) {
        self.settings.player_speed = percent;
        self.settings.save();
        if let Some(preview) = &mut self.preview {
            preview.player.set_speed(percent);
        }
    }

    pub fn update_player_inv_time(&mut self, percent: f32) {
        self.settings.player_inv_time = percent;
        self.settings.save();
        if let Some(preview) = &mut self.preview {
            preview.player.set_powerup_time(percent);
        }
    }

    /// `slider` is the value the player sees; it is stored inverted
    pub fn update_charges_needed(&mut self, slider: f32) {
        let stored = 1.0 - slider;
        self.settings.player_charges_needed = stored;
        self.settings.save();
        if let Some(preview) = &mut self.preview {
            preview.player.set_charges_needed(stored);
        }
    }

    /// Accepts hex with or without a leading `#`; empty input is ignored
    pub fn update_colour(&mut self, hex: &str) {
        let hex = hex.trim();
        if hex.is_empty() {
            return;
        }
        let hex = if hex.starts_with('#') {
            hex.to_string()
        } else {
            format!("#{}", hex)
        };

        let colour = Colour::from_hex(&hex);
        self.settings.player_colour = hex;
        self.settings.save();
        if let Some(preview) = &mut self.preview {
            preview.player.set_base_colour(colour);
        }
    }
}
