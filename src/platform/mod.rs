//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing (first-callback baseline)
//! - Frame scheduling (requestAnimationFrame on web, a queue natively)
//! - Keyboard input mapping

use crate::sim::TickInput;

/// Which loop a scheduled frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopTarget {
    Game,
    Preview,
}

/// Opaque id of a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// "Call me back once before the next paint"
pub trait FrameScheduler {
    fn request_frame(&mut self, target: LoopTarget) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Turns absolute frame timestamps into deltas.
///
/// The first timestamp only establishes the baseline, so the first frame of
/// a loop never simulates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    last_frame_ms: Option<f64>,
}

impl FrameClock {
    /// Seconds since the previous call, or `None` on the first call
    pub fn advance(&mut self, now_ms: f64) -> Option<f32> {
        let last = self.last_frame_ms.replace(now_ms)?;
        Some(((now_ms - last) / 1000.0) as f32)
    }

    pub fn reset(&mut self) {
        self.last_frame_ms = None;
    }
}

/// Scheduler that queues requests for the caller to run. Used headless and
/// in tests.
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    next_handle: i32,
    pending: Vec<(FrameHandle, LoopTarget)>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests still waiting to run, oldest first
    pub fn pending(&self) -> &[(FrameHandle, LoopTarget)] {
        &self.pending
    }

    /// Remove and return every pending request
    pub fn take_pending(&mut self) -> Vec<(FrameHandle, LoopTarget)> {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&mut self, target: LoopTarget) -> FrameHandle {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending.push((handle, target));
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|(h, _)| *h != handle);
    }
}

/// Directional key, by `KeyboardEvent.key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Pause,
}

impl Key {
    pub fn from_key_name(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "Escape" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// Update the held-key set for a keydown (`pressed`) or keyup.
/// Returns false for keys the game does not use.
pub fn apply_key(input: &mut TickInput, key: &str, pressed: bool) -> bool {
    let Some(key) = Key::from_key_name(key) else {
        return false;
    };

    let slot = match key {
        Key::Up => &mut input.up,
        Key::Down => &mut input.down,
        Key::Left => &mut input.left,
        Key::Right => &mut input.right,
        Key::Pause => &mut input.pause,
    };
    *slot = pressed;
    true
}

/// Keys (by `KeyboardEvent.code`) that restart the game
pub fn is_restart_code(code: &str) -> bool {
    matches!(code, "Space" | "Enter")
}
