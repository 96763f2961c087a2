//! Frame scheduling
//!
//! The host drives frames (a redraw request per display refresh); the
//! [`RenderLoop`] decides whether a frame should still be produced and measures
//! the time between frames. Cancelling its [`CancellationToken`] stops frame
//! production for good.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared single-shot cancellation flag
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; later calls have no further effect
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Timing information for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Sequence number, starting at 0
    pub frame: u64,
    /// Seconds since the previous frame (0 for the first)
    pub dt: f32,
}

/// Owned frame scheduler
#[derive(Debug)]
pub struct RenderLoop {
    token: CancellationToken,
    last_frame: Option<Instant>,
    frames: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            last_frame: None,
            frames: 0,
        }
    }

    /// Token that stops this loop when cancelled
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Stop producing frames
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Number of frames produced so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Start a frame, or return `None` once cancelled
    pub fn tick(&mut self) -> Option<FrameTick> {
        if self.token.is_cancelled() {
            return None;
        }
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last))
            .unwrap_or(Duration::ZERO)
            .as_secs_f32();
        self.last_frame = Some(now);

        let tick = FrameTick { frame: self.frames, dt };
        self.frames += 1;
        Some(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_until_cancelled() {
        let mut render_loop = RenderLoop::new();
        let first = render_loop.tick().unwrap();
        assert_eq!(first.frame, 0);
        assert_eq!(first.dt, 0.0);

        let second = render_loop.tick().unwrap();
        assert_eq!(second.frame, 1);
        assert!(second.dt >= 0.0);

        render_loop.cancel();
        assert!(!render_loop.is_running());
        assert!(render_loop.tick().is_none());
        assert_eq!(render_loop.frame_count(), 2);
    }

    #[test]
    fn test_token_cancels_from_a_clone() {
        let mut render_loop = RenderLoop::new();
        let token = render_loop.token();
        token.cancel();
        token.cancel();
        assert!(render_loop.tick().is_none());
    }
}
