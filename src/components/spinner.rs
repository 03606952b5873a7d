use std::time::{Duration, Instant};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Animated braille glyph shown in front of the progress line.
#[derive(Debug, Clone)]
pub struct Spinner {
    frame_index: usize,
    last_frame_time: Instant,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            frame_index: 0,
            last_frame_time: Instant::now(),
        }
    }

    /// Advances the animation if the frame duration elapsed. Returns whether it moved.
    pub fn tick(&mut self) -> bool {
        if self.last_frame_time.elapsed() >= FRAME_DURATION {
            self.frame_index = (self.frame_index + 1) % FRAMES.len();
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }

    pub fn current_frame(&self) -> &'static str {
        FRAMES[self.frame_index % FRAMES.len()]
    }
}
