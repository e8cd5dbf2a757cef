use std::time::{Duration, Instant};

/// Paces redraws to a fixed delay between frames.
///
/// The event loop asks [`FramePacer::frame_due`] once per wake-up and
/// sleeps until [`FramePacer::next_frame`] otherwise, so a pending
/// redraw never keeps the loop spinning.
#[derive(Debug, Clone)]
pub struct FramePacer {
    delay: Duration,
    next_frame: Instant,
}

impl FramePacer {
    /// The first frame is due immediately at `start`.
    pub fn new(delay: Duration, start: Instant) -> Self {
        Self {
            delay,
            next_frame: start,
        }
    }

    /// Returns true when a frame should be drawn at `now` and schedules
    /// the following one a full delay later.
    pub fn frame_due(&mut self, now: Instant) -> bool {
        if now < self.next_frame {
            return false;
        }
        self.next_frame = now + self.delay;
        true
    }

    pub fn next_frame(&self) -> Instant {
        self.next_frame
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(25);

    #[test]
    fn first_frame_is_due_at_start() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(DELAY, start);
        assert!(pacer.frame_due(start));
        assert_eq!(pacer.next_frame(), start + DELAY);
    }

    #[test]
    fn no_frame_before_the_delay_elapses() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(DELAY, start);
        assert!(pacer.frame_due(start));
        assert!(!pacer.frame_due(start + Duration::from_millis(1)));
        assert!(!pacer.frame_due(start + Duration::from_millis(24)));
        assert_eq!(pacer.next_frame(), start + DELAY);
        assert!(pacer.frame_due(start + DELAY));
    }

    #[test]
    fn late_wake_up_does_not_burst() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(DELAY, start);
        assert!(pacer.frame_due(start));
        let late = start + Duration::from_millis(100);
        assert!(pacer.frame_due(late));
        assert!(!pacer.frame_due(late + Duration::from_millis(10)));
        assert_eq!(pacer.next_frame(), late + DELAY);
    }
}
