// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

/// Turns host callbacks arriving at any rate into ticks at a target rate.
#[derive(Clone, Debug)]
pub struct FrameScheduler {
    interval: Duration,
    last_tick: Option<Instant>,
}

fn interval_for(fps: f64) -> Duration {
    let fps = if fps.is_finite() { fps.max(0.001) } else { 1.0 };
    Duration::from_nanos((1e9 / fps).round() as u64)
}

impl FrameScheduler {
    pub fn new(fps: f64) -> Self {
        Self {
            interval: interval_for(fps),
            last_tick: None,
        }
    }

    /// Takes effect on the next [`FrameScheduler::poll`].
    pub fn set_fps(&mut self, fps: f64) {
        self.interval = interval_for(fps);
    }

    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[cfg(test)]
    pub fn last_tick(&self) -> Option<Instant> {
        self.last_tick
    }

    /// Forget the last tick; the next poll only records its baseline.
    pub fn reset(&mut self) {
        self.last_tick = None;
    }

    /// Returns true when this callback should run a tick. The first poll
    /// after a reset starts the clock, so the first tick lands one interval
    /// later. The remainder of the elapsed time past a whole interval is
    /// carried into the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return false;
        };

        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.interval {
            return false;
        }

        let interval_ns = self.interval.as_nanos().max(1);
        let remainder = Duration::from_nanos((elapsed.as_nanos() % interval_ns) as u64);
        self.last_tick = Some(now - remainder);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn accepts_once_and_carries_only_the_remainder() {
        let t0 = Instant::now();
        let mut s = FrameScheduler::new(10.0);
        assert!(!s.poll(t0));

        let accepted: Vec<bool> = [30, 70, 105, 165]
            .into_iter()
            .map(|t| s.poll(t0 + ms(t)))
            .collect();
        assert_eq!(accepted, vec![false, false, true, false]);
        assert_eq!(s.last_tick(), Some(t0 + ms(100)));
    }

    #[test]
    fn long_stall_does_not_burst() {
        let t0 = Instant::now();
        let mut s = FrameScheduler::new(10.0);
        s.poll(t0);
        assert!(s.poll(t0 + ms(1_050)));
        assert_eq!(s.last_tick(), Some(t0 + ms(1_000)));
        assert!(!s.poll(t0 + ms(1_060)));
        assert!(s.poll(t0 + ms(1_100)));
    }

    #[test]
    fn exact_interval_is_accepted() {
        let t0 = Instant::now();
        let mut s = FrameScheduler::new(20.0);
        s.poll(t0);
        assert!(s.poll(t0 + ms(50)));
        assert_eq!(s.last_tick(), Some(t0 + ms(50)));
    }

    #[test]
    fn rate_change_applies_on_next_poll() {
        let t0 = Instant::now();
        let mut s = FrameScheduler::new(10.0);
        s.poll(t0);
        assert!(!s.poll(t0 + ms(60)));
        s.set_fps(20.0);
        assert!(s.poll(t0 + ms(60)));
        assert_eq!(s.last_tick(), Some(t0 + ms(50)));
    }

    #[test]
    fn first_poll_after_reset_waits_a_full_interval() {
        let t0 = Instant::now();
        let mut s = FrameScheduler::new(1.0);
        s.poll(t0);
        assert!(s.poll(t0 + ms(1_000)));
        s.reset();
        assert!(!s.poll(t0 + ms(5_000)));
        assert_eq!(s.last_tick(), Some(t0 + ms(5_000)));
        assert!(!s.poll(t0 + ms(5_999)));
        assert!(s.poll(t0 + ms(6_000)));
    }
}
