use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    /// Ticks the active scene spent waiting instead of simulating.
    pub paused_ticks: u32,
}

/// Counts frames and ticks over a fixed interval and turns them into rates.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    paused_ticks: u32,
    frame_time_total: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            frames: 0,
            ticks: 0,
            paused_ticks: 0,
            frame_time_total: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_total = self.frame_time_total.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self, paused: bool) {
        self.ticks = self.ticks.saturating_add(1);
        if paused {
            self.paused_ticks = self.paused_ticks.saturating_add(1);
        }
    }

    /// Emits and resets once `interval` has elapsed since the last emission.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_total.as_secs_f32() * 1000.0 / frames as f32,
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms,
            paused_ticks: self.paused_ticks,
        };

        *self = Self::new(self.interval, now);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_cover_the_elapsed_interval() {
        let start = Instant::now();
        let mut metrics = MetricsAccumulator::new(Duration::from_secs(2), start);
        for _ in 0..4 {
            metrics.record_frame(Duration::from_millis(20));
        }
        for paused in [false, false, true, true, true, false] {
            metrics.record_tick(paused);
        }

        assert!(metrics
            .maybe_snapshot(start + Duration::from_millis(1500))
            .is_none());
        let snapshot = metrics
            .maybe_snapshot(start + Duration::from_secs(2))
            .expect("snapshot");

        assert!((snapshot.fps - 2.0).abs() < 0.01);
        assert!((snapshot.tps - 3.0).abs() < 0.01);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.01);
        assert_eq!(snapshot.paused_ticks, 3);
    }

    #[test]
    fn emission_resets_counters() {
        let start = Instant::now();
        let mut metrics = MetricsAccumulator::new(Duration::from_secs(1), start);
        metrics.record_tick(true);
        metrics.maybe_snapshot(start + Duration::from_secs(1)).expect("first");

        let second = metrics
            .maybe_snapshot(start + Duration::from_secs(2))
            .expect("second");
        assert_eq!(second, LoopMetricsSnapshot::default());
    }
}
