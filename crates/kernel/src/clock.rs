/// Turns host frame timestamps into simulation deltas.
///
/// The first frame and any long stall (a backgrounded tab, a debugger break)
/// produce a bounded delta, so projectiles never jump across the map.
#[derive(Debug)]
pub struct FrameClock {
    last: Option<f64>,
    nominal_dt: f32,
    max_dt: f32,
    history: Vec<f32>,
    index: usize,
    filled: bool,
}

impl FrameClock {
    pub fn new(nominal_dt: f32, max_dt: f32, window: usize) -> Self {
        Self {
            last: None,
            nominal_dt,
            max_dt,
            history: vec![0.0; window.max(1)],
            index: 0,
            filled: false,
        }
    }

    /// 60 Hz nominal, deltas capped at 100 ms, averaged over 120 frames.
    pub fn sixty_hz() -> Self {
        Self::new(1.0 / 60.0, 0.1, 120)
    }

    /// Feed the host timestamp (seconds) for a new frame; returns its delta.
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            None => self.nominal_dt,
            Some(prev) => ((now - prev) as f32).clamp(0.0, self.max_dt),
        };
        self.last = Some(now);
        self.record(dt);
        dt
    }

    /// Mean delta over the window, zero before the first frame.
    pub fn average_dt(&self) -> f32 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        self.history[..count].iter().sum::<f32>() / count as f32
    }

    pub fn fps(&self) -> f32 {
        let avg = self.average_dt();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }

    pub fn count(&self) -> usize {
        if self.filled {
            self.history.len()
        } else {
            self.index
        }
    }

    fn record(&mut self, dt: f32) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.history.len();
        if self.index == 0 {
            self.filled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_uses_nominal_delta() {
        let mut clock = FrameClock::sixty_hz();
        assert!((clock.tick(1234.5) - 1.0 / 60.0).abs() < 1e-7);
    }

    #[test]
    fn deltas_follow_timestamps_and_clamp() {
        let mut clock = FrameClock::new(0.02, 0.1, 8);
        clock.tick(0.0);
        assert!((clock.tick(0.05) - 0.05).abs() < 1e-6);
        assert_eq!(clock.tick(10.0), 0.1);
        // Time going backwards yields a zero delta, never a negative one.
        assert_eq!(clock.tick(9.0), 0.0);
    }

    #[test]
    fn average_wraps_around_the_window() {
        let mut clock = FrameClock::new(0.01, 1.0, 2);
        clock.tick(0.0); // 0.01
        clock.tick(0.02); // 0.02
        clock.tick(0.05); // 0.03 overwrites the first
        assert_eq!(clock.count(), 2);
        assert!((clock.average_dt() - 0.025).abs() < 1e-6);
        assert!((clock.fps() - 40.0).abs() < 0.01);
    }

    #[test]
    fn empty_clock_reports_zero() {
        let clock = FrameClock::sixty_hz();
        assert_eq!(clock.count(), 0);
        assert_eq!(clock.fps(), 0.0);
    }
}
