pub const DEFAULT_DURATION_SECS: u32 = 25 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Running(u32),
    Finished,
}

/// Countdown driven by an external once-per-second tick. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomodoroTimer {
    duration: u32,
    remaining: u32,
    running: bool,
}

impl PomodoroTimer {
    /// A zero duration is bumped to one second so the timer can still finish.
    pub fn new(duration_secs: u32) -> Self {
        let duration = duration_secs.max(1);
        Self {
            duration,
            remaining: duration,
            running: false,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starting an already running timer keeps its progress.
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.remaining = self.duration;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }

        if self.remaining <= 1 {
            self.stop();
            return Tick::Finished;
        }

        self.remaining -= 1;
        Tick::Running(self.remaining)
    }

    pub fn clock(&self) -> String {
        format_clock(self.remaining)
    }
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_DURATION_SECS, PomodoroTimer, Tick, format_clock};

    #[test]
    fn idle_until_started() {
        let mut timer = PomodoroTimer::new(3);
        assert_eq!(timer.tick(), Tick::Idle);
        assert_eq!(timer.remaining(), 3);
    }

    #[test]
    fn finishes_after_duration_ticks_and_resets() {
        let mut timer = PomodoroTimer::new(3);
        timer.start();

        assert_eq!(timer.tick(), Tick::Running(2));
        assert_eq!(timer.tick(), Tick::Running(1));
        assert_eq!(timer.tick(), Tick::Finished);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 3);
        assert_eq!(timer.tick(), Tick::Idle);
    }

    #[test]
    fn stop_resets_remaining() {
        let mut timer = PomodoroTimer::default();
        timer.start();
        timer.tick();
        timer.tick();
        assert_eq!(timer.remaining(), DEFAULT_DURATION_SECS - 2);

        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), DEFAULT_DURATION_SECS);
    }

    #[test]
    fn zero_duration_still_finishes() {
        let mut timer = PomodoroTimer::new(0);
        timer.start();
        assert_eq!(timer.tick(), Tick::Finished);
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(DEFAULT_DURATION_SECS), "25:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(100 * 60), "100:00");
    }
}
