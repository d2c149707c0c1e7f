use std::time::Duration;

/// Trailing-edge debounce on a seconds clock (see [`crate::util::time`]).
///
/// Every `schedule` pushes the deadline back; `poll` fires once after a
/// quiet period and then disarms.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: delay.as_secs_f64(),
            deadline: None,
        }
    }

    /// Restart the quiet window at `now`.
    pub fn schedule(&mut self, now: f64) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the deadline, for scheduling a wake-up.
    pub fn remaining(&self, now: f64) -> Option<Duration> {
        self.deadline
            .map(|deadline| Duration::from_secs_f64((deadline - now).max(0.0)))
    }

    /// True once `now` has reached the deadline. Disarms when it fires.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_last_schedule_fires() {
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        debounce.schedule(0.0);
        debounce.schedule(0.2);
        assert!(!debounce.poll(0.35));
        assert!(debounce.poll(0.5));
        assert!(!debounce.poll(0.9));
    }

    #[test]
    fn cancel_disarms() {
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        debounce.schedule(1.0);
        debounce.cancel();
        assert!(!debounce.poll(5.0));
        assert!(debounce.remaining(5.0).is_none());
    }

    #[test]
    fn remaining_never_negative() {
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        debounce.schedule(0.0);
        assert_eq!(debounce.remaining(1.0), Some(Duration::ZERO));
    }
}
