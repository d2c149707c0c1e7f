use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Seconds since the first call, on a monotonic clock. Debounce deadlines are
/// expressed on this clock.
pub fn current_time_secs() -> f64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backwards() {
        let first = current_time_secs();
        let second = current_time_secs();
        assert!(first >= 0.0);
        assert!(second >= first);
    }
}
