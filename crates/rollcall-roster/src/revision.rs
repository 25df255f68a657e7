use std::sync::atomic::{AtomicI64, Ordering};

/// Hands out "last modified" markers for message metadata: wall-clock
/// milliseconds, bumped when needed so every marker is strictly larger than
/// the previous one.
#[derive(Debug, Default)]
pub struct RevisionClock {
    last: AtomicI64,
}

impl RevisionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        self.next_after(chrono::Utc::now().timestamp_millis())
    }

    fn next_after(&self, now: i64) -> i64 {
        let prev = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(prev + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictly_increasing_when_clock_stalls() {
        let clock = RevisionClock::new();
        assert_eq!(clock.next_after(1000), 1000);
        assert_eq!(clock.next_after(1000), 1001);
        assert_eq!(clock.next_after(900), 1002);
        assert_eq!(clock.next_after(5000), 5000);
    }

    #[test]
    fn follows_wall_clock() {
        let clock = RevisionClock::new();
        let a = clock.next();
        let b = clock.next();
        assert!(b > a);
        assert!(a > 1_600_000_000_000);
    }
}
