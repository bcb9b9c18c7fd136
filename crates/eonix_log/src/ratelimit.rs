use spin::Mutex;

struct Window {
    begin: Option<u64>,
    printed: u32,
    missed: u32,
}

/// Allows at most `burst` messages in every `interval` milliseconds.
///
/// The caller passes in the current time so the limiter works with whatever
/// clock the kernel has, including none at all during early boot.
pub struct RateLimit {
    interval: u64,
    burst: u32,
    window: Mutex<Window>,
}

impl RateLimit {
    pub const DEFAULT_INTERVAL_MS: u64 = 5000;
    pub const DEFAULT_BURST: u32 = 10;

    pub const fn new(interval: u64, burst: u32) -> Self {
        Self {
            interval,
            burst,
            window: Mutex::new(Window {
                begin: None,
                printed: 0,
                missed: 0,
            }),
        }
    }

    /// Returns whether a message may be printed at `now` (in milliseconds).
    ///
    /// When a new window starts after some messages were suppressed, the
    /// number of suppressed messages is reported through a warning.
    pub fn allow(&self, now: u64) -> bool {
        // An interval of zero disables limiting.
        if self.interval == 0 {
            return true;
        }

        // Never spin on the limiter: a contended window means someone else
        // is printing right now, so drop this one.
        let Some(mut window) = self.window.try_lock() else {
            return false;
        };

        let begin = *window.begin.get_or_insert(now);
        if now.saturating_sub(begin) >= self.interval {
            if window.missed != 0 {
                crate::println_warn!("{} messages suppressed", window.missed);
            }

            window.begin = Some(now);
            window.printed = 0;
            window.missed = 0;
        }

        if window.printed < self.burst {
            window.printed += 1;
            true
        } else {
            window.missed += 1;
            false
        }
    }

    pub fn missed(&self) -> u32 {
        self.window.lock().missed
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL_MS, Self::DEFAULT_BURST)
    }
}

#[cfg(test)]
mod tests {
    use super::RateLimit;

    #[test]
    fn burst_then_suppress() {
        let limit = RateLimit::new(1000, 3);

        assert!(limit.allow(0));
        assert!(limit.allow(10));
        assert!(limit.allow(20));
        assert!(!limit.allow(30));
        assert!(!limit.allow(999));
        assert_eq!(limit.missed(), 2);
    }

    #[test]
    fn new_window_resets_budget() {
        let limit = RateLimit::new(1000, 1);

        assert!(limit.allow(5));
        assert!(!limit.allow(500));
        assert!(limit.allow(1005));
        assert_eq!(limit.missed(), 0);
    }

    #[test]
    fn zero_interval_never_limits() {
        let limit = RateLimit::new(0, 0);
        assert!((0..100).all(|now| limit.allow(now)));
    }
}
