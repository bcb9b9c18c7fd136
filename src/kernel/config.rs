use core::sync::atomic::{AtomicBool, Ordering};
use eonix_log::RateLimit;

/// Runtime knobs of the trap paths.
///
/// One instance is set up at boot and handed to the fault handler by
/// reference.
pub struct KernelConfig {
    show_unhandled_signals: AtomicBool,
    ratelimit: RateLimit,
}

impl KernelConfig {
    pub const fn new() -> Self {
        Self::with_ratelimit(RateLimit::new(
            RateLimit::DEFAULT_INTERVAL_MS,
            RateLimit::DEFAULT_BURST,
        ))
    }

    pub const fn with_ratelimit(ratelimit: RateLimit) -> Self {
        Self {
            show_unhandled_signals: AtomicBool::new(true),
            ratelimit,
        }
    }

    /// Whether user segfaults nobody handles get a line on the console.
    pub fn show_unhandled_signals(&self) -> bool {
        self.show_unhandled_signals.load(Ordering::Relaxed)
    }

    pub fn set_show_unhandled_signals(&self, show: bool) {
        self.show_unhandled_signals.store(show, Ordering::Relaxed);
    }

    pub fn ratelimit(&self) -> &RateLimit {
        &self.ratelimit
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new()
    }
}
