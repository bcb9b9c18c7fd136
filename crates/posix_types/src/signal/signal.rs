use core::fmt;

/// A signal number as the kernel delivers it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signal(u32);

impl Signal {
    pub const SIGBUS: Signal = Signal(7);
    pub const SIGSEGV: Signal = Signal(11);

    pub const fn into_raw(self) -> u32 {
        self.0
    }

    /// Signal numbers come from the trap path and are not range checked.
    pub const fn from_raw(signo: u32) -> Self {
        Signal(signo)
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Signal::SIGBUS => f.write_str("SIGBUS"),
            Signal::SIGSEGV => f.write_str("SIGSEGV"),
            Signal(signo) => write!(f, "Signal({signo})"),
        }
    }
}
