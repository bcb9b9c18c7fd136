use super::Signal;

/// Address not mapped to object.
pub const SEGV_MAPERR: u32 = 1;
/// Invalid permissions for mapped object.
pub const SEGV_ACCERR: u32 = 2;

/// Nonexistent physical address.
pub const BUS_ADRERR: u32 = 2;

#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigInfo {
    pub si_signo: u32,    // Signal number
    pub si_errno: u32,    // Error number
    pub si_code: u32,     // Signal code
    pub si_trapno: u32,   // Trap number that caused the signal
    pub si_pid: u32,      // Sending process ID
    pub si_uid: u32,      // Sending user ID
    pub si_addr: usize,   // Address that caused the fault
    pub si_addr_lsb: u16, // Least significant bit of address
}

impl SigInfo {
    /// Signal information for a synchronous fault at `addr`.
    pub fn fault(signal: Signal, code: u32, addr: usize) -> Self {
        Self {
            si_signo: signal.into_raw(),
            si_code: code,
            si_addr: addr,
            ..Default::default()
        }
    }

    pub fn signal(&self) -> Signal {
        Signal::from_raw(self.si_signo)
    }
}
