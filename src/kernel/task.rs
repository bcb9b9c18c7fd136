use posix_types::signal::{SigInfo, Signal};

use super::mem::AddressSpace;

/// The task a synchronous fault is taken on behalf of.
pub trait FaultingTask {
    type Space: AddressSpace;

    fn pid(&self) -> u32;
    fn comm(&self) -> &str;

    /// The user address space, or `None` for kernel threads.
    fn mm(&self) -> Option<&Self::Space>;

    /// Whether a signal that will kill the task is already queued.
    fn fatal_signal_pending(&self) -> bool;

    /// Whether `signal` would end up with the default action, i.e. the task
    /// has neither blocked nor installed a handler for it.
    fn is_signal_unhandled(&self, signal: Signal) -> bool;

    /// Queue `info` for the task, overriding any blocking or ignoring.
    fn force_signal(&self, info: SigInfo);

    /// Bump the major or minor fault counter.
    fn account_fault(&self, major: bool);
}
