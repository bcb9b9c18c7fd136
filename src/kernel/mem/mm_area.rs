use core::sync::atomic::{AtomicUsize, Ordering};
use eonix_mm::address::{Addr as _, VAddr, VRange};

use super::{VmArea, VmFlags};

/// One area of an `MMList`.
///
/// The start address can move downwards while readers hold the list lock,
/// which is how stacks grow. The end address is fixed once the area is
/// inserted and is used as the key of the area.
#[derive(Debug)]
pub struct MMArea {
    start: AtomicUsize,
    end: VAddr,
    pub(super) flags: VmFlags,
}

impl MMArea {
    pub fn new(range: VRange, flags: VmFlags) -> Self {
        Self {
            start: AtomicUsize::new(range.start().addr()),
            end: range.end(),
            flags,
        }
    }

    pub fn start(&self) -> VAddr {
        VAddr::from(self.start.load(Ordering::Acquire))
    }

    pub fn end(&self) -> VAddr {
        self.end
    }

    pub fn range(&self) -> VRange {
        VRange::new(self.start(), self.end)
    }

    pub fn snapshot(&self) -> VmArea {
        VmArea {
            range: self.range(),
            flags: self.flags,
        }
    }

    /// Move the start of the area down to `start`.
    ///
    /// Callers serialize stack growth and make sure `start` stays above the
    /// end of the area below this one.
    pub(super) fn grow_down_to(&self, start: VAddr) {
        assert!(start <= self.start(), "Growing down to a higher address");
        self.start.store(start.addr(), Ordering::Release);
    }
}
