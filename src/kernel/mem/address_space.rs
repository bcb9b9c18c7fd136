use bitflags::bitflags;
use eonix_mm::address::{VAddr, VRange};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VmFlags: u32 {
        const READ = 0x1;
        const WRITE = 0x2;
        const EXEC = 0x4;
        /// A stack that is extended downwards on faults right below it.
        const GROWSDOWN = 0x100;
    }
}

/// A copy of one area of an address space, taken under the shared lock.
#[derive(Debug, Clone, Copy)]
pub struct VmArea {
    pub range: VRange,
    pub flags: VmFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackGrowError {
    /// The area does not grow downwards.
    NotGrowsDown,
    /// The area is no longer part of the address space.
    NoArea,
    /// The stack would get larger than the stack limit.
    LimitExceeded,
    /// The stack would run into the area below it.
    Overlap,
}

/// Queries allowed while holding the address space lock in shared mode.
///
/// Dropping the implementor releases the lock.
pub trait VmaLookup {
    /// Find the first area that ends above `addr`. The area does not
    /// necessarily contain `addr`.
    fn find_vma(&self, addr: VAddr) -> Option<VmArea>;

    /// Extend the grows-down `area` so that it covers `addr`, returning the
    /// updated area.
    fn expand_stack(&self, area: &VmArea, addr: VAddr) -> Result<VmArea, StackGrowError>;
}

pub trait AddressSpace {
    type ReadGuard<'a>: VmaLookup
    where
        Self: 'a;

    /// Acquire the address space lock in shared mode.
    fn lock_shared(&self) -> Self::ReadGuard<'_>;
}

impl VmArea {
    pub fn contains(&self, addr: VAddr) -> bool {
        self.range.contains(addr)
    }

    pub fn is_writable(&self) -> bool {
        self.flags.contains(VmFlags::WRITE)
    }

    pub fn is_executable(&self) -> bool {
        self.flags.contains(VmFlags::EXEC)
    }

    pub fn grows_down(&self) -> bool {
        self.flags.contains(VmFlags::GROWSDOWN)
    }
}
