use super::addr::Addr;
use crate::paging::{PAGE_SIZE_BITS, PFN};
use core::{fmt, ptr::NonNull};

#[repr(transparent)]
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub struct PAddr(usize);

/// Translates physical addresses into pointers the kernel can dereference.
pub trait PhysAccess {
    /// # Safety
    /// The caller MUST ensure that `paddr` refers to memory that is actually
    /// present and that the returned pointer is used with the right type.
    unsafe fn as_ptr<T>(paddr: PAddr) -> NonNull<T>;
}

impl From<usize> for PAddr {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

impl fmt::Debug for PAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PAddr({:#x})", self.0)
    }
}

impl Addr for PAddr {
    fn addr(self) -> usize {
        self.0
    }
}

impl From<PFN> for PAddr {
    fn from(value: PFN) -> Self {
        Self(usize::from(value) << PAGE_SIZE_BITS)
    }
}
