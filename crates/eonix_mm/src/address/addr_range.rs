use super::addr::Addr;
use core::fmt;

/// Addresses from `start` up to, but not including, `end`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AddrRange<A: Addr> {
    start: A,
    end: A,
}

impl<A: Addr> AddrRange<A> {
    /// # Panics
    /// Panics if the start address is greater than the end address.
    pub fn new(start: A, end: A) -> Self {
        assert!(start <= end, "Address range ends before it starts");
        Self { start, end }
    }

    pub const fn start(&self) -> A {
        self.start
    }

    pub const fn end(&self) -> A {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, addr: A) -> bool {
        self.start <= addr && addr < self.end
    }
}

impl<A: Addr + fmt::Debug> fmt::Debug for AddrRange<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?})", self.start, self.end)
    }
}
