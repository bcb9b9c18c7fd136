use super::{RawPageTable, PTE};
use crate::{
    address::{Addr as _, PAddr, PhysAccess, VAddr},
    paging::PFN,
};

pub trait PagingMode {
    type Entry: PTE;
    type RawTable<'a>: RawPageTable<'a, Entry = Self::Entry>;

    /// Levels from the root table down to the leaf table.
    const LEVELS: &'static [PageTableLevel];

    /// Get the table stored in frame `pfn`, reached through `A`.
    ///
    /// # Safety
    /// `pfn` MUST hold a page table of this paging mode that stays alive for `'a`.
    unsafe fn raw_table<'a, A: PhysAccess>(pfn: PFN) -> Self::RawTable<'a> {
        unsafe {
            // SAFETY: The caller guarantees that `pfn` holds a page table.
            <Self::RawTable<'a> as RawPageTable<'a>>::from_ptr(A::as_ptr(PAddr::from(pfn)))
        }
    }
}

#[derive(Clone, Copy, PartialOrd, PartialEq, Debug)]
pub struct PageTableLevel(usize, usize);

impl PageTableLevel {
    pub const fn new(nth_bit: usize, len: usize) -> Self {
        Self(nth_bit, len)
    }

    pub const fn nth_bit(self) -> usize {
        self.0
    }

    pub const fn len(self) -> usize {
        self.1
    }

    pub const fn page_size(self) -> usize {
        1 << self.nth_bit()
    }

    pub const fn max_index(self) -> u16 {
        (1 << self.len()) - 1
    }

    pub fn index_of(self, vaddr: VAddr) -> u16 {
        ((vaddr.addr() >> self.nth_bit()) & ((1 << self.len()) - 1)) as u16
    }
}
