use super::PTE;
use crate::paging::PageBlock;
use core::ptr::NonNull;

/// One page worth of page table entries at any level of the hierarchy.
pub trait RawPageTable<'a>: Send + 'a {
    type Entry: PTE + 'a;

    /// Return the entry at the given index.
    fn index(&self, index: u16) -> &'a Self::Entry;

    /// Return a mutable reference to the entry at the given index.
    fn index_mut(&mut self, index: u16) -> &'a mut Self::Entry;

    /// Get the page table pointed to by raw pointer `ptr`.
    ///
    /// # Safety
    /// `ptr` MUST point to a live, page aligned table of this paging mode
    /// that outlives `'a`.
    unsafe fn from_ptr(ptr: NonNull<PageBlock>) -> Self;
}
