use crate::paging::PAGE_SIZE;

pub trait Addr: Copy + Ord + From<usize> {
    fn addr(self) -> usize;
}

pub trait AddrOps: Sized {
    fn is_page_aligned(self) -> bool;

    /// Round down to the start of the page.
    fn floor(self) -> Self;
}

impl<A: Addr> AddrOps for A {
    fn is_page_aligned(self) -> bool {
        self.addr() % PAGE_SIZE == 0
    }

    fn floor(self) -> Self {
        Self::from(self.addr() & !(PAGE_SIZE - 1))
    }
}
