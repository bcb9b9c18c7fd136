mod pfn;

pub use pfn::PFN;

pub const PAGE_SIZE: usize = 4096;
pub const PAGE_SIZE_BITS: u32 = PAGE_SIZE.trailing_zeros();

/// A block of memory that is aligned to the page size.
///
/// Page tables are exactly one `PageBlock` large.
#[repr(align(4096))]
pub struct PageBlock([u8; PAGE_SIZE]);

impl PageBlock {
    pub const fn new() -> Self {
        Self([0; PAGE_SIZE])
    }
}
