use super::config::mm::PHYS_MAP_VIRT;
use core::{marker::PhantomData, ptr::NonNull};
use eonix_mm::{
    address::{Addr as _, PAddr, PhysAccess},
    page_table::{PageAttribute, PageTableLevel, PagingMode, RawPageTable, PTE},
    paging::{PageBlock, PFN},
};

pub const PA_V: u64 = 0b1 << 0;
pub const PA_R: u64 = 0b1 << 1;
pub const PA_W: u64 = 0b1 << 2;
pub const PA_X: u64 = 0b1 << 3;
pub const PA_U: u64 = 0b1 << 4;
pub const PA_G: u64 = 0b1 << 5;
pub const PA_A: u64 = 0b1 << 6;
pub const PA_D: u64 = 0b1 << 7;

pub const PA_SHIFT: u64 = 10;
// Bit 0-9 (V, R, W, X, U, G, A, D, RSW)
pub const PA_FLAGS_MASK: u64 = 0x3FF;

#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct PTE64(pub u64);

impl core::fmt::Debug for PTE64 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PTE64({:#x})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageAttribute64(u64);

pub struct RawPageTableSv48<'a>(NonNull<PTE64>, PhantomData<&'a ()>);

pub struct PagingModeSv48;

pub struct ArchPhysAccess;

// SAFETY: A page table is plain memory. Concurrent access is serialized by
//         whoever owns the hierarchy.
unsafe impl Send for RawPageTableSv48<'_> {}

impl PTE for PTE64 {
    type Attr = PageAttribute64;

    fn set(&mut self, pfn: PFN, attr: Self::Attr) {
        self.0 = ((usize::from(pfn) as u64) << PA_SHIFT) | attr.0;
    }

    fn get(&self) -> (PFN, Self::Attr) {
        let pfn = PFN::from((self.0 >> PA_SHIFT) as usize);
        let attr = PageAttribute64(self.0 & PA_FLAGS_MASK);
        (pfn, attr)
    }
}

impl PagingMode for PagingModeSv48 {
    type Entry = PTE64;
    type RawTable<'a> = RawPageTableSv48<'a>;

    const LEVELS: &'static [PageTableLevel] = &[
        PageTableLevel::new(39, 9),
        PageTableLevel::new(30, 9),
        PageTableLevel::new(21, 9),
        PageTableLevel::new(12, 9),
    ];
}

pub type ArchPagingMode = PagingModeSv48;

impl<'a> RawPageTable<'a> for RawPageTableSv48<'a> {
    type Entry = PTE64;

    fn index(&self, index: u16) -> &'a Self::Entry {
        unsafe { self.0.add(index as usize).as_ref() }
    }

    fn index_mut(&mut self, index: u16) -> &'a mut Self::Entry {
        unsafe { self.0.add(index as usize).as_mut() }
    }

    unsafe fn from_ptr(ptr: NonNull<PageBlock>) -> Self {
        Self(ptr.cast(), PhantomData)
    }
}

impl PageAttribute for PageAttribute64 {
    fn new() -> Self {
        Self(0)
    }

    fn present(self, present: bool) -> Self {
        self.with(PA_V, present)
    }

    fn read(self, read: bool) -> Self {
        self.with(PA_R, read)
    }

    fn write(self, write: bool) -> Self {
        self.with(PA_W, write)
    }

    fn execute(self, execute: bool) -> Self {
        self.with(PA_X, execute)
    }

    fn user(self, user: bool) -> Self {
        self.with(PA_U, user)
    }

    fn global(self, global: bool) -> Self {
        self.with(PA_G, global)
    }

    fn is_present(&self) -> bool {
        self.0 & PA_V != 0
    }

    fn is_read(&self) -> bool {
        self.0 & PA_R != 0
    }

    fn is_write(&self) -> bool {
        self.0 & PA_W != 0
    }

    fn is_execute(&self) -> bool {
        self.0 & PA_X != 0
    }

    fn is_user(&self) -> bool {
        self.0 & PA_U != 0
    }

    fn is_global(&self) -> bool {
        self.0 & PA_G != 0
    }

    fn is_leaf(&self) -> bool {
        self.0 & (PA_R | PA_W | PA_X) != 0
    }
}

impl PageAttribute64 {
    fn with(self, bits: u64, set: bool) -> Self {
        match set {
            true => Self(self.0 | bits),
            false => Self(self.0 & !bits),
        }
    }
}

impl ArchPhysAccess {
    const PHYS_OFFSET: usize = PHYS_MAP_VIRT;
}

impl PhysAccess for ArchPhysAccess {
    unsafe fn as_ptr<T>(paddr: PAddr) -> NonNull<T> {
        let alignment: usize = align_of::<T>();
        assert!(paddr.addr() % alignment == 0, "Alignment error");

        unsafe {
            // SAFETY: We can assume that we'll never have `self.addr()` equals
            //         to `-PHYS_OFFSET`. Otherwise, the kernel might be broken.
            NonNull::new_unchecked((Self::PHYS_OFFSET + paddr.addr()) as *mut T)
        }
    }
}

/// The root table the MMU is walking right now.
///
/// This may differ from the root recorded in the current task while a task
/// switch is in progress.
#[cfg(target_arch = "riscv64")]
pub fn get_root_page_table_pfn() -> PFN {
    PFN::from(riscv::register::satp::read().ppn())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pte_round_trips_frame_and_flags() {
        let mut pte = PTE64::default();
        assert!(!pte.is_present());

        let attr = PageAttribute64::new().present(true).global(true);
        pte.set(PFN::from_val(0x8_0123), attr);

        assert!(pte.is_present());
        assert_eq!(pte.get_pfn(), PFN::from_val(0x8_0123));
        assert!(pte.get_attr().is_global());
        assert!(!pte.get_attr().is_write());
        assert_eq!(pte.0 & PA_FLAGS_MASK, PA_V | PA_G);
        assert!(!pte.get_attr().is_leaf());
    }

    #[test]
    fn read_and_write_are_separate_bits() {
        let rw = PageAttribute64::new().present(true).read(true).write(true);
        let ro = rw.write(false);

        assert!(ro.is_read());
        assert!(!ro.is_write());
        assert!(ro.is_leaf());
        assert_eq!(ro, PageAttribute64(PA_V | PA_R));

        let wo = rw.read(false);
        assert!(!wo.is_read());
        assert!(wo.is_write());
    }

    #[test]
    fn sv48_has_four_levels() {
        assert_eq!(PagingModeSv48::LEVELS.len(), 4);
        assert_eq!(PagingModeSv48::LEVELS[0].nth_bit(), 39);
        assert_eq!(PagingModeSv48::LEVELS[3].nth_bit(), 12);
    }
}
