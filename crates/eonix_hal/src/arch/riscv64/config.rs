/// mm
pub mod mm {
    pub const PAGE_SIZE: usize = 1 << PAGE_SIZE_BITS;
    pub const PAGE_SIZE_BITS: usize = 12;

    pub const PTE_SIZE: usize = 8;
    pub const PTES_PER_PAGE: usize = PAGE_SIZE / PTE_SIZE;

    /// Start of the linear mapping of physical memory (Sv48 upper half).
    pub const PAGE_OFFSET: usize = 0xffff_d000_0000_0000;
    pub const PHYS_MAP_VIRT: usize = PAGE_OFFSET;

    /// The vmalloc area sits right below the linear mapping. Both bounds are
    /// inclusive.
    pub const VMALLOC_SIZE: usize = 0x0000_1000_0000_0000;
    pub const VMALLOC_END: usize = PAGE_OFFSET - 1;
    pub const VMALLOC_START: usize = PAGE_OFFSET - VMALLOC_SIZE;

    pub const fn is_vmalloc_addr(addr: usize) -> bool {
        addr >= VMALLOC_START && addr <= VMALLOC_END
    }
}

/// Interrupt lines local to each hart, numbered after their `scause` codes.
pub mod irq {
    pub const IRQ_SOFTWARE: usize = 1;
    pub const IRQ_TIMER: usize = 5;

    /// Number of lines owned by the core interrupt controller.
    pub const NR_IRQS_CORE: usize = 8;
}
