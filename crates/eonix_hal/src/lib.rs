#![cfg_attr(not(test), no_std)]

pub(crate) mod arch;

pub mod config {
    pub use crate::arch::config::{irq, mm};
}

pub mod csr {
    pub use crate::arch::csr::SieBits;

    #[cfg(target_arch = "riscv64")]
    pub use crate::arch::csr::{Sie, enable_irqs};
}

pub mod mm {
    pub use crate::arch::mm::{
        ArchPagingMode, ArchPhysAccess, PTE64, PageAttribute64, PagingModeSv48,
    };

    #[cfg(target_arch = "riscv64")]
    pub use crate::arch::mm::get_root_page_table_pfn;
}

pub mod trap {
    pub use crate::arch::trap::{Exception, SstatusBits, TrapContext};
}

pub use eonix_hal_traits as traits;
