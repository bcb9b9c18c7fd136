//! The hart side of the fault and interrupt paths.
//!
//! A kernel's `FaultEnv` implementation takes its paging types and the
//! `active_root`/`enable_irqs` operations from here:
//!
//! ```ignore
//! unsafe impl FaultEnv for Kernel {
//!     type PagingMode = arch::PagingMode;
//!     type PhysAccess = arch::PhysAccess;
//!
//!     fn active_root(&self) -> PFN {
//!         arch::active_root()
//!     }
//!
//!     fn enable_irqs(&self) {
//!         arch::enable_irqs()
//!     }
//!     // ...
//! }
//! ```

use crate::prelude::*;

use eonix_hal::{
    csr::Sie,
    mm::{get_root_page_table_pfn, ArchPagingMode, ArchPhysAccess},
};
use eonix_mm::paging::PFN;

use crate::kernel::interrupt::{init_irq, IrqDescTable, IrqError, RiscvIrqChip};

pub type PagingMode = ArchPagingMode;
pub type PhysAccess = ArchPhysAccess;

/// The root table in `satp`, which is what the MMU is walking.
///
/// Read the register instead of the current task's root: the two differ
/// while an address space switch is in progress.
pub fn active_root() -> PFN {
    get_root_page_table_pfn()
}

pub fn enable_irqs() {
    eonix_hal::csr::enable_irqs();
}

/// Hand the core lines of this hart to the `sie` backed controller.
pub fn init_irq_thiscpu(table: &IrqDescTable) -> Result<(), IrqError> {
    init_irq(table, Arc::new(RiscvIrqChip::new(Sie)))?;

    println_debug!("riscv: core interrupt controller up");
    Ok(())
}
