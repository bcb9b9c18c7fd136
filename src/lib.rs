#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod kernel;

mod prelude;

pub use kernel::config::KernelConfig;
pub use kernel::interrupt::{do_irq, init_irq, IrqContext, IrqDescTable, RiscvIrqChip};
pub use kernel::mem::{handle_page_fault, FaultEnv, FaultExit};
