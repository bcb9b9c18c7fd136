mod addr;
mod addr_range;
mod paddr;
mod vaddr;

pub use addr::{Addr, AddrOps};
pub use addr_range::AddrRange;
pub use paddr::{PAddr, PhysAccess};
pub use vaddr::VAddr;

pub type VRange = AddrRange<VAddr>;
