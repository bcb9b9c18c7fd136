mod address_space;
mod kernel_range;
mod mm_area;
mod mm_list;
mod page_fault;

pub use address_space::{AddressSpace, StackGrowError, VmArea, VmFlags, VmaLookup};
pub use kernel_range::{sync_kernel_range, SyncError};
pub use mm_list::{MMList, MMListReadGuard, MmapError};
pub use page_fault::{handle_page_fault, FaultEnv, FaultExit, FaultFlags, SpaceGuard, VmFault};

pub(self) use mm_area::MMArea;
