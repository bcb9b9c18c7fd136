mod paging_mode;
mod pte;
mod raw_table;

pub use paging_mode::{PageTableLevel, PagingMode};
pub use pte::{PageAttribute, PTE};
pub use raw_table::RawPageTable;
