#![cfg_attr(not(test), no_std)]

pub mod address;
pub mod page_table;
pub mod paging;
