pub mod arch;
pub mod config;
pub mod interrupt;
pub mod mem;
pub mod task;

#[cfg(test)]
pub(crate) mod mock;
