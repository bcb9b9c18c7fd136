pub mod config;
pub mod csr;
pub mod mm;
pub mod trap;
