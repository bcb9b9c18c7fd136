#![no_std]

pub mod csr;
pub mod fault;
pub mod trap;
