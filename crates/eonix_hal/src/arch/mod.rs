// Only the RISC-V 64 port lives here. The data layouts are plain Rust so that
// the fault and interrupt paths can be exercised on the build host; anything
// touching a CSR is compiled for `riscv64` only.
mod riscv64;

pub use riscv64::*;
