mod siginfo;
mod signal;

pub use siginfo::{BUS_ADRERR, SEGV_ACCERR, SEGV_MAPERR, SigInfo};
pub use signal::Signal;
