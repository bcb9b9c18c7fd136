use bitflags::bitflags;
use eonix_mm::address::VAddr;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFaultErrorCode: u32 {
        const Read = 2;
        const Write = 4;
        const InstructionFetch = 8;
        const UserAccess = 16;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    InvalidOp,
    BadAccess,
    PageFault {
        error_code: PageFaultErrorCode,
        /// The address the access was aimed at. For instruction fetches this
        /// is the program counter itself.
        address: VAddr,
    },
    Unknown(usize),
}
