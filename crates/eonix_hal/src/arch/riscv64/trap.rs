use bitflags::bitflags;
use eonix_hal_traits::{
    fault::{Fault, PageFaultErrorCode},
    trap::{RawTrapContext, TrapType},
};
use eonix_mm::address::VAddr;
use int_to_c_enum::TryFromInt;

const SCAUSE_INTERRUPT: usize = 1 << (usize::BITS - 1);
const REG_SP: usize = 2;

bitflags! {
    /// The `sstatus` bits the trap paths look at.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SstatusBits: usize {
        const SIE = 1 << 1;
        /// Interrupts were enabled before the trap.
        const SPIE = 1 << 5;
        /// The trap came from supervisor mode.
        const SPP = 1 << 8;
        const SUM = 1 << 18;
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromInt)]
pub enum Exception {
    InstructionMisaligned = 0,
    InstructionFault = 1,
    IllegalInstruction = 2,
    Breakpoint = 3,
    LoadMisaligned = 4,
    LoadFault = 5,
    StoreMisaligned = 6,
    StoreFault = 7,
    UserEnvCall = 8,
    SupervisorEnvCall = 9,
    InstructionPageFault = 12,
    LoadPageFault = 13,
    StorePageFault = 15,
}

/// Saved CPU context when a trap (interrupt or exception) occurs on RISC-V 64.
#[repr(C)]
#[derive(Default, Clone, Copy)]
pub struct TrapContext {
    /// `x1` to `x31`, indexed by register number minus one.
    regs: [usize; 31],

    sstatus: usize,
    sepc: usize,
    scause: usize,
    stval: usize,
}

impl TrapContext {
    /// A supervisor mode context with interrupts disabled.
    pub fn new() -> Self {
        Self {
            sstatus: (SstatusBits::SPP | SstatusBits::SUM).bits(),
            ..Default::default()
        }
    }

    pub fn set_exception(&mut self, exception: Exception) {
        self.scause = exception as usize;
    }

    pub fn set_interrupt(&mut self, irqno: usize) {
        self.scause = SCAUSE_INTERRUPT | irqno;
    }

    pub fn set_fault_address(&mut self, stval: usize) {
        self.stval = stval;
    }

    pub fn set_stack_pointer(&mut self, sp: usize) {
        self.regs[REG_SP - 1] = sp;
    }

    pub fn set_interrupt_enabled(&mut self, enabled: bool) {
        self.status_mut().set(SstatusBits::SPIE, enabled);
    }

    pub fn set_user_mode(&mut self, user: bool) {
        self.status_mut().set(SstatusBits::SPP, !user);
    }

    pub fn exception(&self) -> Option<Exception> {
        if self.scause & SCAUSE_INTERRUPT != 0 {
            return None;
        }

        u8::try_from(self.scause)
            .ok()
            .and_then(|code| Exception::try_from(code).ok())
    }

    fn status(&self) -> SstatusBits {
        SstatusBits::from_bits_retain(self.sstatus)
    }

    fn status_mut(&mut self) -> StatusMut<'_> {
        StatusMut(&mut self.sstatus)
    }

    fn page_fault(&self, error_code: PageFaultErrorCode, address: usize) -> TrapType {
        let mut error_code = error_code;
        error_code.set(PageFaultErrorCode::UserAccess, self.is_user_mode());

        TrapType::Fault(Fault::PageFault {
            error_code,
            address: VAddr::from(address),
        })
    }
}

struct StatusMut<'a>(&'a mut usize);

impl StatusMut<'_> {
    fn set(self, bits: SstatusBits, value: bool) {
        let mut status = SstatusBits::from_bits_retain(*self.0);
        status.set(bits, value);
        *self.0 = status.bits();
    }
}

impl RawTrapContext for TrapContext {
    fn trap_type(&self) -> TrapType {
        if self.scause & SCAUSE_INTERRUPT != 0 {
            return TrapType::Irq(self.scause & !SCAUSE_INTERRUPT);
        }

        match self.exception() {
            Some(Exception::InstructionFault | Exception::InstructionPageFault) => {
                self.page_fault(PageFaultErrorCode::InstructionFetch, self.sepc)
            }
            Some(Exception::LoadFault | Exception::LoadPageFault) => {
                self.page_fault(PageFaultErrorCode::Read, self.stval)
            }
            Some(Exception::StoreFault | Exception::StorePageFault) => {
                self.page_fault(PageFaultErrorCode::Write, self.stval)
            }
            Some(
                Exception::InstructionMisaligned
                | Exception::LoadMisaligned
                | Exception::StoreMisaligned,
            ) => TrapType::Fault(Fault::BadAccess),
            Some(Exception::IllegalInstruction) => TrapType::Fault(Fault::InvalidOp),
            // breakpoints and environment calls
            Some(_) | None => TrapType::Fault(Fault::Unknown(self.scause)),
        }
    }

    fn get_program_counter(&self) -> usize {
        self.sepc
    }

    fn get_stack_pointer(&self) -> usize {
        self.regs[REG_SP - 1]
    }

    fn set_program_counter(&mut self, pc: usize) {
        self.sepc = pc;
    }

    fn is_interrupt_enabled(&self) -> bool {
        self.status().contains(SstatusBits::SPIE)
    }

    fn is_user_mode(&self) -> bool {
        !self.status().contains(SstatusBits::SPP)
    }
}
