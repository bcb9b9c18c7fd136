use crate::fault::Fault;

/// A raw trap context.
///
/// This should be implemented by the architecture-specific trap context
/// and will be used by the fault and interrupt paths.
pub trait RawTrapContext {
    fn trap_type(&self) -> TrapType;

    fn get_program_counter(&self) -> usize;
    fn get_stack_pointer(&self) -> usize;

    /// Used to resume at an exception fixup address.
    fn set_program_counter(&mut self, pc: usize);

    /// Whether interrupts were enabled in the context that trapped.
    fn is_interrupt_enabled(&self) -> bool;

    /// Whether the trap came from user mode.
    fn is_user_mode(&self) -> bool;
}

/// The reason that caused the trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapType {
    Fault(Fault),
    Irq(usize),
}
