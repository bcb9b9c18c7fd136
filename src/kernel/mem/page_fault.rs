use crate::prelude::*;

use bitflags::bitflags;
use core::fmt;
use eonix_hal::{
    config::mm::is_vmalloc_addr,
    traits::{
        fault::{Fault, PageFaultErrorCode},
        trap::{RawTrapContext, TrapType},
    },
};
use eonix_mm::{
    address::{Addr as _, PhysAccess, VAddr},
    page_table::PagingMode,
    paging::PFN,
};
use posix_types::signal::{SigInfo, Signal, BUS_ADRERR, SEGV_ACCERR, SEGV_MAPERR};

use super::{sync_kernel_range, AddressSpace, VmArea, VmaLookup};
use crate::kernel::{config::KernelConfig, task::FaultingTask};

bitflags! {
    /// How the faulting access was made and what the resolver may do about it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FaultFlags: u32 {
        const WRITE = 0x01;
        const INSTRUCTION = 0x02;
        /// The resolver may drop the lock and ask for a retry.
        const ALLOW_RETRY = 0x04;
        /// The resolver may sleep, but only until a fatal signal arrives.
        const KILLABLE = 0x08;
        const USER = 0x10;
    }

    /// Outcome of one call to the resolver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VmFault: u32 {
        /// Resolution needed I/O.
        const MAJOR = 0x01;
        /// The lock may be gone, look the area up again.
        const RETRY = 0x02;
        const OOM = 0x04;
        const SIGBUS = 0x08;
        const SIGSEGV = 0x10;
        const HWPOISON = 0x20;

        const ERROR = Self::OOM.bits()
            | Self::SIGBUS.bits()
            | Self::SIGSEGV.bits()
            | Self::HWPOISON.bits();
    }
}

/// How a page fault was dealt with. A kernel fault with no fixup does not
/// return at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultExit {
    /// The mapping is in place, retry the access.
    Resolved,
    /// Kernel range entries were copied in from the reference table.
    Synced,
    /// SIGSEGV was sent with `code` as its `si_code`.
    Segv { code: u32 },
    /// SIGBUS was sent.
    Bus,
    /// A kernel mode access resumes at the exception fixup `pc`.
    Fixup { pc: usize },
    /// The out of memory policy took over.
    OutOfMemory,
    /// A fatal signal arrived while the fault was being retried.
    Killed,
}

pub type SpaceGuard<'a, E> =
    <<<E as FaultEnv>::Task as FaultingTask>::Space as AddressSpace>::ReadGuard<'a>;

/// Everything the page fault handler needs from the rest of the kernel.
///
/// # Safety
/// `active_root` and `reference_root` MUST return live page tables of
/// `Self::PagingMode` that can be reached through `Self::PhysAccess`. The
/// kernel range walk writes into the former and reads the latter without
/// further checks.
pub unsafe trait FaultEnv: Sized {
    type Task: FaultingTask;
    type PagingMode: PagingMode;
    type PhysAccess: PhysAccess;

    fn current(&self) -> &Self::Task;

    /// Whether we are in a context that must not sleep or take locks.
    fn in_atomic(&self) -> bool;

    fn enable_irqs(&self);

    /// Bring in the page at `addr` inside `area`.
    ///
    /// `guard` is the shared lock taken for the lookup of `area`. It is handed
    /// back only if the lock is still held.
    fn handle_mm_fault<'a>(
        &self,
        guard: SpaceGuard<'a, Self>,
        area: &VmArea,
        addr: VAddr,
        flags: FaultFlags,
    ) -> (VmFault, Option<SpaceGuard<'a, Self>>)
    where
        <Self::Task as FaultingTask>::Space: 'a;

    /// Where to resume if the kernel faults at `pc`.
    fn search_exception_table(&self, pc: usize) -> Option<usize>;

    fn pagefault_out_of_memory(&self);

    /// The root table the MMU is walking right now.
    fn active_root(&self) -> PFN;

    /// The kernel's own root table.
    fn reference_root(&self) -> PFN;

    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

enum State<G> {
    Start,
    VmallocCheck,
    VmallocSync,
    InterruptReenable,
    ContextCheck,
    Lookup,
    GoodArea { guard: G, area: VmArea },
    BadArea { guard: Option<G>, code: u32 },
    NoContext,
    OutOfMemory { guard: Option<G> },
    SigBus { guard: Option<G> },
    Done(FaultExit),
}

struct PageFault<'a, E, T>
where
    E: FaultEnv,
{
    env: &'a E,
    config: &'a KernelConfig,
    trap: &'a mut T,
    task: &'a E::Task,

    error_code: PageFaultErrorCode,
    addr: VAddr,
    pc: usize,
    user: bool,
    flags: FaultFlags,
}

struct SegfaultMessage<'a> {
    comm: &'a str,
    pid: u32,
    addr: VAddr,
    pc: usize,
    sp: usize,
    error: usize,
}

impl<G> State<G> {
    #[cfg_attr(not(feature = "trace_fault"), allow(dead_code))]
    fn name(&self) -> &'static str {
        match self {
            State::Start => "Start",
            State::VmallocCheck => "VmallocCheck",
            State::VmallocSync => "VmallocSync",
            State::InterruptReenable => "InterruptReenable",
            State::ContextCheck => "ContextCheck",
            State::Lookup => "Lookup",
            State::GoodArea { .. } => "GoodArea",
            State::BadArea { .. } => "BadArea",
            State::NoContext => "NoContext",
            State::OutOfMemory { .. } => "OutOfMemory",
            State::SigBus { .. } => "SigBus",
            State::Done(_) => "Done",
        }
    }
}

impl<'a, E, T> PageFault<'a, E, T>
where
    E: FaultEnv,
    T: RawTrapContext,
{
    fn new(env: &'a E, config: &'a KernelConfig, trap: &'a mut T) -> Self {
        let (error_code, addr) = match trap.trap_type() {
            TrapType::Fault(Fault::PageFault {
                error_code,
                address,
            }) => (error_code, address),
            other => panic!("Page fault handler invoked for {:?}", other),
        };

        let pc = trap.get_program_counter();
        let user = trap.is_user_mode();

        Self {
            env,
            config,
            trap,
            task: env.current(),
            error_code,
            addr,
            pc,
            user,
            flags: FaultFlags::empty(),
        }
    }

    fn step(&mut self, state: State<SpaceGuard<'a, E>>) -> State<SpaceGuard<'a, E>> {
        println_trace!("trace_fault", "page fault at {:#x}: {}", self.addr, state.name());

        match state {
            State::Start => {
                self.flags = FaultFlags::ALLOW_RETRY | FaultFlags::KILLABLE;
                self.flags.set(
                    FaultFlags::WRITE,
                    self.error_code.contains(PageFaultErrorCode::Write),
                );
                self.flags.set(
                    FaultFlags::INSTRUCTION,
                    self.error_code.contains(PageFaultErrorCode::InstructionFetch),
                );

                State::VmallocCheck
            }
            State::VmallocCheck => match is_vmalloc_addr(self.addr.addr()) {
                true => State::VmallocSync,
                false => State::InterruptReenable,
            },
            State::VmallocSync => self.vmalloc_sync(),
            State::InterruptReenable => {
                if self.trap.is_interrupt_enabled() {
                    self.env.enable_irqs();
                }
                State::ContextCheck
            }
            State::ContextCheck => {
                if self.task.mm().is_none() || self.env.in_atomic() {
                    return State::NoContext;
                }

                if self.user {
                    self.flags |= FaultFlags::USER;
                }
                State::Lookup
            }
            State::Lookup => self.lookup(),
            State::GoodArea { guard, area } => self.good_area(guard, area),
            State::BadArea { guard, code } => {
                drop(guard);
                self.bad_area(code)
            }
            State::NoContext => self.no_context(),
            State::OutOfMemory { guard } => {
                drop(guard);
                if !self.user {
                    return State::NoContext;
                }

                self.env.pagefault_out_of_memory();
                State::Done(FaultExit::OutOfMemory)
            }
            State::SigBus { guard } => {
                drop(guard);

                // Kernel mode accesses get the signal too.
                self.task.force_signal(SigInfo::fault(
                    Signal::SIGBUS,
                    BUS_ADRERR,
                    self.addr.addr(),
                ));

                match self.user {
                    true => State::Done(FaultExit::Bus),
                    false => State::NoContext,
                }
            }
            State::Done(exit) => State::Done(exit),
        }
    }

    fn vmalloc_sync(&mut self) -> State<SpaceGuard<'a, E>> {
        if self.user {
            return State::BadArea {
                guard: None,
                code: SEGV_MAPERR,
            };
        }

        // SAFETY: `FaultEnv` implementors hand out live root tables.
        let result = unsafe {
            sync_kernel_range::<E::PagingMode, E::PhysAccess>(
                self.env.active_root(),
                self.env.reference_root(),
                self.addr,
            )
        };

        match result {
            Ok(()) => State::Done(FaultExit::Synced),
            Err(err) => {
                println_trace!("trace_fault", "kernel range sync failed: {:?}", err);
                State::NoContext
            }
        }
    }

    fn lookup(&mut self) -> State<SpaceGuard<'a, E>> {
        let Some(mm) = self.task.mm() else {
            return State::NoContext;
        };

        let guard = mm.lock_shared();
        let area = match guard.find_vma(self.addr) {
            Some(area) if area.range.start() <= self.addr => area,
            Some(area) if area.grows_down() => match guard.expand_stack(&area, self.addr) {
                Ok(area) => area,
                Err(err) => {
                    println_trace!("trace_fault", "stack expansion failed: {:?}", err);
                    return State::BadArea {
                        guard: Some(guard),
                        code: SEGV_MAPERR,
                    };
                }
            },
            _ => {
                return State::BadArea {
                    guard: Some(guard),
                    code: SEGV_MAPERR,
                }
            }
        };

        State::GoodArea { guard, area }
    }

    fn good_area(&mut self, guard: SpaceGuard<'a, E>, area: VmArea) -> State<SpaceGuard<'a, E>> {
        let denied = (self.flags.contains(FaultFlags::WRITE) && !area.is_writable())
            || (self.flags.contains(FaultFlags::INSTRUCTION) && !area.is_executable());

        if denied {
            return State::BadArea {
                guard: Some(guard),
                code: SEGV_ACCERR,
            };
        }

        let (fault, guard) = self
            .env
            .handle_mm_fault(guard, &area, self.addr, self.flags);

        if fault.contains(VmFault::RETRY) && self.task.fatal_signal_pending() {
            drop(guard);
            return State::Done(FaultExit::Killed);
        }

        if fault.intersects(VmFault::ERROR) {
            if fault.contains(VmFault::OOM) {
                return State::OutOfMemory { guard };
            }
            if fault.contains(VmFault::SIGBUS) {
                return State::SigBus { guard };
            }

            panic!(
                "Unexpected fault result {:?} resolving {:#x}",
                fault, self.addr
            );
        }

        if self.flags.contains(FaultFlags::ALLOW_RETRY) {
            self.task.account_fault(fault.contains(VmFault::MAJOR));

            if fault.contains(VmFault::RETRY) {
                // Only one automatic retry. The lock is taken again from
                // scratch even if the resolver kept it.
                self.flags.remove(FaultFlags::ALLOW_RETRY);
                drop(guard);
                return State::Lookup;
            }
        }

        drop(guard);
        State::Done(FaultExit::Resolved)
    }

    fn bad_area(&mut self, code: u32) -> State<SpaceGuard<'a, E>> {
        if !self.user {
            return State::NoContext;
        }

        self.task
            .force_signal(SigInfo::fault(Signal::SIGSEGV, code, self.addr.addr()));
        self.show_signal_msg();

        State::Done(FaultExit::Segv { code })
    }

    fn no_context(&mut self) -> State<SpaceGuard<'a, E>> {
        match self.env.search_exception_table(self.pc) {
            Some(fixup) => {
                self.trap.set_program_counter(fixup);
                State::Done(FaultExit::Fixup { pc: fixup })
            }
            None => kernel_page_fault_die(self.addr, self.pc),
        }
    }

    fn show_signal_msg(&self) {
        if !self.config.show_unhandled_signals() {
            return;
        }

        if !self.task.is_signal_unhandled(Signal::SIGSEGV) {
            return;
        }

        if !self.config.ratelimit().allow(self.env.now_ms()) {
            return;
        }

        let message = SegfaultMessage {
            comm: self.task.comm(),
            pid: self.task.pid(),
            addr: self.addr,
            pc: self.pc,
            sp: self.trap.get_stack_pointer(),
            error: self.flags.contains(FaultFlags::WRITE) as usize,
        };

        // Init dying takes the whole system down with it.
        match message.pid {
            0 | 1 => println_fatal!("{}", message),
            _ => println_info!("{}", message),
        }
    }
}

impl fmt::Display for SegfaultMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: segfault at {:x} ip {:#x} sp {:#x} error {:x}",
            self.comm, self.pid, self.addr, self.pc, self.sp, self.error
        )
    }
}

fn kernel_page_fault_die(vaddr: VAddr, pc: usize) -> ! {
    panic!(
        "Unable to handle kernel paging request at virtual address {:#018x}, epc={:#018x}",
        vaddr, pc
    )
}

/// Handle a page fault described by `trap`.
///
/// Returns once the faulting context may be resumed, which includes the cases
/// where a signal was queued for the current task.
///
/// # Panics
/// Panics on kernel mode faults that have no exception fixup, and if `trap`
/// is not a page fault at all.
pub fn handle_page_fault<E, T>(env: &E, config: &KernelConfig, trap: &mut T) -> FaultExit
where
    E: FaultEnv,
    T: RawTrapContext,
{
    let mut fault = PageFault::new(env, config, trap);
    let mut state = State::Start;

    loop {
        state = match fault.step(state) {
            State::Done(exit) => {
                println_trace!("trace_fault", "page fault at {:#x}: {:?}", fault.addr, exit);
                return exit;
            }
            next => next,
        };
    }
}
