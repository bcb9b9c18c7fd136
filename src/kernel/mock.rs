//! Stand-ins for the rest of the kernel, used by unit tests.

use crate::prelude::*;

use alloc::collections::VecDeque;
use core::{
    ptr::NonNull,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};
use eonix_hal::{
    config::mm::VMALLOC_START,
    mm::{PageAttribute64, PagingModeSv48, PTE64},
    traits::{csr::BitRegister, trap::RawTrapContext},
    trap::{Exception, TrapContext},
};
use eonix_mm::{
    address::{Addr as _, PAddr, PhysAccess, VAddr, VRange},
    page_table::{PageAttribute, PagingMode, RawPageTable, PTE},
    paging::{PageBlock, PFN},
};
use posix_types::signal::{SigInfo, Signal};
use spin::Mutex;

use super::mem::{FaultEnv, FaultFlags, MMList, MMListReadGuard, VmArea, VmFault, VmFlags};
use super::task::FaultingTask;

pub const VMALLOC_ADDR: VAddr = VAddr::from(VMALLOC_START + 0x0012_3456_7000);
pub const USER_PC: usize = 0x1_0074;
pub const USER_SP: usize = 0x3fff_fff0;
pub const KERNEL_PC: usize = 0xffff_ffff_8020_1234;

/// Physical addresses are host addresses.
pub struct IdentityAccess;

impl PhysAccess for IdentityAccess {
    unsafe fn as_ptr<T>(paddr: PAddr) -> NonNull<T> {
        NonNull::new(paddr.addr() as *mut T).expect("Null page table")
    }
}

/// Page tables backed by host allocations.
pub struct Tables {
    blocks: Vec<Box<PageBlock>>,
}

impl Tables {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn alloc(&mut self) -> PFN {
        let block = Box::new(PageBlock::new());
        let pfn = PFN::from(PAddr::from(&*block as *const PageBlock as usize));
        self.blocks.push(block);
        pfn
    }

    fn table(pfn: PFN) -> <PagingModeSv48 as PagingMode>::RawTable<'static> {
        unsafe { PagingModeSv48::raw_table::<IdentityAccess>(pfn) }
    }

    pub fn entry(&self, pfn: PFN, index: u16) -> PTE64 {
        *Self::table(pfn).index(index)
    }

    pub fn set_entry(&mut self, table: PFN, index: u16, pfn: PFN, attr: PageAttribute64) {
        Self::table(table).index_mut(index).set(pfn, attr);
    }

    pub fn is_empty(&self, pfn: PFN) -> bool {
        (0..512).all(|index| self.entry(pfn, index) == PTE64::default())
    }

    /// Map `addr` under `root` down to `depth` levels, returning the frame
    /// stored at each level.
    pub fn map_kernel(&mut self, root: PFN, addr: VAddr, depth: usize) -> Vec<PFN> {
        let levels = PagingModeSv48::LEVELS;
        let mut table = root;
        let mut chain = Vec::new();

        for (level, table_level) in levels.iter().enumerate().take(depth) {
            let attr = PageAttribute64::new().present(true).global(true);
            let (pfn, attr) = match level == levels.len() - 1 {
                true => (PFN::from_val(0x8_0000), attr.read(true).write(true)),
                false => (self.alloc(), attr),
            };

            Self::table(table)
                .index_mut(table_level.index_of(addr))
                .set(pfn, attr);

            chain.push(pfn);
            table = pfn;
        }

        chain
    }

    /// The entries on the path to `addr`, up to the first absent or leaf one.
    pub fn walk(&self, root: PFN, addr: VAddr) -> Vec<PTE64> {
        let mut table = root;
        let mut path = Vec::new();

        for table_level in PagingModeSv48::LEVELS {
            let entry = self.entry(table, table_level.index_of(addr));
            path.push(entry);

            if !entry.is_present() || entry.get_attr().is_leaf() {
                break;
            }
            table = entry.get_pfn();
        }

        path
    }
}

pub fn trap(exception: Exception, addr: usize, user: bool) -> TrapContext {
    let pc = match exception {
        Exception::InstructionFault | Exception::InstructionPageFault => addr,
        _ if user => USER_PC,
        _ => KERNEL_PC,
    };

    let mut trap = TrapContext::new();
    trap.set_exception(exception);
    trap.set_fault_address(addr);
    trap.set_program_counter(pc);
    trap.set_stack_pointer(USER_SP);
    trap.set_user_mode(user);
    trap.set_interrupt_enabled(true);
    trap
}

pub struct MockTask {
    pid: u32,
    mm: Option<MMList>,
    fatal_pending: bool,
    handles_segv: bool,
    signals: Mutex<Vec<SigInfo>>,
    maj_flt: AtomicUsize,
    min_flt: AtomicUsize,
}

impl MockTask {
    fn new(mm: Option<MMList>) -> Self {
        Self {
            pid: 100,
            mm,
            fatal_pending: false,
            handles_segv: false,
            signals: Mutex::new(Vec::new()),
            maj_flt: AtomicUsize::new(0),
            min_flt: AtomicUsize::new(0),
        }
    }

    /// Major and minor fault counts.
    pub fn faults(&self) -> (usize, usize) {
        (
            self.maj_flt.load(Ordering::Relaxed),
            self.min_flt.load(Ordering::Relaxed),
        )
    }
}

impl FaultingTask for MockTask {
    type Space = MMList;

    fn pid(&self) -> u32 {
        self.pid
    }

    fn comm(&self) -> &str {
        "mock"
    }

    fn mm(&self) -> Option<&MMList> {
        self.mm.as_ref()
    }

    fn fatal_signal_pending(&self) -> bool {
        self.fatal_pending
    }

    fn is_signal_unhandled(&self, signal: Signal) -> bool {
        !(signal == Signal::SIGSEGV && self.handles_segv)
    }

    fn force_signal(&self, info: SigInfo) {
        self.signals.lock().push(info);
    }

    fn account_fault(&self, major: bool) {
        match major {
            true => self.maj_flt.fetch_add(1, Ordering::Relaxed),
            false => self.min_flt.fetch_add(1, Ordering::Relaxed),
        };
    }
}

/// What the mock resolver answers with.
#[derive(Clone, Copy)]
pub struct Outcome {
    fault: VmFault,
    keep_lock: bool,
}

impl Outcome {
    pub fn ok() -> Self {
        Self::fault(VmFault::empty())
    }

    /// Retry after dropping the lock, like waiting on a page lock does.
    pub fn retry() -> Self {
        Self::dropped(VmFault::RETRY)
    }

    pub fn fault(fault: VmFault) -> Self {
        Self {
            fault,
            keep_lock: true,
        }
    }

    pub fn dropped(fault: VmFault) -> Self {
        Self {
            fault,
            keep_lock: false,
        }
    }
}

pub struct MockEnv {
    pub task: MockTask,
    atomic: bool,
    outcomes: Mutex<VecDeque<Outcome>>,
    calls: Mutex<Vec<FaultFlags>>,
    fixups: Vec<(usize, usize)>,
    irqs_enabled: AtomicBool,
    oom_calls: AtomicUsize,
    tables: Tables,
    active_root: PFN,
    reference_root: PFN,
}

impl MockEnv {
    fn new(mm: Option<MMList>) -> Self {
        let mut tables = Tables::new();
        let active_root = tables.alloc();
        let reference_root = tables.alloc();

        Self {
            task: MockTask::new(mm),
            atomic: false,
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fixups: Vec::new(),
            irqs_enabled: AtomicBool::new(false),
            oom_calls: AtomicUsize::new(0),
            tables,
            active_root,
            reference_root,
        }
    }

    pub fn user() -> Self {
        Self::new(Some(MMList::default()))
    }

    pub fn kernel_thread() -> Self {
        Self::new(None)
    }

    /// Replaces the address space, so call this before adding areas.
    pub fn with_stack_limit(mut self, limit: usize) -> Self {
        self.task.mm = Some(MMList::new(limit));
        self
    }

    pub fn with_area(self, start: usize, end: usize, flags: VmFlags) -> Self {
        self.mm()
            .mmap(VRange::new(VAddr::from(start), VAddr::from(end)), flags)
            .expect("Bad test area");
        self
    }

    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.outcomes.lock().extend(outcomes);
        self
    }

    pub fn with_fixup(mut self, pc: usize, fixup: usize) -> Self {
        self.fixups.push((pc, fixup));
        self
    }

    pub fn with_fatal_signal(mut self) -> Self {
        self.task.fatal_pending = true;
        self
    }

    pub fn with_segv_handler(mut self) -> Self {
        self.task.handles_segv = true;
        self
    }

    pub fn in_atomic(mut self) -> Self {
        self.atomic = true;
        self
    }

    pub fn with_kernel_mapping(mut self, depth: usize) -> Self {
        let root = self.reference_root;
        self.tables.map_kernel(root, VMALLOC_ADDR, depth);
        self
    }

    pub fn mm(&self) -> &MMList {
        self.task.mm.as_ref().expect("Kernel threads have no address space")
    }

    pub fn signals(&self) -> Vec<SigInfo> {
        self.task.signals.lock().clone()
    }

    pub fn calls(&self) -> Vec<FaultFlags> {
        self.calls.lock().clone()
    }

    pub fn oom_calls(&self) -> usize {
        self.oom_calls.load(Ordering::Relaxed)
    }

    pub fn irqs_enabled(&self) -> bool {
        self.irqs_enabled.load(Ordering::Relaxed)
    }

    pub fn roots(&self) -> (PFN, PFN) {
        (self.active_root, self.reference_root)
    }

    pub fn entry(&self, pfn: PFN, index: u16) -> PTE64 {
        self.tables.entry(pfn, index)
    }

    pub fn tables_untouched(&self) -> bool {
        self.tables.is_empty(self.active_root)
    }
}

unsafe impl FaultEnv for MockEnv {
    type Task = MockTask;
    type PagingMode = PagingModeSv48;
    type PhysAccess = IdentityAccess;

    fn current(&self) -> &MockTask {
        &self.task
    }

    fn in_atomic(&self) -> bool {
        self.atomic
    }

    fn enable_irqs(&self) {
        self.irqs_enabled.store(true, Ordering::Relaxed);
    }

    fn handle_mm_fault<'a>(
        &self,
        guard: MMListReadGuard<'a>,
        area: &VmArea,
        addr: VAddr,
        flags: FaultFlags,
    ) -> (VmFault, Option<MMListReadGuard<'a>>)
    where
        <Self::Task as FaultingTask>::Space: 'a,
    {
        assert!(area.contains(addr), "Resolving outside of the area");
        assert!(self.mm().is_locked());

        self.calls.lock().push(flags);
        let outcome = self.outcomes.lock().pop_front().unwrap_or(Outcome::ok());

        match outcome.keep_lock {
            true => (outcome.fault, Some(guard)),
            false => {
                drop(guard);
                (outcome.fault, None)
            }
        }
    }

    fn search_exception_table(&self, pc: usize) -> Option<usize> {
        self.fixups
            .iter()
            .find(|&&(from, _)| from == pc)
            .map(|&(_, to)| to)
    }

    fn pagefault_out_of_memory(&self) {
        self.oom_calls.fetch_add(1, Ordering::Relaxed);
    }

    fn active_root(&self) -> PFN {
        self.active_root
    }

    fn reference_root(&self) -> PFN {
        self.reference_root
    }

    fn now_ms(&self) -> u64 {
        0
    }
}

/// An `sie` register in plain memory.
#[derive(Default)]
pub struct FakeSie(AtomicUsize);

impl FakeSie {
    pub fn bits(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl BitRegister for FakeSie {
    fn set_bits(&self, bits: usize) {
        self.0.fetch_or(bits, Ordering::Relaxed);
    }

    fn clear_bits(&self, bits: usize) {
        self.0.fetch_and(!bits, Ordering::Relaxed);
    }
}
