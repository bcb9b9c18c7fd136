use crate::prelude::*;

use core::{
    ptr,
    sync::atomic::{AtomicPtr, AtomicUsize, Ordering},
};
use eonix_hal::{config::irq::IRQ_SOFTWARE, traits::trap::RawTrapContext};

use super::IrqDescTable;

/// Per-hart interrupt bookkeeping: the trap frame of the interrupt being
/// handled and how deep we are in hard IRQ context.
pub struct IrqContext {
    regs: AtomicPtr<()>,
    hardirq: AtomicUsize,
}

/// Hard IRQ context, left again when dropped.
pub struct HardIrqGuard<'a> {
    context: &'a IrqContext,
    old_regs: *mut (),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqExit {
    /// Consumed by the inter-processor interrupt handler.
    Ipi,
    Handled,
    /// Nobody set the line up.
    Unhandled,
}

impl IrqContext {
    pub const fn new() -> Self {
        Self {
            regs: AtomicPtr::new(ptr::null_mut()),
            hardirq: AtomicUsize::new(0),
        }
    }

    /// The trap frame of the interrupt being handled, or null.
    pub fn irq_regs(&self) -> *const () {
        self.regs.load(Ordering::Acquire)
    }

    /// Install `regs` as the current interrupt frame, returning the old one.
    pub fn set_irq_regs(&self, regs: *const ()) -> *const () {
        self.regs.swap(regs.cast_mut(), Ordering::AcqRel)
    }

    pub fn hardirq_count(&self) -> usize {
        self.hardirq.load(Ordering::Acquire)
    }

    pub fn in_hardirq(&self) -> bool {
        self.hardirq_count() != 0
    }

    pub fn enter<T>(&self, regs: &T) -> HardIrqGuard<'_> {
        let old_regs = self.set_irq_regs(ptr::from_ref(regs).cast());
        self.hardirq.fetch_add(1, Ordering::AcqRel);

        HardIrqGuard {
            context: self,
            old_regs: old_regs.cast_mut(),
        }
    }
}

impl Default for IrqContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HardIrqGuard<'_> {
    fn drop(&mut self) {
        self.context.hardirq.fetch_sub(1, Ordering::AcqRel);
        self.context.set_irq_regs(self.old_regs);
    }
}

/// Entry point for interrupt `irq`, taken with `trap` as the interrupted
/// context.
///
/// Inter-processor interrupts arrive on the software line and go to
/// `handle_ipi` first. Everything else, and software interrupts it leaves
/// alone, is dispatched through `table` in hard IRQ context.
pub fn do_irq<T, F>(
    irq: usize,
    trap: &T,
    context: &IrqContext,
    table: &IrqDescTable,
    handle_ipi: F,
) -> IrqExit
where
    T: RawTrapContext,
    F: FnOnce() -> bool,
{
    if irq == IRQ_SOFTWARE && handle_ipi() {
        return IrqExit::Ipi;
    }

    let _hardirq = context.enter(trap);
    match table.generic_handle_irq(irq) {
        Ok(()) => IrqExit::Handled,
        Err(err) => {
            println_warn!("Unexpected irq {}: {:?}", irq, err);
            IrqExit::Unhandled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::interrupt::init_irq;
    use crate::kernel::interrupt::RiscvIrqChip;
    use crate::kernel::mock::FakeSie;
    use core::sync::atomic::AtomicBool;
    use eonix_hal::{config::irq::IRQ_TIMER, trap::TrapContext};

    fn irq_frame(irq: usize) -> TrapContext {
        let mut frame = TrapContext::new();
        frame.set_interrupt(irq);
        frame
    }

    fn core_table() -> IrqDescTable {
        let table = IrqDescTable::new();
        let sie: &'static FakeSie = Box::leak(Box::new(FakeSie::default()));
        init_irq(&table, Arc::new(RiscvIrqChip::new(sie))).unwrap();
        table
    }

    #[test]
    fn consumed_ipi_skips_generic_dispatch() {
        let table = core_table();
        let context = IrqContext::new();
        let ran = Arc::new(AtomicBool::new(false));

        let flag = ran.clone();
        table
            .request_irq(IRQ_SOFTWARE, move || flag.store(true, Ordering::Relaxed))
            .unwrap();

        let exit = do_irq(IRQ_SOFTWARE, &irq_frame(IRQ_SOFTWARE), &context, &table, || true);

        assert_eq!(exit, IrqExit::Ipi);
        assert!(!ran.load(Ordering::Relaxed));
        assert_eq!(table.count(IRQ_SOFTWARE), 0);
        assert!(context.irq_regs().is_null());
        assert!(!context.in_hardirq());
    }

    #[test]
    fn software_irq_left_by_ipi_handler_is_dispatched() {
        let table = core_table();
        let context = Arc::new(IrqContext::new());
        let frame = irq_frame(IRQ_SOFTWARE);
        let frame_addr = ptr::from_ref(&frame) as usize;
        let seen = Arc::new(AtomicUsize::new(0));

        let (ctx, saw) = (context.clone(), seen.clone());
        table
            .request_irq(IRQ_SOFTWARE, move || {
                assert_eq!(ctx.hardirq_count(), 1);
                saw.store(ctx.irq_regs() as usize, Ordering::Relaxed);
            })
            .unwrap();

        let sentinel = 0x1000 as *const ();
        context.set_irq_regs(sentinel);

        let exit = do_irq(IRQ_SOFTWARE, &frame, &context, &table, || false);

        assert_eq!(exit, IrqExit::Handled);
        assert_eq!(seen.load(Ordering::Relaxed), frame_addr);
        assert_eq!(context.irq_regs(), sentinel);
        assert!(!context.in_hardirq());
        assert_eq!(table.count(IRQ_SOFTWARE), 1);
    }

    #[test]
    fn timer_never_asks_the_ipi_handler() {
        let table = core_table();
        let context = IrqContext::new();
        table.request_irq(IRQ_TIMER, || {}).unwrap();

        let exit = do_irq(IRQ_TIMER, &irq_frame(IRQ_TIMER), &context, &table, || {
            panic!("IPI handler called for the timer")
        });

        assert_eq!(exit, IrqExit::Handled);
        assert_eq!(table.count(IRQ_TIMER), 1);
    }

    #[test]
    fn unknown_line_restores_context() {
        let table = IrqDescTable::new();
        let context = IrqContext::new();

        let exit = do_irq(42, &irq_frame(42), &context, &table, || false);

        assert_eq!(exit, IrqExit::Unhandled);
        assert!(context.irq_regs().is_null());
        assert!(!context.in_hardirq());
    }

    #[test]
    fn nested_entries_unwind_in_order() {
        let context = IrqContext::new();
        let (outer, inner) = (irq_frame(IRQ_TIMER), irq_frame(IRQ_SOFTWARE));

        let first = context.enter(&outer);
        {
            let _second = context.enter(&inner);
            assert_eq!(context.hardirq_count(), 2);
            assert_eq!(context.irq_regs(), ptr::from_ref(&inner).cast());
        }
        assert_eq!(context.irq_regs(), ptr::from_ref(&outer).cast());

        drop(first);
        assert!(context.irq_regs().is_null());
    }
}
