use crate::prelude::*;

use eonix_hal::{
    config::irq::{IRQ_SOFTWARE, IRQ_TIMER, NR_IRQS_CORE},
    csr::SieBits,
    traits::csr::BitRegister,
};

use super::{handle_level_irq, IrqChip, IrqDescTable, IrqError};

const SIE_STIE: usize = SieBits::STIE.bits();
const SIE_SSIE: usize = SieBits::SSIE.bits();

struct IrqLine<R> {
    irq: usize,
    mask: fn(&R),
    unmask: fn(&R),
}

/// The per-hart interrupt sources, switched on and off through `sie`.
pub struct RiscvIrqChip<R> {
    sie: R,
}

fn clear_sie<R: BitRegister, const BIT: usize>(sie: &R) {
    sie.clear_bits(BIT);
}

fn set_sie<R: BitRegister, const BIT: usize>(sie: &R) {
    sie.set_bits(BIT);
}

impl<R: BitRegister> RiscvIrqChip<R> {
    const LINES: [IrqLine<R>; 2] = [
        IrqLine {
            irq: IRQ_TIMER,
            mask: clear_sie::<R, SIE_STIE>,
            unmask: set_sie::<R, SIE_STIE>,
        },
        IrqLine {
            irq: IRQ_SOFTWARE,
            mask: clear_sie::<R, SIE_SSIE>,
            unmask: set_sie::<R, SIE_SSIE>,
        },
    ];

    pub const fn new(sie: R) -> Self {
        Self { sie }
    }

    pub fn sie(&self) -> &R {
        &self.sie
    }

    fn line(irq: usize) -> IrqLine<R> {
        match Self::LINES.into_iter().find(|line| line.irq == irq) {
            Some(line) => line,
            None => panic!("riscv: interrupt line {} does not exist", irq),
        }
    }
}

impl<R> IrqChip for RiscvIrqChip<R>
where
    R: BitRegister + Send + Sync,
{
    fn name(&self) -> &'static str {
        "riscv"
    }

    fn mask(&self, irq: usize) {
        (Self::line(irq).mask)(&self.sie);
    }

    fn unmask(&self, irq: usize) {
        (Self::line(irq).unmask)(&self.sie);
    }

    fn mask_ack(&self, irq: usize) {
        self.mask(irq);
    }
}

/// Hand every core line to `chip` with the level triggered flow.
pub fn init_irq(table: &IrqDescTable, chip: Arc<dyn IrqChip>) -> Result<(), IrqError> {
    for irq in 0..NR_IRQS_CORE {
        table.set_chip_and_handler(irq, chip.clone(), handle_level_irq)?;
    }

    println_trace!("trace_irq", "{} lines on {}", NR_IRQS_CORE, chip.name());
    Ok(())
}
