use crate::prelude::*;

use core::array;
use eonix_hal::config::irq::NR_IRQS_CORE;
use spin::Mutex;

/// An interrupt controller as seen by the generic IRQ code.
pub trait IrqChip: Send + Sync {
    fn name(&self) -> &'static str;

    fn mask(&self, irq: usize);
    fn unmask(&self, irq: usize);

    /// Mask and acknowledge `irq`. Chips without an acknowledge step only mask.
    fn mask_ack(&self, irq: usize) {
        self.mask(irq)
    }
}

/// Runs the actions of one line and deals with the chip around them.
pub type IrqFlowHandler = fn(irq: usize, desc: &mut IrqDesc);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqError {
    /// The line number is out of range.
    InvalidIrq(usize),
    /// Nobody set up the line.
    NoHandler(usize),
}

#[derive(Default)]
pub struct IrqDesc {
    chip: Option<Arc<dyn IrqChip>>,
    flow: Option<IrqFlowHandler>,
    actions: Vec<Box<dyn Fn() + Send>>,
    count: usize,
}

/// Descriptors of all lines owned by the core interrupt controller.
pub struct IrqDescTable {
    descs: [Mutex<IrqDesc>; NR_IRQS_CORE],
}

impl IrqDesc {
    pub fn chip(&self) -> Option<&dyn IrqChip> {
        self.chip.as_deref()
    }

    /// How many times the line fired.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl IrqDescTable {
    pub fn new() -> Self {
        Self {
            descs: array::from_fn(|_| Mutex::new(IrqDesc::default())),
        }
    }

    fn desc(&self, irq: usize) -> Result<&Mutex<IrqDesc>, IrqError> {
        self.descs.get(irq).ok_or(IrqError::InvalidIrq(irq))
    }

    pub fn set_chip_and_handler(
        &self,
        irq: usize,
        chip: Arc<dyn IrqChip>,
        flow: IrqFlowHandler,
    ) -> Result<(), IrqError> {
        let mut desc = self.desc(irq)?.lock();
        desc.chip = Some(chip);
        desc.flow = Some(flow);
        Ok(())
    }

    pub fn request_irq<F>(&self, irq: usize, handler: F) -> Result<(), IrqError>
    where
        F: Fn() + Send + 'static,
    {
        self.desc(irq)?.lock().actions.push(Box::new(handler));
        Ok(())
    }

    /// Run the flow handler of `irq`.
    ///
    /// The line's descriptor stays locked while its actions run, so actions
    /// must not register handlers on their own line.
    pub fn generic_handle_irq(&self, irq: usize) -> Result<(), IrqError> {
        let mut desc = self.desc(irq)?.lock();
        let flow = desc.flow.ok_or(IrqError::NoHandler(irq))?;

        flow(irq, &mut desc);
        Ok(())
    }

    pub fn chip_name(&self, irq: usize) -> Option<&'static str> {
        let desc = self.desc(irq).ok()?.lock();
        desc.chip().map(|chip| chip.name())
    }

    pub fn count(&self, irq: usize) -> usize {
        self.desc(irq).map_or(0, |desc| desc.lock().count())
    }
}

impl Default for IrqDescTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Flow for level triggered lines: keep the line masked while the actions
/// run so it does not fire again before the device is quiet.
pub fn handle_level_irq(irq: usize, desc: &mut IrqDesc) {
    let Some(chip) = desc.chip.clone() else {
        println_warn!("irq {}: level flow without a chip", irq);
        return;
    };

    chip.mask_ack(irq);
    desc.count += 1;

    // Leave the line masked, it would only fire again.
    if desc.actions.is_empty() {
        println_warn!("irq {}: no action, keeping it masked", irq);
        return;
    }

    for action in desc.actions.iter() {
        action();
    }

    chip.unmask(irq);
}
