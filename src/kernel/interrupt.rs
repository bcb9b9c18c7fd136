mod dispatch;
mod intc;
mod irq_desc;

pub use dispatch::{do_irq, HardIrqGuard, IrqContext, IrqExit};
pub use intc::{init_irq, RiscvIrqChip};
pub use irq_desc::{handle_level_irq, IrqChip, IrqDesc, IrqDescTable, IrqError, IrqFlowHandler};
