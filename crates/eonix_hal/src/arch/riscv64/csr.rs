use bitflags::bitflags;

bitflags! {
    /// Supervisor interrupt-enable register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SieBits: usize {
        const SSIE = 1 << 1;
        const STIE = 1 << 5;
        const SEIE = 1 << 9;
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "riscv64")] {
        use eonix_hal_traits::csr::BitRegister;
        use riscv::register::{sie, sstatus};

        /// The `sie` CSR of the current hart.
        pub struct Sie;

        impl BitRegister for Sie {
            fn set_bits(&self, bits: usize) {
                let bits = SieBits::from_bits_truncate(bits);

                // SAFETY: Enabling a local interrupt source has no memory effects.
                unsafe {
                    if bits.contains(SieBits::SSIE) {
                        sie::set_ssoft();
                    }
                    if bits.contains(SieBits::STIE) {
                        sie::set_stimer();
                    }
                    if bits.contains(SieBits::SEIE) {
                        sie::set_sext();
                    }
                }
            }

            fn clear_bits(&self, bits: usize) {
                let bits = SieBits::from_bits_truncate(bits);

                // SAFETY: Disabling a local interrupt source has no memory effects.
                unsafe {
                    if bits.contains(SieBits::SSIE) {
                        sie::clear_ssoft();
                    }
                    if bits.contains(SieBits::STIE) {
                        sie::clear_stimer();
                    }
                    if bits.contains(SieBits::SEIE) {
                        sie::clear_sext();
                    }
                }
            }
        }

        /// Let interrupts in on the current hart.
        #[inline]
        pub fn enable_irqs() {
            // SAFETY: Callers are done with anything interrupts must not see.
            unsafe {
                sstatus::set_sie();
            }
        }
    }
}
