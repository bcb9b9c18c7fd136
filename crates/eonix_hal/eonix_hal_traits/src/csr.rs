/// A control/status register seen as a set of independent bits.
///
/// Implementations touch real hardware on the target and plain memory in
/// tests. Only the two atomic read-modify-write operations the hardware
/// offers (`csrs`, `csrc`) are exposed.
pub trait BitRegister {
    /// Set every bit that is set in `bits`.
    fn set_bits(&self, bits: usize);

    /// Clear every bit that is set in `bits`.
    fn clear_bits(&self, bits: usize);
}

impl<R: BitRegister + ?Sized> BitRegister for &R {
    fn set_bits(&self, bits: usize) {
        (**self).set_bits(bits)
    }

    fn clear_bits(&self, bits: usize) {
        (**self).clear_bits(bits)
    }
}
