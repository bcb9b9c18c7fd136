use super::addr::Addr;
use core::{fmt, ops::Sub};

#[repr(transparent)]
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct VAddr(usize);

impl From<usize> for VAddr {
    fn from(v: usize) -> Self {
        Self::from(v)
    }
}

impl VAddr {
    pub const fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Distance in bytes between two addresses.
impl Sub for VAddr {
    type Output = usize;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Debug for VAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VAddr({:#x})", self.0)
    }
}

impl fmt::LowerHex for VAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Addr for VAddr {
    fn addr(self) -> usize {
        self.0
    }
}
