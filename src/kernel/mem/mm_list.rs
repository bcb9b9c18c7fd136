use crate::prelude::*;

use alloc::collections::btree_map::BTreeMap;
use core::ops::Bound;
use eonix_mm::address::{AddrOps as _, VAddr, VRange};
use spin::{Mutex, RwLock, RwLockReadGuard};

use super::{AddressSpace, MMArea, StackGrowError, VmArea, VmFlags, VmaLookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmapError {
    /// The range is empty or not page aligned.
    InvalidRange,
    /// The range overlaps an existing area.
    Exists,
}

#[derive(Debug)]
struct MMListInner {
    /// Areas keyed by their end address, which never changes.
    areas: BTreeMap<VAddr, MMArea>,
}

/// The areas of a user address space.
#[derive(Debug)]
pub struct MMList {
    inner: RwLock<MMListInner>,
    /// Stacks grow while the list is only locked for reading.
    grow_lock: Mutex<()>,
    stack_limit: usize,
}

pub struct MMListReadGuard<'a> {
    list: &'a MMList,
    inner: RwLockReadGuard<'a, MMListInner>,
}

impl MMListInner {
    fn find_area(&self, addr: VAddr) -> Option<&MMArea> {
        self.areas
            .range((Bound::Excluded(addr), Bound::Unbounded))
            .next()
            .map(|(_, area)| area)
    }

    /// The area right below the one ending at `end`.
    fn prev_area(&self, end: VAddr) -> Option<&MMArea> {
        self.areas.range(..end).next_back().map(|(_, area)| area)
    }

    fn check_overlapping_range(&self, range: VRange) -> bool {
        self.find_area(range.start())
            .is_some_and(|area| area.start() < range.end())
    }

    fn mmap(&mut self, range: VRange, flags: VmFlags) -> Result<(), MmapError> {
        if range.is_empty() || !range.start().is_page_aligned() || !range.end().is_page_aligned() {
            return Err(MmapError::InvalidRange);
        }

        if self.check_overlapping_range(range) {
            return Err(MmapError::Exists);
        }

        self.areas.insert(range.end(), MMArea::new(range, flags));
        Ok(())
    }
}

impl MMList {
    pub const DEFAULT_STACK_LIMIT: usize = 8 * 1024 * 1024;

    pub fn new(stack_limit: usize) -> Self {
        Self {
            inner: RwLock::new(MMListInner {
                areas: BTreeMap::new(),
            }),
            grow_lock: Mutex::new(()),
            stack_limit,
        }
    }

    pub fn mmap(&self, range: VRange, flags: VmFlags) -> Result<(), MmapError> {
        self.inner.write().mmap(range, flags)
    }

    pub fn areas(&self) -> Vec<VmArea> {
        self.inner
            .read()
            .areas
            .values()
            .map(MMArea::snapshot)
            .collect()
    }

    /// Whether anyone holds the list lock right now.
    pub fn is_locked(&self) -> bool {
        self.inner.reader_count() != 0 || self.inner.writer_count() != 0
    }
}

impl Default for MMList {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STACK_LIMIT)
    }
}

impl AddressSpace for MMList {
    type ReadGuard<'a> = MMListReadGuard<'a>;

    fn lock_shared(&self) -> Self::ReadGuard<'_> {
        MMListReadGuard {
            list: self,
            inner: self.inner.read(),
        }
    }
}

impl VmaLookup for MMListReadGuard<'_> {
    fn find_vma(&self, addr: VAddr) -> Option<VmArea> {
        self.inner.find_area(addr).map(MMArea::snapshot)
    }

    fn expand_stack(&self, area: &VmArea, addr: VAddr) -> Result<VmArea, StackGrowError> {
        if !area.grows_down() {
            return Err(StackGrowError::NotGrowsDown);
        }

        let new_start = addr.floor();
        let _grow = self.list.grow_lock.lock();

        let current = self
            .inner
            .areas
            .get(&area.range.end())
            .ok_or(StackGrowError::NoArea)?;

        // Someone else grew it already.
        if current.start() <= new_start {
            return Ok(current.snapshot());
        }

        if current.end() - new_start > self.list.stack_limit {
            return Err(StackGrowError::LimitExceeded);
        }

        if let Some(prev) = self.inner.prev_area(current.end()) {
            if prev.end() > new_start {
                return Err(StackGrowError::Overlap);
            }
        }

        current.grow_down_to(new_start);
        println_trace!(
            "trace_fault",
            "stack grown to {:#x}..{:#x}",
            new_start,
            current.end()
        );

        Ok(current.snapshot())
    }
}
