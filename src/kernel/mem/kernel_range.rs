use eonix_mm::{
    address::{PhysAccess, VAddr},
    page_table::{PageAttribute as _, PagingMode, RawPageTable, PTE},
    paging::PFN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// The reference table has nothing at `level`, counted from the root.
    NotPresent { level: usize },
}

/// Make the kernel mapping of `addr` visible through `active_root`.
///
/// The kernel range is mapped once in the reference table and shared by every
/// address space through its top level entries, which are copied in lazily.
/// We walk both hierarchies in lockstep: intermediate entries are copied from
/// the reference table, the leaf entry is only checked for presence. A huge
/// page mapping above the last level is copied and ends the walk.
///
/// Once an entry is copied both walks point at the same table, so the
/// reference hierarchy is only ever read.
///
/// # Safety
/// `active_root` and `reference_root` MUST hold live page tables of paging
/// mode `M` reachable through `A`.
pub unsafe fn sync_kernel_range<M, A>(
    active_root: PFN,
    reference_root: PFN,
    addr: VAddr,
) -> Result<(), SyncError>
where
    M: PagingMode,
    A: PhysAccess,
{
    let leaf_level = M::LEVELS.len() - 1;
    let mut active = active_root;
    let mut reference = reference_root;

    for (level, table_level) in M::LEVELS.iter().enumerate() {
        let index = table_level.index_of(addr);

        // SAFETY: `reference` is the root or was read from a present entry of
        //         the reference hierarchy.
        let reference_table = unsafe { M::raw_table::<A>(reference) };
        let reference_entry = reference_table.index(index);

        if !reference_entry.is_present() {
            return Err(SyncError::NotPresent { level });
        }

        if level == leaf_level {
            break;
        }

        let (pfn, attr) = reference_entry.get();
        if active != reference {
            // SAFETY: `active` is the active root or a table we just linked
            //         into it.
            let mut active_table = unsafe { M::raw_table::<A>(active) };
            active_table.index_mut(index).set(pfn, attr);
        }

        if attr.is_leaf() {
            break;
        }

        active = pfn;
        reference = pfn;
    }

    Ok(())
}
