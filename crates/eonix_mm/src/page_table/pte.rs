use crate::paging::PFN;

pub trait PageAttribute: Copy {
    /// Create a new instance of the attribute with all attributes set to false.
    fn new() -> Self;

    fn present(self, present: bool) -> Self;
    fn read(self, read: bool) -> Self;
    fn write(self, write: bool) -> Self;
    fn execute(self, execute: bool) -> Self;
    fn user(self, user: bool) -> Self;
    fn global(self, global: bool) -> Self;

    fn is_present(&self) -> bool;
    fn is_read(&self) -> bool;
    fn is_write(&self) -> bool;
    fn is_execute(&self) -> bool;
    fn is_user(&self) -> bool;
    fn is_global(&self) -> bool;

    /// Whether the entry maps memory instead of pointing at a lower table.
    fn is_leaf(&self) -> bool;
}

pub trait PTE: Sized {
    type Attr: PageAttribute;

    fn set(&mut self, pfn: PFN, attr: Self::Attr);
    fn get(&self) -> (PFN, Self::Attr);

    fn get_pfn(&self) -> PFN {
        self.get().0
    }

    fn get_attr(&self) -> Self::Attr {
        self.get().1
    }

    fn is_present(&self) -> bool {
        self.get_attr().is_present()
    }
}
