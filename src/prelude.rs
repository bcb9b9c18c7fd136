#[allow(unused_imports)]
pub(crate) use eonix_log::{
    println_debug, println_fatal, println_info, println_trace, println_warn,
};

#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};
