pub(crate) mod error;
pub(crate) mod interrupt;
pub(crate) mod process;
