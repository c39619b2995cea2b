//! Core batch logic for ryt-batch

pub mod batch;
pub mod work_item;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::*;
pub use work_item::*;
pub use workflow::*;
