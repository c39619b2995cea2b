//! Utility functions for ryt-batch

pub mod cookies;
pub mod filename;
pub mod rate;
pub mod url;

pub use cookies::*;
pub use filename::*;
pub use rate::*;
pub use self::url::*;
