//! Command implementations for VaultArc CLI.

pub mod acm;
pub mod extract;
pub mod info;
pub mod list;

pub use acm::{AcmArgs, cmd_acm};
pub use extract::{ExtractOptions, cmd_extract};
pub use info::cmd_info;
pub use list::{ListOptions, cmd_list};
