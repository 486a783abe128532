//! CLI command handlers, one file per command.

mod checksum;
mod complete;
mod enqueue;
mod fetch;
mod import;
mod list;
mod resolve;
mod work;

pub use checksum::run_checksum;
pub use complete::run_complete;
pub use enqueue::run_enqueue;
pub use fetch::run_fetch;
pub use import::run_import;
pub use list::run_list;
pub use resolve::run_resolve;
pub use work::run_work;
