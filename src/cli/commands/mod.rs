//! CLI command implementations

pub mod completions;
pub mod config;
pub mod list;
pub mod load;

pub use completions::execute as completions;
pub use config::execute as config;
pub use list::execute as list;
pub use load::execute as load;
