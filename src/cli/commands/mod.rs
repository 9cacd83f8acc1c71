//! CLI command implementations.

mod config;
mod delete;
mod list;
mod plan;
mod serve;
mod show;

pub use config::run_config;
pub use delete::run_delete;
pub use list::run_list;
pub use plan::run_plan;
pub use serve::run_serve;
pub use show::run_show;
