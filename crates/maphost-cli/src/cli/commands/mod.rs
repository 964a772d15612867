//! CLI command handlers. Each command is in its own file.

mod fetch;
mod rewrite;
mod route;

pub use fetch::run_fetch;
pub use rewrite::run_rewrite;
pub use route::run_route;
