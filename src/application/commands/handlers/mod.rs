//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod identify_handlers;
mod method_handlers;

pub use identify_handlers::*;
pub use method_handlers::*;
