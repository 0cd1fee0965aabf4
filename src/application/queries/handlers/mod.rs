//! Query Handlers 实现

mod document_handlers;

pub use document_handlers::*;
