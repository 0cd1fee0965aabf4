//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod memory;
pub mod persistence;

pub use adapters::BaselineIdentifier;
pub use memory::InMemoryInventoryClaims;
pub use persistence::sqlite::{
    SqliteDocumentRepository, SqliteInventoryRepository, SqliteMethodRepository,
};
