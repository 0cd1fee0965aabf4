//! Archive Context - 档案限界上下文
//!
//! 职责:
//! - Inventory / Scan / Page 实体
//! - 强类型标识与页序策略

mod entities;
mod value_objects;

pub use entities::{Inventory, Page, Scan};
pub use value_objects::{
    BlankState, DocumentId, InventoryId, MethodId, PageId, PageOrder, RectoVerso, ScanId,
    ScanType,
};
