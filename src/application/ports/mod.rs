//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod document_identifier;
mod inventory_claims;
mod repositories;

pub use document_identifier::DocumentIdentifierPort;
pub use inventory_claims::InventoryClaimPort;
pub use repositories::{
    DocumentRecord, DocumentRepositoryPort, DocumentWithPages, InventoryRepositoryPort,
    MethodRepositoryPort, PageLinkRecord, PageSequencePort, RepositoryError,
};
