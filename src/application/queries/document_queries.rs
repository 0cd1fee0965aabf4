//! Document Queries

use crate::domain::archive::{DocumentId, InventoryId, MethodId};

/// 列出 Inventory 的文档查询
#[derive(Debug, Clone)]
pub struct ListDocuments {
    pub inventory_id: InventoryId,
    /// 只返回该方法识别出的文档
    pub method_id: Option<MethodId>,
}

/// 获取文档详情查询
#[derive(Debug, Clone)]
pub struct GetDocument {
    pub document_id: DocumentId,
}

/// 列出所有识别方法查询
#[derive(Debug, Clone)]
pub struct ListMethods;
