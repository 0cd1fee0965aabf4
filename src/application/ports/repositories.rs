//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::archive::{
    DocumentId, Inventory, InventoryId, MethodId, Page, PageId, PageOrder, Scan,
};
use crate::domain::identification::{IdentificationMethod, MethodSpec};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Inventory Repository
// ============================================================================

/// Inventory Repository Port
///
/// Inventory / Scan / Page 由导入流程写入，识别流程只读
#[async_trait]
pub trait InventoryRepositoryPort: Send + Sync {
    /// 保存 Inventory（按 id 覆盖）
    async fn save_inventory(&self, inventory: &Inventory) -> Result<(), RepositoryError>;

    /// 保存扫描件
    async fn save_scan(&self, scan: &Scan) -> Result<(), RepositoryError>;

    /// 批量保存页面
    async fn save_pages(&self, pages: &[Page]) -> Result<(), RepositoryError>;

    /// 根据 ID 查找 Inventory
    async fn find_by_id(&self, id: InventoryId) -> Result<Option<Inventory>, RepositoryError>;

    /// 获取所有 Inventory（按馆藏编号排序）
    async fn find_all(&self) -> Result<Vec<Inventory>, RepositoryError>;
}

// ============================================================================
// Page Sequence Provider
// ============================================================================

/// Page Sequence Port
///
/// 提供单个 Inventory 内按全序排列的页面序列
#[async_trait]
pub trait PageSequencePort: Send + Sync {
    /// 获取 Inventory 的有序页面
    async fn ordered_pages(
        &self,
        inventory_id: InventoryId,
        order: PageOrder,
    ) -> Result<Vec<Page>, RepositoryError>;
}

// ============================================================================
// Identification Method Registry
// ============================================================================

/// Method Repository Port
///
/// 名称是唯一业务键，存储层必须有唯一约束，
/// 以保证多个 worker 并发 `ensure` 时只产生一行
#[async_trait]
pub trait MethodRepositoryPort: Send + Sync {
    /// 按名称查找或创建方法；已存在时原样返回，不做修改
    async fn ensure(&self, spec: &MethodSpec) -> Result<IdentificationMethod, RepositoryError>;

    /// 根据名称精确查找
    async fn find_by_name(&self, name: &str)
        -> Result<Option<IdentificationMethod>, RepositoryError>;

    /// 根据 ID 查找
    async fn find_by_id(&self, id: MethodId)
        -> Result<Option<IdentificationMethod>, RepositoryError>;

    /// 获取所有方法
    async fn find_all(&self) -> Result<Vec<IdentificationMethod>, RepositoryError>;
}

// ============================================================================
// Document / Page-Link Store
// ============================================================================

/// 文档实体（用于持久化）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub inventory_id: InventoryId,
    pub method_id: MethodId,
    /// 父文档；基线识别只产生扁平文档，始终为 None
    pub part_of: Option<DocumentId>,
    /// 标题与日期由下游流程填写，识别引擎不设置
    pub title: Option<String>,
    pub date_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 页面-文档关联（Page2Document）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinkRecord {
    pub id: Uuid,
    pub page_id: PageId,
    pub document_id: DocumentId,
    /// 页面在文档中的位置，从 0 开始
    pub index: usize,
}

/// 文档及其有序页面关联
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentWithPages {
    pub document: DocumentRecord,
    pub pages: Vec<PageLinkRecord>,
}

impl DocumentWithPages {
    pub fn number_of_pages(&self) -> usize {
        self.pages.len()
    }
}

/// Document Repository Port
#[async_trait]
pub trait DocumentRepositoryPort: Send + Sync {
    /// 在单个事务中保存一个 Inventory 的全部文档与页面关联
    ///
    /// 要么全部提交，要么全部不提交
    async fn save_segmentation(&self, documents: &[DocumentWithPages])
        -> Result<(), RepositoryError>;

    /// 根据 ID 查找文档
    async fn find_by_id(&self, id: DocumentId) -> Result<Option<DocumentRecord>, RepositoryError>;

    /// 获取 Inventory 的文档，可按方法过滤（按创建顺序）
    async fn find_by_inventory(
        &self,
        inventory_id: InventoryId,
        method_id: Option<MethodId>,
    ) -> Result<Vec<DocumentRecord>, RepositoryError>;

    /// 获取文档的页面关联（按 index 排序）
    async fn find_page_links(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<PageLinkRecord>, RepositoryError>;

    /// 统计某方法产生的文档数
    async fn count_by_method(&self, method_id: MethodId) -> Result<usize, RepositoryError>;
}
