//! Document Identifier Port - 文档识别算法抽象
//!
//! 每个实现对应一个识别方法，具体实现在 infrastructure/adapters 层

use chrono::NaiveDate;

use crate::domain::archive::Page;
use crate::domain::identification::MethodSpec;
use crate::domain::SegmentedDocument;

/// Document Identifier Port
///
/// 文档识别器接口
pub trait DocumentIdentifierPort: Send + Sync {
    /// 该算法登记到方法注册表时使用的元数据
    fn method_spec(&self, today: NaiveDate) -> MethodSpec;

    /// 将一个 Inventory 的有序页面切分成文档
    fn identify(&self, pages: &[Page]) -> Vec<SegmentedDocument>;
}
