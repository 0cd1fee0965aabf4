//! Baseline Identifier - 空白页与签名标记

use chrono::NaiveDate;

use crate::application::ports::DocumentIdentifierPort;
use crate::domain::archive::Page;
use crate::domain::identification::MethodSpec;
use crate::domain::{segment, SegmentedDocument};

/// 基线识别器
///
/// 规则:
/// 1. 跳过 Inventory 开头的空白页
/// 2. 第一个文档从第一个非空白页开始
/// 3. 空白页序列表示文档边界
/// 4. 带签名的页面表示文档结束，下一个非空白页开始新文档
#[derive(Debug, Clone, Default)]
pub struct BaselineIdentifier;

impl BaselineIdentifier {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentIdentifierPort for BaselineIdentifier {
    fn method_spec(&self, today: NaiveDate) -> MethodSpec {
        MethodSpec::baseline(today)
    }

    fn identify(&self, pages: &[Page]) -> Vec<SegmentedDocument> {
        segment(pages)
    }
}
