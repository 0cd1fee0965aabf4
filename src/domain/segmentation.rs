//! 文档边界识别引擎
//!
//! 对单个 Inventory 的有序页面做一次从左到右的扫描，仅依据两个页面信号
//! 切分逻辑文档：
//! - 空白页序列：两段内容之间的任意长度空白页构成边界
//! - 签名标记：文档结束，但边界落在下一个非空白页上
//!
//! 空白页从不归入任何文档，只改变扫描状态。

use serde::{Deserialize, Serialize};

use crate::domain::archive::{Page, PageId};

/// 页面在文档中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page_id: PageId,
    /// 从 0 开始的连续序号
    pub index: usize,
}

/// 识别出的逻辑文档（尚未持久化）
///
/// 不变量:
/// - links 的 index 为 0..n-1，无空洞无重复
/// - 不包含空白页
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentedDocument {
    links: Vec<PageLink>,
}

impl SegmentedDocument {
    pub fn links(&self) -> &[PageLink] {
        &self.links
    }

    pub fn page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        self.links.iter().map(|link| link.page_id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// 单遍扫描状态机
///
/// 运行状态：当前文档、空白序列标记、待定签名边界标记、下一个页序号。
/// 每次 `push` 消费一页，`finish` 返回按创建顺序排列的文档。
#[derive(Debug, Default)]
pub struct Segmenter {
    documents: Vec<SegmentedDocument>,
    current_document: Option<SegmentedDocument>,
    empty_run_active: bool,
    awaiting_signature_boundary: bool,
    next_index: usize,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 消费下一页
    pub fn push(&mut self, page: &Page) {
        // 第一个非空白页之前的空白页（封面、衬页）直接跳过，不影响任何状态
        if self.current_document.is_none() && page.is_blank() {
            return;
        }

        let open_new = self.should_open_document(page);

        if page.is_blank() {
            return;
        }

        if open_new {
            if let Some(done) = self.current_document.take() {
                self.documents.push(done);
            }
            self.current_document = Some(SegmentedDocument::default());
            self.next_index = 0;
        }

        let Some(document) = self.current_document.as_mut() else {
            return;
        };
        document.links.push(PageLink {
            page_id: page.id,
            index: self.next_index,
        });
        self.next_index += 1;

        // 只在此处置位；只有在签名边界真正落地时才清除
        if page.has_signature() {
            self.awaiting_signature_boundary = true;
        }
    }

    /// 判定是否在当前页之前开启新文档，按优先级依次应用规则
    fn should_open_document(&mut self, page: &Page) -> bool {
        if self.current_document.is_none() {
            return true;
        }

        if self.awaiting_signature_boundary {
            // 签名之后的空白页被吸收进等待，不再单独构成第二个边界
            self.empty_run_active = false;
            if page.is_blank() {
                return false;
            }
            self.awaiting_signature_boundary = false;
            return true;
        }

        if page.is_blank() {
            self.empty_run_active = true;
            return false;
        }

        if self.empty_run_active {
            self.empty_run_active = false;
            return true;
        }

        self.empty_run_active = false;
        false
    }

    /// 结束扫描，返回所有文档
    pub fn finish(mut self) -> Vec<SegmentedDocument> {
        if let Some(done) = self.current_document.take() {
            self.documents.push(done);
        }
        self.documents
    }
}

/// 对一个 Inventory 的有序页面进行文档切分
///
/// 前置条件：`pages` 已按 Inventory 内的全序排好，且全部属于同一 Inventory。
/// 违反前置条件不会报错，只会得到错误的切分。
pub fn segment(pages: &[Page]) -> Vec<SegmentedDocument> {
    let mut segmenter = Segmenter::new();
    for page in pages {
        segmenter.push(page);
    }
    segmenter.finish()
}
