//! Identification Context - Method

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::IdentificationError;
use crate::domain::archive::MethodId;

/// 方法名最大长度
pub const MAX_METHOD_NAME_LEN: usize = 255;

/// 基线方法名称（find-or-create 的业务键）
pub const BASELINE_METHOD_NAME: &str = "Baseline: Empty Pages & Signatures";

/// 基线方法说明
pub const BASELINE_METHOD_DESCRIPTION: &str = "Identifies documents in early modern archival inventories:\n\
1. Skips empty pages (is_blank=True) at inventory start\n\
2. First document starts with first non-blank page\n\
3. Empty page sequences (is_blank=True) indicate document boundaries\n\
4. Pages with signatures indicate document end; new document starts after";

/// 创建识别方法所需的元数据
///
/// 不变量:
/// - name 非空且不超过 255 字符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSpec {
    name: String,
    description: Option<String>,
    date: Option<NaiveDate>,
    url: Option<String>,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>) -> Result<Self, IdentificationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentificationError::InvalidName(
                "method name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_METHOD_NAME_LEN {
            return Err(IdentificationError::InvalidName(format!(
                "method name exceeds {} characters",
                MAX_METHOD_NAME_LEN
            )));
        }
        Ok(Self {
            name,
            description: None,
            date: None,
            url: None,
        })
    }

    /// 基线方法：空白页序列与签名标记
    pub fn baseline(date: NaiveDate) -> Self {
        Self {
            name: BASELINE_METHOD_NAME.to_string(),
            description: Some(BASELINE_METHOD_DESCRIPTION.to_string()),
            date: Some(date),
            url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// 已登记的文档识别方法
///
/// 每个 Document 永久归属于一个方法；创建后识别引擎不会修改它
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentificationMethod {
    pub id: MethodId,
    pub name: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub url: Option<String>,
}

impl IdentificationMethod {
    /// 用元数据创建一个新的方法实体（尚未持久化）
    pub fn from_spec(spec: &MethodSpec) -> Self {
        Self {
            id: MethodId::new(),
            name: spec.name.clone(),
            description: spec.description.clone(),
            date: spec.date,
            url: spec.url.clone(),
        }
    }
}

impl std::fmt::Display for IdentificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.date {
            Some(date) => write!(f, "{} ({})", self.name, date),
            None => write!(f, "{}", self.name),
        }
    }
}
