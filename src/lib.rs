//! Folio - 档案文献边界识别系统
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Archive Context: Inventory / Scan / Page
//! - Identification Context: 文档识别方法
//! - 文档边界识别引擎（空白页序列 + 签名标记）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories、PageSequence、DocumentIdentifier、InventoryClaim）
//! - Commands: 方法登记、批量识别
//! - Queries: 文档与方法查询
//!
//! 基础设施层 (infrastructure/):
//! - Persistence: SQLite 存储
//! - Memory: Inventory 占用表
//! - Adapters: 基线识别器

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
