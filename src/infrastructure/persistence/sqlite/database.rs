//! SQLite Database - 数据库连接和迁移

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库 URL
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/folio.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            max_connections: 5,
        }
    }

    /// 内存数据库只能使用单连接，否则每个连接各有一个独立的库
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 创建数据库连接池
///
/// 每个连接都启用 WAL、外键约束与 busy_timeout=5000ms
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(5000))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "SQLite pool created with WAL mode and busy_timeout=5000ms"
    );

    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // 创建 inventories 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventories (
            id TEXT PRIMARY KEY,
            inventory_number TEXT NOT NULL UNIQUE,
            handle TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 scans 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scans (
            id TEXT PRIMARY KEY,
            inventory_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            scan_type TEXT,
            FOREIGN KEY (inventory_id) REFERENCES inventories(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 pages 表（is_blank 允许为 NULL，表示未知）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pages (
            id TEXT PRIMARY KEY,
            inventory_id TEXT NOT NULL,
            scan_id TEXT NOT NULL,
            recto_verso TEXT,
            is_blank INTEGER,
            signatures TEXT,
            FOREIGN KEY (inventory_id) REFERENCES inventories(id),
            FOREIGN KEY (scan_id) REFERENCES scans(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 identification_methods 表（name 唯一，保证并发 find-or-create 只产生一行）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS identification_methods (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            date TEXT,
            url TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 documents 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            inventory_id TEXT NOT NULL,
            method_id TEXT NOT NULL,
            part_of_id TEXT,
            title TEXT,
            date_text TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (inventory_id) REFERENCES inventories(id),
            FOREIGN KEY (method_id) REFERENCES identification_methods(id),
            FOREIGN KEY (part_of_id) REFERENCES documents(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 page2document 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS page2document (
            id TEXT PRIMARY KEY,
            page_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            page_index INTEGER NOT NULL,
            FOREIGN KEY (page_id) REFERENCES pages(id),
            FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE,
            UNIQUE (document_id, page_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建索引
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_pages_inventory_id
        ON pages(inventory_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_scans_filename
        ON scans(filename)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_documents_inventory_method
        ON documents(inventory_id, method_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_page2document_page_id
        ON page2document(page_id)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}
