//! SQLite Document Repository
//!
//! Document 与 Page2Document 的存储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{parse_id, DbPool};
use crate::application::ports::{
    DocumentRecord, DocumentRepositoryPort, DocumentWithPages, PageLinkRecord, RepositoryError,
};
use crate::domain::archive::{DocumentId, InventoryId, MethodId};

/// 单条 INSERT 语句包含的页面关联数
const LINK_BATCH_SIZE: usize = 200;

/// SQLite Document Repository
pub struct SqliteDocumentRepository {
    pool: DbPool,
}

impl SqliteDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    inventory_id: String,
    method_id: String,
    part_of_id: Option<String>,
    title: Option<String>,
    date_text: Option<String>,
    created_at: String,
}

impl TryFrom<DocumentRow> for DocumentRecord {
    type Error = RepositoryError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(DocumentRecord {
            id: parse_id(&row.id)?,
            inventory_id: parse_id(&row.inventory_id)?,
            method_id: parse_id(&row.method_id)?,
            part_of: row.part_of_id.as_deref().map(parse_id::<DocumentId>).transpose()?,
            title: row.title,
            date_text: row.date_text,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[derive(FromRow)]
struct PageLinkRow {
    id: String,
    page_id: String,
    document_id: String,
    page_index: i64,
}

impl TryFrom<PageLinkRow> for PageLinkRecord {
    type Error = RepositoryError;

    fn try_from(row: PageLinkRow) -> Result<Self, Self::Error> {
        Ok(PageLinkRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            page_id: parse_id(&row.page_id)?,
            document_id: parse_id(&row.document_id)?,
            index: row.page_index as usize,
        })
    }
}

const SELECT_DOCUMENT: &str =
    "SELECT id, inventory_id, method_id, part_of_id, title, date_text, created_at FROM documents";

#[async_trait]
impl DocumentRepositoryPort for SqliteDocumentRepository {
    async fn save_segmentation(&self, documents: &[DocumentWithPages]) -> Result<(), RepositoryError> {
        if documents.is_empty() {
            return Ok(());
        }

        // 整个 Inventory 一个事务；中途失败时 tx 被 drop 并回滚
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        for entry in documents {
            let document = &entry.document;

            sqlx::query(
                r#"
                INSERT INTO documents (id, inventory_id, method_id, part_of_id, title, date_text, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(document.id.to_string())
            .bind(document.inventory_id.to_string())
            .bind(document.method_id.to_string())
            .bind(document.part_of.map(|id| id.to_string()))
            .bind(&document.title)
            .bind(&document.date_text)
            .bind(document.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

            for chunk in entry.pages.chunks(LINK_BATCH_SIZE) {
                let mut query = String::from(
                    "INSERT INTO page2document (id, page_id, document_id, page_index) VALUES ",
                );
                let placeholders: Vec<&str> = chunk.iter().map(|_| "(?, ?, ?, ?)").collect();
                query.push_str(&placeholders.join(", "));

                let mut sql_query = sqlx::query(&query);
                for link in chunk {
                    sql_query = sql_query
                        .bind(link.id.to_string())
                        .bind(link.page_id.to_string())
                        .bind(link.document_id.to_string())
                        .bind(link.index as i64);
                }

                sql_query
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: DocumentId) -> Result<Option<DocumentRecord>, RepositoryError> {
        let row: Option<DocumentRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_DOCUMENT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(DocumentRecord::try_from).transpose()
    }

    async fn find_by_inventory(
        &self,
        inventory_id: InventoryId,
        method_id: Option<MethodId>,
    ) -> Result<Vec<DocumentRecord>, RepositoryError> {
        let method = method_id.map(|id| id.to_string());

        // rowid 保留插入顺序，即识别时的文档顺序
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "{} WHERE inventory_id = ? AND (? IS NULL OR method_id = ?) ORDER BY rowid",
            SELECT_DOCUMENT
        ))
        .bind(inventory_id.to_string())
        .bind(method.clone())
        .bind(method)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(DocumentRecord::try_from).collect()
    }

    async fn find_page_links(&self, document_id: DocumentId) -> Result<Vec<PageLinkRecord>, RepositoryError> {
        let rows: Vec<PageLinkRow> = sqlx::query_as(
            "SELECT id, page_id, document_id, page_index FROM page2document WHERE document_id = ? ORDER BY page_index",
        )
        .bind(document_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(PageLinkRecord::try_from).collect()
    }

    async fn count_by_method(&self, method_id: MethodId) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE method_id = ?")
            .bind(method_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(count as usize)
    }
}
