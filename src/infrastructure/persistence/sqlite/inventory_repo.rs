//! SQLite Inventory Repository
//!
//! 同时充当 Page Sequence Provider：按 Inventory 内全序返回页面

use async_trait::async_trait;
use sqlx::FromRow;

use super::{parse_id, DbPool};
use crate::application::ports::{InventoryRepositoryPort, PageSequencePort, RepositoryError};
use crate::domain::archive::{Inventory, InventoryId, Page, PageOrder, RectoVerso, Scan};

/// SQLite Inventory Repository
pub struct SqliteInventoryRepository {
    pool: DbPool,
}

impl SqliteInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct InventoryRow {
    id: String,
    inventory_number: String,
    handle: Option<String>,
}

impl TryFrom<InventoryRow> for Inventory {
    type Error = RepositoryError;

    fn try_from(row: InventoryRow) -> Result<Self, Self::Error> {
        Ok(Inventory {
            id: parse_id(&row.id)?,
            inventory_number: row.inventory_number,
            handle: row.handle,
        })
    }
}

#[derive(FromRow)]
struct PageRow {
    id: String,
    inventory_id: String,
    scan_id: String,
    scan_filename: String,
    recto_verso: Option<String>,
    is_blank: Option<bool>,
    signatures: Option<String>,
}

impl TryFrom<PageRow> for Page {
    type Error = RepositoryError;

    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        Ok(Page {
            id: parse_id(&row.id)?,
            inventory_id: parse_id(&row.inventory_id)?,
            scan_id: parse_id(&row.scan_id)?,
            scan_filename: row.scan_filename,
            recto_verso: row.recto_verso.as_deref().and_then(RectoVerso::from_str),
            is_blank: row.is_blank,
            signatures: row.signatures,
        })
    }
}

/// 页序对应的 ORDER BY 子句
fn order_clause(order: PageOrder) -> &'static str {
    match order {
        PageOrder::ScanThenId => "ORDER BY s.filename, p.id",
        PageOrder::ScanThenRectoVerso => {
            "ORDER BY s.filename, CASE p.recto_verso WHEN 'Recto' THEN 0 WHEN 'Verso' THEN 1 ELSE 2 END, p.id"
        }
    }
}

#[async_trait]
impl InventoryRepositoryPort for SqliteInventoryRepository {
    async fn save_inventory(&self, inventory: &Inventory) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO inventories (id, inventory_number, handle)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                inventory_number = excluded.inventory_number,
                handle = excluded.handle
            "#,
        )
        .bind(inventory.id.to_string())
        .bind(&inventory.inventory_number)
        .bind(&inventory.handle)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(format!("inventory {}", inventory.inventory_number))
            }
            other => RepositoryError::DatabaseError(other.to_string()),
        })?;

        Ok(())
    }

    async fn save_scan(&self, scan: &Scan) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO scans (id, inventory_id, filename, scan_type)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                filename = excluded.filename,
                scan_type = excluded.scan_type
            "#,
        )
        .bind(scan.id.to_string())
        .bind(scan.inventory_id.to_string())
        .bind(&scan.filename)
        .bind(scan.scan_type.map(|t| t.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn save_pages(&self, pages: &[Page]) -> Result<(), RepositoryError> {
        if pages.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        for page in pages {
            sqlx::query(
                r#"
                INSERT INTO pages (id, inventory_id, scan_id, recto_verso, is_blank, signatures)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    recto_verso = excluded.recto_verso,
                    is_blank = excluded.is_blank,
                    signatures = excluded.signatures
                "#,
            )
            .bind(page.id.to_string())
            .bind(page.inventory_id.to_string())
            .bind(page.scan_id.to_string())
            .bind(page.recto_verso.map(|rv| rv.as_str()))
            .bind(page.is_blank)
            .bind(&page.signatures)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: InventoryId) -> Result<Option<Inventory>, RepositoryError> {
        let row: Option<InventoryRow> = sqlx::query_as(
            "SELECT id, inventory_number, handle FROM inventories WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(Inventory::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Inventory>, RepositoryError> {
        let rows: Vec<InventoryRow> = sqlx::query_as(
            "SELECT id, inventory_number, handle FROM inventories ORDER BY inventory_number",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Inventory::try_from).collect()
    }
}

#[async_trait]
impl PageSequencePort for SqliteInventoryRepository {
    async fn ordered_pages(
        &self,
        inventory_id: InventoryId,
        order: PageOrder,
    ) -> Result<Vec<Page>, RepositoryError> {
        let query = format!(
            r#"
            SELECT p.id, p.inventory_id, p.scan_id, s.filename AS scan_filename,
                   p.recto_verso, p.is_blank, p.signatures
            FROM pages p
            JOIN scans s ON s.id = p.scan_id
            WHERE p.inventory_id = ?
            {}
            "#,
            order_clause(order)
        );

        let rows: Vec<PageRow> = sqlx::query_as(&query)
            .bind(inventory_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Page::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::archive::PageId;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use uuid::Uuid;

    async fn repo() -> SqliteInventoryRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteInventoryRepository::new(pool)
    }

    fn page_with_id(scan: &Scan, id: u128) -> Page {
        let mut page = Page::new(scan);
        page.id = PageId::from_uuid(Uuid::from_u128(id));
        page
    }

    #[tokio::test]
    async fn test_find_all_ordered_by_number() {
        let repo = repo().await;
        repo.save_inventory(&Inventory::new("1054")).await.unwrap();
        repo.save_inventory(&Inventory::new("1053")).await.unwrap();

        let numbers: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.inventory_number)
            .collect();
        assert_eq!(numbers, vec!["1053", "1054"]);
    }

    #[tokio::test]
    async fn test_duplicate_inventory_number_rejected() {
        let repo = repo().await;
        repo.save_inventory(&Inventory::new("1053")).await.unwrap();
        let err = repo.save_inventory(&Inventory::new("1053")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_pages_ordered_by_scan_then_id() {
        let repo = repo().await;
        let inventory = Inventory::new("1053");
        repo.save_inventory(&inventory).await.unwrap();

        let scan_b = Scan::new(inventory.id, "0002.jpg");
        let scan_a = Scan::new(inventory.id, "0001.jpg");
        repo.save_scan(&scan_a).await.unwrap();
        repo.save_scan(&scan_b).await.unwrap();

        // 同一扫描件内，背面的 ID 小于正面的 ID
        let verso = page_with_id(&scan_a, 1).with_recto_verso(RectoVerso::Verso);
        let recto = page_with_id(&scan_a, 2).with_recto_verso(RectoVerso::Recto);
        let later = page_with_id(&scan_b, 0).with_blank(Some(true));
        repo.save_pages(&[later.clone(), recto.clone(), verso.clone()])
            .await
            .unwrap();

        let ids: Vec<PageId> = repo
            .ordered_pages(inventory.id, PageOrder::ScanThenId)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![verso.id, recto.id, later.id]);

        let ids: Vec<PageId> = repo
            .ordered_pages(inventory.id, PageOrder::ScanThenRectoVerso)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![recto.id, verso.id, later.id]);
    }

    #[tokio::test]
    async fn test_page_signals_round_trip() {
        let repo = repo().await;
        let inventory = Inventory::new("1053");
        repo.save_inventory(&inventory).await.unwrap();
        let scan = Scan::new(inventory.id, "0001.jpg");
        repo.save_scan(&scan).await.unwrap();

        let unknown = page_with_id(&scan, 1);
        let signed = page_with_id(&scan, 2)
            .with_blank(Some(false))
            .with_signatures("Van Diemen");
        repo.save_pages(&[unknown, signed]).await.unwrap();

        let pages = repo
            .ordered_pages(inventory.id, PageOrder::ScanThenId)
            .await
            .unwrap();
        assert_eq!(pages[0].is_blank, None);
        assert!(!pages[0].has_signature());
        assert_eq!(pages[1].is_blank, Some(false));
        assert!(pages[1].has_signature());
        assert_eq!(pages[1].scan_filename, "0001.jpg");
    }

    #[tokio::test]
    async fn test_pages_scoped_to_inventory() {
        let repo = repo().await;
        let first = Inventory::new("1053");
        let second = Inventory::new("1054");
        repo.save_inventory(&first).await.unwrap();
        repo.save_inventory(&second).await.unwrap();
        let scan = Scan::new(second.id, "0001.jpg");
        repo.save_scan(&scan).await.unwrap();
        repo.save_pages(&[Page::new(&scan)]).await.unwrap();

        let pages = repo.ordered_pages(first.id, PageOrder::ScanThenId).await.unwrap();
        assert!(pages.is_empty());
    }
}
