//! Persistence of product records and the ranked series aggregate

use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, migrate::MigrateDatabase};
use tracing::info;

use crate::error::Result;
use crate::models::{ProductRecord, SeriesCharacterAggregate};

const CREATE_PRODUCT_DETAILS: &str = r#"
    CREATE TABLE IF NOT EXISTS product_details (
        Title TEXT,
        Status TEXT,
        Price INTEGER,
        Wishlist INTEGER,
        "Character" TEXT,
        Series TEXT,
        Category TEXT,
        Manufacturer TEXT
    )
"#;

const CREATE_PRODUCT_WISHLISTS_SERIES: &str = r#"
    CREATE TABLE IF NOT EXISTS product_wishlists_series (
        Series TEXT,
        "Character" TEXT,
        Wishlist_Total INTEGER,
        Average_Wishlist REAL
    )
"#;

/// Per-series mean of per-character wishlist totals
const RECOMPUTE_PRODUCT_WISHLISTS_SERIES: &str = r#"
    INSERT INTO product_wishlists_series (Series, "Character", Wishlist_Total, Average_Wishlist)
    SELECT
        Series,
        "Character",
        Wishlist_Total,
        AVG(Wishlist_Total) OVER (PARTITION BY Series) AS Average_Wishlist
    FROM (
        SELECT Series, "Character", SUM(Wishlist) AS Wishlist_Total
        FROM product_details
        WHERE Series IS NOT NULL AND "Character" IS NOT NULL
        GROUP BY Series, "Character"
    )
    ORDER BY Average_Wishlist DESC, Wishlist_Total DESC
"#;

/// What happens to rows already in `product_details` when a new run is ingested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasePolicy {
    /// Clear the base relation first so it holds exactly the latest run
    #[default]
    Replace,
    /// Keep earlier runs' rows and append
    Accumulate,
}

impl std::str::FromStr for BasePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "accumulate" => Ok(Self::Accumulate),
            other => Err(format!("unknown base policy {other:?}")),
        }
    }
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    policy: BasePolicy,
}

impl Database {
    /// Opens (creating if needed) the SQLite database at `db_url`.
    pub async fn new(db_url: &str, policy: BasePolicy) -> Result<Self> {
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database file");
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePool::connect(db_url).await?;

        info!("Database initialized successfully");
        Ok(Self { pool, policy })
    }

    /// Private in-memory database; a single connection keeps every query on the same store.
    #[cfg(test)]
    pub async fn in_memory(policy: BasePolicy) -> Result<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool, policy })
    }

    /// Ensures both relations exist. Never drops existing data.
    pub async fn ensure_schema(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        Self::create_schema(&mut conn).await
    }

    async fn create_schema(conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query(CREATE_PRODUCT_DETAILS)
            .execute(&mut *conn)
            .await?;
        sqlx::query(CREATE_PRODUCT_WISHLISTS_SERIES)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Writes `records` to `product_details` and recomputes `product_wishlists_series`.
    ///
    /// Runs in one transaction: on failure neither relation changes.
    ///
    /// # Errors
    /// * `CatalogError::SinkUnavailable` - any failure talking to the store
    pub async fn ingest(&self, records: &[ProductRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        Self::create_schema(&mut tx).await?;

        if self.policy == BasePolicy::Replace {
            let cleared = sqlx::query("DELETE FROM product_details")
                .execute(&mut *tx)
                .await?
                .rows_affected();
            info!("Cleared {} rows from product_details", cleared);
        }

        let mut inserted = 0;
        for record in records {
            inserted += Self::insert_record(&mut tx, record).await?;
        }

        let aggregated = Self::recompute_aggregate(&mut tx).await?;
        tx.commit().await?;

        info!("Inserted {} rows into product_details", inserted);
        info!("Recomputed {} rows in product_wishlists_series", aggregated);
        Ok(inserted)
    }

    async fn insert_record(conn: &mut SqliteConnection, record: &ProductRecord) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO product_details (Title, Status, Price, Wishlist, "Character", Series, Category, Manufacturer)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.title)
        .bind(&record.status)
        .bind(record.price)
        .bind(record.wishlist)
        .bind(&record.character)
        .bind(&record.series)
        .bind(&record.category)
        .bind(&record.manufacturer)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    async fn recompute_aggregate(conn: &mut SqliteConnection) -> Result<u64> {
        sqlx::query("DELETE FROM product_wishlists_series")
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query(RECOMPUTE_PRODUCT_WISHLISTS_SERIES)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// The aggregate relation, highest series average first.
    pub async fn ranked_aggregates(&self) -> Result<Vec<SeriesCharacterAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT Series, "Character", Wishlist_Total, Average_Wishlist
            FROM product_wishlists_series
            ORDER BY Average_Wishlist DESC, Wishlist_Total DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let aggregates = rows
            .into_iter()
            .map(|row| SeriesCharacterAggregate {
                series: row.get("Series"),
                character: row.get("Character"),
                wishlist_total: row.get("Wishlist_Total"),
                average_wishlist: row.get("Average_Wishlist"),
            })
            .collect();

        Ok(aggregates)
    }

    /// Rows currently in `product_details`, in insertion order.
    #[cfg(test)]
    pub async fn product_details(&self) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT Title, Status, Price, Wishlist, "Character", Series, Category, Manufacturer
            FROM product_details
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(|row| ProductRecord {
                title: row.get("Title"),
                status: row.get("Status"),
                price: row.get("Price"),
                wishlist: row.get("Wishlist"),
                character: row.get("Character"),
                series: row.get("Series"),
                category: row.get("Category"),
                manufacturer: row.get("Manufacturer"),
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    fn record(series: Option<&str>, character: Option<&str>, wishlist: Option<i64>) -> ProductRecord {
        ProductRecord {
            title: format!("{} figure", character.unwrap_or("Unknown")),
            status: "Ready Stock".to_string(),
            price: Some(100_000),
            wishlist,
            character: character.map(str::to_string),
            series: series.map(str::to_string),
            category: Some("Scale Figure".to_string()),
            manufacturer: None,
        }
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&db.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn aggregate_averages_character_totals_per_series() {
        let db = Database::in_memory(BasePolicy::Replace).await.unwrap();
        let records = vec![
            record(Some("SeriesA"), Some("Char1"), Some(10)),
            record(Some("SeriesA"), Some("Char1"), Some(5)),
            record(Some("SeriesA"), Some("Char2"), Some(20)),
            record(Some("SeriesB"), Some("Char3"), Some(1)),
        ];

        db.ingest(&records).await.unwrap();
        let ranked = db.ranked_aggregates().await.unwrap();

        let rows: Vec<_> = ranked
            .iter()
            .map(|a| {
                (
                    a.series.as_str(),
                    a.character.as_str(),
                    a.wishlist_total,
                    a.average_wishlist,
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                ("SeriesA", "Char2", Some(20), Some(17.5)),
                ("SeriesA", "Char1", Some(15), Some(17.5)),
                ("SeriesB", "Char3", Some(1), Some(1.0)),
            ]
        );
    }

    #[tokio::test]
    async fn rows_without_series_or_character_are_stored_but_not_grouped() {
        let db = Database::in_memory(BasePolicy::Replace).await.unwrap();
        let records = vec![
            record(Some("SeriesA"), Some("Char1"), Some(3)),
            record(None, Some("Char1"), Some(100)),
            record(Some("SeriesA"), None, Some(100)),
        ];

        db.ingest(&records).await.unwrap();

        assert_eq!(count(&db, "product_details").await, 3);
        let ranked = db.ranked_aggregates().await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].wishlist_total, Some(3));
    }

    #[tokio::test]
    async fn absent_fields_are_stored_as_null() {
        let db = Database::in_memory(BasePolicy::Replace).await.unwrap();
        let mut sparse = record(None, None, None);
        sparse.price = None;
        sparse.category = None;

        db.ingest(std::slice::from_ref(&sparse)).await.unwrap();

        let nulls: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM product_details
               WHERE Price IS NULL AND Wishlist IS NULL AND "Character" IS NULL
                 AND Series IS NULL AND Category IS NULL AND Manufacturer IS NULL"#,
        )
        .fetch_one(&db.pool)
        .await
        .unwrap();
        assert_eq!(nulls, 1);
        assert_eq!(db.product_details().await.unwrap(), vec![sparse]);
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let db = Database::in_memory(BasePolicy::Accumulate).await.unwrap();
        db.ingest(&[record(Some("SeriesA"), Some("Char1"), Some(4))])
            .await
            .unwrap();

        db.ensure_schema().await.unwrap();
        db.ensure_schema().await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('product_details', 'product_wishlists_series')",
        )
        .fetch_one(&db.pool)
        .await
        .unwrap();
        assert_eq!(tables, 2);
        assert_eq!(count(&db, "product_details").await, 1);
        assert_eq!(count(&db, "product_wishlists_series").await, 1);
    }

    #[tokio::test]
    async fn replace_policy_keeps_only_latest_run() {
        let db = Database::in_memory(BasePolicy::Replace).await.unwrap();
        let run = vec![record(Some("SeriesA"), Some("Char1"), Some(4))];

        db.ingest(&run).await.unwrap();
        db.ingest(&run).await.unwrap();

        assert_eq!(count(&db, "product_details").await, 1);
        let ranked = db.ranked_aggregates().await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].wishlist_total, Some(4));
    }

    #[tokio::test]
    async fn accumulate_policy_appends_and_aggregate_is_recomputed() {
        let db = Database::in_memory(BasePolicy::Accumulate).await.unwrap();
        let run = vec![record(Some("SeriesA"), Some("Char1"), Some(4))];

        db.ingest(&run).await.unwrap();
        db.ingest(&run).await.unwrap();

        assert_eq!(count(&db, "product_details").await, 2);
        let ranked = db.ranked_aggregates().await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].wishlist_total, Some(8));
    }

    #[tokio::test]
    async fn closed_store_reports_sink_unavailable() {
        let db = Database::in_memory(BasePolicy::Replace).await.unwrap();
        db.pool.close().await;

        let err = db
            .ingest(&[record(Some("SeriesA"), Some("Char1"), Some(1))])
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::SinkUnavailable(_)));
    }

    #[tokio::test]
    async fn failed_ingest_leaves_previous_run_intact() {
        let db = Database::in_memory(BasePolicy::Replace).await.unwrap();
        let previous = vec![record(Some("SeriesA"), Some("Char1"), Some(4))];
        db.ingest(&previous).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_unknown BEFORE INSERT ON product_details \
             WHEN NEW.Title = 'Unknown figure' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        let err = db
            .ingest(&[
                record(Some("SeriesB"), Some("Char2"), Some(9)),
                record(None, None, Some(1)),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::SinkUnavailable(_)));
        assert_eq!(db.product_details().await.unwrap(), previous);
        let ranked = db.ranked_aggregates().await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].series, "SeriesA");
    }

    #[test]
    fn base_policy_parses_case_insensitively() {
        assert_eq!("Replace".parse::<BasePolicy>(), Ok(BasePolicy::Replace));
        assert_eq!(" accumulate ".parse::<BasePolicy>(), Ok(BasePolicy::Accumulate));
        assert!("truncate".parse::<BasePolicy>().is_err());
    }
}
