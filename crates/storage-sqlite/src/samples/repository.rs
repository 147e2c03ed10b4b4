use std::sync::Arc;

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Double, Text};
use diesel::sqlite::SqliteConnection;
use tracing::{debug, info};

use pricewatch_core::samples::{PriceSample, SampleStore};
use pricewatch_core::Result;

use super::model::{CountRow, SampleRowDB, SampleTable};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};

/// SQLite-backed [`SampleStore`].
///
/// Writes go through the single writer actor; reads use pooled connections.
pub struct SqliteSampleStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    table: SampleTable,
}

impl SqliteSampleStore {
    /// Opens the store, creating the samples table and its index if missing.
    pub async fn open(pool: Arc<DbPool>, writer: WriteHandle, table: SampleTable) -> Result<Self> {
        let store = Self {
            pool,
            writer,
            table,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    async fn ensure_schema(&self) -> Result<()> {
        let table = self.table.clone();
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY NOT NULL,
                symbol TEXT NOT NULL,
                price REAL NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_symbol_timestamp ON {table} (symbol, timestamp);"
        );

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                conn.batch_execute(&ddl).map_err(StorageError::from)?;
                Ok(())
            })
            .await?;

        info!(table = %self.table, "Samples table ready");
        Ok(())
    }

    /// Most recent samples for `symbol`, newest first.
    pub fn recent_samples(&self, symbol: &str, limit: usize) -> Result<Vec<PriceSample>> {
        let mut conn = get_connection(&self.pool)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<SampleRowDB> = sql_query(format!(
            "SELECT id, symbol, price, timestamp FROM {} \
             WHERE symbol = ? ORDER BY timestamp DESC, rowid DESC LIMIT ?",
            self.table
        ))
        .bind::<Text, _>(symbol)
        .bind::<BigInt, _>(limit)
        .load(&mut conn)
        .into_core()?;

        rows.into_iter()
            .map(|row| PriceSample::try_from(row).map_err(Into::into))
            .collect()
    }

    /// Number of stored samples across all instruments.
    pub fn count_samples(&self) -> Result<u64> {
        let mut conn = get_connection(&self.pool)?;
        let row: CountRow = sql_query(format!("SELECT COUNT(*) AS count FROM {}", self.table))
            .get_result(&mut conn)
            .into_core()?;
        Ok(u64::try_from(row.count).unwrap_or_default())
    }
}

#[async_trait]
impl SampleStore for SqliteSampleStore {
    async fn insert_sample(&self, sample: &PriceSample) -> Result<()> {
        let row = SampleRowDB::from_sample(sample)?;
        let insert = format!(
            "INSERT INTO {} (id, symbol, price, timestamp) VALUES (?, ?, ?, ?)",
            self.table
        );

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                sql_query(insert)
                    .bind::<Text, _>(row.id)
                    .bind::<Text, _>(row.symbol)
                    .bind::<Double, _>(row.price)
                    .bind::<Text, _>(row.timestamp)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;

        debug!(symbol = %sample.symbol, price = %sample.price, "Sample persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, spawn_writer};
    use chrono::{Duration, TimeZone, Utc};
    use pricewatch_core::errors::{DatabaseError, Error};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    async fn open_store(dir: &TempDir, table: &str) -> SqliteSampleStore {
        let db_path = init(dir.path().join("db").join("pricewatch.db").to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        let writer = spawn_writer((*pool).clone());
        SqliteSampleStore::open(pool, writer, SampleTable::new(table).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir, "symbols").await;
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        for (minutes, price) in [(0, dec!(2300.5)), (5, dec!(2301)), (10, dec!(2302.1))] {
            let sample = PriceSample::new("ETHUSDT", price, start + Duration::minutes(minutes));
            store.insert_sample(&sample).await.unwrap();
        }
        store
            .insert_sample(&PriceSample::new("SOLUSDT", dec!(101.25), start))
            .await
            .unwrap();

        assert_eq!(store.count_samples().unwrap(), 4);

        let recent = store.recent_samples("ETHUSDT", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].price, dec!(2302.1));
        assert_eq!(recent[0].observed_at, start + Duration::minutes(10));
        assert_eq!(recent[1].price, dec!(2301));

        assert!(store.recent_samples("BTCUSDT", 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reopening_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open_store(&dir, "samples_v2").await;
            store
                .insert_sample(&PriceSample::new("ETHUSDT", dec!(1), Utc::now()))
                .await
                .unwrap();
        }

        let store = open_store(&dir, "samples_v2").await;
        assert_eq!(store.table().as_str(), "samples_v2");
        assert_eq!(store.count_samples().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_are_all_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open_store(&dir, "symbols").await);

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let sample = PriceSample::new(format!("SYM{i}USDT"), dec!(1.5), Utc::now());
                store.insert_sample(&sample).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count_samples().unwrap(), 20);
    }

    #[test]
    fn test_invalid_table_name_never_reaches_sql() {
        let err = SampleTable::new("symbols; DROP TABLE symbols").unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::InvalidTable(_))));
    }
}
