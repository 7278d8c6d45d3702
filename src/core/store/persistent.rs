use std::path::Path;

use chrono::Duration;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::info;

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{CacheEntry, HistoryEntry};

use super::{sort_newest_first, Storage, DATABASE_FILE};

/// Key: cache key, Value: serialized CacheEntry
const CACHE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("translation_cache");

/// Key: entry id, Value: serialized HistoryEntry
const HISTORY_TABLE: TableDefinition<&str, &str> = TableDefinition::new("translation_history");

/// redb-backed storage.
pub struct RedbStorage {
    db: Database,
    ttl: Duration,
}

impl RedbStorage {
    /// Open (or create) `lingo_bridge.redb` inside `data_dir`.
    pub fn open_in(data_dir: &Path, ttl: Duration) -> AppResult<Self> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| AppError::Persistence(format!("Failed to create data directory: {}", e)))?;
        Self::open(&data_dir.join(DATABASE_FILE), ttl)
    }

    pub fn open(path: &Path, ttl: Duration) -> AppResult<Self> {
        let db = Database::create(path)?;

        // Make sure both tables exist so read transactions can open them
        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(CACHE_TABLE)?;
            write_txn.open_table(HISTORY_TABLE)?;
        }
        write_txn.commit()?;

        info!(path = %path.display(), "Opened translation database");
        Ok(Self { db, ttl })
    }

    fn read_value(&self, table: TableDefinition<&str, &str>, key: &str) -> AppResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        let value = table.get(key)?.map(|v| v.value().to_string());
        Ok(value)
    }

    fn read_all(&self, table: TableDefinition<&str, &str>) -> AppResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;

        let mut values = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            values.push(value.value().to_string());
        }
        Ok(values)
    }

    fn write_value(&self, table: TableDefinition<&str, &str>, key: &str, value: &str) -> AppResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(table)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, table: TableDefinition<&str, &str>, key: &str) -> AppResult<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(table)?;
            let removed = table.remove(key)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    fn clear(&self, table: TableDefinition<&str, &str>) -> AppResult<usize> {
        let write_txn = self.db.begin_write()?;
        let count = {
            let mut table = write_txn.open_table(table)?;

            // No drain in redb: collect the keys, then remove them
            let mut keys = Vec::new();
            for entry in table.iter()? {
                let (key, _) = entry?;
                keys.push(key.value().to_string());
            }
            for key in &keys {
                table.remove(key.as_str())?;
            }
            keys.len()
        };
        write_txn.commit()?;
        Ok(count)
    }

    pub fn history_len(&self) -> AppResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(HISTORY_TABLE)?;
        Ok(table.len()?)
    }
}

impl Storage for RedbStorage {
    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn get_entry(&self, key: &str) -> AppResult<Option<CacheEntry>> {
        self.read_value(CACHE_TABLE, key)?
            .map(|raw| serde_json::from_str(&raw).map_err(AppError::from))
            .transpose()
    }

    fn put_entry(&self, entry: &CacheEntry) -> AppResult<()> {
        let serialized = serde_json::to_string(entry)?;
        self.write_value(CACHE_TABLE, &entry.key, &serialized)
    }

    fn delete_cached(&self, key: &str) -> AppResult<bool> {
        self.remove(CACHE_TABLE, key)
    }

    fn cache_entries(&self) -> AppResult<Vec<CacheEntry>> {
        self.read_all(CACHE_TABLE)?
            .iter()
            .map(|raw| serde_json::from_str(raw).map_err(AppError::from))
            .collect()
    }

    fn clear_cache(&self) -> AppResult<usize> {
        self.clear(CACHE_TABLE)
    }

    fn append_history(&self, entry: &HistoryEntry) -> AppResult<()> {
        let serialized = serde_json::to_string(entry)?;
        self.write_value(HISTORY_TABLE, &entry.id, &serialized)
    }

    fn list_history(&self, limit: usize) -> AppResult<Vec<HistoryEntry>> {
        let mut entries = self
            .read_all(HISTORY_TABLE)?
            .iter()
            .map(|raw| serde_json::from_str(raw).map_err(AppError::from))
            .collect::<AppResult<Vec<HistoryEntry>>>()?;
        sort_newest_first(&mut entries);
        entries.truncate(limit);
        Ok(entries)
    }

    fn get_history(&self, id: &str) -> AppResult<Option<HistoryEntry>> {
        self.read_value(HISTORY_TABLE, id)?
            .map(|raw| serde_json::from_str(&raw).map_err(AppError::from))
            .transpose()
    }

    fn delete_history(&self, id: &str) -> AppResult<bool> {
        self.remove(HISTORY_TABLE, id)
    }

    fn clear_history(&self) -> AppResult<usize> {
        self.clear(HISTORY_TABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::test_support;
    use chrono::Utc;

    #[test]
    fn shared_storage_contract() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RedbStorage::open_in(dir.path(), Duration::days(7)).unwrap();
        test_support::exercise(&storage);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = RedbStorage::open_in(dir.path(), Duration::days(7)).unwrap();
            storage
                .put_cached("translate:en:fr:hello", test_support::snapshot("bonjour"))
                .unwrap();
            storage
                .append_history(&test_support::history("1", Utc::now()))
                .unwrap();
        }

        let storage = RedbStorage::open_in(dir.path(), Duration::days(7)).unwrap();
        assert_eq!(
            storage.get_cached("translate:en:fr:hello").unwrap(),
            Some(test_support::snapshot("bonjour"))
        );
        assert_eq!(storage.history_len().unwrap(), 1);
    }

    #[test]
    fn corrupt_rows_surface_as_persistence_errors() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RedbStorage::open_in(dir.path(), Duration::days(7)).unwrap();
        storage.write_value(CACHE_TABLE, "broken", "{not json").unwrap();

        assert!(matches!(
            storage.get_cached("broken"),
            Err(AppError::Persistence(_))
        ));
    }
}
