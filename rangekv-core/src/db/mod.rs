use crate::config::Config;
use crate::memtable::Memtable;
use crate::{Error, KeyValue, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// An in memory store made of named, ordered tables.
///
/// Cloning is cheap and every clone shares the same tables.
#[derive(Clone)]
pub struct RangeDB {
    config: Config,
    inner: Arc<DBInner>,
}

pub(crate) struct DBInner {
    // table name -> table, a table is created by its first write
    tables: RwLock<HashMap<String, Memtable>>,
}

impl RangeDB {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            inner: Arc::new(DBInner {
                tables: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn open(config_path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::new(config_path)?;
        info!("RangeDB load config: {config:?}");
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get(&self, table: &str, key: &[u8]) -> Option<Vec<u8>> {
        let tables = self.inner.tables.read().unwrap();
        tables
            .get(table)
            .and_then(|mt| mt.get(key))
            .map(|val| val.to_vec())
    }

    pub fn put(&self, table: &str, key: &[u8], val: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::Config("key cannot be empty".to_owned()));
        }
        let mut tables = self.inner.tables.write().unwrap();
        if !tables.contains_key(table) {
            debug!("create table {table}");
        }
        tables.entry(table.to_owned()).or_default().put(key, val);
        Ok(())
    }

    pub fn del(&self, table: &str, key: &[u8]) -> Result<()> {
        let mut tables = self.inner.tables.write().unwrap();
        if let Some(mt) = tables.get_mut(table) {
            mt.del(key);
        }
        Ok(())
    }

    /// List at most `count` pairs of `table`.
    ///
    /// A `count` above [`Config::max_list_count`] is rejected rather than
    /// truncated: a short answer would read as the end of range to callers.
    pub fn list(
        &self,
        table: &str,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<KeyValue>> {
        self.check_list_count(count)?;
        let tables = self.inner.tables.read().unwrap();
        let mt = tables
            .get(table)
            .ok_or_else(|| Error::NotFound(format!("table {table}")))?;
        Ok(mt.list(start_key, end_key, prefix, count, skip))
    }

    /// List at most `count` keys of `table`, same limits as [`RangeDB::list`].
    pub fn list_keys(
        &self,
        table: &str,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Vec<u8>>> {
        self.check_list_count(count)?;
        let tables = self.inner.tables.read().unwrap();
        let mt = tables
            .get(table)
            .ok_or_else(|| Error::NotFound(format!("table {table}")))?;
        Ok(mt.list_keys(start_key, end_key, prefix, count, skip))
    }

    fn check_list_count(&self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::Config("list count must be positive".to_owned()));
        }
        if count > self.config.max_list_count() {
            return Err(Error::Exceed(format!(
                "list count {count} above limit {}",
                self.config.max_list_count()
            )));
        }
        Ok(())
    }

    pub fn count(
        &self,
        table: &str,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
    ) -> Result<usize> {
        let tables = self.inner.tables.read().unwrap();
        let mt = tables
            .get(table)
            .ok_or_else(|| Error::NotFound(format!("table {table}")))?;
        Ok(mt.count(start_key, end_key, prefix))
    }

    pub fn table_names(&self) -> Vec<String> {
        let tables = self.inner.tables.read().unwrap();
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn db_with_cap(max_list_count: usize) -> RangeDB {
        let json = format!(r#"{{"max_list_count": {max_list_count}}}"#);
        RangeDB::new(Config::from_slice(json.as_bytes()).unwrap())
    }

    #[test]
    fn tables_are_isolated() {
        let db = db_with_cap(100);
        db.put("users", b"a", b"1").unwrap();
        db.put("items", b"a", b"2").unwrap();
        assert_eq!(db.get("users", b"a"), Some(b"1".to_vec()));
        assert_eq!(db.get("items", b"a"), Some(b"2".to_vec()));
        assert_eq!(db.get("nobody", b"a"), None);
        assert_eq!(db.table_names(), ["items", "users"]);

        db.del("users", b"a").unwrap();
        assert_eq!(db.get("users", b"a"), None);
        assert_eq!(db.get("items", b"a"), Some(b"2".to_vec()));
        // deleting from an unknown table is fine
        db.del("nobody", b"a").unwrap();
        assert!(db.put("users", b"", b"1").is_err());
    }

    #[test]
    fn list_limited_by_config() {
        let db = db_with_cap(3);
        for i in 0..10 {
            db.put("t", format!("k{i}").as_bytes(), b"v").unwrap();
        }
        assert!(matches!(
            db.list("t", b"", b"", b"", 100, false),
            Err(Error::Exceed(_))
        ));
        assert_eq!(db.list("t", b"", b"", b"", 3, false).unwrap().len(), 3);
        assert_eq!(db.list("t", b"", b"", b"", 2, false).unwrap().len(), 2);
        assert_eq!(
            db.list_keys("t", b"k1", b"", b"", 3, true).unwrap(),
            [b"k2".to_vec(), b"k3".to_vec(), b"k4".to_vec()]
        );
        assert!(matches!(
            db.list_keys("t", b"", b"", b"", 4, false),
            Err(Error::Exceed(_))
        ));
        assert_eq!(db.count("t", b"", b"", b"").unwrap(), 10);
        assert_eq!(db.count("t", b"k5", b"", b"").unwrap(), 5);
        assert!(matches!(
            db.list("t", b"", b"", b"", 0, false),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn list_unknown_table() {
        let db = db_with_cap(3);
        assert!(matches!(
            db.list("t", b"", b"", b"", 1, false),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            db.list_keys("t", b"", b"", b"", 1, false),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(db.count("t", b"", b"", b""), Err(Error::NotFound(_))));
    }
}
