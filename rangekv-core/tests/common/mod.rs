use rangekv_core::{KeyValue, ListBackend, RangeDB, Result};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A table of `RangeDB` seen as a list backend
pub struct DbTable<'a> {
    pub db: &'a RangeDB,
    pub table: &'a str,
}

impl<'a> ListBackend for DbTable<'a> {
    fn list_key_values(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<KeyValue>> {
        self.db.list(self.table, start_key, end_key, prefix, count, skip)
    }

    fn list_keys(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Vec<u8>>> {
        self.db.list_keys(self.table, start_key, end_key, prefix, count, skip)
    }
}

pub fn put(db: &RangeDB, table: &str, key: impl AsRef<str>, value: i32) -> Result<()> {
    db.put(table, key.as_ref().as_bytes(), &value.to_le_bytes())
}

pub fn decode(kv: &KeyValue) -> (String, i32) {
    (
        String::from_utf8(kv.key.clone()).unwrap(),
        i32::from_le_bytes(kv.value.clone().try_into().unwrap()),
    )
}
