use log::trace;

use crate::backend::ListBackend;
use crate::misc::{key_in_range, scan_lower_bound};
use crate::{KeyValue, Result};
use std::collections::BTreeMap;
use std::ops::Bound::{Included, Unbounded};

/// this is an in memory representaion of a table
#[derive(Default, Clone)]
pub struct Memtable {
    table: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Memtable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.table.get(key).map(|v| v.as_slice())
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.table.insert(key.to_vec(), value.to_vec());
    }

    /// Returns whether the key was present
    pub fn del(&mut self, key: &[u8]) -> bool {
        self.table.remove(key).is_some()
    }

    /// Iterate pairs in `[start_key, end_key)` beginning with `prefix`,
    /// in ascending order of key.
    ///
    /// Keys sharing a prefix are contiguous, so the scan seeks to
    /// `max(start_key, prefix)` and stops at the first key that falls out
    /// of the range or the prefix.
    fn scan<'a>(
        &'a self,
        start_key: &'a [u8],
        end_key: &'a [u8],
        prefix: &'a [u8],
    ) -> impl std::iter::Iterator<Item = (&'a Vec<u8>, &'a Vec<u8>)> + 'a {
        let lower = scan_lower_bound(start_key, prefix);
        self.table
            .range::<[u8], _>((Included(lower), Unbounded))
            .take_while(move |(k, _)| key_in_range(k, start_key, end_key, prefix))
    }

    // `scan` minus the start key itself when `skip`, at most `count` entries
    fn scan_after<'a>(
        &'a self,
        start_key: &'a [u8],
        end_key: &'a [u8],
        prefix: &'a [u8],
        count: usize,
        skip: bool,
    ) -> impl std::iter::Iterator<Item = (&'a Vec<u8>, &'a Vec<u8>)> + 'a {
        self.scan(start_key, end_key, prefix)
            .filter(move |(k, _)| !(skip && k.as_slice() == start_key))
            .take(count)
    }

    /// List at most `count` pairs, see [`ListBackend`] for the meaning of
    /// each argument.
    pub fn list(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Vec<KeyValue> {
        let res: Vec<KeyValue> = self
            .scan_after(start_key, end_key, prefix, count, skip)
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect();
        trace!(
            "memtable list start={:?} end={:?} prefix={:?} count={count} skip={skip} => {} pairs",
            start_key,
            end_key,
            prefix,
            res.len()
        );
        res
    }

    /// Like [`Memtable::list`], keys only.
    pub fn list_keys(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Vec<Vec<u8>> {
        self.scan_after(start_key, end_key, prefix, count, skip)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Number of pairs in `[start_key, end_key)` beginning with `prefix`
    pub fn count(&self, start_key: &[u8], end_key: &[u8], prefix: &[u8]) -> usize {
        self.scan(start_key, end_key, prefix).count()
    }
}

impl ListBackend for Memtable {
    fn list_key_values(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<KeyValue>> {
        Ok(self.list(start_key, end_key, prefix, count, skip))
    }

    fn list_keys(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Vec<u8>>> {
        Ok(Memtable::list_keys(self, start_key, end_key, prefix, count, skip))
    }
}
