use crate::backend::RangeEntry;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single entry returned by a list request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Result of one fetch from a [`crate::ListBackend`].
///
/// A batch is built once from the fetched entries and never mutated
/// afterwards, the iterator replaces it wholesale on every refill.
#[derive(Debug)]
pub(crate) struct Batch<E> {
    entries: Vec<E>,
}

impl<E> Default for Batch<E> {
    fn default() -> Self {
        Self { entries: vec![] }
    }
}

impl<E: RangeEntry> Batch<E> {
    /// Check the entries returned by backend before accepting them:
    /// - no more than `limit` entries
    /// - keys strictly ascending
    pub fn new(entries: Vec<E>, limit: usize) -> Result<Self> {
        if entries.len() > limit {
            return Err(Error::Exceed(format!(
                "backend returned {} entries while {limit} were requested",
                entries.len()
            )));
        }
        if entries.windows(2).any(|w| w[0].key() >= w[1].key()) {
            return Err(Error::KeyOrder);
        }
        Ok(Self { entries })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn entry_at(&self, idx: usize) -> &E {
        &self.entries[idx]
    }

    pub fn last_key(&self) -> Option<&[u8]> {
        self.entries.last().map(|e| e.key())
    }
}
