use crate::{KeyValue, Result};
use serde::{Deserialize, Serialize};

/// Wire form of a list (or count) call, the table travels separately.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub start_key: Vec<u8>,
    pub end_key: Vec<u8>,
    pub prefix: Vec<u8>,
    // ignored by count
    pub count: usize,
    pub skip: bool,
}

/// Anything that can list key-value pairs of an ordered key space.
///
/// Implementors must return pairs ascending by key, all within
/// `[start_key, end_key)` and beginning with `prefix`, and at most `count`
/// of them. An empty `start_key` or `end_key` means unbounded on that side.
///
/// When `skip` is true the pair whose key equals `start_key` must be left
/// out: the caller already got it from the previous batch.
pub trait ListBackend {
    fn list_key_values(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<KeyValue>>;

    /// Same as [`ListBackend::list_key_values`] without the values.
    ///
    /// The default implementation lists the pairs and drops the values,
    /// remote backends override it to avoid transferring them.
    fn list_keys(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Vec<u8>>> {
        let pairs = self.list_key_values(start_key, end_key, prefix, count, skip)?;
        Ok(pairs.into_iter().map(|kv| kv.key).collect())
    }
}

impl<B: ListBackend + ?Sized> ListBackend for &B {
    fn list_key_values(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<KeyValue>> {
        (**self).list_key_values(start_key, end_key, prefix, count, skip)
    }

    fn list_keys(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Vec<u8>>> {
        (**self).list_keys(start_key, end_key, prefix, count, skip)
    }
}

impl<B: ListBackend + ?Sized> ListBackend for Box<B> {
    fn list_key_values(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<KeyValue>> {
        (**self).list_key_values(start_key, end_key, prefix, count, skip)
    }

    fn list_keys(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Vec<u8>>> {
        (**self).list_keys(start_key, end_key, prefix, count, skip)
    }
}

/// An item yielded by a range iterator: a key-value pair, or a bare key.
///
/// Ties an item type to the backend call listing it, so the same iterator
/// drives both kinds of listing.
pub trait RangeEntry: Clone {
    fn key(&self) -> &[u8];

    fn list<B: ListBackend>(
        backend: &B,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Self>>;
}

impl RangeEntry for KeyValue {
    #[inline]
    fn key(&self) -> &[u8] {
        &self.key
    }

    fn list<B: ListBackend>(
        backend: &B,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Self>> {
        backend.list_key_values(start_key, end_key, prefix, count, skip)
    }
}

impl RangeEntry for Vec<u8> {
    #[inline]
    fn key(&self) -> &[u8] {
        self
    }

    fn list<B: ListBackend>(
        backend: &B,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Self>> {
        backend.list_keys(start_key, end_key, prefix, count, skip)
    }
}
