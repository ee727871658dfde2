use crate::backend::{ListBackend, RangeEntry};
use crate::batch::Batch;
use crate::params::{RangeParams, RefillErrorPolicy};
use crate::{Error, KeyValue, Result};
use log::{debug, warn};
use std::iter::FusedIterator;

enum State {
    /// the batch may still hold entries or be refilled
    Ready,
    /// terminal: the whole range was consumed
    Exhausted,
    /// terminal: a refill fetch failed
    Failed { error: Error, reported: bool },
}

/// Iterates the key-value pairs of a range.
pub type KeyValueIterator<B> = RangeIterator<B, KeyValue>;

/// Iterates the keys of a range, values are never transferred.
pub type KeyIterator<B> = RangeIterator<B, Vec<u8>>;

/// A forward-only, single-pass iterator over the entries of a key range,
/// fetched from a [`ListBackend`] in batches of `granularity` entries.
///
/// Construction performs the first fetch and fails if that fetch fails.
/// Later fetches happen inside [`RangeIterator::has_next`] (and so inside
/// `Iterator::next`) when the current batch is drained and was full: the last
/// key of the batch becomes the new start key and is skipped by the backend.
/// A batch shorter than `granularity` proves the range is over and no further
/// fetch is issued.
///
/// Note that `has_next` is not a pure query, it may block on a fetch.
///
/// The iterator cannot be restarted or rewound, and the sequence is
/// read-only. All methods take `&mut self`; one instance must not be driven
/// by several callers at once without external serialization.
pub struct RangeIterator<B: ListBackend, E: RangeEntry> {
    backend: B,
    params: RangeParams,
    batch: Batch<E>,
    pos: usize,
    // entries handed out so far, checked against `params.count`
    yielded: usize,
    fetches: usize,
    state: State,
}

impl<B: ListBackend, E: RangeEntry> RangeIterator<B, E> {
    pub fn new(backend: B, params: RangeParams) -> Result<Self> {
        let mut this = Self {
            backend,
            params,
            batch: Batch::default(),
            pos: 0,
            yielded: 0,
            fetches: 0,
            state: State::Ready,
        };
        this.batch = this.fetch(false)?;
        if this.batch.size() == 0 {
            this.state = State::Exhausted;
        }
        Ok(this)
    }

    /// Iterate `[start_key, end_key)` restricted to `prefix` with default
    /// parameters. Empty slices leave the corresponding side unbounded.
    pub fn with_range(
        backend: B,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
    ) -> Result<Self> {
        let params = RangeParams::new()
            .start_key(start_key)
            .end_key(end_key)
            .prefix(prefix);
        Self::new(backend, params)
    }

    /// Whether another entry is available. May refill the batch from backend.
    ///
    /// Calling it repeatedly without consuming an entry never fetches twice.
    /// A failed refill makes it return false; the error stays available
    /// through [`RangeIterator::error`].
    pub fn has_next(&mut self) -> bool {
        self.ensure_buffered_or_advance()
    }

    /// Take the entry under the cursor. Never fetches: returns `None` once the
    /// current batch is drained, so call [`RangeIterator::has_next`] first.
    pub fn next_entry(&mut self) -> Option<E> {
        if !matches!(self.state, State::Ready) || self.limit_reached() {
            return None;
        }
        if self.pos >= self.batch.size() {
            return None;
        }
        let entry = self.batch.entry_at(self.pos).clone();
        self.pos += 1;
        self.yielded += 1;
        Some(entry)
    }

    /// The error which ended the iteration, if a refill failed.
    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            State::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Number of fetches issued to backend so far, the initial one included.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    fn limit_reached(&self) -> bool {
        matches!(self.params.count, Some(limit) if self.yielded >= limit)
    }

    fn ensure_buffered_or_advance(&mut self) -> bool {
        if !matches!(self.state, State::Ready) {
            return false;
        }
        if self.limit_reached() {
            debug!("iterator reach count limit after {} entries", self.yielded);
            self.state = State::Exhausted;
            return false;
        }
        if self.pos < self.batch.size() {
            return true;
        }
        // a partial batch means backend has nothing after it
        if self.batch.size() < self.params.granularity {
            self.state = State::Exhausted;
            return false;
        }

        let pivot = match self.batch.last_key() {
            Some(key) => key.to_vec(),
            None => {
                self.state = State::Exhausted;
                return false;
            }
        };
        debug!("refill iterator batch after pivot {:?}", pivot);
        self.params.start_key = pivot;
        match self.fetch(true) {
            Ok(batch) => {
                self.batch = batch;
                self.pos = 0;
                if self.batch.size() == 0 {
                    self.state = State::Exhausted;
                    return false;
                }
                true
            }
            Err(e) => {
                warn!(
                    "refill after {:?} failed, end iteration: {e}",
                    self.params.start_key
                );
                self.state = State::Failed {
                    error: e,
                    reported: false,
                };
                false
            }
        }
    }

    fn fetch(&mut self, skip: bool) -> Result<Batch<E>> {
        self.fetches += 1;
        let params = &self.params;
        let entries = E::list(
            &self.backend,
            &params.start_key,
            &params.end_key,
            &params.prefix,
            params.granularity,
            skip,
        )?;
        let batch = Batch::new(entries, params.granularity)?;
        // the pivot was handed out already, backend must not return it again
        if skip && batch.size() > 0 && batch.entry_at(0).key() <= params.start_key.as_slice() {
            return Err(Error::KeyOrder);
        }
        Ok(batch)
    }
}

impl<B: ListBackend, E: RangeEntry> Iterator for RangeIterator<B, E> {
    type Item = Result<E>;

    /// Under [`RefillErrorPolicy::Surface`] a failed refill is yielded once as
    /// `Some(Err(_))` before the iterator ends.
    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            return self.next_entry().map(Ok);
        }
        let policy = self.params.refill_errors;
        match &mut self.state {
            State::Failed { error, reported }
                if !*reported && policy == RefillErrorPolicy::Surface =>
            {
                *reported = true;
                Some(Err(error.clone()))
            }
            _ => None,
        }
    }
}

impl<B: ListBackend, E: RangeEntry> FusedIterator for RangeIterator<B, E> {}
