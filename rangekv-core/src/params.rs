use crate::backend::ListRequest;
use crate::{Error, Result};

/// Default number of pairs requested from backend per fetch.
pub const DEFAULT_GRANULARITY: usize = 100;

/// What a [`crate::KeyValueIterator`] does when a refill fetch fails.
///
/// The initial fetch always reports its error to the caller, this only
/// concerns the fetches issued while iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefillErrorPolicy {
    /// End the iteration and yield the error once through `Iterator::next`.
    #[default]
    Surface,
    /// End the iteration as if the range was exhausted.
    Swallow,
}

/// Parameters of a range iteration, built by chaining:
///
/// ```
/// use rangekv_core::RangeParams;
///
/// let params = RangeParams::new()
///     .prefix("user:")
///     .start_key("user:100")
///     .end_key("user:200")
///     .granularity(50)
///     .unwrap();
/// assert_eq!(params.get_granularity(), 50);
/// ```
///
/// By default every key is covered (empty start/end/prefix), there is no
/// limit on the number of pairs and pairs are fetched in batches of
/// [`DEFAULT_GRANULARITY`].
#[derive(Debug, Clone)]
pub struct RangeParams {
    pub(crate) prefix: Vec<u8>,
    pub(crate) start_key: Vec<u8>,
    pub(crate) end_key: Vec<u8>,
    pub(crate) count: Option<usize>,
    pub(crate) granularity: usize,
    pub(crate) refill_errors: RefillErrorPolicy,
}

impl Default for RangeParams {
    fn default() -> Self {
        Self {
            prefix: vec![],
            start_key: vec![],
            end_key: vec![],
            count: None,
            granularity: DEFAULT_GRANULARITY,
            refill_errors: RefillErrorPolicy::default(),
        }
    }
}

impl RangeParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keys starting with `prefix` are returned.
    pub fn prefix(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Iteration starts at `start_key`, or the first key greater than it.
    pub fn start_key(mut self, start_key: impl Into<Vec<u8>>) -> Self {
        self.start_key = start_key.into();
        self
    }

    /// Iteration stops before `end_key`.
    pub fn end_key(mut self, end_key: impl Into<Vec<u8>>) -> Self {
        self.end_key = end_key.into();
        self
    }

    /// Iteration stops after `count` pairs.
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Pairs are fetched in batches of `granularity`, which must be positive.
    pub fn granularity(mut self, granularity: usize) -> Result<Self> {
        if granularity == 0 {
            return Err(Error::Config("granularity must be positive".to_owned()));
        }
        self.granularity = granularity;
        Ok(self)
    }

    pub fn refill_errors(mut self, policy: RefillErrorPolicy) -> Self {
        self.refill_errors = policy;
        self
    }

    #[inline]
    pub fn get_granularity(&self) -> usize {
        self.granularity
    }

    #[inline]
    pub fn get_count(&self) -> Option<usize> {
        self.count
    }

    /// The first list request of an iteration over these parameters.
    pub fn to_request(&self) -> ListRequest {
        ListRequest {
            start_key: self.start_key.clone(),
            end_key: self.end_key.clone(),
            prefix: self.prefix.clone(),
            count: self.granularity,
            skip: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn params_default() {
        let params = RangeParams::new();
        assert!(params.prefix.is_empty());
        assert!(params.start_key.is_empty());
        assert!(params.end_key.is_empty());
        assert_eq!(params.get_count(), None);
        assert_eq!(params.get_granularity(), 100);
        assert_eq!(params.refill_errors, RefillErrorPolicy::Surface);
    }

    #[test]
    fn params_to_request() {
        let params = RangeParams::new()
            .prefix("user:")
            .start_key("user:1")
            .end_key("user:9")
            .count(5)
            .granularity(20)
            .unwrap();
        assert_eq!(
            params.to_request(),
            ListRequest {
                start_key: b"user:1".to_vec(),
                end_key: b"user:9".to_vec(),
                prefix: b"user:".to_vec(),
                count: 20,
                skip: false,
            }
        );
    }

    #[test]
    fn params_zero_granularity() {
        assert!(matches!(
            RangeParams::new().granularity(0),
            Err(Error::Config(_))
        ));
    }
}
