/// Whether `key` lies in `[start_key, end_key)` and begins with `prefix`.
///
/// Empty `start_key` / `end_key` leave that side unbounded.
pub fn key_in_range(key: &[u8], start_key: &[u8], end_key: &[u8], prefix: &[u8]) -> bool {
    if key < start_key {
        return false;
    }
    if !end_key.is_empty() && key >= end_key {
        return false;
    }
    key.starts_with(prefix)
}

/// The smallest key a scan over (`start_key`, `prefix`) needs to look at.
pub(crate) fn scan_lower_bound<'a>(start_key: &'a [u8], prefix: &'a [u8]) -> &'a [u8] {
    if prefix > start_key {
        prefix
    } else {
        start_key
    }
}
