pub mod db;
mod errors;

mod backend;
mod batch;
mod config;
mod params;

mod iterator;
mod memtable;

mod misc;

pub use backend::{ListBackend, ListRequest, RangeEntry};
pub use batch::KeyValue;
pub use config::Config;
pub use db::RangeDB;
pub use errors::{Error, Result};
pub use iterator::{KeyIterator, KeyValueIterator, RangeIterator};
pub use memtable::Memtable;
pub use misc::key_in_range;
pub use params::{RangeParams, RefillErrorPolicy, DEFAULT_GRANULARITY};
