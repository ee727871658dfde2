use log::debug;
use rangekv_core::{
    Error, KeyIterator, KeyValue, KeyValueIterator, ListBackend, ListRequest, RangeParams, Result,
};
use serde::de::DeserializeOwned;
use reqwest::blocking::{Client as RawClient, Response};
use reqwest::{header::HeaderValue, StatusCode};

/// Blocking client of a RangeKV daemon.
///
/// The client keeps a current table, selected by [`Client::use_table`], which
/// is used by every operation called on the client itself. [`Client::table`]
/// gives a handle bound to one table instead.
pub struct Client {
    client: RawClient,
    base_url: String,
    table: Option<String>,
}

/// A handle to one table of the daemon, borrowed from a [`Client`].
#[derive(Clone, Copy)]
pub struct Table<'a> {
    client: &'a Client,
    name: &'a str,
}

fn map_transport_err(e: reqwest::Error) -> Error {
    Error::Client(e.to_string())
}

// turn non-success status into an error, with server message attached
fn check_status(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let msg = res.text().unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(Error::NotFound(msg)),
        _ => Err(Error::Client(format!("{status}: {msg}"))),
    }
}

fn list_request(
    start_key: &[u8],
    end_key: &[u8],
    prefix: &[u8],
    count: usize,
    skip: bool,
) -> ListRequest {
    ListRequest {
        start_key: start_key.to_vec(),
        end_key: end_key.to_vec(),
        prefix: prefix.to_vec(),
        count,
        skip,
    }
}

impl Client {
    /// Create a new RangeKV client
    /// - `base_url`: baseurl of RangeKV daemon
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_owned();
        Self {
            client: RawClient::new(),
            base_url,
            table: None,
        }
    }

    pub fn use_table(&mut self, name: &str) {
        self.table = Some(name.to_owned());
    }

    pub fn current_table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn table<'a>(&'a self, name: &'a str) -> Table<'a> {
        Table { client: self, name }
    }

    fn current(&self) -> Result<Table<'_>> {
        match self.table.as_deref() {
            Some(name) => Ok(self.table(name)),
            None => Err(Error::Config("no table selected".to_owned())),
        }
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.current()?.get(key)
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.current()?.put(key, value)
    }

    pub fn del(&self, key: &[u8]) -> Result<()> {
        self.current()?.del(key)
    }

    pub fn count(&self, params: &RangeParams) -> Result<usize> {
        self.current()?.count(params)
    }

    /// Iterate the current table over `params`, performing the first fetch.
    pub fn key_value_iterator(&self, params: RangeParams) -> Result<KeyValueIterator<&Client>> {
        KeyValueIterator::new(self, params)
    }

    /// Iterate the keys of the current table over `params`.
    pub fn key_iterator(&self, params: RangeParams) -> Result<KeyIterator<&Client>> {
        KeyIterator::new(self, params)
    }

    fn post(&self, path: &str, table: &str) -> reqwest::blocking::RequestBuilder {
        self.client
            .post(format!("{}/{path}", self.base_url))
            .header("X-table", table)
    }

    fn get_in(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let res = self
            .post("get", table)
            .body(key.to_vec())
            .send()
            .map_err(map_transport_err)?;
        let res = check_status(res)?;
        let exist = res
            .headers()
            .get("X-key-exist")
            .map(|val| *val == HeaderValue::from(1));
        match exist {
            Some(true) => {
                let res = res.bytes().map_err(map_transport_err)?;
                Ok(Some(res.to_vec()))
            }
            Some(false) => Ok(None),
            None => Err(Error::Client(
                "invalid response: without x-key-exist header".to_owned(),
            )),
        }
    }

    fn put_in(&self, table: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let mut body = Vec::with_capacity(key.len() + value.len());
        body.extend_from_slice(key);
        body.extend_from_slice(value);
        let res = self
            .post("put", table)
            .header("X-key-length", key.len())
            .body(body)
            .send()
            .map_err(map_transport_err)?;
        check_status(res)?;
        Ok(())
    }

    fn del_in(&self, table: &str, key: &[u8]) -> Result<()> {
        let res = self
            .post("del", table)
            .body(key.to_vec())
            .send()
            .map_err(map_transport_err)?;
        check_status(res)?;
        Ok(())
    }

    // `path` is one of the listing routes, answering a json array
    fn list_in<T: DeserializeOwned>(
        &self,
        path: &str,
        table: &str,
        req: &ListRequest,
    ) -> Result<T> {
        debug!(
            "{path} {table} start={:?} count={} skip={}",
            req.start_key, req.count, req.skip
        );
        let body = serde_json::to_vec(req)
            .map_err(|e| Error::Internal(format!("serialize list request: {e}")))?;
        let res = self
            .post(path, table)
            .body(body)
            .send()
            .map_err(map_transport_err)?;
        let res = check_status(res)?;
        let body = res.bytes().map_err(map_transport_err)?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::Corrupt(format!("cannot deserialize {path} result: {e}")))
    }

    fn count_in(&self, table: &str, params: &RangeParams) -> Result<usize> {
        let body = serde_json::to_vec(&params.to_request())
            .map_err(|e| Error::Internal(format!("serialize count request: {e}")))?;
        let res = self
            .post("count", table)
            .body(body)
            .send()
            .map_err(map_transport_err)?;
        let res = check_status(res)?;
        let text = res.text().map_err(map_transport_err)?;
        let num = text
            .trim()
            .parse::<usize>()
            .map_err(|e| Error::Corrupt(format!("parse count {text:?} failed: {e}")))?;
        Ok(match params.get_count() {
            Some(limit) => num.min(limit),
            None => num,
        })
    }
}

impl<'a> Table<'a> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.client.get_in(self.name, key)
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.client.put_in(self.name, key, value)
    }

    pub fn del(&self, key: &[u8]) -> Result<()> {
        self.client.del_in(self.name, key)
    }

    /// Number of pairs covered by `params`, at most its count limit.
    pub fn count(&self, params: &RangeParams) -> Result<usize> {
        self.client.count_in(self.name, params)
    }

    /// Iterate this table over `params`, performing the first fetch.
    pub fn key_value_iterator(&self, params: RangeParams) -> Result<KeyValueIterator<Table<'a>>> {
        KeyValueIterator::new(*self, params)
    }

    /// Iterate the keys of this table over `params`.
    pub fn key_iterator(&self, params: RangeParams) -> Result<KeyIterator<Table<'a>>> {
        KeyIterator::new(*self, params)
    }
}

impl ListBackend for Client {
    fn list_key_values(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<KeyValue>> {
        self.current()?.list_key_values(start_key, end_key, prefix, count, skip)
    }

    fn list_keys(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Vec<u8>>> {
        self.current()?.list_keys(start_key, end_key, prefix, count, skip)
    }
}

impl<'a> ListBackend for Table<'a> {
    fn list_key_values(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<KeyValue>> {
        let req = list_request(start_key, end_key, prefix, count, skip);
        self.client.list_in("list", self.name, &req)
    }

    fn list_keys(
        &self,
        start_key: &[u8],
        end_key: &[u8],
        prefix: &[u8],
        count: usize,
        skip: bool,
    ) -> Result<Vec<Vec<u8>>> {
        let req = list_request(start_key, end_key, prefix, count, skip);
        self.client.list_in("list-keys", self.name, &req)
    }
}
