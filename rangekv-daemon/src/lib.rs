use bytes::Bytes;
use log::{debug, info};
use rangekv_core::{Error, ListRequest, RangeDB, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use warp::{
    self,
    http::{Response, StatusCode},
    Filter, Rejection, Reply,
};

const KEY_SIZE_LIMIT: u64 = 16 * 1024;
const VALUE_SIZE_LIMIT: u64 = 1 * 1024 * 1024;
// json encodes every key byte with up to 4 chars
const LIST_REQUEST_LIMIT: u64 = 16 * KEY_SIZE_LIMIT;

type HttpResult = std::result::Result<Response<Vec<u8>>, warp::http::Error>;

fn error_response(e: Error) -> HttpResult {
    let status = match e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Exceed(_) | Error::Config(_) | Error::KeyOrder => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    debug!("request failed with {status}: {e}");
    Response::builder()
        .status(status)
        .body(e.to_string().into_bytes())
}

/// All routes of the daemon, every request names its table in `X-table`.
pub fn routes(db: RangeDB) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    // for now we only support 16KB keys and 1MB values at most
    let get = {
        let db = db.clone();
        warp::post()
            .and(warp::path("get"))
            .and(warp::body::content_length_limit(KEY_SIZE_LIMIT))
            .and(warp::header::<String>("X-table"))
            .and(warp::body::bytes())
            .map(move |table: String, key: Bytes| {
                let response = Response::builder().status(StatusCode::OK);
                match db.get(&table, key.as_ref()) {
                    Some(val) => response.header("X-key-exist", 1).body(val),
                    None => response.header("X-key-exist", 0).body(vec![]),
                }
            })
    };

    let put = {
        let db = db.clone();
        warp::post()
            .and(warp::path("put"))
            .and(warp::body::content_length_limit(
                KEY_SIZE_LIMIT + VALUE_SIZE_LIMIT,
            ))
            .and(warp::header::<String>("X-table"))
            .and(warp::header::<usize>("X-key-length"))
            .and(warp::body::bytes())
            .map(move |table: String, key_len: usize, data: Bytes| {
                if key_len > data.len() {
                    return error_response(Error::Config(format!(
                        "key length {key_len} longer than body {}",
                        data.len()
                    )));
                }
                let (key, value) = data.split_at(key_len);
                match db.put(&table, key, value) {
                    Ok(_) => Response::builder()
                        .status(StatusCode::OK)
                        .body(b"ok".to_vec()),
                    Err(e) => error_response(e),
                }
            })
    };

    let del = {
        let db = db.clone();
        warp::post()
            .and(warp::path("del"))
            .and(warp::body::content_length_limit(KEY_SIZE_LIMIT))
            .and(warp::header::<String>("X-table"))
            .and(warp::body::bytes())
            .map(move |table: String, key: Bytes| match db.del(&table, key.as_ref()) {
                Ok(_) => Response::builder()
                    .status(StatusCode::OK)
                    .body(b"ok".to_vec()),
                Err(e) => error_response(e),
            })
    };

    let list = {
        let db = db.clone();
        warp::post()
            .and(warp::path("list"))
            .and(warp::body::content_length_limit(LIST_REQUEST_LIMIT))
            .and(warp::header::<String>("X-table"))
            .and(warp::body::bytes())
            .map(move |table: String, body: Bytes| {
                let req: ListRequest = match serde_json::from_slice(body.as_ref()) {
                    Ok(req) => req,
                    Err(e) => {
                        return error_response(Error::Config(format!(
                            "unknown list request format: {e}"
                        )))
                    }
                };
                let pairs = match db.list(
                    &table,
                    &req.start_key,
                    &req.end_key,
                    &req.prefix,
                    req.count,
                    req.skip,
                ) {
                    Ok(pairs) => pairs,
                    Err(e) => return error_response(e),
                };
                match serde_json::to_vec(&pairs) {
                    Ok(body) => Response::builder().status(StatusCode::OK).body(body),
                    Err(e) => error_response(Error::Internal(format!(
                        "serialize list result failed: {e}"
                    ))),
                }
            })
    };

    let list_keys = {
        let db = db.clone();
        warp::post()
            .and(warp::path("list-keys"))
            .and(warp::body::content_length_limit(LIST_REQUEST_LIMIT))
            .and(warp::header::<String>("X-table"))
            .and(warp::body::bytes())
            .map(move |table: String, body: Bytes| {
                let req: ListRequest = match serde_json::from_slice(body.as_ref()) {
                    Ok(req) => req,
                    Err(e) => {
                        return error_response(Error::Config(format!(
                            "unknown list request format: {e}"
                        )))
                    }
                };
                let keys = match db.list_keys(
                    &table,
                    &req.start_key,
                    &req.end_key,
                    &req.prefix,
                    req.count,
                    req.skip,
                ) {
                    Ok(keys) => keys,
                    Err(e) => return error_response(e),
                };
                match serde_json::to_vec(&keys) {
                    Ok(body) => Response::builder().status(StatusCode::OK).body(body),
                    Err(e) => error_response(Error::Internal(format!(
                        "serialize list keys result failed: {e}"
                    ))),
                }
            })
    };

    let count = {
        let db = db.clone();
        warp::post()
            .and(warp::path("count"))
            .and(warp::body::content_length_limit(LIST_REQUEST_LIMIT))
            .and(warp::header::<String>("X-table"))
            .and(warp::body::bytes())
            .map(move |table: String, body: Bytes| {
                let req: ListRequest = match serde_json::from_slice(body.as_ref()) {
                    Ok(req) => req,
                    Err(e) => {
                        return error_response(Error::Config(format!(
                            "unknown count request format: {e}"
                        )))
                    }
                };
                match db.count(&table, &req.start_key, &req.end_key, &req.prefix) {
                    Ok(num) => Response::builder()
                        .status(StatusCode::OK)
                        .body(num.to_string().into_bytes()),
                    Err(e) => error_response(e),
                }
            })
    };

    get.or(put).or(del).or(list).or(list_keys).or(count)
}

/// Bind the daemon to `addr` (port 0 picks a free one) and return the bound
/// address with the future serving requests.
pub fn bind_daemon(
    db: RangeDB,
    addr: SocketAddr,
) -> Result<(SocketAddr, impl Future<Output = ()>)> {
    let (bound, server) = warp::serve(routes(db))
        .try_bind_ephemeral(addr)
        .map_err(|e| Error::Config(format!("bind {addr} failed: {e}")))?;
    info!("RangeKV daemon listen on {bound}");
    Ok((bound, server))
}

pub async fn start_daemon(config_path: impl AsRef<Path>, addr: SocketAddr) -> Result<()> {
    let db = RangeDB::open(config_path)?;
    let (_, server) = bind_daemon(db, addr)?;
    server.await;
    Ok(())
}
