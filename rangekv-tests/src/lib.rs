use log::error;
use rangekv_core::{Error, RangeDB, Result};
use rangekv_daemon::bind_daemon;
use std::net::SocketAddr;
use std::sync::mpsc;

/// Serve `db` on a free local port from a background thread with its own
/// runtime, and return the address once the daemon is listening.
///
/// The daemon lives until the process exits.
pub fn spawn_daemon(db: RangeDB) -> Result<SocketAddr> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("rangekv_daemon".to_owned())
        .spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = tx.send(Err(Error::from(e)));
                    return;
                }
            };
            runtime.block_on(async move {
                match bind_daemon(db, SocketAddr::from(([127, 0, 0, 1], 0))) {
                    Ok((addr, server)) => {
                        let _ = tx.send(Ok(addr));
                        server.await;
                    }
                    Err(e) => {
                        error!("start daemon failed: {e}");
                        let _ = tx.send(Err(e));
                    }
                }
            });
        })?;
    rx.recv()
        .map_err(|e| Error::Internal(format!("daemon thread exit early: {e}")))?
}
