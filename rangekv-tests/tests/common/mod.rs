use rangekv_client::Client;
use rangekv_core::{Config, KeyValue, RangeDB};
use rangekv_tests::spawn_daemon;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Start a fresh daemon and return a client talking to it
pub fn start(config: Config) -> (RangeDB, Client) {
    let db = RangeDB::new(config);
    let addr = spawn_daemon(db.clone()).unwrap();
    let client = Client::new(&format!("http://{}", addr));
    (db, client)
}

pub fn put(client: &Client, table: &str, key: impl AsRef<str>, value: i32) {
    client
        .table(table)
        .put(key.as_ref().as_bytes(), &value.to_le_bytes())
        .unwrap();
}

pub fn key_str(kv: &KeyValue) -> String {
    String::from_utf8(kv.key.clone()).unwrap()
}
