use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("quartile-{prefix}-{nanos}"))
}
