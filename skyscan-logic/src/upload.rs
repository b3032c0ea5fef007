use std::path::Path;

use crate::UtcDT;

const SUFFIX_POOL: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;
const FALLBACK_EXTENSION: &str = "bin";

/// Pick a storage object name for an uploaded file: `{unix millis}-{9 random base-36 chars}.{ext}`,
/// keeping the original file's extension.
pub fn object_name(file_name: &str, now: UtcDT) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(FALLBACK_EXTENSION);

    let suffix = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_POOL[rand::random_range(0..SUFFIX_POOL.len())] as char)
        .collect::<String>();

    format!("{}-{suffix}.{ext}", now.timestamp_millis())
}
