use std::path::PathBuf;

/// Returns the root Nearby directory path.
///
/// Resolution order:
/// 1. `NEARBY_ROOT` environment variable (if set)
/// 2. Current working directory + `.nearby`
pub fn nearby_root() -> PathBuf {
    if let Ok(root) = std::env::var("NEARBY_ROOT") {
        PathBuf::from(root)
    } else {
        PathBuf::from(".nearby")
    }
}

/// Returns the path to the configuration file.
pub fn config_file() -> PathBuf {
    nearby_root().join("config.yaml")
}
