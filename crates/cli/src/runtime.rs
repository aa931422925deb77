#![forbid(unsafe_code)]

use std::ffi::OsString;
use std::path::PathBuf;

pub(crate) const STORAGE_DIR_ENV: &str = "KINSHIP_STORAGE_DIR";
const DEFAULT_STORAGE_DIR: &str = ".kinship";

/// Flag first, then `KINSHIP_STORAGE_DIR`, then `./.kinship`.
pub(crate) fn resolve_storage_dir(flag: Option<PathBuf>, env: Option<OsString>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Some(raw) = env
        && !raw.is_empty()
    {
        return PathBuf::from(raw);
    }
    PathBuf::from(DEFAULT_STORAGE_DIR)
}

pub(crate) fn storage_dir_from_env(flag: Option<PathBuf>) -> PathBuf {
    resolve_storage_dir(flag, std::env::var_os(STORAGE_DIR_ENV))
}

/// Default filter when `RUST_LOG` is unset.
pub(crate) fn default_log_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

pub(crate) fn init_tracing(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
