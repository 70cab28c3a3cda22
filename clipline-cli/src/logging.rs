// clipline-cli/src/logging.rs
//
// Logging utilities. The main logging implementation uses the standard `log`
// crate with `env_logger` as the backend, configured in main.rs and driven by
// the RUST_LOG environment variable (info by default, debug/trace for
// troubleshooting).

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// Used to name run manifests and other per-run artifacts.
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
