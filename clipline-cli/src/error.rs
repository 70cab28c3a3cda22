// clipline-cli/src/error.rs
//
// CLI result alias over the core error type, so command implementations
// propagate core failures unchanged and main.rs maps them to exit codes.

use clipline_core::CoreResult;

pub type CliResult<T> = CoreResult<T>;
