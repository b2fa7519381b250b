//! Main binary entry point for the `ttnn-tidy` modernization checks.
//!
//! This binary simply delegates to the shared `entry_point::run_with_args()` function
//! so it behaves exactly like the `ttnn-tidy-cli` binary.

use anyhow::Result;

fn main() -> Result<()> {
    let code = ttnn_tidy::entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
