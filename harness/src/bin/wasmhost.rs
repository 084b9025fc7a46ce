//! Runs the default harness configuration against `./test.wasm`.
//!
//! Stdout carries only report lines; diagnostics go to stderr.

use wasmhost_harness::config::HarnessConfig;
use wasmhost_harness::loader::WasmtimeLoader;
use wasmhost_harness::{logging, runner};

fn main() -> anyhow::Result<()> {
    logging::init();
    let config = HarnessConfig::default();
    let stdout = std::io::stdout();
    runner::run(&config, &WasmtimeLoader::default(), &mut stdout.lock())?;
    Ok(())
}
