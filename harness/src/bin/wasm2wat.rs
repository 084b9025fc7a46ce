//! Print a WebAssembly artifact as text, or as a JSON summary.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use wasmhost_harness::{inspect, logging, runner};
use wasmhost_kernel::binary::decode::decode;
use wasmhost_kernel::binary::wat::to_wat;

#[derive(Debug, Parser)]
#[command(name = "wasm2wat", about = "Print a WebAssembly module in text form")]
struct Cli {
    /// Artifact to read.
    #[arg(default_value = "test.wasm")]
    path: PathBuf,
    /// Print a JSON summary instead of WAT.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();
    let artifact = runner::load(&cli.path)?;
    let module = decode(&artifact.bytes)
        .with_context(|| format!("cannot decode {}", artifact.path.display()))?;
    if cli.json {
        let summary = inspect::module_summary(&module, &artifact.digest);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", to_wat(&module));
    }
    Ok(())
}
