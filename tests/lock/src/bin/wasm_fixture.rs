//! Binary that writes a demo artifact and prints its digest.
//!
//! Used by the cross-process tests to produce `test.wasm` in a scratch
//! directory without checking binary files into the tree.
//!
//! Usage: `wasm_fixture <output_path> [--chained] [--const-val N]`
//! Output: one line, `artifact_digest=sha256:...`

use anyhow::{bail, Context};

use wasmhost_harness::fixtures::{chained_demo_artifact, demo_artifact};
use wasmhost_kernel::hash::artifact_digest;

const USAGE: &str = "usage: wasm_fixture <output_path> [--chained] [--const-val N]";

fn main() -> anyhow::Result<()> {
    let mut output = None;
    let mut chained = false;
    let mut const_val = 42_i32;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--chained" => chained = true,
            "--const-val" => {
                let raw = args.next().context(USAGE)?;
                const_val = raw
                    .parse()
                    .with_context(|| format!("invalid --const-val {raw:?}"))?;
            }
            _ if output.is_none() && !arg.starts_with("--") => output = Some(arg),
            _ => bail!("unexpected argument {arg:?}\n{USAGE}"),
        }
    }
    let output = output.context(USAGE)?;

    let bytes = if chained {
        chained_demo_artifact(const_val)?
    } else {
        demo_artifact(const_val)?
    };
    std::fs::write(&output, &bytes).with_context(|| format!("cannot write {output}"))?;
    println!("artifact_digest={}", artifact_digest(&bytes));
    Ok(())
}
