//! Shared helpers for wasmhost benchmark suites.

use wasmhost_kernel::binary::builder::ModuleBuilder;
use wasmhost_kernel::binary::encode::encode;
use wasmhost_kernel::binary::module::{FuncType, Instr, Module, ValType};

/// A module of `depth` functions where function `i` returns
/// `call (i + 1) + 1` and the last returns 0. Exported as `chain`.
///
/// Invoking `chain` yields `depth - 1` after `depth - 1` nested calls.
///
/// # Panics
///
/// Panics if `depth` is zero or does not fit in `u32`.
#[must_use]
pub fn call_chain_module(depth: usize) -> Module {
    assert!(depth > 0, "call chain needs at least one function");
    let last = u32::try_from(depth - 1).expect("depth fits in u32");
    let ty = FuncType::new([], [ValType::I32]);
    let mut builder = ModuleBuilder::new();
    for i in 0..last {
        builder.func(
            ty.clone(),
            vec![],
            vec![Instr::Call(i + 1), Instr::I32Const(1), Instr::I32Add],
        );
    }
    builder.func(ty, vec![], vec![Instr::I32Const(0)]);
    builder.export_func("chain", 0);
    builder.finish()
}

/// Binary form of [`call_chain_module`].
///
/// # Panics
///
/// Panics if encoding fails. Benchmark setup failures are fatal.
#[must_use]
pub fn call_chain_artifact(depth: usize) -> Vec<u8> {
    encode(&call_chain_module(depth)).expect("call chain encodes")
}
