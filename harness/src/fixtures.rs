//! Demo artifacts exercising the default harness configuration.
//!
//! Both modules export `get_const_val: [] -> [i32]` and
//! `add_two_nums: [i32 i32] -> [i32]`.
//!
//! | Builder | `get_const_val()` | `add_two_nums(a, b)` |
//! |---------|-------------------|----------------------|
//! | [`demo_module`] | `const_val` | `a + b` |
//! | [`chained_demo_module`] | `const_val` | `a + b + get_const_val()` |

use wasmhost_kernel::binary::builder::ModuleBuilder;
use wasmhost_kernel::binary::encode::{encode, EncodeError};
use wasmhost_kernel::binary::module::{FuncType, Instr, Module, ValType};

/// Export name of the constant-returning entry point.
pub const GET_CONST_VAL: &str = "get_const_val";

/// Export name of the two-argument adder.
pub const ADD_TWO_NUMS: &str = "add_two_nums";

#[must_use]
pub fn demo_module(const_val: i32) -> Module {
    build(const_val, false)
}

#[must_use]
pub fn chained_demo_module(const_val: i32) -> Module {
    build(const_val, true)
}

/// Binary form of [`demo_module`].
///
/// # Errors
///
/// Propagates [`EncodeError`] from the encoder.
pub fn demo_artifact(const_val: i32) -> Result<Vec<u8>, EncodeError> {
    encode(&demo_module(const_val))
}

/// Binary form of [`chained_demo_module`].
///
/// # Errors
///
/// Propagates [`EncodeError`] from the encoder.
pub fn chained_demo_artifact(const_val: i32) -> Result<Vec<u8>, EncodeError> {
    encode(&chained_demo_module(const_val))
}

fn build(const_val: i32, chained: bool) -> Module {
    let mut builder = ModuleBuilder::new();
    let get = builder.func(
        FuncType::new([], [ValType::I32]),
        vec![],
        vec![Instr::I32Const(const_val)],
    );
    let mut code = vec![Instr::LocalGet(0), Instr::LocalGet(1), Instr::I32Add];
    if chained {
        code.extend([Instr::Call(get), Instr::I32Add]);
    }
    let add = builder.func(
        FuncType::new([ValType::I32, ValType::I32], [ValType::I32]),
        vec![],
        code,
    );
    builder
        .export_func(GET_CONST_VAL, get)
        .export_func(ADD_TWO_NUMS, add);
    builder.finish()
}
