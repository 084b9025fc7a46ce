//! Text-format (WAT) rendering of a decoded module.
//!
//! # Layout
//!
//! ```text
//! (module
//!     (func $0
//!         (param) (result i32)
//!         (local)
//!         i32.const 42
//!     )
//!     (export "get_const_val" (func $0))
//! )
//! ```
//!
//! Functions are named by index. Declared locals are expanded one keyword
//! per local. Output has no trailing newline.

use std::fmt::Write;

use crate::binary::module::Module;

const INDENT: &str = "    ";

/// Render `module` in text format.
#[must_use]
pub fn to_wat(module: &Module) -> String {
    let mut out = String::from("(module");

    for (index, (&type_index, body)) in module.funcs.iter().zip(&module.bodies).enumerate() {
        let _ = write!(out, "\n{INDENT}(func ${index}");
        match module.types.get(type_index as usize) {
            Some(ty) => {
                let _ = write!(out, "\n{INDENT}{INDENT}{ty}");
            }
            None => {
                let _ = write!(out, "\n{INDENT}{INDENT}(type {type_index})");
            }
        }
        let _ = write!(out, "\n{INDENT}{INDENT}(local");
        for ty in body.local_types() {
            let _ = write!(out, " {ty}");
        }
        out.push(')');
        for instr in &body.code {
            let _ = write!(out, "\n{INDENT}{INDENT}{instr}");
        }
        let _ = write!(out, "\n{INDENT})");
    }

    for export in &module.exports {
        let _ = write!(
            out,
            "\n{INDENT}(export \"{}\" ({} ${}))",
            escape_name(&export.name),
            export.kind,
            export.index
        );
    }

    out.push_str("\n)");
    out
}

/// Escape a name for use inside a WAT string literal.
fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\{byte:02x}");
            }
        }
    }
    out
}
