//! Binary module encoder.
//!
//! Pure byte transform from [`Module`] to the binary format. Sections are
//! written in canonical order (type, function, export, code); empty sections
//! are omitted. Every length prefix is the minimal ULEB128 encoding, so
//! `decode(encode(m)) == m` for every module the decoder accepts.

use thiserror::Error;

use crate::binary::leb128::{write_i32, write_u32};
use crate::binary::module::{
    FuncBody, Instr, Module, FUNC_TYPE_FORM, OP_END, SECTION_CODE, SECTION_EXPORT,
    SECTION_FUNCTION, SECTION_TYPE, WASM_MAGIC, WASM_VERSION,
};

/// Error during module serialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A vector or payload length does not fit the format's u32 prefix.
    #[error("{what} length {len} exceeds u32")]
    LengthOverflow { what: &'static str, len: usize },
}

/// Serialize a module to binary form.
///
/// # Errors
///
/// Returns [`EncodeError::LengthOverflow`] if any count or payload exceeds
/// `u32::MAX`.
pub fn encode(module: &Module) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(&WASM_MAGIC);
    out.extend_from_slice(&WASM_VERSION);

    if !module.types.is_empty() {
        let mut payload = Vec::new();
        write_len(&mut payload, module.types.len(), "type vector")?;
        for ty in &module.types {
            payload.push(FUNC_TYPE_FORM);
            write_len(&mut payload, ty.params.len(), "parameter vector")?;
            payload.extend(ty.params.iter().map(|p| p.to_byte()));
            write_len(&mut payload, ty.results.len(), "result vector")?;
            payload.extend(ty.results.iter().map(|r| r.to_byte()));
        }
        write_section(&mut out, SECTION_TYPE, &payload)?;
    }

    if !module.funcs.is_empty() {
        let mut payload = Vec::new();
        write_len(&mut payload, module.funcs.len(), "function vector")?;
        for &type_index in &module.funcs {
            write_u32(&mut payload, type_index);
        }
        write_section(&mut out, SECTION_FUNCTION, &payload)?;
    }

    if !module.exports.is_empty() {
        let mut payload = Vec::new();
        write_len(&mut payload, module.exports.len(), "export vector")?;
        for export in &module.exports {
            write_len(&mut payload, export.name.len(), "export name")?;
            payload.extend_from_slice(export.name.as_bytes());
            payload.push(export.kind.to_byte());
            write_u32(&mut payload, export.index);
        }
        write_section(&mut out, SECTION_EXPORT, &payload)?;
    }

    if !module.bodies.is_empty() {
        let mut payload = Vec::new();
        write_len(&mut payload, module.bodies.len(), "code vector")?;
        for body in &module.bodies {
            let encoded = encode_body(body)?;
            write_len(&mut payload, encoded.len(), "function body")?;
            payload.extend_from_slice(&encoded);
        }
        write_section(&mut out, SECTION_CODE, &payload)?;
    }

    Ok(out)
}

/// Encode one instruction (opcode plus immediates).
pub fn encode_instr(buf: &mut Vec<u8>, instr: Instr) {
    buf.push(instr.opcode());
    match instr {
        Instr::Call(idx) | Instr::LocalGet(idx) | Instr::LocalSet(idx) | Instr::LocalTee(idx) => {
            write_u32(buf, idx);
        }
        Instr::I32Const(value) => write_i32(buf, value),
        _ => {}
    }
}

fn encode_body(body: &FuncBody) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    write_len(&mut buf, body.locals.len(), "local declarations")?;
    for decl in &body.locals {
        write_u32(&mut buf, decl.count);
        buf.push(decl.ty.to_byte());
    }
    for &instr in &body.code {
        encode_instr(&mut buf, instr);
    }
    buf.push(OP_END);
    Ok(buf)
}

fn write_section(out: &mut Vec<u8>, id: u8, payload: &[u8]) -> Result<(), EncodeError> {
    out.push(id);
    write_len(out, payload.len(), "section payload")?;
    out.extend_from_slice(payload);
    Ok(())
}

fn write_len(buf: &mut Vec<u8>, len: usize, what: &'static str) -> Result<(), EncodeError> {
    let value = u32::try_from(len).map_err(|_| EncodeError::LengthOverflow { what, len })?;
    write_u32(buf, value);
    Ok(())
}
