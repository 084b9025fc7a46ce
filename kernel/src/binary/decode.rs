//! Binary module decoder.
//!
//! Fail-closed: rejects bad magic, unsupported versions, truncated input,
//! duplicate or out-of-order sections, section payloads that are not consumed exactly, and opcodes outside the
//! supported subset. No panics on malformed input; every failure path
//! returns a typed [`DecodeError`] carrying the absolute byte offset.
//!
//! # Sections
//!
//! | Id | Section  | Handling  |
//! |----|----------|-----------|
//! | 0  | custom   | skipped   |
//! | 1  | type     | decoded   |
//! | 2  | import   | rejected  |
//! | 3  | function | decoded   |
//! | 4-6| table, memory, global | skipped |
//! | 7  | export   | decoded   |
//! | 8  | start    | rejected  |
//! | 9  | element  | skipped   |
//! | 10 | code     | decoded   |
//! | 11-12 | data, data count | skipped |

use thiserror::Error;
use tracing::{debug, warn};

use crate::binary::leb128::{self, Leb128Error};
use crate::binary::module::{
    Export, ExportKind, FuncBody, FuncType, Instr, LocalDecl, Module, ValType, FUNC_TYPE_FORM,
    OP_END, SECTION_CODE, SECTION_CUSTOM, SECTION_DATA, SECTION_DATA_COUNT, SECTION_ELEMENT,
    SECTION_EXPORT, SECTION_FUNCTION, SECTION_GLOBAL, SECTION_IMPORT, SECTION_MEMORY,
    SECTION_START, SECTION_TABLE, SECTION_TYPE, WASM_MAGIC, WASM_VERSION,
};

/// Upper bound on declared locals per function body.
pub const MAX_LOCALS_PER_FUNCTION: u64 = 50_000;

/// Error decoding a binary module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset} while reading {context}")]
    UnexpectedEof { offset: usize, context: &'static str },
    #[error("bad magic {found:02x?} (expected \\0asm)")]
    BadMagic { found: [u8; 4] },
    #[error("unsupported binary version {found:02x?}")]
    UnsupportedVersion { found: [u8; 4] },
    #[error("LEB128 value at offset {offset} does not fit in 32 bits")]
    Leb128Overflow { offset: usize },
    #[error("unknown section id {id} at offset {offset}")]
    UnknownSection { id: u8, offset: usize },
    #[error("section id {id} at offset {offset} is not supported")]
    UnsupportedSection { id: u8, offset: usize },
    #[error("duplicate section id {id} at offset {offset}")]
    DuplicateSection { id: u8, offset: usize },
    #[error("section id {id} at offset {offset} is out of order")]
    SectionOutOfOrder { id: u8, offset: usize },
    #[error("section id {id} declared {declared} bytes but {consumed} were consumed")]
    SectionSizeMismatch {
        id: u8,
        declared: usize,
        consumed: usize,
    },
    #[error("invalid value type 0x{byte:02X} at offset {offset}")]
    InvalidValType { byte: u8, offset: usize },
    #[error("expected function type form 0x60 at offset {offset}, found 0x{found:02X}")]
    InvalidFuncTypeForm { found: u8, offset: usize },
    #[error("invalid export kind 0x{byte:02X} at offset {offset}")]
    InvalidExportKind { byte: u8, offset: usize },
    #[error("name at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
    #[error("unsupported opcode 0x{opcode:02X} at offset {offset}")]
    UnsupportedOpcode { opcode: u8, offset: usize },
    #[error("function body {index} declared {declared} bytes but ended after {consumed}")]
    BodySizeMismatch {
        index: usize,
        declared: usize,
        consumed: usize,
    },
    #[error(
        "function body {index} declares {count} locals (limit {limit})",
        limit = MAX_LOCALS_PER_FUNCTION
    )]
    TooManyLocals { index: usize, count: u64 },
    #[error("function section declares {funcs} functions but code section has {bodies} bodies")]
    FunctionCountMismatch { funcs: usize, bodies: usize },
}

/// Decode a complete binary module.
///
/// # Errors
///
/// Returns [`DecodeError`] for any structural problem; see the variants.
pub fn decode(bytes: &[u8]) -> Result<Module, DecodeError> {
    let mut reader = Reader::new(bytes);

    let magic = reader.array4("magic")?;
    if magic != WASM_MAGIC {
        return Err(DecodeError::BadMagic { found: magic });
    }
    let version = reader.array4("version")?;
    if version != WASM_VERSION {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }

    let mut module = Module::default();
    let mut last_rank = 0;

    while !reader.is_empty() {
        let offset = reader.offset();
        let id = reader.u8("section id")?;
        let declared = reader.len_u32("section size")?;
        let mut payload = reader.sub(declared, "section payload")?;

        if id != SECTION_CUSTOM {
            let rank = section_rank(id).ok_or(DecodeError::UnknownSection { id, offset })?;
            if rank == last_rank {
                return Err(DecodeError::DuplicateSection { id, offset });
            }
            if rank < last_rank {
                return Err(DecodeError::SectionOutOfOrder { id, offset });
            }
            last_rank = rank;
        }

        match id {
            SECTION_TYPE => module.types = decode_type_section(&mut payload)?,
            SECTION_FUNCTION => module.funcs = decode_function_section(&mut payload)?,
            SECTION_EXPORT => module.exports = decode_export_section(&mut payload)?,
            SECTION_CODE => module.bodies = decode_code_section(&mut payload)?,
            SECTION_IMPORT | SECTION_START => {
                return Err(DecodeError::UnsupportedSection { id, offset });
            }
            SECTION_CUSTOM => {
                debug!(offset, size = declared, "skipping custom section");
                payload.skip_rest();
            }
            SECTION_TABLE | SECTION_MEMORY | SECTION_GLOBAL | SECTION_ELEMENT | SECTION_DATA
            | SECTION_DATA_COUNT => {
                warn!(
                    id,
                    offset,
                    size = declared,
                    "skipping section the module model does not cover"
                );
                payload.skip_rest();
            }
            _ => return Err(DecodeError::UnknownSection { id, offset }),
        }

        if !payload.is_empty() {
            return Err(DecodeError::SectionSizeMismatch {
                id,
                declared,
                consumed: declared - payload.remaining(),
            });
        }
    }

    if module.funcs.len() != module.bodies.len() {
        return Err(DecodeError::FunctionCountMismatch {
            funcs: module.funcs.len(),
            bodies: module.bodies.len(),
        });
    }

    Ok(module)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Position of a non-custom section in the required order. Data count (12)
/// sits between element and code.
fn section_rank(id: u8) -> Option<u8> {
    match id {
        SECTION_TYPE..=SECTION_ELEMENT => Some(id),
        SECTION_DATA_COUNT => Some(SECTION_ELEMENT + 1),
        SECTION_CODE => Some(SECTION_ELEMENT + 2),
        SECTION_DATA => Some(SECTION_ELEMENT + 3),
        _ => None,
    }
}

fn decode_type_section(reader: &mut Reader<'_>) -> Result<Vec<FuncType>, DecodeError> {
    let count = reader.len_u32("type count")?;
    let mut types = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        let offset = reader.offset();
        let form = reader.u8("function type form")?;
        if form != FUNC_TYPE_FORM {
            return Err(DecodeError::InvalidFuncTypeForm {
                found: form,
                offset,
            });
        }
        let params = decode_val_types(reader, "parameter types")?;
        let results = decode_val_types(reader, "result types")?;
        types.push(FuncType { params, results });
    }
    Ok(types)
}

fn decode_val_types(
    reader: &mut Reader<'_>,
    context: &'static str,
) -> Result<Vec<ValType>, DecodeError> {
    let count = reader.len_u32(context)?;
    let mut types = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        types.push(reader.val_type(context)?);
    }
    Ok(types)
}

fn decode_function_section(reader: &mut Reader<'_>) -> Result<Vec<u32>, DecodeError> {
    let count = reader.len_u32("function count")?;
    let mut funcs = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        funcs.push(reader.u32("function type index")?);
    }
    Ok(funcs)
}

fn decode_export_section(reader: &mut Reader<'_>) -> Result<Vec<Export>, DecodeError> {
    let count = reader.len_u32("export count")?;
    let mut exports = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        let name = reader.name("export name")?;
        let kind_offset = reader.offset();
        let kind_byte = reader.u8("export kind")?;
        let kind = ExportKind::from_byte(kind_byte).ok_or(DecodeError::InvalidExportKind {
            byte: kind_byte,
            offset: kind_offset,
        })?;
        let index = reader.u32("export index")?;
        exports.push(Export { name, kind, index });
    }
    Ok(exports)
}

fn decode_code_section(reader: &mut Reader<'_>) -> Result<Vec<FuncBody>, DecodeError> {
    let count = reader.len_u32("code count")?;
    let mut bodies = Vec::with_capacity(count.min(reader.remaining()));
    for index in 0..count {
        let declared = reader.len_u32("function body size")?;
        let mut body_reader = reader.sub(declared, "function body")?;
        let body = decode_body(&mut body_reader, index)?;
        if !body_reader.is_empty() {
            return Err(DecodeError::BodySizeMismatch {
                index,
                declared,
                consumed: declared - body_reader.remaining(),
            });
        }
        bodies.push(body);
    }
    Ok(bodies)
}

fn decode_body(reader: &mut Reader<'_>, index: usize) -> Result<FuncBody, DecodeError> {
    let decl_count = reader.len_u32("local declaration count")?;
    let mut locals = Vec::with_capacity(decl_count.min(reader.remaining()));
    let mut total = 0u64;
    for _ in 0..decl_count {
        let count = reader.u32("local count")?;
        let ty = reader.val_type("local type")?;
        total += u64::from(count);
        if total > MAX_LOCALS_PER_FUNCTION {
            return Err(DecodeError::TooManyLocals {
                index,
                count: total,
            });
        }
        locals.push(LocalDecl { count, ty });
    }

    let mut code = Vec::new();
    loop {
        let offset = reader.offset();
        let opcode = reader.u8("instruction")?;
        if opcode == OP_END {
            break;
        }
        code.push(decode_instr(reader, opcode, offset)?);
    }

    Ok(FuncBody { locals, code })
}

fn decode_instr(reader: &mut Reader<'_>, opcode: u8, offset: usize) -> Result<Instr, DecodeError> {
    let instr = match opcode {
        0x00 => Instr::Unreachable,
        0x01 => Instr::Nop,
        0x0F => Instr::Return,
        0x10 => Instr::Call(reader.u32("call target")?),
        0x1A => Instr::Drop,
        0x20 => Instr::LocalGet(reader.u32("local index")?),
        0x21 => Instr::LocalSet(reader.u32("local index")?),
        0x22 => Instr::LocalTee(reader.u32("local index")?),
        0x41 => Instr::I32Const(reader.i32("i32 constant")?),
        0x6A => Instr::I32Add,
        0x6B => Instr::I32Sub,
        0x6C => Instr::I32Mul,
        0x6D => Instr::I32DivS,
        0x6E => Instr::I32DivU,
        0x6F => Instr::I32RemS,
        0x70 => Instr::I32RemU,
        0x71 => Instr::I32And,
        0x72 => Instr::I32Or,
        0x73 => Instr::I32Xor,
        _ => return Err(DecodeError::UnsupportedOpcode { opcode, offset }),
    };
    Ok(instr)
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Bounded cursor over a byte slice. `base` is the absolute offset of
/// `data[0]` so nested readers report positions in the whole module.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
        }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn skip_rest(&mut self) {
        self.pos = self.data.len();
    }

    fn eof(&self, context: &'static str) -> DecodeError {
        DecodeError::UnexpectedEof {
            offset: self.base + self.data.len(),
            context,
        }
    }

    fn u8(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let byte = *self.data.get(self.pos).ok_or_else(|| self.eof(context))?;
        self.pos += 1;
        Ok(byte)
    }

    fn bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(self.eof(context));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array4(&mut self, context: &'static str) -> Result<[u8; 4], DecodeError> {
        let mut out = [0u8; 4];
        out.copy_from_slice(self.bytes(4, context)?);
        Ok(out)
    }

    fn sub(&mut self, len: usize, context: &'static str) -> Result<Reader<'a>, DecodeError> {
        let base = self.offset();
        let data = self.bytes(len, context)?;
        Ok(Reader { data, pos: 0, base })
    }

    fn leb_error(&self, err: Leb128Error, context: &'static str) -> DecodeError {
        match err {
            Leb128Error::Truncated => self.eof(context),
            Leb128Error::Overflow => DecodeError::Leb128Overflow {
                offset: self.offset(),
            },
        }
    }

    fn u32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let (value, size) =
            leb128::decode_u32(&self.data[self.pos..]).map_err(|e| self.leb_error(e, context))?;
        self.pos += size;
        Ok(value)
    }

    fn i32(&mut self, context: &'static str) -> Result<i32, DecodeError> {
        let (value, size) =
            leb128::decode_i32(&self.data[self.pos..]).map_err(|e| self.leb_error(e, context))?;
        self.pos += size;
        Ok(value)
    }

    /// A `u32` used as a length or count.
    fn len_u32(&mut self, context: &'static str) -> Result<usize, DecodeError> {
        self.u32(context).map(|value| value as usize)
    }

    fn val_type(&mut self, context: &'static str) -> Result<ValType, DecodeError> {
        let offset = self.offset();
        let byte = self.u8(context)?;
        ValType::from_byte(byte).ok_or(DecodeError::InvalidValType { byte, offset })
    }

    fn name(&mut self, context: &'static str) -> Result<String, DecodeError> {
        let len = self.len_u32(context)?;
        let offset = self.offset();
        let raw = self.bytes(len, context)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 { offset })
    }
}
