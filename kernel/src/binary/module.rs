//! In-memory model of a WebAssembly binary module.
//!
//! Only the parts of the format the host executes are modelled: function
//! types, the function section (type index per function), exports, and
//! function bodies over a flat, block-free instruction subset.
//!
//! # Header
//!
//! | Offset | Bytes          | Field   |
//! |--------|----------------|---------|
//! | 0      | `00 61 73 6D`  | magic   |
//! | 4      | `01 00 00 00`  | version |

use std::fmt;

/// Module preamble magic (`"\0asm"`).
pub const WASM_MAGIC: [u8; 4] = *b"\0asm";

/// Supported binary format version (1, little-endian u32).
pub const WASM_VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Leading byte of every function type in the type section.
pub const FUNC_TYPE_FORM: u8 = 0x60;

/// Terminates a function body.
pub const OP_END: u8 = 0x0B;

pub const SECTION_CUSTOM: u8 = 0;
pub const SECTION_TYPE: u8 = 1;
pub const SECTION_IMPORT: u8 = 2;
pub const SECTION_FUNCTION: u8 = 3;
pub const SECTION_TABLE: u8 = 4;
pub const SECTION_MEMORY: u8 = 5;
pub const SECTION_GLOBAL: u8 = 6;
pub const SECTION_EXPORT: u8 = 7;
pub const SECTION_START: u8 = 8;
pub const SECTION_ELEMENT: u8 = 9;
pub const SECTION_CODE: u8 = 10;
pub const SECTION_DATA: u8 = 11;
pub const SECTION_DATA_COUNT: u8 = 12;

/// A number type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValType {
    I32,
    I64,
    F32,
    F64,
}

impl ValType {
    /// Parse a value type from its binary code.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x7F => Some(Self::I32),
            0x7E => Some(Self::I64),
            0x7D => Some(Self::F32),
            0x7C => Some(Self::F64),
            _ => None,
        }
    }

    /// Binary code of this type.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::I32 => 0x7F,
            Self::I64 => 0x7E,
            Self::F32 => 0x7D,
            Self::F64 => 0x7C,
        }
    }

    /// Text-format keyword.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FuncType {
    pub params: Vec<ValType>,
    pub results: Vec<ValType>,
}

impl FuncType {
    #[must_use]
    pub fn new(params: impl Into<Vec<ValType>>, results: impl Into<Vec<ValType>>) -> Self {
        Self {
            params: params.into(),
            results: results.into(),
        }
    }
}

impl fmt::Display for FuncType {
    /// Renders as `(param i32 i32) (result i32)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(param")?;
        for ty in &self.params {
            write!(f, " {ty}")?;
        }
        f.write_str(") (result")?;
        for ty in &self.results {
            write!(f, " {ty}")?;
        }
        f.write_str(")")
    }
}

/// What an export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Func,
    Table,
    Memory,
    Global,
}

impl ExportKind {
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Func),
            0x01 => Some(Self::Table),
            0x02 => Some(Self::Memory),
            0x03 => Some(Self::Global),
            _ => None,
        }
    }

    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Func => 0x00,
            Self::Table => 0x01,
            Self::Memory => 0x02,
            Self::Global => 0x03,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Func => "func",
            Self::Table => "table",
            Self::Memory => "memory",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub kind: ExportKind,
    /// Index into the index space selected by `kind`.
    pub index: u32,
}

/// A run of `count` locals sharing one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDecl {
    pub count: u32,
    pub ty: ValType,
}

/// A supported instruction. Bodies are flat: no blocks, loops or branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    Unreachable,
    Nop,
    Return,
    Call(u32),
    Drop,
    LocalGet(u32),
    LocalSet(u32),
    LocalTee(u32),
    I32Const(i32),
    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32DivU,
    I32RemS,
    I32RemU,
    I32And,
    I32Or,
    I32Xor,
}

impl Instr {
    /// The instruction's opcode byte.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Unreachable => 0x00,
            Self::Nop => 0x01,
            Self::Return => 0x0F,
            Self::Call(_) => 0x10,
            Self::Drop => 0x1A,
            Self::LocalGet(_) => 0x20,
            Self::LocalSet(_) => 0x21,
            Self::LocalTee(_) => 0x22,
            Self::I32Const(_) => 0x41,
            Self::I32Add => 0x6A,
            Self::I32Sub => 0x6B,
            Self::I32Mul => 0x6C,
            Self::I32DivS => 0x6D,
            Self::I32DivU => 0x6E,
            Self::I32RemS => 0x6F,
            Self::I32RemU => 0x70,
            Self::I32And => 0x71,
            Self::I32Or => 0x72,
            Self::I32Xor => 0x73,
        }
    }

    /// Text-format mnemonic without immediates.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::Nop => "nop",
            Self::Return => "return",
            Self::Call(_) => "call",
            Self::Drop => "drop",
            Self::LocalGet(_) => "local.get",
            Self::LocalSet(_) => "local.set",
            Self::LocalTee(_) => "local.tee",
            Self::I32Const(_) => "i32.const",
            Self::I32Add => "i32.add",
            Self::I32Sub => "i32.sub",
            Self::I32Mul => "i32.mul",
            Self::I32DivS => "i32.div_s",
            Self::I32DivU => "i32.div_u",
            Self::I32RemS => "i32.rem_s",
            Self::I32RemU => "i32.rem_u",
            Self::I32And => "i32.and",
            Self::I32Or => "i32.or",
            Self::I32Xor => "i32.xor",
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())?;
        match *self {
            Self::Call(idx) | Self::LocalGet(idx) | Self::LocalSet(idx) | Self::LocalTee(idx) => {
                write!(f, " {idx}")
            }
            Self::I32Const(value) => write!(f, " {value}"),
            _ => Ok(()),
        }
    }
}

/// Locals and code of one function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FuncBody {
    pub locals: Vec<LocalDecl>,
    /// Instructions, excluding the terminating `end`.
    pub code: Vec<Instr>,
}

impl FuncBody {
    #[must_use]
    pub fn new(locals: Vec<LocalDecl>, code: Vec<Instr>) -> Self {
        Self { locals, code }
    }

    /// Declared locals expanded one entry per local.
    pub fn local_types(&self) -> impl Iterator<Item = ValType> + '_ {
        self.locals
            .iter()
            .flat_map(|decl| std::iter::repeat(decl.ty).take(decl.count as usize))
    }

    /// Total number of declared locals (parameters excluded).
    #[must_use]
    pub fn declared_local_count(&self) -> u64 {
        self.locals.iter().map(|decl| u64::from(decl.count)).sum()
    }
}

/// A decoded module.
///
/// Invariant (after decoding): `funcs.len() == bodies.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    pub types: Vec<FuncType>,
    /// Type index of each defined function.
    pub funcs: Vec<u32>,
    pub exports: Vec<Export>,
    pub bodies: Vec<FuncBody>,
}

impl Module {
    /// Signature of the function at `func_index`, if both indices resolve.
    #[must_use]
    pub fn func_type(&self, func_index: u32) -> Option<&FuncType> {
        let type_index = *self.funcs.get(func_index as usize)?;
        self.types.get(type_index as usize)
    }

    /// Body of the function at `func_index`.
    #[must_use]
    pub fn body(&self, func_index: u32) -> Option<&FuncBody> {
        self.bodies.get(func_index as usize)
    }

    /// First export named `name`, of any kind.
    #[must_use]
    pub fn find_export(&self, name: &str) -> Option<&Export> {
        self.exports.iter().find(|export| export.name == name)
    }
}
