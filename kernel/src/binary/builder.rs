//! Incremental construction of a [`Module`].

use crate::binary::module::{Export, ExportKind, FuncBody, FuncType, Instr, LocalDecl, Module};

/// Builds a module function by function.
///
/// Function types are interned: adding two functions with the same
/// signature produces a single type entry.
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a function type, returning its index.
    #[allow(clippy::cast_possible_truncation)]
    pub fn func_type(&mut self, ty: FuncType) -> u32 {
        if let Some(pos) = self.module.types.iter().position(|t| *t == ty) {
            return pos as u32;
        }
        self.module.types.push(ty);
        (self.module.types.len() - 1) as u32
    }

    /// Add a function, returning its index in the function index space.
    #[allow(clippy::cast_possible_truncation)]
    pub fn func(&mut self, ty: FuncType, locals: Vec<LocalDecl>, code: Vec<Instr>) -> u32 {
        let type_index = self.func_type(ty);
        self.module.funcs.push(type_index);
        self.module.bodies.push(FuncBody::new(locals, code));
        (self.module.funcs.len() - 1) as u32
    }

    /// Export the function at `index` under `name`.
    pub fn export_func(&mut self, name: impl Into<String>, index: u32) -> &mut Self {
        self.module.exports.push(Export {
            name: name.into(),
            kind: ExportKind::Func,
            index,
        });
        self
    }

    #[must_use]
    pub fn finish(self) -> Module {
        self.module
    }
}
