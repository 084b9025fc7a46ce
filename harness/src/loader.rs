//! `wasmtime`-backed [`ModuleLoader`].
//!
//! Compilation, validation, linking and execution are wasmtime's. This
//! module only translates between wasmtime's types and the harness's:
//!
//! | wasmtime outcome | Harness error |
//! |------------------|---------------|
//! | `Module::from_binary` or `Linker::instantiate` fails | `Instantiation` |
//! | export missing, not a function, or non-numeric signature | `NotFound` |
//! | argument mismatch, trap, or other call failure | `Invocation` |

use tracing::debug;
use wasmtime::{Engine, Extern, Func, Instance, Linker, Module, Store, Trap, Val};

use wasmhost_kernel::binary::module::{FuncType, ValType};
use wasmhost_kernel::value::Value;

use crate::contract::{EntryPoint, ModuleHandle, ModuleLoader};
use crate::error::HarnessError;

/// Loader compiling artifacts with a shared wasmtime [`Engine`].
///
/// No host functions are linked, so modules with imports fail to
/// instantiate.
#[derive(Clone, Default)]
pub struct WasmtimeLoader {
    engine: Engine,
}

impl WasmtimeLoader {
    #[must_use]
    pub fn with_engine(engine: Engine) -> Self {
        Self { engine }
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl ModuleLoader for WasmtimeLoader {
    type Handle = WasmtimeHandle;

    fn instantiate(&self, artifact: Vec<u8>) -> Result<WasmtimeHandle, HarnessError> {
        let instantiation = |err: &wasmtime::Error| HarnessError::Instantiation {
            detail: describe(err),
        };
        let module =
            Module::from_binary(&self.engine, &artifact).map_err(|e| instantiation(&e))?;
        let mut store = Store::new(&self.engine, ());
        let instance = Linker::new(&self.engine)
            .instantiate(&mut store, &module)
            .map_err(|e| instantiation(&e))?;
        debug!(
            bytes = artifact.len(),
            imports = module.imports().len(),
            exports = module.exports().len(),
            "module instantiated"
        );
        Ok(WasmtimeHandle { store, instance })
    }
}

/// An instance together with the store it lives in.
pub struct WasmtimeHandle {
    store: Store<()>,
    instance: Instance,
}

impl std::fmt::Debug for WasmtimeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmtimeHandle").finish_non_exhaustive()
    }
}

impl ModuleHandle for WasmtimeHandle {
    type Func = Func;

    fn resolve(&mut self, name: &str) -> Result<EntryPoint<Func>, HarnessError> {
        let not_found = |detail: String| HarnessError::NotFound {
            name: name.to_string(),
            detail,
        };
        let export = self
            .instance
            .get_export(&mut self.store, name)
            .ok_or_else(|| not_found("module has no export with this name".into()))?;
        let kind = extern_kind(&export);
        let func = export
            .into_func()
            .ok_or_else(|| not_found(format!("export is a {kind}, not a function")))?;

        let ty = func.ty(&self.store);
        let params = ty.params().map(|t| host_type(&t)).collect::<Result<Vec<_>, _>>();
        let results = ty.results().map(|t| host_type(&t)).collect::<Result<Vec<_>, _>>();
        let (params, results) = match (params, results) {
            (Ok(params), Ok(results)) => (params, results),
            (Err(unsupported), _) | (_, Err(unsupported)) => {
                return Err(not_found(format!(
                    "signature uses {unsupported}, which has no host value"
                )));
            }
        };
        Ok(EntryPoint::new(name, FuncType::new(params, results), func))
    }

    fn invoke(
        &mut self,
        entry: EntryPoint<Func>,
        args: &[Value],
    ) -> Result<Vec<Value>, HarnessError> {
        let invocation = |detail: String| HarnessError::Invocation {
            name: entry.name().to_string(),
            detail,
        };
        let signature = entry.signature();
        let found: Vec<ValType> = args.iter().map(|arg| arg.ty()).collect();
        if found != signature.params {
            return Err(invocation(format!(
                "argument mismatch: expected ({}), got ({})",
                join(&signature.params),
                join(&found)
            )));
        }

        debug!(name = entry.name(), ?args, "invoking entry point");
        let params: Vec<Val> = args.iter().copied().map(to_val).collect();
        let mut results = vec![Val::I32(0); signature.results.len()];
        entry
            .func()
            .call(&mut self.store, &params, &mut results)
            .map_err(|e| invocation(describe(&e)))?;

        results
            .iter()
            .map(|val| {
                from_val(val).ok_or_else(|| invocation(format!("unexpected result {val:?}")))
            })
            .collect()
    }
}

/// Trap message when the failure is a trap, else the full error chain.
fn describe(err: &wasmtime::Error) -> String {
    match err.downcast_ref::<Trap>() {
        Some(trap) => trap.to_string(),
        None => format!("{err:#}"),
    }
}

fn extern_kind(export: &Extern) -> &'static str {
    match export {
        Extern::Func(_) => "func",
        Extern::Global(_) => "global",
        Extern::Table(_) => "table",
        Extern::Memory(_) | Extern::SharedMemory(_) => "memory",
        #[allow(unreachable_patterns)]
        _ => "non-function item",
    }
}

fn host_type(ty: &wasmtime::ValType) -> Result<ValType, String> {
    match ty {
        wasmtime::ValType::I32 => Ok(ValType::I32),
        wasmtime::ValType::I64 => Ok(ValType::I64),
        wasmtime::ValType::F32 => Ok(ValType::F32),
        wasmtime::ValType::F64 => Ok(ValType::F64),
        other => Err(format!("{other:?}")),
    }
}

fn to_val(value: Value) -> Val {
    match value {
        Value::I32(v) => Val::I32(v),
        Value::I64(v) => Val::I64(v),
        Value::F32(v) => Val::F32(v.to_bits()),
        Value::F64(v) => Val::F64(v.to_bits()),
    }
}

fn from_val(val: &Val) -> Option<Value> {
    match *val {
        Val::I32(v) => Some(Value::I32(v)),
        Val::I64(v) => Some(Value::I64(v)),
        Val::F32(bits) => Some(Value::F32(f32::from_bits(bits))),
        Val::F64(bits) => Some(Value::F64(f64::from_bits(bits))),
        _ => None,
    }
}

fn join(types: &[ValType]) -> String {
    types
        .iter()
        .map(|ty| ty.name())
        .collect::<Vec<_>>()
        .join(" ")
}
