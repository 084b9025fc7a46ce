//! Machine-readable module summary for `wasm2wat --json`.

use serde_json::{json, Value as JsonValue};

use wasmhost_kernel::binary::module::{FuncType, Module};
use wasmhost_kernel::hash::ContentHash;

fn signature_json(ty: &FuncType) -> JsonValue {
    json!({
        "params": ty.params.iter().map(|t| t.name()).collect::<Vec<_>>(),
        "results": ty.results.iter().map(|t| t.name()).collect::<Vec<_>>(),
    })
}

/// Summary of `module`: types, functions with their signatures, exports,
/// and the artifact digest.
#[must_use]
pub fn module_summary(module: &Module, digest: &ContentHash) -> JsonValue {
    let types: Vec<JsonValue> = module.types.iter().map(signature_json).collect();
    let functions: Vec<JsonValue> = module
        .funcs
        .iter()
        .zip(&module.bodies)
        .enumerate()
        .map(|(index, (&type_index, body))| {
            json!({
                "index": index,
                "type_index": type_index,
                "signature": module.types.get(type_index as usize).map(signature_json),
                "locals": body.declared_local_count(),
                "instructions": body.code.len(),
            })
        })
        .collect();
    let exports: Vec<JsonValue> = module
        .exports
        .iter()
        .map(|e| {
            json!({
                "name": e.name,
                "kind": e.kind.name(),
                "index": e.index,
            })
        })
        .collect();
    json!({
        "artifact_digest": digest.as_str(),
        "types": types,
        "functions": functions,
        "exports": exports,
    })
}
