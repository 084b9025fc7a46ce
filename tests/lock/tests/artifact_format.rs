//! Artifact format lock: decoder acceptance and rejection at the binary
//! level, WAT rendering and the JSON summary of the demo artifact.

use wasmhost_harness::contract::{ModuleHandle, ModuleLoader};
use wasmhost_harness::error::HarnessError;
use wasmhost_harness::fixtures::demo_artifact;
use wasmhost_harness::inspect::module_summary;
use wasmhost_harness::loader::WasmtimeLoader;
use wasmhost_kernel::binary::decode::{decode, DecodeError};
use wasmhost_kernel::binary::wat::to_wat;
use wasmhost_kernel::hash::artifact_digest;
use wasmhost_kernel::value::Value;

fn section(id: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![id, u8::try_from(payload.len()).expect("short payload")];
    out.extend_from_slice(payload);
    out
}

/// Append a section with `id` and `payload` to `bytes`.
fn with_section(mut bytes: Vec<u8>, id: u8, payload: &[u8]) -> Vec<u8> {
    bytes.extend(section(id, payload));
    bytes
}

/// Insert a section directly after the section with id `after`; returns the
/// new bytes and the offset of the inserted section.
///
/// Demo artifact sections are small enough for one-byte sizes.
fn insert_after(bytes: &[u8], after: u8, id: u8, payload: &[u8]) -> (Vec<u8>, usize) {
    let mut pos = 8;
    while pos < bytes.len() {
        let end = pos + 2 + usize::from(bytes[pos + 1]);
        if bytes[pos] == after {
            let mut out = bytes[..end].to_vec();
            out.extend(section(id, payload));
            out.extend_from_slice(&bytes[end..]);
            return (out, end);
        }
        pos = end;
    }
    panic!("no section {after} in artifact");
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

#[test]
fn demo_artifact_header_is_wasm_v1() {
    let bytes = demo_artifact(42).unwrap();
    assert_eq!(&bytes[..8], b"\0asm\x01\0\0\0");
}

#[test]
fn custom_and_memory_sections_are_skipped() {
    let bytes = with_section(demo_artifact(42).unwrap(), 0, b"\x04namex");
    // memory section: one memory, min 1 page
    let (bytes, _) = insert_after(&bytes, 3, 5, &[0x01, 0x00, 0x01]);
    assert_eq!(decode(&bytes).unwrap().exports.len(), 2);

    let mut handle = WasmtimeLoader::default().instantiate(bytes).unwrap();
    let get = handle.resolve("get_const_val").unwrap();
    assert_eq!(handle.invoke(get, &[]).unwrap(), [Value::I32(42)]);
}

#[test]
fn import_section_is_rejected() {
    // (import "env" "f" (func (type 0)))
    let (bytes, offset) = insert_after(
        &demo_artifact(42).unwrap(),
        1,
        2,
        b"\x01\x03env\x01f\x00\x00",
    );
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnsupportedSection { id: 2, offset })
    );
    // No host functions are linked, so the loader refuses it too.
    assert!(matches!(
        WasmtimeLoader::default().instantiate(bytes),
        Err(HarnessError::Instantiation { .. })
    ));
}

#[test]
fn start_section_is_rejected() {
    let (bytes, offset) = insert_after(&demo_artifact(42).unwrap(), 7, 8, &[0x00]);
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnsupportedSection { id: 8, offset })
    );
}

#[test]
fn sections_out_of_order_are_rejected() {
    let bytes = demo_artifact(42).unwrap();
    let offset = bytes.len();
    let bytes = with_section(bytes, 5, &[0x01, 0x00, 0x01]);
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::SectionOutOfOrder { id: 5, offset })
    );
    assert!(matches!(
        WasmtimeLoader::default().instantiate(bytes),
        Err(HarnessError::Instantiation { .. })
    ));
}

#[test]
fn duplicate_and_unknown_sections_are_rejected() {
    let bytes = demo_artifact(42).unwrap();
    let (dup, offset) = insert_after(&bytes, 1, 1, &[0x00]);
    assert_eq!(
        decode(&dup),
        Err(DecodeError::DuplicateSection { id: 1, offset })
    );
    let unknown = with_section(bytes, 0x2A, &[]);
    assert!(matches!(
        decode(&unknown),
        Err(DecodeError::UnknownSection { id: 0x2A, .. })
    ));
}

#[test]
fn bad_magic_and_version_are_rejected() {
    assert!(matches!(
        decode(b"\0ASM\x01\0\0\0"),
        Err(DecodeError::BadMagic { .. })
    ));
    assert!(matches!(
        decode(b"\0asm\x02\0\0\0"),
        Err(DecodeError::UnsupportedVersion { .. })
    ));
    assert!(matches!(
        decode(b"\0as"),
        Err(DecodeError::UnexpectedEof { .. })
    ));
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn demo_artifact_wat_layout() {
    let module = decode(&demo_artifact(42).unwrap()).unwrap();
    let expected = "\
(module
    (func $0
        (param) (result i32)
        (local)
        i32.const 42
    )
    (func $1
        (param i32 i32) (result i32)
        (local)
        local.get 0
        local.get 1
        i32.add
    )
    (export \"get_const_val\" (func $0))
    (export \"add_two_nums\" (func $1))
)";
    assert_eq!(to_wat(&module), expected);
}

#[test]
fn demo_artifact_summary_binds_digest() {
    let bytes = demo_artifact(42).unwrap();
    let digest = artifact_digest(&bytes);
    let module = decode(&bytes).unwrap();
    let summary = module_summary(&module, &digest);

    assert_eq!(summary["artifact_digest"], digest.as_str());
    let names: Vec<&str> = summary["exports"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert_eq!(names, ["get_const_val", "add_two_nums"]);
    assert_eq!(
        summary["functions"][0]["signature"],
        serde_json::json!({ "params": [], "results": ["i32"] })
    );
}
