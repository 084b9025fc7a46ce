//! wasmhost kernel: the WebAssembly core used by the host harness.
//!
//! # API Surface
//!
//! - [`binary::decode::decode`] -- parse a binary module into a [`binary::module::Module`]
//! - [`binary::encode::encode`] -- serialize a `Module` back to binary form
//! - [`binary::wat::to_wat`] -- render a `Module` in text format
//! - [`value::Value`] -- typed scalars crossing the host/module boundary
//! - [`hash::artifact_digest`] -- content digest of artifact bytes
//!
//! # Module Dependency Direction
//!
//! `binary` ← `value`
//!
//! One-way only. `value` uses `binary::module::ValType`. `binary` and `hash`
//! depend on nothing internal.
//!
//! The kernel does not execute modules; instantiation and invocation belong
//! to the harness loader.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod binary;
pub mod hash;
pub mod value;
