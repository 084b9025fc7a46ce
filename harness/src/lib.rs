//! Wasmhost harness: loads a WebAssembly artifact, instantiates it through a
//! [`contract::ModuleLoader`], calls named entry points and reports their
//! results line by line.
//!
//! The harness does NOT decode or execute modules itself. It delegates to a
//! loader; [`loader::WasmtimeLoader`] compiles and runs artifacts with
//! `wasmtime`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod contract;
pub mod error;
pub mod fixtures;
pub mod inspect;
pub mod loader;
pub mod logging;
pub mod runner;
